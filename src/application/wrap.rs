use tracing::instrument;

use crate::domain::{Document, NodeId, TreeError, TreeResult};

impl Document {
    /// Moves the text and children of `container` into `wrapper` (after any
    /// content `wrapper` already has) and makes `wrapper` the only child of
    /// `container`. The tail of `container` is untouched.
    ///
    /// `wrapper` must be a detached node other than `container`.
    #[instrument(level = "debug", skip(self))]
    pub fn wrap_content(&mut self, container: NodeId, wrapper: NodeId) -> TreeResult<NodeId> {
        self.element(container)?;
        self.element(wrapper)?;
        if wrapper == container {
            return Err(TreeError::structural(
                "wrap_content",
                format!("{wrapper} cannot wrap itself"),
            ));
        }
        if self.parent(wrapper).is_some()
            || self.root() == Some(wrapper)
            || self.is_ancestor(wrapper, container)
        {
            return Err(TreeError::structural(
                "wrap_content",
                format!("wrapper {wrapper} must be a detached node outside {container}"),
            ));
        }

        if let Some(text) = self.take_text(container)? {
            match self.last_child(wrapper) {
                Some(last) => self.append_tail(last, &text)?,
                None => self.append_text(wrapper, &text)?,
            }
        }
        self.move_children(container, 0.., wrapper)?;
        self.insert_child(container, 0, wrapper)?;
        Ok(container)
    }
}
