//! Removal that keeps the surrounding text stream intact.

use tracing::{debug, instrument};

use crate::domain::{Document, NodeId, TreeError, TreeResult};

impl Document {
    /// Detaches `node` from its parent and returns it.
    ///
    /// With `keep_tail`, the node's tail is moved onto the parent's text (first
    /// child) or the previous sibling's tail, and cleared on the node.
    #[instrument(level = "debug", skip(self))]
    pub fn remove(&mut self, node: NodeId, keep_tail: bool) -> TreeResult<NodeId> {
        self.element(node)?;
        let parent = self
            .parent(node)
            .ok_or_else(|| TreeError::structural("remove", format!("{node} has no parent")))?;
        if keep_tail {
            if let Some(tail) = self.take_tail(node)? {
                self.append_before(node, &tail)?;
            }
        }
        self.remove_child(parent, node)?;
        Ok(node)
    }

    /// Removes `node` if it has no text and no children. Returns whether it
    /// was removed. A node that is already detached is left alone, so a
    /// second call is a no-op.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_if_empty(&mut self, node: NodeId, keep_tail: bool) -> TreeResult<bool> {
        if !self.element(node)?.is_empty() || self.parent(node).is_none() {
            return Ok(false);
        }
        self.remove(node, keep_tail)?;
        debug!(%node, "removed empty node");
        Ok(true)
    }

    /// Removes `node` if empty and frees it.
    pub(crate) fn prune(&mut self, node: NodeId) -> TreeResult<bool> {
        let removed = self.remove_if_empty(node, true)?;
        if removed {
            self.discard(node)?;
        }
        Ok(removed)
    }

    /// Replaces `node` by its children, merging its text and tail into the
    /// neighbouring text slots. `node` is left detached and empty.
    #[instrument(level = "debug", skip(self))]
    pub fn replace_with_contents(&mut self, node: NodeId) -> TreeResult<()> {
        self.element(node)?;
        let parent = self.parent(node).ok_or_else(|| {
            TreeError::structural("replace_with_contents", format!("{node} has no parent"))
        })?;
        let index = self.index_in_parent(node).ok_or_else(|| {
            TreeError::structural(
                "replace_with_contents",
                format!("{parent} does not list {node}"),
            )
        })?;
        let children = self.children(node).to_vec();

        if let Some(text) = self.take_text(node)? {
            self.append_before(node, &text)?;
        }
        let tail = self.take_tail(node)?;
        for (offset, &child) in children.iter().enumerate() {
            self.insert_child(parent, index + offset, child)?;
        }
        if let Some(tail) = tail {
            match children.last() {
                Some(&last) => self.append_tail(last, &tail)?,
                None => self.append_before(node, &tail)?,
            }
        }
        self.remove_child(parent, node)?;
        debug!(%node, moved = children.len(), "replaced node with its contents");
        Ok(())
    }
}
