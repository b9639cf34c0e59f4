//! Nesting transforms: moving an element across the nesting of another
//! while keeping text and document order.

use tracing::{debug, instrument};

use crate::application::selector::Selector;
use crate::domain::{Document, NodeId, TreeError, TreeResult};

impl Document {
    /// Pulls `node` up to be a sibling of its parent, splitting the parent in
    /// two around it:
    ///
    /// `<x><y>1<z/>2</y></x>` becomes `<x><y>1</y><z/><y>2</y></x>`.
    ///
    /// Either half of the split parent is pruned when it ends up empty.
    #[instrument(level = "debug", skip(self))]
    pub fn unnest(&mut self, node: NodeId) -> TreeResult<()> {
        self.element(node)?;
        let parent = self
            .parent(node)
            .ok_or_else(|| TreeError::structural("unnest", format!("{node} has no parent")))?;
        let grandparent = self.parent(parent).ok_or_else(|| {
            TreeError::structural("unnest", format!("{node} has no grandparent"))
        })?;
        let index = self.index_in_parent(node).unwrap_or(0);

        // everything in front of node goes into a copy placed before parent
        let pre_parent = self.shallow_copy(parent)?;
        let text = self.take_text(parent)?;
        self.element_mut(pre_parent)?.text = text;
        let leading = self.children(parent)[..index].to_vec();
        for child in leading {
            self.append_child(pre_parent, child)?;
        }
        let at = self.index_in_parent(parent).unwrap_or(0);
        self.insert_child(grandparent, at, pre_parent)?;
        self.prune(pre_parent)?;

        self.remove(node, true)?;
        let at = self.index_in_parent(parent).unwrap_or(0);
        self.insert_child(grandparent, at, node)?;
        self.element_mut(node)?.tail = None;

        if self.prune(parent)? {
            debug!(%parent, "original parent left empty");
        }
        Ok(())
    }

    /// For every element selected by `selector` inside `outer`, wraps that
    /// element's content in a fresh copy of `outer`, then replaces `outer`
    /// with its contents and frees it. The nesting of `outer` is pushed one
    /// level down, once per match.
    #[instrument(level = "debug", skip(self))]
    pub fn interior_nesting(&mut self, outer: NodeId, selector: &str) -> TreeResult<()> {
        let selector: Selector = selector.parse()?;
        self.element(outer)?;
        if self.parent(outer).is_none() {
            return Err(TreeError::structural(
                "interior_nesting",
                format!("{outer} has no parent"),
            ));
        }
        let matches = selector.select(self, outer);
        debug!(count = matches.len(), "interior nesting matches");
        for inner in matches {
            let copy = self.shallow_copy(outer)?;
            let text = self.take_text(inner)?;
            self.element_mut(copy)?.text = text;
            self.move_children(inner, 0.., copy)?;
            self.insert_child(inner, 0, copy)?;
        }
        self.replace_with_contents(outer)?;
        self.discard(outer)?;
        Ok(())
    }

    /// Splits `outer` at each direct child tagged `inner_tag`:
    ///
    /// `<p>a<br/>b<br/>c</p>` becomes `<p>a</p><br/><p>b</p><br/><p>c</p>`.
    ///
    /// Each extracted child has its own content wrapped in a copy of `outer`
    /// (pruned when empty). Empty fragments are pruned. Returns the number of
    /// children extracted; zero matches leave the tree unchanged.
    #[instrument(level = "debug", skip(self))]
    pub fn fragment_nesting(&mut self, outer: NodeId, inner_tag: &str) -> TreeResult<usize> {
        self.element(outer)?;
        if self.first_child_tagged(outer, inner_tag).is_none() {
            return Ok(0);
        }
        if self.parent(outer).is_none() {
            return Err(TreeError::structural(
                "fragment_nesting",
                format!("{outer} has no parent"),
            ));
        }

        let mut extracted = 0;
        let mut current = outer;
        while let Some(matched) = self.first_child_tagged(current, inner_tag) {
            let index = self.index_in_parent(matched).unwrap_or(0);

            let inner_copy = self.shallow_copy(current)?;
            let text = self.take_text(matched)?;
            self.element_mut(inner_copy)?.text = text;
            self.move_children(matched, 0.., inner_copy)?;
            self.append_child(matched, inner_copy)?;
            self.prune(inner_copy)?;

            let trailing = self.shallow_copy(current)?;
            let text = self.take_tail(matched)?;
            self.element_mut(trailing)?.text = text;
            self.move_children(current, index + 1.., trailing)?;

            let parent = self.parent(current).ok_or_else(|| {
                TreeError::structural("fragment_nesting", format!("{current} lost its parent"))
            })?;
            let at = self.index_in_parent(current).unwrap_or(0) + 1;
            self.insert_child(parent, at, matched)?;
            self.insert_child(parent, at + 1, trailing)?;
            let tail = self.take_tail(current)?;
            self.element_mut(trailing)?.tail = tail;
            extracted += 1;
            debug!(%matched, %trailing, "fragment created");

            self.prune(current)?;
            if self.prune(trailing)? {
                break;
            }
            current = trailing;
        }
        Ok(extracted)
    }

    fn first_child_tagged(&self, node: NodeId, tag: &str) -> Option<NodeId> {
        self.children(node)
            .iter()
            .copied()
            .find(|&c| self.tag(c) == Some(tag))
    }
}
