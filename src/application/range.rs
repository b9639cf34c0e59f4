//! Deletion of a document-order span that may cross element boundaries.

use std::cmp::Ordering;

use tracing::{debug, instrument};

use crate::domain::{Document, NodeId, TreeError, TreeResult};

impl Document {
    /// Deletes everything from `start` up to `end` in document order,
    /// including `start`, and including `end` when `delete_end` is set.
    ///
    /// `start` and `end` may sit at different levels. Ancestors of `end` lose
    /// the text in front of the range and are pruned if they end up empty;
    /// ancestors of `start` lose the text after the range and are pruned the
    /// same way. Deleted nodes are freed.
    ///
    /// Fails with a structural error, before touching the tree, when `end`
    /// does not follow `start` in the same tree.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_range(&mut self, start: NodeId, end: NodeId, delete_end: bool) -> TreeResult<()> {
        self.element(start)?;
        self.element(end)?;
        match self.compare_document_order(start, end) {
            Some(Ordering::Less | Ordering::Equal) => {}
            _ => {
                return Err(TreeError::structural(
                    "remove_range",
                    format!("{end} is not reachable from {start} in document order"),
                ))
            }
        }
        if start == end && delete_end && self.parent(end).is_none() {
            return Err(TreeError::structural(
                "remove_range",
                format!("{end} has no parent"),
            ));
        }
        if self.depth_of(start) + self.depth_of(end) >= self.max_depth() {
            return Err(TreeError::DepthExceeded {
                limit: self.max_depth(),
            });
        }
        let parent = self.parent(start);
        self.remove_span(Some(start), parent, end, delete_end)
    }

    /// One level of the walk: `start` is the first node to delete (or `None`
    /// once the sibling chain inside `parent` is exhausted).
    fn remove_span(
        &mut self,
        start: Option<NodeId>,
        mut parent: Option<NodeId>,
        end: NodeId,
        delete_end: bool,
    ) -> TreeResult<()> {
        let mut current = start;
        while let Some(node) = current {
            if node == end || self.is_ancestor(node, end) {
                break;
            }
            parent = self.parent(node);
            current = self.next_sibling(node);
            // the tail belongs to the deleted span
            self.discard(node)?;
        }

        match current {
            Some(node) if node == end => {
                if delete_end {
                    self.remove(end, true)?;
                    self.discard(end)?;
                }
            }
            Some(node) => {
                debug!(%node, "descending into ancestor of range end");
                self.element_mut(node)?.text = None;
                let first = self.first_child(node);
                self.remove_span(first, Some(node), end, delete_end)?;
                self.prune(node)?;
            }
            None => {
                let parent = parent.ok_or_else(|| {
                    TreeError::structural("remove_range", format!("{end} was never reached"))
                })?;
                if self.parent(parent).is_none() {
                    return Err(TreeError::structural(
                        "remove_range",
                        format!("{end} was never reached"),
                    ));
                }
                debug!(%parent, "ascending past exhausted parent");
                self.element_mut(parent)?.tail = None;
                let next = self.next_sibling(parent);
                let grandparent = self.parent(parent);
                self.remove_span(next, grandparent, end, delete_end)?;
                self.prune(parent)?;
            }
        }
        Ok(())
    }
}
