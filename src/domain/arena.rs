use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use generational_arena::{Arena, Index};
use tracing::{debug, instrument};

use crate::domain::error::{TreeError, TreeResult};

/// Default bound on recursion depth for walks over a subtree.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Handle of a node stored in a [`Document`].
///
/// Handles are generational: once a node is freed (see [`Document::discard`]
/// and [`Document::sweep`]) its handle never resolves again, even if the slot
/// is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(Index);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "#{slot}@{generation}")
    }
}

/// Insertion-ordered attribute list with unique keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Sets `key`, replacing an existing value in place (order is kept).
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let position = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(position).1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut attributes = Attributes::new();
        for (k, v) in iter {
            attributes.set(k, v);
        }
        attributes
    }
}

/// A markup element in the arena.
///
/// `parent` and `children` are only changed through [`Document`] so that
/// both directions of every link stay consistent.
#[derive(Debug, Clone)]
pub struct Element {
    /// Opaque tag name (may carry a namespace fragment)
    pub tag: String,
    pub attributes: Attributes,
    /// Content before the first child
    pub text: Option<String>,
    /// Content after this element, before the next sibling
    pub tail: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    fn new(tag: String) -> Self {
        Self {
            tag,
            attributes: Attributes::new(),
            text: None,
            tail: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    pub fn tail(&self) -> &str {
        self.tail.as_deref().unwrap_or("")
    }

    /// No text and no children. The tail does not count.
    pub fn is_empty(&self) -> bool {
        self.text().is_empty() && self.children.is_empty()
    }
}

/// Concatenates `s` onto an optional text slot.
pub(crate) fn append_str(slot: &mut Option<String>, s: &str) {
    if s.is_empty() {
        return;
    }
    slot.get_or_insert_with(String::new).push_str(s);
}

/// Arena-backed markup tree.
///
/// Children are the only ownership edge; the parent link is a plain handle.
/// Nodes detached by editing operations stay addressable until they are
/// discarded or swept.
#[derive(Debug)]
pub struct Document {
    arena: Arena<Element>,
    root: Option<NodeId>,
    max_depth: usize,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            max_depth,
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Number of live nodes, attached or not.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Creates a detached element.
    pub fn create_element(&mut self, tag: impl Into<String>) -> NodeId {
        NodeId(self.arena.insert(Element::new(tag.into())))
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    #[instrument(level = "trace", skip(self))]
    pub fn set_root(&mut self, node: NodeId) -> TreeResult<()> {
        if self.element(node)?.parent.is_some() {
            return Err(TreeError::structural(
                "set_root",
                format!("{node} is attached to a parent"),
            ));
        }
        self.root = Some(node);
        Ok(())
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.arena.contains(node.0)
    }

    pub fn get(&self, node: NodeId) -> Option<&Element> {
        self.arena.get(node.0)
    }

    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        self.arena.get_mut(node.0)
    }

    pub fn element(&self, node: NodeId) -> TreeResult<&Element> {
        self.get(node).ok_or(TreeError::NodeNotFound(node))
    }

    pub fn element_mut(&mut self, node: NodeId) -> TreeResult<&mut Element> {
        self.get_mut(node).ok_or(TreeError::NodeNotFound(node))
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.get(node).map(|el| el.tag.as_str())
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        self.get(node).map(Element::text)
    }

    pub fn tail(&self, node: NodeId) -> Option<&str> {
        self.get(node).map(Element::tail)
    }

    pub fn attribute(&self, node: NodeId, key: &str) -> Option<&str> {
        self.get(node).and_then(|el| el.attributes.get(key))
    }

    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) -> TreeResult<()> {
        self.element_mut(node)?.text = Some(text.into());
        Ok(())
    }

    pub fn set_tail(&mut self, node: NodeId, tail: impl Into<String>) -> TreeResult<()> {
        self.element_mut(node)?.tail = Some(tail.into());
        Ok(())
    }

    pub fn set_attribute(
        &mut self,
        node: NodeId,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> TreeResult<()> {
        self.element_mut(node)?.attributes.set(key, value);
        Ok(())
    }

    // == navigation ==

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.get(node).and_then(|el| el.parent)
    }

    /// Children of `node`; empty for unknown handles.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.get(node).map(Element::children).unwrap_or(&[])
    }

    pub fn index_in_parent(&self, node: NodeId) -> Option<usize> {
        let parent = self.parent(node)?;
        self.children(parent).iter().position(|&c| c == node)
    }

    pub fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        let index = self.index_in_parent(node)?;
        let parent = self.parent(node)?;
        index
            .checked_sub(1)
            .and_then(|i| self.children(parent).get(i).copied())
    }

    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let index = self.index_in_parent(node)?;
        let parent = self.parent(node)?;
        self.children(parent).get(index + 1).copied()
    }

    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.children(node).first().copied()
    }

    pub fn last_child(&self, node: NodeId) -> Option<NodeId> {
        self.children(node).last().copied()
    }

    /// True iff `text` is empty or absent and there are no children.
    pub fn is_empty(&self, node: NodeId) -> bool {
        self.get(node).is_some_and(Element::is_empty)
    }

    /// Ancestors of `node`, nearest first.
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(node), move |&n| self.parent(n))
    }

    /// True if `ancestor` is a proper ancestor of `node`.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|a| a == ancestor)
    }

    /// Number of ancestors of `node`.
    pub fn depth_of(&self, node: NodeId) -> usize {
        self.ancestors(node).count()
    }

    /// Topmost ancestor of `node` (itself when detached).
    pub fn tree_root(&self, node: NodeId) -> NodeId {
        self.ancestors(node).last().unwrap_or(node)
    }

    /// Descendants of `node` in document order, `node` excluded.
    pub fn descendants(&self, node: NodeId) -> Descendants<'_> {
        Descendants::new(self, node)
    }

    /// Child-index path from the tree root down to `node`.
    fn position(&self, node: NodeId) -> (NodeId, Vec<usize>) {
        let mut path = Vec::new();
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            path.push(self.index_in_parent(current).unwrap_or(0));
            current = parent;
        }
        path.reverse();
        (current, path)
    }

    /// Orders two nodes by document order. An ancestor sorts before its
    /// descendants. `None` when they live in different trees.
    pub fn compare_document_order(&self, a: NodeId, b: NodeId) -> Option<Ordering> {
        if !self.contains(a) || !self.contains(b) {
            return None;
        }
        let (root_a, path_a) = self.position(a);
        let (root_b, path_b) = self.position(b);
        (root_a == root_b).then(|| path_a.cmp(&path_b))
    }

    /// Number of levels in the subtree rooted at `node`.
    #[instrument(level = "trace", skip(self))]
    pub fn subtree_depth(&self, node: NodeId) -> usize {
        if !self.contains(node) {
            return 0;
        }
        let mut deepest = 0;
        let mut stack = vec![(node, 1)];
        while let Some((current, level)) = stack.pop() {
            deepest = deepest.max(level);
            stack.extend(self.children(current).iter().map(|&child| (child, level + 1)));
        }
        deepest
    }

    pub(crate) fn check_depth(&self, depth: usize) -> TreeResult<()> {
        if depth >= self.max_depth {
            return Err(TreeError::DepthExceeded {
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    // == structural mutators ==

    /// Inserts `node` as child of `parent` at `index` (clamped to the child
    /// count), detaching it from its previous parent first.
    #[instrument(level = "trace", skip(self))]
    pub fn insert_child(&mut self, parent: NodeId, index: usize, node: NodeId) -> TreeResult<()> {
        self.element(parent)?;
        self.element(node)?;
        if parent == node || self.is_ancestor(node, parent) {
            return Err(TreeError::structural(
                "insert_child",
                format!("{node} cannot be inserted into its own subtree"),
            ));
        }
        if self.root == Some(node) {
            return Err(TreeError::structural(
                "insert_child",
                format!("{node} is the document root"),
            ));
        }
        self.detach(node);
        let children = &mut self.element_mut(parent)?.children;
        let index = index.min(children.len());
        children.insert(index, node);
        self.element_mut(node)?.parent = Some(parent);
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, node: NodeId) -> TreeResult<()> {
        self.insert_child(parent, usize::MAX, node)
    }

    /// Unlinks `node` from `parent`. Text is not touched.
    #[instrument(level = "trace", skip(self))]
    pub fn remove_child(&mut self, parent: NodeId, node: NodeId) -> TreeResult<()> {
        self.element(parent)?;
        if self.element(node)?.parent != Some(parent) {
            return Err(TreeError::structural(
                "remove_child",
                format!("{node} is not a child of {parent}"),
            ));
        }
        self.detach(node);
        Ok(())
    }

    /// Unlinks `node` from its parent, returning the former parent and index.
    pub(crate) fn detach(&mut self, node: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.get(node)?.parent?;
        let index = self.get_mut(parent).and_then(|p| {
            let i = p.children.iter().position(|&c| c == node)?;
            p.children.remove(i);
            Some(i)
        });
        if let Some(el) = self.get_mut(node) {
            el.parent = None;
        }
        index.map(|i| (parent, i))
    }

    /// Appends `s` to the text slot right before `node`: the parent's text
    /// when `node` is the first child, otherwise the previous sibling's tail.
    pub(crate) fn append_before(&mut self, node: NodeId, s: &str) -> TreeResult<()> {
        let parent = self.parent(node).ok_or_else(|| {
            TreeError::structural("append_before", format!("{node} has no parent"))
        })?;
        match self.previous_sibling(node) {
            Some(previous) => append_str(&mut self.element_mut(previous)?.tail, s),
            None => append_str(&mut self.element_mut(parent)?.text, s),
        }
        Ok(())
    }

    pub(crate) fn append_text(&mut self, node: NodeId, s: &str) -> TreeResult<()> {
        append_str(&mut self.element_mut(node)?.text, s);
        Ok(())
    }

    pub(crate) fn append_tail(&mut self, node: NodeId, s: &str) -> TreeResult<()> {
        append_str(&mut self.element_mut(node)?.tail, s);
        Ok(())
    }

    pub(crate) fn take_text(&mut self, node: NodeId) -> TreeResult<Option<String>> {
        Ok(self.element_mut(node)?.text.take())
    }

    pub(crate) fn take_tail(&mut self, node: NodeId) -> TreeResult<Option<String>> {
        Ok(self.element_mut(node)?.tail.take())
    }

    /// Moves the children of `from` in `range` to the end of `to`, in order.
    pub(crate) fn move_children(
        &mut self,
        from: NodeId,
        range: std::ops::RangeFrom<usize>,
        to: NodeId,
    ) -> TreeResult<()> {
        let moving: Vec<NodeId> = self.children(from).get(range).unwrap_or(&[]).to_vec();
        for child in moving {
            self.append_child(to, child)?;
        }
        Ok(())
    }

    // == copies ==

    /// New detached element with the tag and attributes of `node`.
    pub fn shallow_copy(&mut self, node: NodeId) -> TreeResult<NodeId> {
        let source = self.element(node)?;
        let mut copy = Element::new(source.tag.clone());
        copy.attributes = source.attributes.clone();
        Ok(NodeId(self.arena.insert(copy)))
    }

    /// Detached copy of the whole subtree, including text and tail.
    #[instrument(level = "debug", skip(self))]
    pub fn deep_copy(&mut self, node: NodeId) -> TreeResult<NodeId> {
        self.deep_copy_at(node, 0)
    }

    fn deep_copy_at(&mut self, node: NodeId, depth: usize) -> TreeResult<NodeId> {
        self.check_depth(depth)?;
        let source = self.element(node)?;
        let mut copy = Element::new(source.tag.clone());
        copy.attributes = source.attributes.clone();
        copy.text = source.text.clone();
        copy.tail = source.tail.clone();
        let children = source.children.clone();

        let id = NodeId(self.arena.insert(copy));
        for child in children {
            let child_copy = match self.deep_copy_at(child, depth + 1) {
                Ok(c) => c,
                Err(e) => {
                    self.discard(id)?;
                    return Err(e);
                }
            };
            self.element_mut(child_copy)?.parent = Some(id);
            self.element_mut(id)?.children.push(child_copy);
        }
        Ok(id)
    }

    // == lifetime ==

    /// Detaches `node` and frees its whole subtree. Returns the number of
    /// nodes freed.
    #[instrument(level = "debug", skip(self))]
    pub fn discard(&mut self, node: NodeId) -> TreeResult<usize> {
        self.element(node)?;
        self.detach(node);
        let mut freed = 0;
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if let Some(el) = self.arena.remove(current.0) {
                stack.extend(el.children);
                freed += 1;
            }
        }
        if self.root == Some(node) {
            self.root = None;
        }
        Ok(freed)
    }

    /// Frees every node not reachable from the document root.
    #[instrument(level = "debug", skip(self))]
    pub fn sweep(&mut self) -> usize {
        let Some(root) = self.root else {
            debug!("no document root, nothing swept");
            return 0;
        };
        let mut reachable: HashSet<NodeId> = self.descendants(root).collect();
        reachable.insert(root);
        let garbage: Vec<Index> = self
            .arena
            .iter()
            .map(|(index, _)| index)
            .filter(|index| !reachable.contains(&NodeId(*index)))
            .collect();
        for index in &garbage {
            self.arena.remove(*index);
        }
        debug!(freed = garbage.len(), "swept detached nodes");
        garbage.len()
    }

    /// Verifies that parent and child links agree everywhere.
    pub fn check_links(&self) -> TreeResult<()> {
        let broken = |reason: String| TreeError::structural("check_links", reason);
        if let Some(root) = self.root {
            if self.parent(root).is_some() {
                return Err(broken(format!("root {root} has a parent")));
            }
        }
        let mut listed = HashSet::new();
        for (index, el) in self.arena.iter() {
            let id = NodeId(index);
            if let Some(parent) = el.parent {
                match self.get(parent) {
                    None => return Err(broken(format!("{id} points to freed parent {parent}"))),
                    Some(p) if !p.children.contains(&id) => {
                        return Err(broken(format!("{parent} does not list its child {id}")))
                    }
                    Some(_) => {}
                }
            }
            for &child in &el.children {
                if !listed.insert(child) {
                    return Err(broken(format!("{child} is listed twice")));
                }
                match self.get(child) {
                    None => return Err(broken(format!("{id} lists freed child {child}"))),
                    Some(c) if c.parent != Some(id) => {
                        return Err(broken(format!("{child} does not point back to {id}")))
                    }
                    Some(_) => {}
                }
            }
        }
        Ok(())
    }
}

/// Pre-order walk below a node, left to right.
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl<'a> Descendants<'a> {
    fn new(doc: &'a Document, node: NodeId) -> Self {
        let stack = doc.children(node).iter().rev().copied().collect();
        Self { doc, stack }
    }
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        self.stack
            .extend(self.doc.children(current).iter().rev().copied());
        Some(current)
    }
}
