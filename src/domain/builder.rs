//! Declarative element construction.
//!
//! An [`ElementSpec`] describes an element together with its mixed content.
//! Strings and child specs are flattened in order: a string before the first
//! child becomes the element's text, a string after a child becomes that
//! child's tail.

use tracing::instrument;

use crate::domain::arena::{append_str, Attributes, Document, NodeId};
use crate::domain::error::TreeResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Element(ElementSpec),
}

/// Blueprint of an element subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSpec {
    tag: String,
    attributes: Attributes,
    content: Vec<Content>,
    tail: Option<String>,
}

/// Shorthand for [`ElementSpec::new`].
pub fn el(tag: impl Into<String>) -> ElementSpec {
    ElementSpec::new(tag)
}

impl ElementSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Attributes::new(),
            content: Vec::new(),
            tail: None,
        }
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.set(key, value);
        self
    }

    /// Appends text after whatever content is already there.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.content.push(Content::Text(text.into()));
        self
    }

    pub fn child(mut self, child: ElementSpec) -> Self {
        self.content.push(Content::Element(child));
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = ElementSpec>) -> Self {
        self.content
            .extend(children.into_iter().map(Content::Element));
        self
    }

    /// Tail of the built element itself (only meaningful for a detached top node).
    pub fn tail(mut self, tail: impl Into<String>) -> Self {
        self.tail = Some(tail.into());
        self
    }
}

impl Document {
    /// Builds `spec` as a detached subtree.
    #[instrument(level = "trace", skip(self, spec), fields(tag = %spec.tag))]
    pub fn build(&mut self, spec: &ElementSpec) -> TreeResult<NodeId> {
        self.build_at(spec, 0)
    }

    /// Builds `spec` and makes it the document root.
    pub fn build_root(&mut self, spec: &ElementSpec) -> TreeResult<NodeId> {
        let root = self.build(spec)?;
        self.set_root(root)?;
        Ok(root)
    }

    fn build_at(&mut self, spec: &ElementSpec, depth: usize) -> TreeResult<NodeId> {
        self.check_depth(depth)?;
        let node = self.create_element(spec.tag.clone());
        {
            let element = self.element_mut(node)?;
            element.attributes = spec.attributes.clone();
            element.tail = spec.tail.clone();
        }
        let mut last_child: Option<NodeId> = None;
        for item in &spec.content {
            match item {
                Content::Text(s) => match last_child {
                    Some(child) => append_str(&mut self.element_mut(child)?.tail, s),
                    None => append_str(&mut self.element_mut(node)?.text, s),
                },
                Content::Element(child_spec) => {
                    let child = self.build_at(child_spec, depth + 1)?;
                    self.append_child(node, child)?;
                    last_child = Some(child);
                }
            }
        }
        Ok(node)
    }
}
