//! Relative element selectors.
//!
//! Supported forms, evaluated against a context element:
//!
//! | selector                           | selects              |
//! |------------------------------------|----------------------|
//! | `name`, `child::name`, `./name`    | children             |
//! | `.//name`, `descendant::name`      | all descendants      |
//!
//! `*` matches any tag. Tags are compared as opaque strings, so a Clark-style
//! `{uri}local` name is matched verbatim.

use std::str::FromStr;

use crate::domain::{Document, NodeId, TreeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameTest {
    Any,
    Tag(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    axis: Axis,
    name: NameTest,
}

const FORBIDDEN: &[char] = &[
    '/', '[', ']', '(', ')', '@', '=', '|', ',', '\'', '"', ':',
];

impl Selector {
    pub fn child(tag: impl Into<String>) -> Self {
        Self {
            axis: Axis::Child,
            name: NameTest::Tag(tag.into()),
        }
    }

    pub fn descendant(tag: impl Into<String>) -> Self {
        Self {
            axis: Axis::Descendant,
            name: NameTest::Tag(tag.into()),
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn name(&self) -> &NameTest {
        &self.name
    }

    /// Name test only; the axis is not considered.
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        match &self.name {
            NameTest::Any => doc.contains(node),
            NameTest::Tag(tag) => doc.tag(node) == Some(tag.as_str()),
        }
    }

    /// Matching nodes relative to `context`, in document order.
    pub fn select(&self, doc: &Document, context: NodeId) -> Vec<NodeId> {
        match self.axis {
            Axis::Child => doc
                .children(context)
                .iter()
                .copied()
                .filter(|&n| self.matches(doc, n))
                .collect(),
            Axis::Descendant => doc
                .descendants(context)
                .filter(|&n| self.matches(doc, n))
                .collect(),
        }
    }
}

impl FromStr for Selector {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| TreeError::InvalidSelector {
            selector: s.to_string(),
            reason: reason.to_string(),
        };
        let trimmed = s.trim();
        let (axis, name) = if let Some(rest) = trimmed.strip_prefix("descendant::") {
            (Axis::Descendant, rest)
        } else if let Some(rest) = trimmed.strip_prefix(".//") {
            (Axis::Descendant, rest)
        } else if let Some(rest) = trimmed.strip_prefix("child::") {
            (Axis::Child, rest)
        } else if let Some(rest) = trimmed.strip_prefix("./") {
            (Axis::Child, rest)
        } else {
            (Axis::Child, trimmed)
        };

        if name == "*" {
            return Ok(Self {
                axis,
                name: NameTest::Any,
            });
        }
        let local = match name.strip_prefix('{') {
            Some(rest) => rest
                .split_once('}')
                .map(|(_, local)| local)
                .ok_or_else(|| invalid("unterminated namespace"))?,
            None => name,
        };
        if local.is_empty() {
            return Err(invalid("missing name test"));
        }
        if local == "." || local == ".." {
            return Err(invalid("self and parent steps are not supported"));
        }
        if local.contains(|c: char| c.is_whitespace() || FORBIDDEN.contains(&c)) {
            return Err(invalid("only a single child or descendant step is supported"));
        }
        Ok(Self {
            axis,
            name: NameTest::Tag(name.to_string()),
        })
    }
}
