//! Rule-based transformations.
//!
//! A [`Transformer`] holds an ordered list of rules. Each node is handed to
//! the first rule whose matcher accepts it; nodes no rule accepts produce
//! nothing. Handlers return [`Piece`]s, which are spliced together by the
//! caller, typically through [`Document::assemble`].
//!
//! Handlers own the text after a node: a node returned as a piece is placed
//! without its tail, so a handler that wants the tail kept emits it as a
//! text piece (the helpers below do).

use std::fmt;

use tracing::{debug, instrument, trace};

use crate::application::selector::Selector;
use crate::domain::arena::append_str;
use crate::domain::{Document, NodeId, TreeResult};

/// Output unit of a transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    Text(String),
    Node(NodeId),
}

type Predicate = Box<dyn Fn(&Document, NodeId) -> bool>;
type Handler = Box<dyn Fn(&Transformer, &mut Document, NodeId) -> TreeResult<Vec<Piece>>>;

/// Decides whether a rule applies to a node.
pub enum Matcher {
    Tag(String),
    /// Matches when the selector selects anything from the node.
    Selector(Selector),
    Predicate(Predicate),
}

impl Matcher {
    fn accepts(&self, doc: &Document, node: NodeId) -> bool {
        match self {
            Matcher::Tag(tag) => doc.tag(node) == Some(tag.as_str()),
            Matcher::Selector(selector) => !selector.select(doc, node).is_empty(),
            Matcher::Predicate(predicate) => predicate(doc, node),
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Tag(tag) => f.debug_tuple("Tag").field(tag).finish(),
            Matcher::Selector(selector) => f.debug_tuple("Selector").field(selector).finish(),
            Matcher::Predicate(_) => f.write_str("Predicate"),
        }
    }
}

struct Rule {
    matcher: Matcher,
    handler: Handler,
}

#[derive(Default)]
pub struct Transformer {
    rules: Vec<Rule>,
}

impl fmt::Debug for Transformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|rule| &rule.matcher))
            .finish()
    }
}

impl Transformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule; rules are tried in the order they were added.
    pub fn rule<H>(mut self, matcher: Matcher, handler: H) -> Self
    where
        H: Fn(&Transformer, &mut Document, NodeId) -> TreeResult<Vec<Piece>> + 'static,
    {
        self.rules.push(Rule {
            matcher,
            handler: Box::new(handler),
        });
        self
    }

    pub fn on_tag<H>(self, tag: impl Into<String>, handler: H) -> Self
    where
        H: Fn(&Transformer, &mut Document, NodeId) -> TreeResult<Vec<Piece>> + 'static,
    {
        self.rule(Matcher::Tag(tag.into()), handler)
    }

    pub fn on_selector<H>(self, selector: Selector, handler: H) -> Self
    where
        H: Fn(&Transformer, &mut Document, NodeId) -> TreeResult<Vec<Piece>> + 'static,
    {
        self.rule(Matcher::Selector(selector), handler)
    }

    pub fn on<P, H>(self, predicate: P, handler: H) -> Self
    where
        P: Fn(&Document, NodeId) -> bool + 'static,
        H: Fn(&Transformer, &mut Document, NodeId) -> TreeResult<Vec<Piece>> + 'static,
    {
        self.rule(Matcher::Predicate(Box::new(predicate)), handler)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Runs the first matching rule on `node`.
    pub fn apply_node(&self, doc: &mut Document, node: NodeId) -> TreeResult<Vec<Piece>> {
        match self.rules.iter().position(|r| r.matcher.accepts(doc, node)) {
            Some(index) => {
                trace!(%node, rule = index, "rule matched");
                (self.rules[index].handler)(self, doc, node)
            }
            None => {
                debug!(%node, "no rule matched");
                Ok(Vec::new())
            }
        }
    }

    /// Transforms each node piece; text pieces pass through unchanged.
    pub fn apply(&self, doc: &mut Document, pieces: Vec<Piece>) -> TreeResult<Vec<Piece>> {
        let mut out = Vec::new();
        for piece in pieces {
            match piece {
                Piece::Text(_) => out.push(piece),
                Piece::Node(node) => out.extend(self.apply_node(doc, node)?),
            }
        }
        Ok(out)
    }

    /// Transforms a deep copy of `node`, leaving the original untouched, and
    /// returns the first piece produced.
    ///
    /// The working copy is freed afterwards unless the returned piece is the
    /// copy or lies inside it. Nodes of further pieces are left detached for
    /// [`Document::sweep`].
    #[instrument(level = "debug", skip(self, doc))]
    pub fn transform(&self, doc: &mut Document, node: NodeId) -> TreeResult<Option<Piece>> {
        let copy = doc.deep_copy(node)?;
        let first = match self.apply_node(doc, copy) {
            Ok(pieces) => pieces.into_iter().next(),
            Err(e) => {
                if doc.contains(copy) {
                    doc.discard(copy)?;
                }
                return Err(e);
            }
        };
        let keeps_copy = matches!(
            first,
            Some(Piece::Node(n)) if n == copy || doc.is_ancestor(copy, n)
        );
        if !keeps_copy && doc.contains(copy) {
            let freed = doc.discard(copy)?;
            trace!(%copy, freed, "working copy discarded");
        }
        Ok(first)
    }

    // == common handlers ==

    /// The node's text, its transformed children and, with `with_tail`, its
    /// tail.
    pub fn inner_content(
        &self,
        doc: &mut Document,
        node: NodeId,
        with_tail: bool,
    ) -> TreeResult<Vec<Piece>> {
        let element = doc.element(node)?;
        let mut pieces = vec![Piece::Text(element.text().to_string())];
        let tail = element.tail().to_string();
        let children = element
            .children()
            .iter()
            .copied()
            .map(Piece::Node)
            .collect();
        pieces.extend(self.apply(doc, children)?);
        if with_tail {
            pieces.push(Piece::Text(tail));
        }
        Ok(pieces)
    }

    /// Drops the node, keeping only its tail when asked.
    pub fn omit(&self, doc: &Document, node: NodeId, keep_tail: bool) -> TreeResult<Vec<Piece>> {
        let tail = doc.element(node)?.tail.clone();
        Ok(match tail {
            Some(tail) if keep_tail => vec![Piece::Text(tail)],
            _ => Vec::new(),
        })
    }

    /// A deep copy of the node followed by its tail.
    pub fn copy(&self, doc: &mut Document, node: NodeId) -> TreeResult<Vec<Piece>> {
        let copy = doc.deep_copy(node)?;
        let tail = doc.take_tail(copy)?;
        let mut pieces = vec![Piece::Node(copy)];
        pieces.extend(tail.map(Piece::Text));
        Ok(pieces)
    }
}

impl Document {
    /// Builds a detached element from pieces. Text flows into the element's
    /// text or the tail of the preceding node; node pieces are moved in
    /// without their tails.
    #[instrument(level = "trace", skip(self, pieces))]
    pub fn assemble(&mut self, tag: &str, pieces: Vec<Piece>) -> TreeResult<NodeId> {
        let node = self.create_element(tag);
        for piece in pieces {
            match piece {
                Piece::Text(text) => match self.last_child(node) {
                    Some(last) => append_str(&mut self.element_mut(last)?.tail, &text),
                    None => append_str(&mut self.element_mut(node)?.text, &text),
                },
                Piece::Node(child) => {
                    self.element_mut(child)?.tail = None;
                    self.append_child(node, child)?;
                }
            }
        }
        Ok(node)
    }
}
