//! Wrapping of whitespace-delimited words in marker elements.

#![allow(clippy::expect_used)]

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use crate::config::TaggingConfig;
use crate::domain::{Document, NodeId, TreeResult};

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S+").expect("WORD regex"));

/// Splits `s` into its leading whitespace and `(word, following whitespace)`
/// pairs.
fn split_words(s: &str) -> (&str, Vec<(&str, &str)>) {
    let found: Vec<_> = WORD.find_iter(s).collect();
    let lead = &s[..found.first().map_or(s.len(), |m| m.start())];
    let words = found
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let gap_end = found.get(i + 1).map_or(s.len(), |next| next.start());
            (m.as_str(), &s[m.end()..gap_end])
        })
        .collect();
    (lead, words)
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

/// Tags every word of a subtree's text with a marker element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordTagger {
    marker_tag: String,
    excluded_tags: HashSet<String>,
}

impl WordTagger {
    pub fn new(marker_tag: impl Into<String>) -> Self {
        Self {
            marker_tag: marker_tag.into(),
            excluded_tags: HashSet::new(),
        }
    }

    /// Subtrees rooted at these tags are not tokenized (their tails are).
    pub fn excluding<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn from_config(config: &TaggingConfig) -> Self {
        Self::new(config.marker_tag.clone()).excluding(config.excluded_tags.iter().cloned())
    }

    pub fn marker_tag(&self) -> &str {
        &self.marker_tag
    }

    /// Returns a detached deep copy of `root` in which every word is wrapped
    /// in a marker element. `root` itself is not modified.
    ///
    /// The copy carries no tail, since the tail of `root` lies outside the
    /// tagged subtree. An excluded `root` comes back untokenized.
    #[instrument(level = "debug", skip(self, doc), fields(marker = %self.marker_tag))]
    pub fn tag_words_in(&self, doc: &mut Document, root: NodeId) -> TreeResult<NodeId> {
        let copy = doc.deep_copy(root)?;
        doc.element_mut(copy)?.tail = None;
        if self.is_excluded(doc, copy) {
            debug!(%root, "root tag is excluded, nothing tagged");
            return Ok(copy);
        }
        if let Err(e) = self.tag_element(doc, copy, 0) {
            doc.discard(copy)?;
            return Err(e);
        }
        Ok(copy)
    }

    fn is_excluded(&self, doc: &Document, node: NodeId) -> bool {
        doc.tag(node)
            .is_some_and(|tag| self.excluded_tags.contains(tag))
    }

    fn tag_element(&self, doc: &mut Document, node: NodeId, depth: usize) -> TreeResult<()> {
        doc.check_depth(depth)?;
        let children = doc.children(node).to_vec();

        if let Some(text) = doc.take_text(node)? {
            let (lead, words) = split_words(&text);
            doc.element_mut(node)?.text = non_empty(lead);
            for (offset, (word, gap)) in words.into_iter().enumerate() {
                let marker = self.marker(doc, word, gap)?;
                doc.insert_child(node, offset, marker)?;
            }
        }

        for child in children {
            if !self.is_excluded(doc, child) {
                self.tag_element(doc, child, depth + 1)?;
            }
            if let Some(tail) = doc.take_tail(child)? {
                let (lead, words) = split_words(&tail);
                doc.element_mut(child)?.tail = non_empty(lead);
                let at = doc.index_in_parent(child).map_or(0, |i| i + 1);
                for (offset, (word, gap)) in words.into_iter().enumerate() {
                    let marker = self.marker(doc, word, gap)?;
                    doc.insert_child(node, at + offset, marker)?;
                }
            }
        }
        Ok(())
    }

    fn marker(&self, doc: &mut Document, word: &str, gap: &str) -> TreeResult<NodeId> {
        let marker = doc.create_element(self.marker_tag.clone());
        let element = doc.element_mut(marker)?;
        element.text = Some(word.to_string());
        element.tail = non_empty(gap);
        Ok(marker)
    }
}

impl Document {
    /// [`WordTagger::tag_words_in`] without exclusions.
    pub fn tag_words_in(&mut self, root: NodeId, marker_tag: &str) -> TreeResult<NodeId> {
        WordTagger::new(marker_tag).tag_words_in(self, root)
    }
}
