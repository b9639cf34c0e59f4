//! Text and vocabulary auditing over a subtree.

use std::collections::BTreeMap;

use tracing::instrument;

use crate::domain::arena::{Document, NodeId};
use crate::domain::error::TreeResult;

/// tag -> attribute name -> distinct values, in first-seen order.
pub type TagDict = BTreeMap<String, BTreeMap<String, Vec<String>>>;

impl Document {
    /// Document-order concatenation of the text of `node` and the text and
    /// tails of everything below it. The node's own tail is not included.
    pub fn visible_text(&self, node: NodeId) -> TreeResult<String> {
        let mut out = String::new();
        self.collect_text(node, 0, &mut out)?;
        Ok(out)
    }

    fn collect_text(&self, node: NodeId, depth: usize, out: &mut String) -> TreeResult<()> {
        self.check_depth(depth)?;
        let element = self.element(node)?;
        out.push_str(element.text());
        for &child in element.children() {
            self.collect_text(child, depth + 1, out)?;
            out.push_str(self.element(child)?.tail());
        }
        Ok(())
    }

    /// Number of whitespace-delimited words in the visible text.
    #[instrument(level = "debug", skip(self))]
    pub fn num_words(&self, node: NodeId) -> TreeResult<usize> {
        Ok(self.visible_text(node)?.split_whitespace().count())
    }

    /// Tags used in the subtree rooted at `root` (itself included) with the
    /// attribute values seen on each.
    #[instrument(level = "debug", skip(self))]
    pub fn tag_dict(&self, root: NodeId, exclude_attributes: &[&str]) -> TreeResult<TagDict> {
        let mut tags = TagDict::new();
        for node in std::iter::once(root).chain(self.descendants(root)) {
            let element = self.element(node)?;
            let entry = tags.entry(element.tag.clone()).or_default();
            for (key, value) in element.attributes.iter() {
                if exclude_attributes.contains(&key) {
                    continue;
                }
                let values = entry.entry(key.to_string()).or_default();
                if !values.iter().any(|v| v == value) {
                    values.push(value.to_string());
                }
            }
        }
        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::builder::el;
    use crate::domain::Document;

    #[test]
    fn test_visible_text_follows_document_order() {
        let mut doc = Document::new();
        let a = doc
            .build(
                &el("a")
                    .text("1")
                    .child(el("b").text("2").child(el("c")).text("3"))
                    .text("4")
                    .tail("not mine"),
            )
            .unwrap();
        assert_eq!(doc.visible_text(a).unwrap(), "1234");
    }

    #[test]
    fn test_num_words_counts_across_elements() {
        let mut doc = Document::new();
        let p = doc
            .build(&el("p").text(" one two ").child(el("i").text("three")).text(" four"))
            .unwrap();
        assert_eq!(doc.num_words(p).unwrap(), 4);
        let empty = doc.build(&el("p")).unwrap();
        assert_eq!(doc.num_words(empty).unwrap(), 0);
    }

    #[test]
    fn test_tag_dict_collects_distinct_values() {
        let mut doc = Document::new();
        let root = doc
            .build(
                &el("doc")
                    .child(el("p").attr("class", "a").attr("id", "1"))
                    .child(el("p").attr("class", "b").attr("id", "2"))
                    .child(el("p").attr("class", "a")),
            )
            .unwrap();
        let tags = doc.tag_dict(root, &["id"]).unwrap();
        assert!(tags["doc"].is_empty());
        assert_eq!(tags["p"]["class"], vec!["a".to_string(), "b".to_string()]);
        assert!(!tags["p"].contains_key("id"));
    }
}
