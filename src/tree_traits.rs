//! Debug display of a subtree as an indented tree.

use termtree::Tree;
use tracing::instrument;

use crate::domain::{Document, NodeId, TreeResult};

pub trait TreeNodeConvert {
    /// Fails with `DepthExceeded` on subtrees deeper than the document limit.
    fn to_tree_string(&self, node: NodeId) -> TreeResult<Tree<String>>;
}

fn label(doc: &Document, node: NodeId) -> String {
    match doc.get(node) {
        Some(element) => {
            let mut label = element.tag.clone();
            if !element.text().is_empty() {
                label.push_str(&format!(" text={:?}", element.text()));
            }
            if !element.tail().is_empty() {
                label.push_str(&format!(" tail={:?}", element.tail()));
            }
            label
        }
        None => format!("<freed {node}>"),
    }
}

impl TreeNodeConvert for Document {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self, node: NodeId) -> TreeResult<Tree<String>> {
        tree_at(self, node, 0)
    }
}

fn tree_at(doc: &Document, node: NodeId, depth: usize) -> TreeResult<Tree<String>> {
    doc.check_depth(depth)?;
    let leaves = doc
        .children(node)
        .iter()
        .map(|&child| tree_at(doc, child, depth + 1))
        .collect::<TreeResult<Vec<_>>>()?;
    Ok(Tree::new(label(doc, node)).with_leaves(leaves))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{el, TreeError};

    #[test]
    fn test_tree_string_shows_text_and_tail() {
        let mut doc = Document::new();
        let a = doc
            .build(&el("a").text("x").child(el("b")).text("z"))
            .unwrap();
        let rendered = doc.to_tree_string(a).unwrap().to_string();
        assert!(rendered.starts_with("a text=\"x\""));
        assert!(rendered.contains("b tail=\"z\""));
    }

    #[test]
    fn test_tree_string_of_too_deep_chain_is_depth_error() {
        let mut doc = Document::with_max_depth(8);
        let top = doc.create_element("n");
        let mut bottom = top;
        for _ in 0..20 {
            let next = doc.create_element("n");
            doc.append_child(bottom, next).unwrap();
            bottom = next;
        }
        assert_eq!(
            doc.to_tree_string(top).unwrap_err(),
            TreeError::DepthExceeded { limit: 8 }
        );
    }
}
