#![allow(dead_code)]

use marknest::domain::{Document, ElementSpec, NodeId};
use marknest::util::testing::init_test_setup;

/// Builds `spec` as the root of a fresh document.
pub fn document(spec: &ElementSpec) -> (Document, NodeId) {
    init_test_setup();
    let mut doc = Document::new();
    let root = doc.build_root(spec).expect("build tree");
    (doc, root)
}

/// First element tagged `tag` below `root` in document order.
pub fn find(doc: &Document, root: NodeId, tag: &str) -> NodeId {
    doc.descendants(root)
        .find(|&n| doc.tag(n) == Some(tag))
        .unwrap_or_else(|| panic!("no <{tag}> below root"))
}

/// Element carrying `id="<id>"` below `root`.
pub fn by_id(doc: &Document, root: NodeId, id: &str) -> NodeId {
    doc.descendants(root)
        .find(|&n| doc.attribute(n, "id") == Some(id))
        .unwrap_or_else(|| panic!("no element with id {id}"))
}

pub fn markup(doc: &Document, node: NodeId) -> String {
    doc.to_markup(node).expect("render")
}
