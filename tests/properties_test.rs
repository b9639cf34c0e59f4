//! Invariants every restructuring operation keeps: the visible text of the
//! document is unchanged and parent/child links stay consistent.

mod common;

use marknest::domain::{el, Document, ElementSpec, NodeId, TreeResult};
use rstest::rstest;

use common::{document, find};

fn fixture() -> ElementSpec {
    el("root")
        .text("r0 ")
        .child(
            el("sec")
                .attr("id", "s")
                .text("s0 ")
                .child(
                    el("p")
                        .text("p0 ")
                        .child(el("b").text("b0 "))
                        .text("b1 ")
                        .child(el("br"))
                        .text("br1 ")
                        .child(el("i").text("i0 ").child(el("em").text("e0 ")).text("e1 "))
                        .text("i1 "),
                )
                .text("p1 "),
        )
        .text("s1")
}

type Operation = fn(&mut Document, NodeId) -> TreeResult<()>;

fn remove_br(doc: &mut Document, root: NodeId) -> TreeResult<()> {
    let br = find(doc, root, "br");
    doc.remove(br, true).map(|_| ())
}

fn remove_br_if_empty(doc: &mut Document, root: NodeId) -> TreeResult<()> {
    let br = find(doc, root, "br");
    assert!(doc.remove_if_empty(br, true)?);
    Ok(())
}

fn replace(tag: &'static str) -> impl Fn(&mut Document, NodeId) -> TreeResult<()> {
    move |doc: &mut Document, root: NodeId| {
        let node = find(doc, root, tag);
        doc.replace_with_contents(node)
    }
}

fn replace_b(doc: &mut Document, root: NodeId) -> TreeResult<()> {
    replace("b")(doc, root)
}

fn replace_i(doc: &mut Document, root: NodeId) -> TreeResult<()> {
    replace("i")(doc, root)
}

fn replace_p(doc: &mut Document, root: NodeId) -> TreeResult<()> {
    replace("p")(doc, root)
}

fn wrap_p(doc: &mut Document, root: NodeId) -> TreeResult<()> {
    let p = find(doc, root, "p");
    let wrapper = doc.create_element("span");
    doc.wrap_content(p, wrapper).map(|_| ())
}

fn unnest(tag: &'static str) -> impl Fn(&mut Document, NodeId) -> TreeResult<()> {
    move |doc: &mut Document, root: NodeId| {
        let node = find(doc, root, tag);
        doc.unnest(node)
    }
}

fn unnest_b(doc: &mut Document, root: NodeId) -> TreeResult<()> {
    unnest("b")(doc, root)
}

fn unnest_br(doc: &mut Document, root: NodeId) -> TreeResult<()> {
    unnest("br")(doc, root)
}

fn unnest_i(doc: &mut Document, root: NodeId) -> TreeResult<()> {
    unnest("i")(doc, root)
}

fn unnest_em(doc: &mut Document, root: NodeId) -> TreeResult<()> {
    unnest("em")(doc, root)
}

fn interior_p(doc: &mut Document, root: NodeId) -> TreeResult<()> {
    let p = find(doc, root, "p");
    doc.interior_nesting(p, ".//*")
}

fn fragment_p(doc: &mut Document, root: NodeId) -> TreeResult<()> {
    let p = find(doc, root, "p");
    assert_eq!(doc.fragment_nesting(p, "br")?, 1);
    Ok(())
}

#[rstest]
#[case::remove(remove_br as Operation)]
#[case::remove_if_empty(remove_br_if_empty as Operation)]
#[case::replace_b(replace_b as Operation)]
#[case::replace_i(replace_i as Operation)]
#[case::replace_p(replace_p as Operation)]
#[case::wrap_content(wrap_p as Operation)]
#[case::unnest_b(unnest_b as Operation)]
#[case::unnest_br(unnest_br as Operation)]
#[case::unnest_i(unnest_i as Operation)]
#[case::unnest_em(unnest_em as Operation)]
#[case::interior_nesting(interior_p as Operation)]
#[case::fragment_nesting(fragment_p as Operation)]
fn given_operation_when_applied_then_text_and_links_are_preserved(#[case] operation: Operation) {
    let (mut doc, root) = document(&fixture());
    let before = doc.visible_text(root).unwrap();
    let words = doc.num_words(root).unwrap();

    operation(&mut doc, root).unwrap();

    assert_eq!(doc.visible_text(root).unwrap(), before);
    assert_eq!(doc.num_words(root).unwrap(), words);
    doc.check_links().unwrap();

    doc.sweep();
    doc.check_links().unwrap();
    assert_eq!(doc.node_count(), doc.descendants(root).count() + 1);
}

#[test]
fn given_removed_node_when_remove_if_empty_again_then_no_op() {
    let (mut doc, root) = document(&fixture());
    let br = find(&doc, root, "br");

    assert!(doc.remove_if_empty(br, true).unwrap());
    let after_first = doc.to_markup(root).unwrap();
    assert!(!doc.remove_if_empty(br, true).unwrap());

    assert_eq!(doc.to_markup(root).unwrap(), after_first);
}

#[test]
fn given_detached_nodes_when_swept_then_only_the_tree_survives() {
    let (mut doc, root) = document(&fixture());
    let b = find(&doc, root, "b");
    doc.remove(b, true).unwrap();
    let orphan = doc.create_element("orphan");

    let swept = doc.sweep();

    assert_eq!(swept, 2);
    assert!(!doc.contains(b));
    assert!(!doc.contains(orphan));
    doc.check_links().unwrap();
}
