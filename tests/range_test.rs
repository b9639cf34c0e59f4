//! Tests for remove_range across sibling, ancestor and cousin boundaries.

mod common;

use marknest::domain::el;
use rstest::rstest;

use common::{by_id, document, find, markup};

#[test]
fn given_cousin_end_when_removing_range_then_emptied_ancestor_is_pruned() {
    let (mut doc, root) = document(
        &el("a")
            .child(el("b"))
            .child(el("c").child(el("d")).child(el("e")))
            .child(el("f")),
    );
    let d = find(&doc, root, "d");
    let e = find(&doc, root, "e");
    let c = find(&doc, root, "c");
    let f = find(&doc, root, "f");

    doc.remove_range(d, f, true).unwrap();

    assert_eq!(markup(&doc, root), "<a><b/></a>");
    for gone in [c, d, e, f] {
        assert!(!doc.contains(gone), "{gone} should be freed");
    }
    doc.check_links().unwrap();
}

#[rstest]
#[case(true, "<a>03</a>")]
#[case(false, "<a>0<d/>3</a>")]
fn given_siblings_when_removing_range_then_inner_tails_are_deleted(
    #[case] delete_end: bool,
    #[case] expected: &str,
) {
    let (mut doc, root) = document(
        &el("a")
            .text("0")
            .child(el("b"))
            .text("1")
            .child(el("c"))
            .text("2")
            .child(el("d"))
            .text("3"),
    );
    let b = find(&doc, root, "b");
    let d = find(&doc, root, "d");

    doc.remove_range(b, d, delete_end).unwrap();

    assert_eq!(markup(&doc, root), expected);
}

#[test]
fn given_end_inside_later_sibling_when_removing_range_then_leading_text_is_cleared() {
    let (mut doc, root) = document(
        &el("r")
            .child(el("s"))
            .text("x")
            .child(
                el("p")
                    .text("lead")
                    .child(el("q"))
                    .text("mid")
                    .child(el("e"))
                    .text("after"),
            )
            .text("tail"),
    );
    let s = find(&doc, root, "s");
    let e = find(&doc, root, "e");

    doc.remove_range(s, e, true).unwrap();

    assert_eq!(markup(&doc, root), "<r><p>after</p>tail</r>");
}

#[test]
fn given_start_deeper_than_end_when_removing_range_then_trailing_text_is_cleared() {
    let (mut doc, root) = document(
        &el("r")
            .child(el("p").text("a").child(el("b")).text("b-tail"))
            .text("p-tail")
            .child(el("q").text("q-text").child(el("e")).text("e-tail")),
    );
    let b = find(&doc, root, "b");
    let e = find(&doc, root, "e");
    let before = doc.visible_text(root).unwrap();

    doc.remove_range(b, e, true).unwrap();

    assert_eq!(markup(&doc, root), "<r><p>a</p><q>e-tail</q></r>");
    let after = doc.visible_text(root).unwrap();
    assert_eq!(before.replace("b-tailp-tailq-text", ""), after);
    doc.check_links().unwrap();
}

#[test]
fn given_start_is_ancestor_of_end_when_removing_range_then_descends() {
    let (mut doc, root) = document(
        &el("r").child(
            el("div")
                .attr("id", "start")
                .text("t")
                .child(el("x"))
                .child(el("end")),
        ),
    );
    let start = by_id(&doc, root, "start");
    let end = find(&doc, root, "end");

    doc.remove_range(start, end, true).unwrap();

    assert_eq!(markup(&doc, root), "<r/>");
}

#[test]
fn given_start_equals_end_when_removing_range_then_only_that_node_goes() {
    let (mut doc, root) = document(&el("r").text("a").child(el("x").text("in")).text("b"));
    let x = find(&doc, root, "x");

    doc.remove_range(x, x, true).unwrap();
    assert_eq!(markup(&doc, root), "<r>ab</r>");
}

#[test]
fn given_end_before_start_when_removing_range_then_structural_error_and_unchanged() {
    let (mut doc, root) = document(&el("r").child(el("a")).text("1").child(el("b")).text("2"));
    let a = find(&doc, root, "a");
    let b = find(&doc, root, "b");
    let before = markup(&doc, root);

    let err = doc.remove_range(b, a, true).unwrap_err();

    assert!(err.is_structural());
    assert_eq!(markup(&doc, root), before);
}

#[test]
fn given_end_is_ancestor_of_start_when_removing_range_then_structural_error() {
    let (mut doc, root) = document(&el("r").child(el("a").child(el("b"))));
    let a = find(&doc, root, "a");
    let b = find(&doc, root, "b");
    assert!(doc.remove_range(b, a, true).unwrap_err().is_structural());
    assert_eq!(markup(&doc, root), "<r><a><b/></a></r>");
}

#[test]
fn given_nodes_in_different_trees_when_removing_range_then_structural_error() {
    let (mut doc, root) = document(&el("r").child(el("a")));
    let a = find(&doc, root, "a");
    let stray = doc.build(&el("s").child(el("t"))).unwrap();
    assert!(doc.remove_range(a, stray, true).unwrap_err().is_structural());
    assert!(doc.contains(a));
}
