use super::*;
use crate::document::{
    fragment::{FragmentElement, FragmentNode},
    markup::inner_html,
    selector::SelectorList,
};
use crate::engine::decompose::{DecomposeOptions, prepare};
use crate::foundation::{core::Millis, rng::Rng64};

fn page() -> Document {
    Document::from_fragment(&FragmentNode::Element(FragmentElement::new(
        "body",
        vec![
            FragmentElement::new("h1", vec!["Fall & rise".into()]).into(),
            FragmentElement::new(
                "p",
                vec!["one ".into(), FragmentElement::new("b", vec!["two".into()]).into()],
            )
            .with_attr("class", "lead")
            .into(),
        ],
    )))
    .unwrap()
}

fn decompose(doc: &mut Document, snaps: &mut SnapshotStore) {
    let sel = SelectorList::parse("h1,p").unwrap();
    let excluded: Vec<String> = vec![];
    let ignored = vec!["script".to_owned()];
    let report = prepare(
        doc,
        snaps,
        DecomposeOptions {
            selectors: &sel,
            excluded_ancestors: &excluded,
            ignored_subtrees: &ignored,
            max_units: 100,
            pop_max_delay: Millis(300),
        },
        &mut Rng64::new(5),
    );
    assert!(report.success);
}

#[test]
fn restores_markup_byte_for_byte() {
    let mut doc = page();
    let before = inner_html(&doc, doc.root());
    let mut snaps = SnapshotStore::default();
    decompose(&mut doc, &mut snaps);
    assert_ne!(inner_html(&doc, doc.root()), before);

    let root = doc.root();
    doc.add_class(root, FALLING_MODE_CLASS);
    let report = restore_all(&mut doc, &mut snaps);
    assert_eq!(report.restored, 2);
    assert_eq!(report.missing, 0);
    assert_eq!(report.stripped, 0);
    assert!(snaps.is_empty());
    assert!(!doc.has_class(root, FALLING_MODE_CLASS));
    assert_eq!(inner_html(&doc, doc.root()), before);
}

#[test]
fn strips_untracked_markers() {
    let mut doc = Document::new("body");
    let root = doc.root();
    let stray = doc.create_element("span");
    doc.add_class(stray, UNIT_CLASS);
    doc.add_class(stray, "char-fall-active");
    doc.set_style(stray, ROTATION_VAR, "12.00deg");
    doc.set_style(stray, POP_DELAY_VAR, "40ms");
    doc.append_child(root, stray).unwrap();

    let report = restore_all(&mut doc, &mut SnapshotStore::default());
    assert_eq!(report.stripped, 1);
    assert_eq!(inner_html(&doc, root), "<span class=\"fall-char\"></span>");
}

#[test]
fn vanished_container_is_counted_not_fatal() {
    let mut doc = page();
    let mut snaps = SnapshotStore::default();
    decompose(&mut doc, &mut snaps);
    let root = doc.root();
    doc.remove_children(root);

    let report = restore_all(&mut doc, &mut snaps);
    assert_eq!(report.restored, 0);
    assert_eq!(report.missing, 2);
    assert!(snaps.is_empty());
}
