use super::*;
use crate::document::fragment::{FragmentElement, FragmentNode};
use crate::foundation::rng::Rng64;

fn page() -> Document {
    let root = FragmentElement::new(
        "body",
        vec![
            FragmentElement::new(
                "header",
                vec![FragmentElement::new("h1", vec!["Site".into()]).into()],
            )
            .into(),
            FragmentElement::new("h2", vec!["Hi there".into()]).into(),
            FragmentElement::new(
                "p",
                vec![
                    "a<b ".into(),
                    FragmentElement::new("em", vec!["x".into()]).into(),
                    FragmentElement::new("script", vec!["var s = 1;".into()]).into(),
                ],
            )
            .into(),
            FragmentElement::new(
                "ul",
                vec![
                    FragmentElement::new(
                        "li",
                        vec!["in ".into(), FragmentElement::new("p", vec!["nest".into()]).into()],
                    )
                    .into(),
                ],
            )
            .into(),
            FragmentElement::new("p", vec![]).into(),
        ],
    );
    Document::from_fragment(&FragmentNode::Element(root)).unwrap()
}

fn opts<'a>(
    selectors: &'a SelectorList,
    names: &'a ([String; 3], [String; 3]),
    max: usize,
) -> DecomposeOptions<'a> {
    DecomposeOptions {
        selectors,
        excluded_ancestors: &names.0,
        ignored_subtrees: &names.1,
        max_units: max,
        pop_max_delay: Millis(600),
    }
}

fn names() -> ([String; 3], [String; 3]) {
    (
        ["header".into(), "nav".into(), "footer".into()],
        ["script".into(), "style".into(), "noscript".into()],
    )
}

fn unit_text(doc: &Document, container: NodeId) -> String {
    doc.descendants(container)
        .into_iter()
        .filter(|&n| doc.has_class(n, UNIT_CLASS))
        .map(|n| doc.text_content(n))
        .collect()
}

#[test]
fn splits_eligible_containers_and_skips_chrome() {
    let mut doc = page();
    let mut snaps = SnapshotStore::default();
    let sel = SelectorList::parse("h1,h2,p,li").unwrap();
    let n = names();
    let report = prepare(&mut doc, &mut snaps, opts(&sel, &n, 4000), &mut Rng64::new(1));

    assert!(report.success);
    // h2 "Hi there" (8) + p "a<b x" (5) + li "in nest" (7); the header h1 and empty p are skipped.
    assert_eq!(report.total_units, 20);
    assert_eq!(report.processed_containers.len(), 3);
    assert_eq!(snaps.len(), 3);

    let h1 = doc.select(&SelectorList::parse("h1").unwrap())[0];
    assert_eq!(doc.children(h1).len(), 1);
    assert!(doc.text(doc.children(h1)[0]).is_some());
}

#[test]
fn units_preserve_characters_with_nbsp_spaces() {
    let mut doc = page();
    let mut snaps = SnapshotStore::default();
    let sel = SelectorList::parse("h2").unwrap();
    let n = names();
    let report = prepare(&mut doc, &mut snaps, opts(&sel, &n, 4000), &mut Rng64::new(9));

    let h2 = report.processed_containers[0];
    let glyphs: String = report.units.iter().map(|u| u.glyph).collect();
    assert_eq!(glyphs, "Hi\u{a0}there");
    assert_eq!(unit_text(&doc, h2), "Hi\u{a0}there");
    assert_eq!(doc.text_content(h2), "Hi\u{a0}there");
    for u in &report.units {
        assert_eq!(u.phase, Phase::Idle);
        assert!(u.pop_delay < Millis(600));
        assert_eq!(doc.style(u.node, POP_DELAY_VAR), Some(u.pop_delay.to_string().as_str()));
    }
}

#[test]
fn script_text_is_never_split() {
    let mut doc = page();
    let mut snaps = SnapshotStore::default();
    let sel = SelectorList::parse("p").unwrap();
    let n = names();
    let report = prepare(&mut doc, &mut snaps, opts(&sel, &n, 4000), &mut Rng64::new(2));
    let glyphs: String = report.units.iter().map(|u| u.glyph).collect();
    assert_eq!(glyphs, "a<b\u{a0}xnest");
    let script = doc.select(&SelectorList::parse("script").unwrap())[0];
    assert_eq!(doc.text_content(script), "var s = 1;");
}

#[test]
fn cap_overflow_rolls_back_everything() {
    let mut doc = page();
    let before = inner_html(&doc, doc.root());
    let mut snaps = SnapshotStore::default();
    let sel = SelectorList::parse("h2,p,li").unwrap();
    let n = names();
    // h2 (8) + p (5) fit in 15; li (7) does not.
    let report = prepare(&mut doc, &mut snaps, opts(&sel, &n, 15), &mut Rng64::new(3));

    assert!(!report.success);
    assert_eq!(report.total_units, 0);
    assert!(report.units.is_empty());
    assert!(snaps.is_empty());
    assert_eq!(inner_html(&doc, doc.root()), before);
}

#[test]
fn second_pass_produces_no_units() {
    let mut doc = page();
    let mut snaps = SnapshotStore::default();
    let sel = SelectorList::parse("h2,p,li").unwrap();
    let n = names();
    let first = prepare(&mut doc, &mut snaps, opts(&sel, &n, 4000), &mut Rng64::new(4));
    let after_first = inner_html(&doc, doc.root());
    let saved: Vec<String> = snaps.iter().map(|s| s.markup.clone()).collect();

    let second = prepare(&mut doc, &mut snaps, opts(&sel, &n, 4000), &mut Rng64::new(5));
    assert!(first.total_units > 0);
    assert!(second.success);
    assert_eq!(second.total_units, 0);
    assert_eq!(inner_html(&doc, doc.root()), after_first);
    let still: Vec<String> = snaps.iter().map(|s| s.markup.clone()).collect();
    assert_eq!(saved, still, "snapshots are not overwritten");
}

#[test]
fn snapshot_holds_original_markup() {
    let mut doc = page();
    let sel = SelectorList::parse("h2").unwrap();
    let h2 = doc.select(&sel)[0];
    let original = inner_html(&doc, h2);
    let mut snaps = SnapshotStore::default();
    let n = names();
    prepare(&mut doc, &mut snaps, opts(&sel, &n, 4000), &mut Rng64::new(6));
    assert_eq!(snaps.get(h2).unwrap().markup, original);
    assert_ne!(inner_html(&doc, h2), original);
}

#[test]
fn cap_is_inclusive() {
    let sel = SelectorList::parse("h2,p,li").unwrap();
    let n = names();

    let mut doc = page();
    let mut snaps = SnapshotStore::default();
    let report = prepare(&mut doc, &mut snaps, opts(&sel, &n, 20), &mut Rng64::new(3));
    assert!(report.success);
    assert_eq!(report.total_units, 20);

    let mut doc = page();
    let before = inner_html(&doc, doc.root());
    let mut snaps = SnapshotStore::default();
    let report = prepare(&mut doc, &mut snaps, opts(&sel, &n, 19), &mut Rng64::new(3));
    assert!(!report.success);
    assert!(snaps.is_empty());
    assert_eq!(inner_html(&doc, doc.root()), before);
}

#[test]
fn overflow_restores_text_added_to_snapshotted_container() {
    let mut doc = page();
    let mut snaps = SnapshotStore::default();
    let n = names();
    let h2_sel = SelectorList::parse("h2").unwrap();
    let first = prepare(&mut doc, &mut snaps, opts(&h2_sel, &n, 4000), &mut Rng64::new(7));
    assert!(first.success);
    let h2 = first.processed_containers[0];
    let original = snaps.get(h2).unwrap().clone();

    // Host edits after the first pass: new text in the split h2 and a long paragraph.
    let extra = doc.create_text("zz");
    doc.append_child(h2, extra).unwrap();
    let long = doc.create_element("p");
    let long_text = doc.create_text("x".repeat(50));
    doc.append_child(long, long_text).unwrap();
    let root = doc.root();
    doc.append_child(root, long).unwrap();
    let before = inner_html(&doc, root);

    let sel = SelectorList::parse("h2,p").unwrap();
    let report = prepare(&mut doc, &mut snaps, opts(&sel, &n, 10), &mut Rng64::new(8));
    assert!(!report.success);
    assert_eq!(inner_html(&doc, root), before);
    assert_eq!(snaps.len(), 1);
    assert_eq!(snaps.get(h2), Some(&original));
}

#[test]
fn containers_inside_ignored_subtrees_are_skipped() {
    let mut doc = Document::from_fragment(&FragmentNode::Element(FragmentElement::new(
        "body",
        vec![
            FragmentElement::new(
                "noscript",
                vec![FragmentElement::new("p", vec!["hidden".into()]).into()],
            )
            .into(),
            FragmentElement::new("p", vec!["shown".into()]).into(),
        ],
    )))
    .unwrap();
    let mut snaps = SnapshotStore::default();
    let sel = SelectorList::parse("p").unwrap();
    let n = names();
    let report = prepare(&mut doc, &mut snaps, opts(&sel, &n, 4000), &mut Rng64::new(1));

    let glyphs: String = report.units.iter().map(|u| u.glyph).collect();
    assert_eq!(glyphs, "shown");
    assert_eq!(snaps.len(), 1);
}

#[test]
fn tag_lists_match_case_insensitively() {
    let mut doc = page();
    let mut snaps = SnapshotStore::default();
    let sel = SelectorList::parse("h1,p").unwrap();
    let n = (
        ["HEADER".into(), "Nav".into(), "FOOTER".into()],
        ["SCRIPT".into(), "STYLE".into(), "NOSCRIPT".into()],
    );
    let report = prepare(&mut doc, &mut snaps, opts(&sel, &n, 4000), &mut Rng64::new(1));

    // header h1 skipped, script body left whole
    let glyphs: String = report.units.iter().map(|u| u.glyph).collect();
    assert_eq!(glyphs, "a<b\u{a0}xnest");
}
