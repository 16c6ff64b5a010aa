use super::*;

fn el(tag: &str, classes: &[&str], id: Option<&str>) -> ElementData {
    let mut e = ElementData::new(tag);
    e.classes = classes.iter().map(|c| (*c).to_owned()).collect();
    if let Some(id) = id {
        e.attrs.insert("id".to_owned(), id.to_owned());
    }
    e
}

#[test]
fn tag_groups_match_any() {
    let s = SelectorList::parse("h1, h2,p ,li").unwrap();
    assert!(s.matches(&el("p", &[], None)));
    assert!(s.matches(&el("h2", &[], None)));
    assert!(!s.matches(&el("div", &[], None)));
}

#[test]
fn compound_requires_every_part() {
    let s: SelectorList = "li.item.big#first".parse().unwrap();
    assert!(s.matches(&el("li", &["big", "item"], Some("first"))));
    assert!(!s.matches(&el("li", &["item"], Some("first"))));
    assert!(!s.matches(&el("p", &["big", "item"], Some("first"))));

    let any = SelectorList::parse("*").unwrap();
    assert!(any.matches(&el("section", &[], None)));
    let class_only = SelectorList::parse(".fall-target").unwrap();
    assert!(class_only.matches(&el("div", &["fall-target"], None)));
}

#[test]
fn rejects_combinators_and_empty_groups() {
    assert!(SelectorList::parse("main p").is_err());
    assert!(SelectorList::parse("p,,li").is_err());
    assert!(SelectorList::parse("").is_err());
    assert!(SelectorList::parse("p>span").is_err());
    assert!(SelectorList::parse("#a#b").is_err());
}
