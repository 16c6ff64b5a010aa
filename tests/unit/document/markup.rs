use super::*;
use crate::document::fragment::{FragmentElement, FragmentNode};

fn doc_of(children: Vec<FragmentNode>) -> Document {
    Document::from_fragment(&FragmentNode::Element(FragmentElement::new("div", children))).unwrap()
}

#[test]
fn escapes_text_and_attributes() {
    let doc = doc_of(vec![
        FragmentElement::new("p", vec!["a < b & c\u{a0}d".into()])
            .with_attr("title", "say \"hi\"")
            .into(),
    ]);
    assert_eq!(
        inner_html(&doc, doc.root()),
        "<p title=\"say &quot;hi&quot;\">a &lt; b &amp; c&nbsp;d</p>"
    );
}

#[test]
fn class_and_style_come_first() {
    let doc = doc_of(vec![
        FragmentElement::new("span", vec!["x".into()])
            .with_attr("data-k", "v")
            .with_attr("style", "--pop-delay:12ms;color: red")
            .with_attr("class", "fall-char  extra")
            .into(),
    ]);
    assert_eq!(
        inner_html(&doc, doc.root()),
        "<span class=\"fall-char extra\" style=\"--pop-delay: 12ms; color: red\" data-k=\"v\">x</span>"
    );
}

#[test]
fn raw_text_and_void_elements() {
    let doc = doc_of(vec![
        FragmentElement::new("script", vec!["if (a < b) {}".into()]).into(),
        FragmentElement::new("br", vec![]).into(),
    ]);
    assert_eq!(
        outer_html(&doc, doc.root()),
        "<div><script>if (a < b) {}</script><br></div>"
    );
}
