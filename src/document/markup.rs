//! Deterministic markup serialization.
//!
//! Output order is stable: `class`, then `style`, then remaining attributes by name. Text is
//! escaped except inside raw-text elements, and U+00A0 is written as `&nbsp;`.

use crate::document::{
    fragment::format_style,
    tree::{Document, ElementData, NodeId, NodeKind},
};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Markup of the children of `id`.
pub fn inner_html(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    let raw = doc
        .element(id)
        .is_some_and(|el| RAW_TEXT_ELEMENTS.contains(&el.tag.as_str()));
    for &child in doc.children(id) {
        write_node(doc, child, raw, &mut out);
    }
    out
}

/// Markup of `id` itself, including its own tag.
pub fn outer_html(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, id, false, &mut out);
    out
}

fn write_node(doc: &Document, id: NodeId, raw_parent: bool, out: &mut String) {
    match doc.kind(id) {
        None => {}
        Some(NodeKind::Text(t)) => {
            if raw_parent {
                out.push_str(t);
            } else {
                escape_text(t, out);
            }
        }
        Some(NodeKind::Element(el)) => {
            write_open_tag(el, out);
            if VOID_ELEMENTS.contains(&el.tag.as_str()) {
                return;
            }
            out.push_str(&inner_html(doc, id));
            out.push_str("</");
            out.push_str(&el.tag);
            out.push('>');
        }
    }
}

fn write_open_tag(el: &ElementData, out: &mut String) {
    out.push('<');
    out.push_str(&el.tag);
    if !el.classes.is_empty() {
        write_attr("class", &el.classes.join(" "), out);
    }
    if !el.style.is_empty() {
        write_attr("style", &format_style(&el.style), out);
    }
    for (k, v) in &el.attrs {
        write_attr(k, v, out);
    }
    out.push('>');
}

fn write_attr(name: &str, value: &str, out: &mut String) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
    out.push('"');
}

fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/markup.rs"]
mod tests;
