use std::collections::BTreeMap;

use crate::document::tree::ElementData;

/// Owned, detached subtree.
///
/// This is the JSON boundary for documents and the storage format for container snapshots:
///
/// ```json
/// { "tag": "p", "attrs": { "class": "lead" }, "children": ["Hello ", { "tag": "em", "children": ["world"] }] }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum FragmentNode {
    /// Text node.
    Text(String),
    /// Element node.
    Element(FragmentElement),
}

/// Element of a [`FragmentNode`] tree.
///
/// `class` and `style` live in `attrs` here and are split into a class list and style
/// properties when the fragment is built into a document.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FragmentElement {
    /// Tag name.
    pub tag: String,
    /// Attributes, including `class` and `style`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    /// Child nodes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FragmentNode>,
}

impl FragmentElement {
    /// Element with a tag and children, no attributes.
    pub fn new(tag: impl Into<String>, children: Vec<FragmentNode>) -> Self {
        Self {
            tag: tag.into(),
            attrs: BTreeMap::new(),
            children,
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub(crate) fn to_element_data(&self) -> ElementData {
        let mut data = ElementData::new(&self.tag);
        for (k, v) in &self.attrs {
            match k.as_str() {
                "class" => {
                    for c in v.split_whitespace() {
                        if !data.has_class(c) {
                            data.classes.push(c.to_owned());
                        }
                    }
                }
                "style" => data.style = parse_style(v),
                _ => {
                    data.attrs.insert(k.to_ascii_lowercase(), v.clone());
                }
            }
        }
        data
    }

    pub(crate) fn from_element(el: &ElementData, children: Vec<FragmentNode>) -> Self {
        let mut attrs = el.attrs.clone();
        if !el.classes.is_empty() {
            attrs.insert("class".to_owned(), el.classes.join(" "));
        }
        if !el.style.is_empty() {
            attrs.insert("style".to_owned(), format_style(&el.style));
        }
        Self {
            tag: el.tag.clone(),
            attrs,
            children,
        }
    }
}

impl From<FragmentElement> for FragmentNode {
    fn from(el: FragmentElement) -> Self {
        Self::Element(el)
    }
}

impl From<&str> for FragmentNode {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

/// Parse an inline `style` attribute into ordered `(property, value)` pairs.
pub fn parse_style(raw: &str) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = Vec::new();
    for decl in raw.split(';') {
        let Some((k, v)) = decl.split_once(':') else {
            continue;
        };
        let (k, v) = (k.trim(), v.trim());
        if k.is_empty() {
            continue;
        }
        match out.iter_mut().find(|(name, _)| name == k) {
            Some((_, old)) => *old = v.to_owned(),
            None => out.push((k.to_owned(), v.to_owned())),
        }
    }
    out
}

/// Inverse of [`parse_style`].
pub fn format_style(style: &[(String, String)]) -> String {
    style
        .iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<_>>()
        .join("; ")
}
