use crate::{
    document::tree::ElementData,
    foundation::error::{FallError, FallResult},
};

/// Comma-separated list of compound selectors (`p`, `.lead`, `li.item`, `#intro`, `*`).
///
/// Combinators are not supported; a group containing whitespace is rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorList {
    groups: Vec<Compound>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>, // None matches any tag
    id: Option<String>,
    classes: Vec<String>,
}

impl SelectorList {
    /// Parse a selector list.
    pub fn parse(raw: &str) -> FallResult<Self> {
        let mut groups = Vec::new();
        for group in raw.split(',') {
            let group = group.trim();
            if group.is_empty() {
                return Err(FallError::validation(format!(
                    "selector list '{raw}' has an empty group"
                )));
            }
            groups.push(parse_compound(group)?);
        }
        Ok(Self { groups })
    }

    /// Whether any group matches `el`.
    pub fn matches(&self, el: &ElementData) -> bool {
        self.groups.iter().any(|g| g.matches(el))
    }
}

impl std::str::FromStr for SelectorList {
    type Err = FallError;

    fn from_str(s: &str) -> FallResult<Self> {
        Self::parse(s)
    }
}

impl Compound {
    fn matches(&self, el: &ElementData) -> bool {
        if self.tag.as_deref().is_some_and(|t| t != el.tag) {
            return false;
        }
        if self.id.as_deref().is_some_and(|id| el.id() != Some(id)) {
            return false;
        }
        self.classes.iter().all(|c| el.has_class(c))
    }
}

fn parse_compound(group: &str) -> FallResult<Compound> {
    let mut out = Compound::default();
    let mut rest = group;

    if let Some(after) = rest.strip_prefix('*') {
        rest = after;
    } else {
        let (ident, after) = take_ident(rest);
        if !ident.is_empty() {
            out.tag = Some(ident.to_ascii_lowercase());
        }
        rest = after;
    }

    while let Some(sigil) = rest.chars().next() {
        let (ident, after) = take_ident(&rest[sigil.len_utf8()..]);
        if ident.is_empty() {
            return Err(FallError::validation(format!(
                "unsupported selector syntax in '{group}'"
            )));
        }
        match sigil {
            '.' => out.classes.push(ident.to_owned()),
            '#' => {
                if out.id.is_some() {
                    return Err(FallError::validation(format!(
                        "selector '{group}' has more than one id"
                    )));
                }
                out.id = Some(ident.to_owned());
            }
            _ => {
                return Err(FallError::validation(format!(
                    "unsupported selector syntax in '{group}'"
                )));
            }
        }
        rest = after;
    }

    Ok(out)
}

fn take_ident(s: &str) -> (&str, &str) {
    let end = s
        .char_indices()
        .find(|&(_, c)| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s.split_at(end)
}

#[cfg(test)]
#[path = "../../tests/unit/document/selector.rs"]
mod tests;
