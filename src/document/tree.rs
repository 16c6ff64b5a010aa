use std::collections::BTreeMap;

use crate::{
    document::fragment::{FragmentElement, FragmentNode},
    document::selector::SelectorList,
    foundation::error::{FallError, FallResult},
};

/// Arena index of a node inside a [`Document`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Raw arena index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Element payload: tag, class list, inline style properties and remaining attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ElementData {
    /// Lower-case tag name.
    pub tag: String,
    /// Class list in insertion order, no duplicates.
    pub classes: Vec<String>,
    /// Inline style properties in insertion order.
    pub style: Vec<(String, String)>,
    /// Attributes other than `class` and `style`.
    pub attrs: BTreeMap<String, String>,
}

impl ElementData {
    /// Element with the given tag and nothing else.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// Whether the class list contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Inline style property value, if set.
    pub fn style_value(&self, name: &str) -> Option<&str> {
        self.style
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// The `id` attribute, if any.
    pub fn id(&self) -> Option<&str> {
        self.attrs.get("id").map(String::as_str)
    }
}

/// Node payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Element node.
    Element(ElementData),
    /// Text node.
    Text(String),
}

#[derive(Clone, Debug)]
struct Slot {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    live: bool,
}

/// Arena-backed document tree.
///
/// Nodes are addressed by [`NodeId`]. Removing a subtree frees its slots for reuse, so ids must
/// not be held across mutations that detach them.
#[derive(Clone, Debug)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<NodeId>,
    root: NodeId,
    reflows: u64,
}

impl Document {
    /// Empty document whose root element has tag `root_tag`.
    pub fn new(root_tag: &str) -> Self {
        let mut doc = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId(0),
            reflows: 0,
        };
        doc.root = doc.alloc(NodeKind::Element(ElementData::new(root_tag)));
        doc
    }

    /// Build a document from an owned fragment. The fragment root must be an element.
    pub fn from_fragment(root: &FragmentNode) -> FallResult<Self> {
        let FragmentNode::Element(el) = root else {
            return Err(FallError::document("document root must be an element"));
        };
        let mut doc = Self::new(&el.tag);
        let root_id = doc.root;
        if let NodeKind::Element(data) = &mut doc.slots[root_id.index()].kind {
            *data = el.to_element_data();
        }
        for child in &el.children {
            let id = doc.build(child);
            doc.attach(root_id, id);
        }
        Ok(doc)
    }

    /// Parse a document from a JSON reader (see [`FragmentNode`] for the shape).
    pub fn from_reader<R: std::io::Read>(r: R) -> FallResult<Self> {
        let root: FragmentNode = serde_json::from_reader(r)
            .map_err(|e| FallError::serde(format!("parse document JSON: {e}")))?;
        Self::from_fragment(&root)
    }

    /// Parse a document from a JSON file on disk.
    pub fn from_path(path: impl AsRef<std::path::Path>) -> FallResult<Self> {
        let path = path.as_ref();
        let f = std::fs::File::open(path).map_err(|e| {
            FallError::document(format!("open document JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(std::io::BufReader::new(f))
    }

    /// Root element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Whether only the root is live.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Whether `id` refers to a live node.
    pub fn is_live(&self, id: NodeId) -> bool {
        self.slots.get(id.index()).is_some_and(|s| s.live)
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeKind::Element(ElementData::new(tag)))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Text(text.into()))
    }

    /// Append a detached node to `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> FallResult<()> {
        if !matches!(self.kind(parent), Some(NodeKind::Element(_))) {
            return Err(FallError::document("append_child parent must be a live element"));
        }
        if !self.is_live(child) || self.slots[child.index()].parent.is_some() || child == self.root
        {
            return Err(FallError::document("append_child child must be live and detached"));
        }
        self.attach(parent, child);
        Ok(())
    }

    /// Node payload.
    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.slot(id).map(|s| &s.kind)
    }

    /// Element payload, if `id` is a live element.
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.kind(id) {
            Some(NodeKind::Element(el)) => Some(el),
            _ => None,
        }
    }

    /// Text payload, if `id` is a live text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            Some(NodeKind::Text(t)) => Some(t),
            _ => None,
        }
    }

    /// Parent of `id`.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).and_then(|s| s.parent)
    }

    /// Children of `id` in document order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.slot(id).map(|s| s.children.as_slice()).unwrap_or(&[])
    }

    /// Strict ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.parent(id),
        }
    }

    /// All strict descendants of `id` in document order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.children(n).iter().rev().copied());
        }
        out
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(t) = self.text(id) {
            return t.to_owned();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|n| self.text(n))
            .collect()
    }

    /// Elements (root included) matching `selectors`, in document order.
    pub fn select(&self, selectors: &SelectorList) -> Vec<NodeId> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .filter(|&n| self.element(n).is_some_and(|el| selectors.matches(el)))
            .collect()
    }

    /// First element whose `id` attribute equals `id_attr`.
    pub fn get_element_by_id(&self, id_attr: &str) -> Option<NodeId> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .find(|&n| self.element(n).and_then(ElementData::id) == Some(id_attr))
    }

    /// Replace `old` (and its subtree) with `replacements`, in order, at the same position.
    pub fn replace_with_many(&mut self, old: NodeId, replacements: &[NodeId]) -> FallResult<()> {
        let parent = self
            .parent(old)
            .ok_or_else(|| FallError::document("replace_with_many target has no parent"))?;
        if replacements
            .iter()
            .any(|&r| !self.is_live(r) || self.slots[r.index()].parent.is_some())
        {
            return Err(FallError::document(
                "replace_with_many replacements must be live and detached",
            ));
        }
        let siblings = &mut self.slots[parent.index()].children;
        let pos = siblings
            .iter()
            .position(|&c| c == old)
            .ok_or_else(|| FallError::document("replace_with_many target not found in parent"))?;
        siblings.splice(pos..=pos, replacements.iter().copied());
        for &r in replacements {
            self.slots[r.index()].parent = Some(parent);
        }
        self.slots[old.index()].parent = None;
        self.free_subtree(old);
        Ok(())
    }

    /// Drop every child subtree of `id`.
    pub fn remove_children(&mut self, id: NodeId) {
        let Some(slot) = self.slots.get_mut(id.index()) else {
            return;
        };
        for child in std::mem::take(&mut slot.children) {
            self.slots[child.index()].parent = None;
            self.free_subtree(child);
        }
    }

    /// Replace the children of `id` with freshly built copies of `fragment`.
    pub fn set_children_from_fragment(
        &mut self,
        id: NodeId,
        fragment: &[FragmentNode],
    ) -> FallResult<()> {
        if self.element(id).is_none() {
            return Err(FallError::document(
                "set_children_from_fragment target must be a live element",
            ));
        }
        self.remove_children(id);
        for node in fragment {
            let child = self.build(node);
            self.attach(id, child);
        }
        Ok(())
    }

    /// Owned copy of the children of `id`.
    pub fn children_fragment(&self, id: NodeId) -> Vec<FragmentNode> {
        self.children(id)
            .iter()
            .filter_map(|&c| self.node_fragment(c))
            .collect()
    }

    /// Owned copy of the subtree rooted at `id`.
    pub fn node_fragment(&self, id: NodeId) -> Option<FragmentNode> {
        match self.kind(id)? {
            NodeKind::Text(t) => Some(FragmentNode::Text(t.clone())),
            NodeKind::Element(el) => Some(FragmentNode::Element(FragmentElement::from_element(
                el,
                self.children_fragment(id),
            ))),
        }
    }

    /// Add `class` to an element. No-op for text or dead nodes.
    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if let Some(el) = self.element_mut(id)
            && !el.has_class(class)
        {
            el.classes.push(class.to_owned());
        }
    }

    /// Remove `class` from an element. No-op when absent.
    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let Some(el) = self.element_mut(id) {
            el.classes.retain(|c| c != class);
        }
    }

    /// Whether the element carries `class`.
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_some_and(|el| el.has_class(class))
    }

    /// Set an inline style property, replacing any previous value in place.
    pub fn set_style(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        let Some(el) = self.element_mut(id) else {
            return;
        };
        let value = value.into();
        match el.style.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value,
            None => el.style.push((name.to_owned(), value)),
        }
    }

    /// Remove an inline style property.
    pub fn remove_style(&mut self, id: NodeId, name: &str) {
        if let Some(el) = self.element_mut(id) {
            el.style.retain(|(k, _)| k != name);
        }
    }

    /// Inline style property value.
    pub fn style(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.style_value(name))
    }

    /// Force a synchronous layout read on `id`.
    ///
    /// Hosts restart CSS animations this way between removing one class and adding the next;
    /// here it only counts, so ordering can be asserted.
    pub fn force_reflow(&mut self, id: NodeId) -> u64 {
        if self.is_live(id) {
            self.reflows += 1;
        }
        self.reflows
    }

    /// Number of forced reflows so far.
    pub fn reflow_count(&self) -> u64 {
        self.reflows
    }

    fn slot(&self, id: NodeId) -> Option<&Slot> {
        self.slots.get(id.index()).filter(|s| s.live)
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match self.slots.get_mut(id.index()) {
            Some(Slot {
                kind: NodeKind::Element(el),
                live: true,
                ..
            }) => Some(el),
            _ => None,
        }
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let slot = Slot {
            kind,
            parent: None,
            children: Vec::new(),
            live: true,
        };
        if let Some(id) = self.free.pop() {
            self.slots[id.index()] = slot;
            return id;
        }
        let id = NodeId(self.slots.len() as u32);
        self.slots.push(slot);
        id
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.slots[child.index()].parent = Some(parent);
        self.slots[parent.index()].children.push(child);
    }

    fn build(&mut self, node: &FragmentNode) -> NodeId {
        match node {
            FragmentNode::Text(t) => self.create_text(t.clone()),
            FragmentNode::Element(el) => {
                let id = self.alloc(NodeKind::Element(el.to_element_data()));
                for child in &el.children {
                    let c = self.build(child);
                    self.attach(id, c);
                }
                id
            }
        }
    }

    fn free_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            let slot = &mut self.slots[n.index()];
            if !slot.live {
                continue;
            }
            stack.append(&mut slot.children);
            slot.live = false;
            slot.parent = None;
            slot.kind = NodeKind::Text(String::new());
            self.free.push(n);
        }
    }
}

/// Iterator over strict ancestors, see [`Document::ancestors`].
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let cur = self.next?;
        self.next = self.doc.parent(cur);
        Some(cur)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/tree.rs"]
mod tests;
