use serde::{Deserialize, Serialize};

use crate::markup::{style::Style, tags};

/// Zero-width space used as a caret placeholder inside freshly inserted
/// inline containers.
pub const ZWSP: char = '\u{200B}';

/// Stable handle to a node in a [`Document`].
///
/// Ids are never reused while the document lives, so a detached node keeps
/// its id and a stale handle can always be detected with
/// [`Document::is_attached`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// An element with a lowercase tag name and ordered attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attrs: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_style(mut self, style: &str) -> Self {
        self.set_style(&Style::parse(style));
        self
    }

    pub fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let idx = self.attrs.iter().position(|(n, _)| n == name)?;
        Some(self.attrs.remove(idx).1)
    }

    pub fn style(&self) -> Style {
        self.attr("style").map(Style::parse).unwrap_or_default()
    }

    /// Writes the style back; an empty style removes the attribute.
    pub fn set_style(&mut self, style: &Style) {
        if style.is_empty() {
            self.remove_attr("style");
        } else {
            self.set_attr("style", style.to_string());
        }
    }

    pub fn update_style(&mut self, f: impl FnOnce(&mut Style)) {
        let mut style = self.style();
        f(&mut style);
        self.set_style(&style);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Root,
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// The editable content tree.
///
/// Nodes live in an arena; structure is expressed through parent/children
/// links. Mutation primitives keep both directions of every link in sync,
/// so any node reachable from [`Document::root`] has a consistent parent
/// chain. The `version` counter is bumped by the command layer after each
/// mutation and is what invalidates previously captured selections.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    version: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Root,
            }],
            version: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn bump_version(&mut self) {
        self.version += 1;
    }

    /// Carries the version over from a document being replaced so that
    /// selections taken against the old tree are invalidated.
    pub(crate) fn continue_version_from(&mut self, previous: &Document) {
        self.version = previous.version + 1;
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        id
    }

    pub fn create_element(&mut self, element: Element) -> NodeId {
        self.alloc(NodeData::Element(element))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Text(text.into()))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Comment(text.into()))
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn set_text(&mut self, id: NodeId, value: impl Into<String>) {
        if let NodeData::Text(text) = &mut self.nodes[id.0].data {
            *text = value.into();
        }
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].data, NodeData::Text(_))
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    pub fn has_tag(&self, id: NodeId, tag: &str) -> bool {
        self.tag(id) == Some(tag)
    }

    /// Mutates an element's inline style. No-op for non-elements.
    pub fn update_style(&mut self, id: NodeId, f: impl FnOnce(&mut Style)) {
        if let Some(el) = self.element_mut(id) {
            el.update_style(f);
        }
    }

    pub fn style(&self, id: NodeId) -> Style {
        self.element(id).map(Element::style).unwrap_or_default()
    }

    // ---- navigation ----

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.nodes[id.0].children.get(index).copied()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].children.first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].children.last().copied()
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let idx = self.index_in_parent(id)?;
        idx.checked_sub(1).and_then(|i| self.child(parent, i))
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let idx = self.index_in_parent(id)?;
        self.child(parent, idx + 1)
    }

    /// True when the node is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        if id.0 >= self.nodes.len() {
            return false;
        }
        let mut cur = id;
        loop {
            if cur == self.root() {
                return true;
            }
            match self.parent(cur) {
                Some(p) => cur = p,
                None => return false,
            }
        }
    }

    /// Ancestors from the parent upwards, ending with the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&n| self.parent(n))
    }

    /// The node itself followed by its ancestors.
    pub fn ancestors_inclusive(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |&n| self.parent(n))
    }

    /// True when `node` is `ancestor` or lies beneath it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors_inclusive(node).any(|n| n == ancestor)
    }

    /// All descendants in document (pre-)order, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.children(n).iter().rev().copied());
        }
        out
    }

    /// Child indices from the root down to `id`.
    pub fn path(&self, id: NodeId) -> Vec<usize> {
        let mut path: Vec<usize> = self
            .ancestors_inclusive(id)
            .filter_map(|n| self.index_in_parent(n))
            .collect();
        path.reverse();
        path
    }

    /// Nearest node (inclusive) satisfying `pred`, stopping below the root.
    pub fn nearest(&self, id: NodeId, pred: impl Fn(&Element) -> bool) -> Option<NodeId> {
        self.ancestors_inclusive(id)
            .find(|&n| self.element(n).is_some_and(&pred))
    }

    pub fn nearest_tag(&self, id: NodeId, names: &[&str]) -> Option<NodeId> {
        self.nearest(id, |el| names.contains(&el.tag.as_str()))
    }

    /// Nearest block-level element (inclusive), or the root.
    pub fn nearest_block(&self, id: NodeId) -> NodeId {
        self.nearest(id, |el| tags::is_block(&el.tag))
            .unwrap_or_else(|| self.root())
    }

    /// A block that holds inline content directly: leaf block tags plus
    /// divs without block children.
    pub fn is_leaf_block(&self, id: NodeId) -> bool {
        match self.tag(id) {
            Some(tag) if tags::is_leaf_block(tag) => true,
            Some("div") => !self
                .children(id)
                .iter()
                .any(|&c| self.tag(c).is_some_and(tags::is_block)),
            _ => false,
        }
    }

    pub fn is_block(&self, id: NodeId) -> bool {
        self.tag(id).is_some_and(tags::is_block)
    }

    /// Length used for positions: chars for text, children otherwise.
    pub fn node_len(&self, id: NodeId) -> usize {
        match &self.nodes[id.0].data {
            NodeData::Text(text) => text.chars().count(),
            NodeData::Comment(_) => 0,
            _ => self.nodes[id.0].children.len(),
        }
    }

    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|n| self.text(n))
            .collect()
    }

    /// True when the subtree has no visible text and no embedded content.
    pub fn is_visually_empty(&self, id: NodeId) -> bool {
        let has_text = self
            .text_content(id)
            .chars()
            .any(|c| c != ZWSP && !c.is_whitespace());
        let has_embedded = self
            .descendants(id)
            .into_iter()
            .any(|n| self.tag(n).is_some_and(tags::is_embedded));
        !has_text && !has_embedded
    }

    // ---- mutation ----

    /// Removes the node from its parent. The subtree stays intact.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != id);
        }
    }

    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        let mut index = index;
        if self.parent(child) == Some(parent)
            && let Some(old) = self.index_in_parent(child)
            && old < index
        {
            index -= 1;
        }
        self.detach(child);
        let len = self.nodes[parent.0].children.len();
        self.nodes[parent.0].children.insert(index.min(len), child);
        self.nodes[child.0].parent = Some(parent);
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    pub fn insert_before(&mut self, reference: NodeId, node: NodeId) {
        if let (Some(parent), Some(idx)) = (self.parent(reference), self.index_in_parent(reference))
        {
            self.insert_child(parent, idx, node);
        }
    }

    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) {
        if let (Some(parent), Some(idx)) = (self.parent(reference), self.index_in_parent(reference))
        {
            self.insert_child(parent, idx + 1, node);
        }
    }

    /// Puts `new` where `old` was and detaches `old`.
    pub fn replace(&mut self, old: NodeId, new: NodeId) {
        self.insert_before(old, new);
        self.detach(old);
    }

    /// Moves every child of `from` to the end of `to`.
    pub fn move_children(&mut self, from: NodeId, to: NodeId) {
        let children = std::mem::take(&mut self.nodes[from.0].children);
        for child in children {
            self.nodes[child.0].parent = Some(to);
            self.nodes[to.0].children.push(child);
        }
    }

    /// Removes every child of `id`.
    pub fn clear_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
    }

    /// Replaces the node by its children, in order. Returns the moved
    /// children.
    pub fn unwrap(&mut self, id: NodeId) -> Vec<NodeId> {
        let Some(parent) = self.parent(id) else {
            return Vec::new();
        };
        let Some(idx) = self.index_in_parent(id) else {
            return Vec::new();
        };
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for (offset, &child) in children.iter().enumerate() {
            self.nodes[child.0].parent = Some(parent);
            self.nodes[parent.0].children.insert(idx + 1 + offset, child);
        }
        self.detach(id);
        children
    }

    /// Wraps `parent.children[start..end]` in `wrapper`, which takes their
    /// place.
    pub fn wrap_children(&mut self, parent: NodeId, start: usize, end: usize, wrapper: NodeId) {
        let end = end.min(self.children(parent).len());
        let start = start.min(end);
        let moved: Vec<NodeId> = self.nodes[parent.0].children.drain(start..end).collect();
        for &child in &moved {
            self.nodes[child.0].parent = Some(wrapper);
        }
        self.detach(wrapper);
        self.nodes[wrapper.0].children.extend(moved);
        self.nodes[parent.0].children.insert(start, wrapper);
        self.nodes[wrapper.0].parent = Some(parent);
    }

    /// Wraps a single node.
    pub fn wrap(&mut self, node: NodeId, wrapper: NodeId) {
        if let (Some(parent), Some(idx)) = (self.parent(node), self.index_in_parent(node)) {
            self.wrap_children(parent, idx, idx + 1, wrapper);
        }
    }

    /// Splits a text node at a char offset. The original node keeps the
    /// head; the returned node holds the tail and is inserted right after.
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> Option<NodeId> {
        let text = self.text(id)?;
        let byte = char_to_byte(text, offset);
        let tail = text[byte..].to_string();
        let head = text[..byte].to_string();
        self.set_text(id, head);
        let new = self.create_text(tail);
        self.insert_after(id, new);
        Some(new)
    }

    fn shallow_clone(&mut self, id: NodeId) -> Option<NodeId> {
        let data = match &self.nodes[id.0].data {
            NodeData::Element(el) => NodeData::Element(el.clone()),
            _ => return None,
        };
        Some(self.alloc(data))
    }

    /// Splits every element from `parent` up to and including `ancestor` at
    /// the boundary `(parent, index)`.
    ///
    /// After the split, `ancestor` keeps everything before the boundary and
    /// the returned clone of `ancestor` (inserted right after it) holds
    /// everything from the boundary on. Intermediate levels are cloned the
    /// same way. Either side may end up empty; callers prune as needed.
    pub fn split_at(&mut self, ancestor: NodeId, parent: NodeId, index: usize) -> Option<NodeId> {
        if !self.contains(ancestor, parent) || self.parent(ancestor).is_none() {
            return None;
        }
        let mut parent = parent;
        let mut index = index;
        loop {
            let right = self.shallow_clone(parent)?;
            let len = self.nodes[parent.0].children.len();
            let moved: Vec<NodeId> = self.nodes[parent.0]
                .children
                .drain(index.min(len)..)
                .collect();
            for &child in &moved {
                self.nodes[child.0].parent = Some(right);
            }
            self.nodes[right.0].children = moved;
            self.insert_after(parent, right);
            if parent == ancestor {
                return Some(right);
            }
            index = self.index_in_parent(right)?;
            parent = self.parent(right)?;
        }
    }

    /// Removes non-void inline elements left without children inside
    /// `scope` (inclusive, unless `scope` is a block).
    pub fn prune_empty_inline(&mut self, scope: NodeId) {
        let mut candidates = self.descendants(scope);
        candidates.push(scope);
        // Deepest first so that emptied parents are caught in the same pass
        candidates.sort_by_key(|&n| std::cmp::Reverse(self.path(n).len()));
        for node in candidates {
            let Some(tag) = self.tag(node) else {
                continue;
            };
            if tags::is_void(tag) || tags::is_block(tag) || tags::is_embedded(tag) {
                continue;
            }
            if self.children(node).is_empty() {
                self.detach(node);
            }
        }
    }

    /// Removes empty text nodes beneath `scope`.
    pub fn prune_empty_text(&mut self, scope: NodeId) {
        for node in self.descendants(scope) {
            if self.text(node).is_some_and(str::is_empty) {
                self.detach(node);
            }
        }
    }
}

/// Byte offset of the `chars`-th character (clamped to the end).
pub fn char_to_byte(s: &str, chars: usize) -> usize {
    s.char_indices().nth(chars).map_or(s.len(), |(b, _)| b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::doc_from;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_document_is_empty() {
        let doc = Document::new();
        assert!(doc.children(doc.root()).is_empty());
        assert_eq!(doc.version(), 0);
        assert_eq!(doc.to_markup(), "");
    }

    #[test]
    fn test_append_and_detach() {
        let mut doc = Document::new();
        let p = doc.create_element(Element::new("p"));
        let text = doc.create_text("hi");
        doc.append_child(doc.root(), p);
        doc.append_child(p, text);
        assert_eq!(doc.to_markup(), "<p>hi</p>");
        assert!(doc.is_attached(text));

        doc.detach(p);
        assert!(!doc.is_attached(text));
        assert_eq!(doc.to_markup(), "");
    }

    #[test]
    fn test_insert_child_moving_within_same_parent() {
        let mut doc = doc_from("<p>a</p><p>b</p><p>c</p>");
        let root = doc.root();
        let first = doc.child(root, 0).unwrap();
        // Move first paragraph to the end (index 3 before removal)
        doc.insert_child(root, 3, first);
        assert_eq!(doc.to_markup(), "<p>b</p><p>c</p><p>a</p>");
    }

    #[test]
    fn test_unwrap_keeps_order() {
        let mut doc = doc_from("<div><b>x</b>y<i>z</i></div>");
        let div = doc.child(doc.root(), 0).unwrap();
        let moved = doc.unwrap(div);
        assert_eq!(moved.len(), 3);
        assert_eq!(doc.to_markup(), "<b>x</b>y<i>z</i>");
    }

    #[test]
    fn test_wrap_children() {
        let mut doc = doc_from("<p>a<b>b</b>c</p>");
        let p = doc.child(doc.root(), 0).unwrap();
        let em = doc.create_element(Element::new("em"));
        doc.wrap_children(p, 1, 3, em);
        assert_eq!(doc.to_markup(), "<p>a<em><b>b</b>c</em></p>");
    }

    #[test]
    fn test_split_text_by_chars() {
        let mut doc = doc_from("<p>héllo</p>");
        let p = doc.child(doc.root(), 0).unwrap();
        let text = doc.child(p, 0).unwrap();
        let tail = doc.split_text(text, 2).unwrap();
        assert_eq!(doc.text(text), Some("hé"));
        assert_eq!(doc.text(tail), Some("llo"));
        assert_eq!(doc.children(p), &[text, tail]);
    }

    #[test]
    fn test_split_at_clones_each_level() {
        let mut doc = doc_from("<p><b>one<i>two</i>three</b></p>");
        let p = doc.child(doc.root(), 0).unwrap();
        let b = doc.child(p, 0).unwrap();
        let i = doc.child(b, 1).unwrap();
        let two = doc.child(i, 0).unwrap();
        let tail = doc.split_text(two, 1).unwrap();
        let right = doc.split_at(b, i, doc.index_in_parent(tail).unwrap()).unwrap();
        assert_eq!(
            doc.to_markup(),
            "<p><b>one<i>t</i></b><b><i>wo</i>three</b></p>"
        );
        assert_eq!(doc.parent(right), Some(p));
    }

    #[test]
    fn test_split_at_refuses_root() {
        let mut doc = doc_from("<p>x</p>");
        let root = doc.root();
        assert_eq!(doc.split_at(root, root, 0), None);
    }

    #[test]
    fn test_prune_empty_inline_keeps_void_and_blocks() {
        let mut doc = doc_from("<p><b><i></i></b><br><span>x</span></p><p></p>");
        let root = doc.root();
        doc.prune_empty_inline(root);
        assert_eq!(doc.to_markup(), "<p><br><span>x</span></p><p></p>");
    }

    #[test]
    fn test_path_and_ancestry() {
        let doc = doc_from("<p>a</p><ul><li>b</li></ul>");
        let ul = doc.child(doc.root(), 1).unwrap();
        let li = doc.child(ul, 0).unwrap();
        let text = doc.child(li, 0).unwrap();
        assert_eq!(doc.path(text), vec![1, 0, 0]);
        assert_eq!(doc.nearest_block(text), li);
        assert_eq!(doc.nearest_tag(text, &["ul", "ol"]), Some(ul));
        assert!(doc.contains(ul, text));
    }

    #[test]
    fn test_leaf_block_detection() {
        let doc = doc_from("<div>text</div><div><p>x</p></div><li>y</li>");
        let root = doc.root();
        assert!(doc.is_leaf_block(doc.child(root, 0).unwrap()));
        assert!(!doc.is_leaf_block(doc.child(root, 1).unwrap()));
        assert!(!doc.is_leaf_block(doc.child(root, 2).unwrap()));
    }

    #[test]
    fn test_visually_empty() {
        let doc = doc_from("<p><br></p>");
        assert!(doc.is_visually_empty(doc.root()));
        let doc = doc_from("<p>\u{200B}</p>");
        assert!(doc.is_visually_empty(doc.root()));
        let doc = doc_from("<p><img src=\"a.png\"></p>");
        assert!(!doc.is_visually_empty(doc.root()));
    }

    #[test]
    fn test_element_style_helpers() {
        let mut el = Element::new("SPAN").with_style("color: red");
        assert_eq!(el.tag, "span");
        el.update_style(|s| {
            s.remove("color");
        });
        assert_eq!(el.attr("style"), None);
    }
}
