//! Range surgery shared by the formatting, block and insertion commands.
//!
//! Commands never edit through raw offsets. They first turn range
//! boundaries into edges between nodes (splitting text where needed), then
//! move whole nodes around.

use std::cmp::Ordering;

use crate::editing::document::{Document, Element, NodeId};
use crate::editing::selection::{Position, Range};
use crate::markup::tags;

/// Turns a position into an edge between children, splitting the text node
/// it falls in. Returns `(parent, child index)`.
pub(crate) fn boundary_at(doc: &mut Document, pos: Position) -> (NodeId, usize) {
    let pos = pos.normalized(doc);
    if doc.is_text(pos.node)
        && let (Some(parent), Some(idx)) = (doc.parent(pos.node), doc.index_in_parent(pos.node))
    {
        if pos.offset == 0 {
            return (parent, idx);
        }
        if pos.offset < doc.node_len(pos.node) {
            doc.split_text(pos.node, pos.offset);
        }
        return (parent, idx + 1);
    }
    (pos.node, pos.offset.min(doc.node_len(pos.node)))
}

/// Splits the text nodes under the range boundaries so that every text node
/// is either entirely inside or entirely outside the range. Returns the
/// same range expressed over the resulting nodes.
pub(crate) fn split_range(doc: &mut Document, range: &Range) -> Range {
    if range.is_collapsed() {
        return *range;
    }
    let mut start = range.start;
    let mut end = range.end;
    // End first: splitting it never moves the start
    if doc.is_text(end.node) && end.offset > 0 && end.offset < doc.node_len(end.node) {
        doc.split_text(end.node, end.offset);
    }
    if doc.is_text(start.node)
        && start.offset > 0
        && start.offset < doc.node_len(start.node)
        && let Some(tail) = doc.split_text(start.node, start.offset)
    {
        if end.node == start.node {
            end = Position::new(tail, end.offset - start.offset);
        }
        start = Position::new(tail, 0);
    }
    Range { start, end }
}

fn is_leaf(doc: &Document, node: NodeId) -> bool {
    match doc.text(node) {
        Some(text) => !text.is_empty(),
        None => doc
            .tag(node)
            .is_some_and(|t| tags::is_void(t) || t == "iframe"),
    }
}

fn scope_of(doc: &Document, range: &Range) -> NodeId {
    let common = range.common_ancestor(doc);
    if doc.is_text(common) {
        doc.parent(common).unwrap_or_else(|| doc.root())
    } else {
        common
    }
}

/// Edges just before and just after a leaf.
fn leaf_edges(doc: &Document, leaf: NodeId) -> (Position, Position) {
    if doc.is_text(leaf) {
        return (Position::new(leaf, 0), Position::new(leaf, doc.node_len(leaf)));
    }
    match (doc.parent(leaf), doc.index_in_parent(leaf)) {
        (Some(parent), Some(idx)) => (Position::new(parent, idx), Position::new(parent, idx + 1)),
        _ => (Position::new(leaf, 0), Position::new(leaf, 0)),
    }
}

/// Leaves (non-empty text, void elements, frames) lying entirely inside the
/// range, in document order.
pub(crate) fn covered_leaves(doc: &Document, range: &Range) -> Vec<NodeId> {
    if range.is_collapsed() {
        return Vec::new();
    }
    doc.descendants(scope_of(doc, range))
        .into_iter()
        .filter(|&n| is_leaf(doc, n))
        .filter(|&n| {
            let (before, after) = leaf_edges(doc, n);
            before.cmp_in(&range.start, doc) != Ordering::Less
                && after.cmp_in(&range.end, doc) != Ordering::Greater
        })
        .collect()
}

/// Text nodes lying entirely inside the range.
pub(crate) fn covered_text(doc: &Document, range: &Range) -> Vec<NodeId> {
    covered_leaves(doc, range)
        .into_iter()
        .filter(|&n| doc.is_text(n))
        .collect()
}

/// Leaves the range overlaps, even partially. A collapsed range yields the
/// leaf at the caret.
pub(crate) fn touched_leaves(doc: &Document, range: &Range) -> Vec<NodeId> {
    if range.is_collapsed() {
        return vec![leaf_at(doc, range.start)];
    }
    let touched: Vec<NodeId> = doc
        .descendants(scope_of(doc, range))
        .into_iter()
        .filter(|&n| is_leaf(doc, n))
        .filter(|&n| {
            let (before, after) = leaf_edges(doc, n);
            after.cmp_in(&range.start, doc) == Ordering::Greater
                && before.cmp_in(&range.end, doc) == Ordering::Less
        })
        .collect();
    if touched.is_empty() {
        vec![leaf_at(doc, range.start)]
    } else {
        touched
    }
}

fn first_leaf(doc: &Document, node: NodeId) -> Option<NodeId> {
    std::iter::once(node)
        .chain(doc.descendants(node))
        .find(|&n| is_leaf(doc, n))
}

fn last_leaf(doc: &Document, node: NodeId) -> Option<NodeId> {
    std::iter::once(node)
        .chain(doc.descendants(node))
        .filter(|&n| is_leaf(doc, n))
        .last()
}

/// The node a caret sits in or next to. Falls back to the position's own
/// node when it has no content.
pub(crate) fn leaf_at(doc: &Document, pos: Position) -> NodeId {
    if doc.is_text(pos.node) {
        return pos.node;
    }
    if let Some(next) = doc.child(pos.node, pos.offset) {
        return first_leaf(doc, next).unwrap_or(next);
    }
    if let Some(prev) = pos.offset.checked_sub(1).and_then(|i| doc.child(pos.node, i)) {
        return last_leaf(doc, prev).unwrap_or(prev);
    }
    pos.node
}

/// Ancestor of `node` (inclusive) whose parent is `container`.
pub(crate) fn child_of(doc: &Document, container: NodeId, node: NodeId) -> Option<NodeId> {
    doc.ancestors_inclusive(node)
        .find(|&n| doc.parent(n) == Some(container))
}

/// Removes a node left without content by a split: blocks without text or
/// embedded content, inline elements without children.
pub(crate) fn discard_if_empty(doc: &mut Document, node: NodeId) {
    if !doc.is_attached(node) {
        return;
    }
    if doc.is_block(node) {
        let has_embedded = doc
            .descendants(node)
            .into_iter()
            .any(|n| doc.tag(n).is_some_and(tags::is_embedded));
        if doc.text_content(node).is_empty() && !has_embedded {
            doc.detach(node);
        }
    } else if doc.element(node).is_some() {
        doc.prune_empty_inline(node);
    }
}

/// Wraps everything from leaf `first` to leaf `last` (inclusive) in
/// `wrapper`, which becomes a child of `container`. Elements between the
/// container and the leaves are split at the edges so that content outside
/// the span keeps its formatting.
pub(crate) fn lift_and_wrap(
    doc: &mut Document,
    container: NodeId,
    first: NodeId,
    last: NodeId,
    wrapper: NodeId,
) -> Option<NodeId> {
    let top_first = child_of(doc, container, first)?;
    if top_first != first {
        let parent = doc.parent(first)?;
        let idx = doc.index_in_parent(first)?;
        if idx > 0 || parent != top_first {
            doc.split_at(top_first, parent, idx)?;
            discard_if_empty(doc, top_first);
        }
    }
    let top_last = child_of(doc, container, last)?;
    if top_last != last {
        let parent = doc.parent(last)?;
        let idx = doc.index_in_parent(last)?;
        if let Some(tail) = doc.split_at(top_last, parent, idx + 1) {
            discard_if_empty(doc, tail);
        }
    }
    let start = doc.index_in_parent(child_of(doc, container, first)?)?;
    let end = doc.index_in_parent(child_of(doc, container, last)?)?;
    doc.wrap_children(container, start, end + 1, wrapper);
    Some(wrapper)
}

/// Inserts an inline node at the position, returning the position right
/// after it.
pub(crate) fn insert_inline_at(doc: &mut Document, pos: Position, node: NodeId) -> Position {
    let (parent, idx) = boundary_at(doc, pos);
    doc.insert_child(parent, idx, node);
    Position::new(parent, idx + 1)
}

/// Containers where block content may be inserted.
fn accepts_blocks(doc: &Document, node: NodeId) -> bool {
    if node == doc.root() {
        return true;
    }
    doc.tag(node).is_some_and(|t| {
        tags::is_block(t) && !tags::is_leaf_block(t) && !tags::is_table_structure(t)
    })
}

/// Inserts a block-level node at the position. A text block around the
/// position is split in two and the node goes between the halves; halves
/// left empty are dropped.
pub(crate) fn insert_block_at(doc: &mut Document, pos: Position, node: NodeId) {
    let (parent, idx) = boundary_at(doc, pos);
    let Some(host) = doc
        .ancestors_inclusive(parent)
        .find(|&n| accepts_blocks(doc, n))
    else {
        doc.append_child(doc.root(), node);
        return;
    };
    if host == parent {
        doc.insert_child(parent, idx, node);
        return;
    }
    let Some(top) = child_of(doc, host, parent) else {
        doc.append_child(host, node);
        return;
    };
    match doc.split_at(top, parent, idx) {
        Some(right) => {
            doc.insert_after(top, node);
            discard_if_empty(doc, top);
            discard_if_empty(doc, right);
        }
        None => doc.insert_after(top, node),
    }
}

/// Leaf block holding `node`. Loose inline content directly inside a
/// container is wrapped in a new paragraph first.
pub(crate) fn text_block_of(doc: &mut Document, node: NodeId) -> NodeId {
    let block = doc.nearest_block(node);
    if doc.is_leaf_block(block) {
        return block;
    }
    if block == node {
        if let Some(leaf) = doc
            .descendants(node)
            .into_iter()
            .find(|&d| doc.is_leaf_block(d))
        {
            return leaf;
        }
        let p = doc.create_element(Element::new("p"));
        let inline_only = doc.children(node).iter().all(|&c| !doc.is_block(c));
        if inline_only && !doc.children(node).is_empty() {
            doc.move_children(node, p);
        } else {
            let br = doc.create_element(Element::new("br"));
            doc.append_child(p, br);
        }
        doc.append_child(node, p);
        return p;
    }
    let Some(top) = child_of(doc, block, node) else {
        return block;
    };
    let siblings = doc.children(block).to_vec();
    let Some(idx) = siblings.iter().position(|&s| s == top) else {
        return block;
    };
    let mut lo = idx;
    while lo > 0 && !doc.is_block(siblings[lo - 1]) {
        lo -= 1;
    }
    let mut hi = idx + 1;
    while hi < siblings.len() && !doc.is_block(siblings[hi]) {
        hi += 1;
    }
    let p = doc.create_element(Element::new("p"));
    doc.wrap_children(block, lo, hi, p);
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{doc_from, find_text};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_range_inside_one_text_node() {
        let mut doc = doc_from("<p>hello world</p>");
        let t = find_text(&doc, "hello world");
        let range = Range::new(&doc, Position::new(t, 2), Position::new(t, 7));
        let split = split_range(&mut doc, &range);
        let covered = covered_text(&doc, &split);
        assert_eq!(covered.len(), 1);
        assert_eq!(doc.text(covered[0]), Some("llo w"));
        assert_eq!(doc.to_markup(), "<p>hello world</p>");
    }

    #[test]
    fn test_split_range_across_elements() {
        let mut doc = doc_from("<p>ab<b>cd</b>ef</p>");
        let ab = find_text(&doc, "ab");
        let ef = find_text(&doc, "ef");
        let range = Range::new(&doc, Position::new(ab, 1), Position::new(ef, 1));
        let split = split_range(&mut doc, &range);
        let texts: Vec<&str> = covered_text(&doc, &split)
            .into_iter()
            .filter_map(|t| doc.text(t))
            .collect();
        assert_eq!(texts, vec!["b", "cd", "e"]);
    }

    #[test]
    fn test_touched_leaves_for_caret() {
        let doc = doc_from("<p>ab</p><p>cd</p>");
        let cd = find_text(&doc, "cd");
        let leaves = touched_leaves(&doc, &Range::collapsed(Position::new(cd, 1)));
        assert_eq!(leaves, vec![cd]);
        let end = Range::collapsed(Position::new(doc.root(), 2));
        assert_eq!(touched_leaves(&doc, &end), vec![cd]);
    }

    #[test]
    fn test_lift_and_wrap_splits_inline_ancestors() {
        let mut doc = doc_from("<p><b>abcd</b></p>");
        let t = find_text(&doc, "abcd");
        let p = doc.child(doc.root(), 0).unwrap();
        let range = Range::new(&doc, Position::new(t, 1), Position::new(t, 3));
        let split = split_range(&mut doc, &range);
        let leaves = covered_leaves(&doc, &split);
        let a = doc.create_element(Element::new("a").with_attr("href", "x"));
        lift_and_wrap(&mut doc, p, leaves[0], leaves[0], a).unwrap();
        assert_eq!(
            doc.to_markup(),
            "<p><b>a</b><a href=\"x\"><b>bc</b></a><b>d</b></p>"
        );
    }

    #[test]
    fn test_insert_block_splits_paragraph() {
        let mut doc = doc_from("<p>abcd</p>");
        let t = find_text(&doc, "abcd");
        let hr = doc.create_element(Element::new("hr"));
        insert_block_at(&mut doc, Position::new(t, 2), hr);
        assert_eq!(doc.to_markup(), "<p>ab</p><hr><p>cd</p>");
    }

    #[test]
    fn test_insert_block_replaces_empty_paragraph() {
        let mut doc = doc_from("<p>x</p><p><br></p>");
        let p = doc.child(doc.root(), 1).unwrap();
        let hr = doc.create_element(Element::new("hr"));
        insert_block_at(&mut doc, Position::new(p, 0), hr);
        assert_eq!(doc.to_markup(), "<p>x</p><hr>");
    }

    #[test]
    fn test_text_block_of_wraps_loose_inline_run() {
        let mut doc = doc_from("<li>one <b>two</b><ul><li>x</li></ul></li>");
        let one = find_text(&doc, "one ");
        let p = text_block_of(&mut doc, one);
        assert_eq!(doc.tag(p), Some("p"));
        assert_eq!(
            doc.to_markup(),
            "<li><p>one <b>two</b></p><ul><li>x</li></ul></li>"
        );
    }
}
