//! Block-level commands: block format, alignment, lists, indentation and
//! blockquotes.

use crate::editing::boundary::{
    covered_leaves, insert_block_at, lift_and_wrap, split_range, text_block_of, touched_leaves,
};
use crate::editing::document::{Document, Element, NodeId};
use crate::editing::selection::{Position, Range};
use crate::markup::{style::parse_px, tags};
use crate::models::{Alignment, BlockFormat, ListKind};

const BLOCKQUOTE_STYLE: &str =
    "border-left: 4px solid #ccc; margin: 0; padding-left: 16px; color: #555;";

/// Indentation step outside lists, in pixels.
const INDENT_STEP: f64 = 40.0;

fn push_unique(list: &mut Vec<NodeId>, node: NodeId) {
    if !list.contains(&node) {
        list.push(node);
    }
}

/// Text blocks touched by the range, creating paragraphs around loose
/// inline content.
fn text_blocks(doc: &mut Document, range: &Range) -> Vec<NodeId> {
    let mut blocks = Vec::new();
    for leaf in touched_leaves(doc, range) {
        let block = text_block_of(doc, leaf);
        push_unique(&mut blocks, block);
    }
    blocks
}

/// Blocks that carry alignment and margins: the nearest block of each
/// touched leaf, except that content loose at the root or inside list and
/// table plumbing gets its own paragraph.
fn styled_blocks(doc: &mut Document, range: &Range) -> Vec<NodeId> {
    let mut blocks = Vec::new();
    for leaf in touched_leaves(doc, range) {
        let nearest = doc.nearest_block(leaf);
        let plumbing = doc.tag(nearest).is_some_and(tags::is_table_structure);
        let block = if nearest == doc.root() || plumbing {
            text_block_of(doc, leaf)
        } else {
            nearest
        };
        if block != doc.root() {
            push_unique(&mut blocks, block);
        }
    }
    blocks
}

/// Renames the enclosing text blocks; identity and attributes are kept.
pub(crate) fn format_block(doc: &mut Document, range: &Range, format: BlockFormat) {
    let tag = format.tag();
    for block in text_blocks(doc, range) {
        if let Some(el) = doc.element_mut(block)
            && el.tag != tag
        {
            el.tag = tag.clone();
        }
    }
}

pub(crate) fn set_alignment(doc: &mut Document, range: &Range, alignment: Alignment) {
    for block in styled_blocks(doc, range) {
        doc.update_style(block, |s| s.set("text-align", alignment.css()));
    }
}

pub(crate) fn set_list(doc: &mut Document, range: &Range, kind: ListKind) {
    let common = range.common_ancestor(doc);
    let existing = doc.nearest_tag(common, &["ul", "ol"]);
    match (existing, kind.tag()) {
        (Some(list), None) => unwrap_list(doc, list),
        (Some(list), Some(tag)) => {
            if !doc.has_tag(list, tag) {
                convert_list(doc, list, tag);
            }
        }
        (None, Some(tag)) => create_list(doc, range, tag),
        (None, None) => {}
    }
}

/// Replaces the list element by a new one of another type, moving the
/// items over in order.
fn convert_list(doc: &mut Document, list: NodeId, tag: &str) {
    let mut el = Element::new(tag);
    if let Some(old) = doc.element(list) {
        el.attrs = old
            .attrs
            .iter()
            .filter(|(name, _)| name != "type" && name != "start")
            .cloned()
            .collect();
    }
    el.update_style(|s| {
        s.remove("list-style-type");
    });
    let replacement = doc.create_element(el);
    doc.insert_before(list, replacement);
    doc.move_children(list, replacement);
    doc.detach(list);
}

/// Turns one list item into standalone blocks. An item with only inline
/// content becomes a paragraph in place; otherwise loose inline runs are
/// wrapped in paragraphs and the item itself goes away.
fn item_to_blocks(doc: &mut Document, item: NodeId) -> Vec<NodeId> {
    let has_blocks = doc.children(item).iter().any(|&c| doc.is_block(c));
    if !has_blocks {
        if let Some(el) = doc.element_mut(item) {
            el.tag = "p".to_string();
            el.remove_attr("value");
        }
        return vec![item];
    }
    let mut out = Vec::new();
    let mut run: Option<NodeId> = None;
    for child in doc.children(item).to_vec() {
        if doc.is_block(child) {
            run = None;
            out.push(child);
            continue;
        }
        let p = match run {
            Some(p) => p,
            None => {
                let p = doc.create_element(Element::new("p"));
                out.push(p);
                run = Some(p);
                p
            }
        };
        doc.append_child(p, child);
    }
    doc.detach(item);
    out
}

fn unwrap_list(doc: &mut Document, list: NodeId) {
    for child in doc.children(list).to_vec() {
        let blocks = if doc.has_tag(child, "li") {
            item_to_blocks(doc, child)
        } else {
            vec![child]
        };
        for block in blocks {
            doc.insert_before(list, block);
        }
    }
    doc.detach(list);
}

fn next_sibling_block(doc: &Document, node: NodeId) -> Option<NodeId> {
    let mut next = doc.next_sibling(node);
    while let Some(n) = next {
        if doc.text(n).is_some_and(|t| t.trim().is_empty()) {
            next = doc.next_sibling(n);
        } else {
            return Some(n);
        }
    }
    None
}

fn prev_sibling_item(doc: &Document, node: NodeId) -> Option<NodeId> {
    let mut prev = doc.prev_sibling(node);
    while let Some(n) = prev {
        if doc.has_tag(n, "li") {
            return Some(n);
        }
        prev = doc.prev_sibling(n);
    }
    None
}

/// Wraps the contiguous run of selected blocks in a new list.
fn create_list(doc: &mut Document, range: &Range, tag: &str) {
    let blocks: Vec<NodeId> = text_blocks(doc, range)
        .into_iter()
        .filter(|&b| doc.nearest_tag(b, &["ul", "ol"]).is_none())
        .collect();
    let Some(&first) = blocks.first() else {
        return;
    };
    let mut run = vec![first];
    for &block in &blocks[1..] {
        let Some(&prev) = run.last() else { break };
        if next_sibling_block(doc, prev) == Some(block) {
            run.push(block);
        } else {
            break;
        }
    }
    let list = doc.create_element(Element::new(tag));
    doc.insert_before(first, list);
    for block in run {
        let plain = matches!(doc.tag(block), Some("p" | "div"));
        if plain {
            if let Some(el) = doc.element_mut(block) {
                el.tag = "li".to_string();
            }
            doc.append_child(list, block);
        } else {
            let item = doc.create_element(Element::new("li"));
            doc.append_child(list, item);
            doc.append_child(item, block);
        }
    }
}

/// Sets `list-style-type` when the nearest list has the expected tag.
/// Anything else is left alone.
pub(crate) fn set_list_style(doc: &mut Document, range: &Range, list_tag: &str, css: &str) {
    let common = range.common_ancestor(doc);
    let Some(list) = doc.nearest_tag(common, &["ul", "ol"]) else {
        log::debug!("list style {css} ignored: not in a list");
        return;
    };
    if !doc.has_tag(list, list_tag) {
        log::debug!("list style {css} ignored: nearest list is not <{list_tag}>");
        return;
    }
    doc.update_style(list, |s| s.set("list-style-type", css));
    if let Some(el) = doc.element_mut(list) {
        el.remove_attr("type");
    }
}

/// List items the range touches, in document order.
fn selected_items(doc: &Document, range: &Range) -> Vec<NodeId> {
    let common = range.common_ancestor(doc);
    if let Some(item) = doc.nearest_tag(common, &["li"]) {
        return vec![item];
    }
    let mut items = Vec::new();
    for leaf in touched_leaves(doc, range) {
        if let Some(item) = doc.nearest_tag(leaf, &["li"]) {
            push_unique(&mut items, item);
        }
    }
    items
}

pub(crate) fn indent(doc: &mut Document, range: &Range) {
    let items = selected_items(doc, range);
    if items.is_empty() {
        shift_margin(doc, range, INDENT_STEP);
        return;
    }
    for item in items {
        indent_item(doc, item);
    }
}

pub(crate) fn outdent(doc: &mut Document, range: &Range) {
    let items = selected_items(doc, range);
    if items.is_empty() {
        shift_margin(doc, range, -INDENT_STEP);
        return;
    }
    for item in items.into_iter().rev() {
        outdent_item(doc, item);
    }
}

/// Nests the item in a sub-list of its previous sibling.
fn indent_item(doc: &mut Document, item: NodeId) {
    let Some(list) = doc.parent(item) else {
        return;
    };
    let Some(prev) = prev_sibling_item(doc, item) else {
        return;
    };
    let tag = doc.tag(list).unwrap_or("ul").to_string();
    let sub = match doc.last_child(prev) {
        Some(last) if doc.has_tag(last, &tag) => last,
        _ => {
            let sub = doc.create_element(Element::new(tag));
            doc.append_child(prev, sub);
            sub
        }
    };
    doc.append_child(sub, item);
}

/// Moves a nested item after its parent item, or lifts a top-level item
/// out of the list as a paragraph.
fn outdent_item(doc: &mut Document, item: NodeId) {
    let (Some(list), Some(idx)) = (doc.parent(item), doc.index_in_parent(item)) else {
        return;
    };
    let Some(outer) = doc.parent(list) else {
        return;
    };
    if doc.has_tag(outer, "li") {
        let following: Vec<NodeId> = doc.children(list)[idx + 1..].to_vec();
        if !following.is_empty() {
            let tag = doc.tag(list).unwrap_or("ul").to_string();
            let sub = doc.create_element(Element::new(tag));
            for node in following {
                doc.append_child(sub, node);
            }
            doc.append_child(item, sub);
        }
        doc.insert_after(outer, item);
    } else {
        if idx + 1 < doc.children(list).len() {
            doc.split_at(list, list, idx + 1);
        }
        let mut anchor = list;
        for block in item_to_blocks(doc, item) {
            doc.insert_after(anchor, block);
            anchor = block;
        }
    }
    if doc.children(list).is_empty() {
        doc.detach(list);
    }
}

fn shift_margin(doc: &mut Document, range: &Range, delta: f64) {
    for block in styled_blocks(doc, range) {
        let current = doc
            .style(block)
            .get("margin-left")
            .and_then(parse_px)
            .unwrap_or(0.0);
        let next = (current + delta).max(0.0);
        if next == current {
            continue;
        }
        doc.update_style(block, |s| {
            if next <= 0.0 {
                s.remove("margin-left");
            } else {
                s.set("margin-left", format!("{next}px"));
            }
        });
    }
}

/// Unwraps an enclosing blockquote, or wraps the selection in a new one.
/// A collapsed range gets an empty blockquote with the caret inside.
pub(crate) fn toggle_blockquote(doc: &mut Document, range: &Range) -> Option<(Position, Position)> {
    let common = range.common_ancestor(doc);
    if let Some(quote) = doc.nearest_tag(common, &["blockquote"]) {
        doc.unwrap(quote);
        return None;
    }
    let quote = doc.create_element(Element::new("blockquote").with_style(BLOCKQUOTE_STYLE));
    if range.is_collapsed() {
        let br = doc.create_element(Element::new("br"));
        doc.append_child(quote, br);
        insert_block_at(doc, range.start, quote);
        let caret = Position::new(quote, 0);
        return Some((caret, caret));
    }

    let range = split_range(doc, range);
    let leaves = covered_leaves(doc, &range);
    let (&first, &last) = (leaves.first()?, leaves.last()?);
    let first_block = text_block_of(doc, first);
    let last_block = text_block_of(doc, last);
    let mut container = doc
        .ancestors_inclusive(first_block)
        .find(|&n| doc.contains(n, last_block))
        .unwrap_or_else(|| doc.root());
    if container == first_block {
        container = doc.parent(first_block)?;
    }
    let (mut lo, mut hi) = (first, last);
    // Never put a blockquote between list or table plumbing and its items
    while doc.tag(container).is_some_and(tags::is_table_structure) {
        lo = container;
        hi = container;
        container = doc.parent(container)?;
    }
    lift_and_wrap(doc, container, lo, hi, quote)?;
    Some((
        Position::new(first, 0),
        Position::new(last, doc.node_len(last)),
    ))
}
