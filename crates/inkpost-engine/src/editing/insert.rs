//! Insertion of links, images, video frames and tables.
//!
//! Links over a selection go through an ordered chain of
//! [`InsertionStrategy`] values. Each strategy checks whether it applies
//! before touching the tree, so a strategy that declines leaves the document
//! as it found it and the next one is tried.

use crate::editing::boundary::{
    covered_leaves, covered_text, insert_block_at, insert_inline_at, lift_and_wrap, split_range,
};
use crate::editing::document::{Document, Element, NodeId};
use crate::editing::selection::{Position, Range, selected_text};
use crate::editing::table::build_table;
use crate::error::CommandError;
use crate::markup::tags;
use crate::models::{MediaReference, TableSize};

const IMAGE_STYLE: &str = "max-width: 100%; height: auto;";

/// Ways of turning a selection into a link, most precise first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionStrategy {
    /// The selection lies within one text node.
    DirectReplace,
    /// Both ends share a parent with only inline content between them.
    Surround,
    /// Both ends share a block; inline ancestors are split at the edges.
    ExtractAndWrap,
    /// Last resort: the link is appended to the end of the document.
    AppendToEnd,
}

impl InsertionStrategy {
    pub const CHAIN: [InsertionStrategy; 4] = [
        InsertionStrategy::DirectReplace,
        InsertionStrategy::Surround,
        InsertionStrategy::ExtractAndWrap,
        InsertionStrategy::AppendToEnd,
    ];

    pub fn name(self) -> &'static str {
        match self {
            InsertionStrategy::DirectReplace => "direct replace",
            InsertionStrategy::Surround => "surround",
            InsertionStrategy::ExtractAndWrap => "extract and wrap",
            InsertionStrategy::AppendToEnd => "append to end",
        }
    }

    /// Whether the strategy can handle the range. Never mutates.
    pub fn applies(self, doc: &Document, range: &Range) -> bool {
        if range.is_collapsed() && self != InsertionStrategy::AppendToEnd {
            return false;
        }
        match self {
            InsertionStrategy::DirectReplace => {
                range.start.node == range.end.node && doc.is_text(range.start.node)
            }
            InsertionStrategy::Surround => surround_span(doc, range).is_some(),
            InsertionStrategy::ExtractAndWrap => {
                doc.nearest_block(range.start.node) == doc.nearest_block(range.end.node)
            }
            InsertionStrategy::AppendToEnd => true,
        }
    }

    /// Wraps the range in `link`. `display` replaces the wrapped content
    /// when given.
    fn wrap(
        self,
        doc: &mut Document,
        range: &Range,
        link: NodeId,
        display: Option<&str>,
        fallback_text: &str,
    ) -> Result<NodeId, CommandError> {
        if !self.applies(doc, range) {
            return Err(CommandError::StrategyMismatch(self.name()));
        }
        let mismatch = CommandError::StrategyMismatch(self.name());
        match self {
            InsertionStrategy::DirectReplace => {
                let split = split_range(doc, range);
                let middle = *covered_text(doc, &split).first().ok_or(mismatch)?;
                doc.wrap(middle, link);
            }
            InsertionStrategy::Surround => {
                let split = split_range(doc, range);
                let (parent, start, end) = surround_span(doc, &split).ok_or(mismatch)?;
                doc.wrap_children(parent, start, end, link);
            }
            InsertionStrategy::ExtractAndWrap => {
                let split = split_range(doc, range);
                let leaves = covered_leaves(doc, &split);
                let (Some(&first), Some(&last)) = (leaves.first(), leaves.last()) else {
                    return Err(mismatch);
                };
                let block = doc.nearest_block(first);
                lift_and_wrap(doc, block, first, last, link).ok_or(mismatch)?;
            }
            InsertionStrategy::AppendToEnd => {
                let root = doc.root();
                match doc.last_child(root) {
                    Some(last) if doc.is_leaf_block(last) => doc.append_child(last, link),
                    _ => {
                        let p = doc.create_element(Element::new("p"));
                        doc.append_child(root, p);
                        doc.append_child(p, link);
                    }
                }
                let text = doc.create_text(display.unwrap_or(fallback_text));
                doc.append_child(link, text);
                return Ok(link);
            }
        }
        if let Some(display) = display {
            doc.clear_children(link);
            let text = doc.create_text(display);
            doc.append_child(link, text);
        }
        Ok(link)
    }
}

fn edge(doc: &Document, pos: Position, is_end: bool) -> Option<(NodeId, usize)> {
    if !doc.is_text(pos.node) {
        return Some((pos.node, pos.offset));
    }
    let parent = doc.parent(pos.node)?;
    let idx = doc.index_in_parent(pos.node)?;
    // A start inside a text node still begins at that node; an end inside
    // it still covers it
    let past = if is_end {
        pos.offset > 0
    } else {
        pos.offset >= doc.node_len(pos.node)
    };
    Some((parent, if past { idx + 1 } else { idx }))
}

/// Parent and child span when both range ends sit in the same element with
/// only inline siblings between them.
fn surround_span(doc: &Document, range: &Range) -> Option<(NodeId, usize, usize)> {
    let (start_parent, start) = edge(doc, range.start, false)?;
    let (end_parent, end) = edge(doc, range.end, true)?;
    if start_parent != end_parent || start >= end {
        return None;
    }
    let tag = doc.tag(start_parent);
    if tag.is_some_and(|t| tags::is_table_structure(t) || tags::is_void(t)) {
        return None;
    }
    let children = doc.children(start_parent);
    let span = children.get(start..end.min(children.len()))?;
    if span.iter().any(|&c| doc.is_block(c)) {
        return None;
    }
    Some((start_parent, start, end))
}

fn after(doc: &Document, node: NodeId) -> Position {
    match (doc.parent(node), doc.index_in_parent(node)) {
        (Some(parent), Some(idx)) => Position::new(parent, idx + 1),
        _ => Position::new(doc.root(), doc.children(doc.root()).len()),
    }
}

/// Creates or updates a link and returns the caret position right after
/// it.
pub(crate) fn insert_link(
    doc: &mut Document,
    range: &Range,
    url: &str,
    text: Option<&str>,
) -> Position {
    let text = text.map(str::trim).filter(|t| !t.is_empty());

    let common = range.common_ancestor(doc);
    if let Some(existing) = doc.nearest_tag(common, &["a"]) {
        if let Some(el) = doc.element_mut(existing) {
            el.set_attr("href", url);
        }
        if let Some(text) = text {
            doc.clear_children(existing);
            let node = doc.create_text(text);
            doc.append_child(existing, node);
        }
        return after(doc, existing);
    }

    let link = doc.create_element(Element::new("a").with_attr("href", url));
    if range.is_collapsed() {
        let node = doc.create_text(text.unwrap_or(url));
        doc.append_child(link, node);
        return insert_inline_at(doc, range.start, link);
    }

    let selected = selected_text(doc, range);
    let fallback = if selected.is_empty() { url } else { &selected };
    let mut placed = None;
    for strategy in InsertionStrategy::CHAIN {
        match strategy.wrap(doc, range, link, text, fallback) {
            Ok(node) => {
                log::debug!("link inserted via {}", strategy.name());
                placed = Some(node);
                break;
            }
            Err(err) => log::warn!("{err}; trying the next insertion strategy"),
        }
    }
    let link = placed.unwrap_or(link);
    for nested in doc.descendants(link) {
        if doc.has_tag(nested, "a") {
            doc.unwrap(nested);
        }
    }
    after(doc, link)
}

/// Inserts an inline node at the end of the range followed by a line break.
/// Returns the caret position after the break.
fn insert_inline_with_break(doc: &mut Document, range: &Range, node: NodeId) -> Position {
    let at = insert_inline_at(doc, range.end, node);
    let br = doc.create_element(Element::new("br"));
    doc.insert_child(at.node, at.offset, br);
    Position::new(at.node, at.offset + 1)
}

pub(crate) fn insert_image(doc: &mut Document, range: &Range, media: &MediaReference) -> Position {
    let img = doc.create_element(
        Element::new("img")
            .with_attr("src", media.url.as_str())
            .with_attr("alt", media.alt_text())
            .with_style(IMAGE_STYLE),
    );
    insert_inline_with_break(doc, range, img)
}

/// Embeds a video player frame for the URL as given.
pub(crate) fn insert_video(doc: &mut Document, range: &Range, url: &str) -> Position {
    let frame = doc.create_element(
        Element::new("iframe")
            .with_attr("src", url)
            .with_attr("width", "560")
            .with_attr("height", "315")
            .with_attr("frameborder", "0")
            .with_attr("allowfullscreen", ""),
    );
    insert_inline_with_break(doc, range, frame)
}

pub(crate) fn insert_table(doc: &mut Document, range: &Range, size: TableSize) -> Position {
    let table = build_table(doc, size);
    insert_block_at(doc, range.end, table);
    let br = doc.create_element(Element::new("br"));
    doc.insert_after(table, br);
    after(doc, br)
}
