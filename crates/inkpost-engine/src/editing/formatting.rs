//! Character formatting: toggled tags (bold, italic, ...) and styled spans
//! (font, size, colors).

use crate::editing::boundary::{
    boundary_at, covered_text, discard_if_empty, insert_inline_at, split_range,
};
use crate::editing::document::{Document, Element, NodeId, ZWSP};
use crate::editing::selection::{Position, Range};
use crate::markup::{style::Style, tags};
use crate::models::InlineFormat;

/// Whether `el` switches the format on (`Some(true)`), explicitly off
/// (`Some(false)`), or says nothing about it.
fn decision(format: InlineFormat, el: &Element) -> Option<bool> {
    if format.tags().contains(&el.tag.as_str()) {
        return Some(true);
    }
    let style = el.style();
    match format {
        InlineFormat::Bold => style.get("font-weight").map(|w| {
            let w = w.trim().to_ascii_lowercase();
            w == "bold" || w == "bolder" || w.parse::<u32>().is_ok_and(|n| n >= 600)
        }),
        InlineFormat::Italic => style
            .get("font-style")
            .map(|s| matches!(s.trim(), "italic" | "oblique")),
        InlineFormat::Underline => decoration(&style, "underline"),
        InlineFormat::Strikethrough => decoration(&style, "line-through"),
        InlineFormat::Superscript => style.get("vertical-align").map(|v| v.trim() == "super"),
        InlineFormat::Subscript => style.get("vertical-align").map(|v| v.trim() == "sub"),
    }
}

fn decoration(style: &Style, token: &str) -> Option<bool> {
    let value = style
        .get("text-decoration")
        .or_else(|| style.get("text-decoration-line"))?;
    if value.split_whitespace().any(|t| t == token) {
        Some(true)
    } else if value.trim() == "none" {
        Some(false)
    } else {
        None
    }
}

fn style_property(format: InlineFormat) -> &'static str {
    match format {
        InlineFormat::Bold => "font-weight",
        InlineFormat::Italic => "font-style",
        InlineFormat::Underline | InlineFormat::Strikethrough => "text-decoration",
        InlineFormat::Superscript | InlineFormat::Subscript => "vertical-align",
    }
}

fn cancel_value(format: InlineFormat) -> &'static str {
    match format {
        InlineFormat::Bold | InlineFormat::Italic => "normal",
        InlineFormat::Underline | InlineFormat::Strikethrough => "none",
        InlineFormat::Superscript | InlineFormat::Subscript => "baseline",
    }
}

fn strip_from_style(format: InlineFormat, el: &mut Element) {
    el.update_style(|style| match format {
        InlineFormat::Underline | InlineFormat::Strikethrough => {
            let token = if format == InlineFormat::Underline {
                "underline"
            } else {
                "line-through"
            };
            for name in ["text-decoration", "text-decoration-line"] {
                let Some(value) = style.get(name).map(str::to_string) else {
                    continue;
                };
                let rest: Vec<&str> = value.split_whitespace().filter(|t| *t != token).collect();
                if rest.is_empty() {
                    style.remove(name);
                } else {
                    style.set(name, rest.join(" "));
                }
            }
        }
        _ => {
            style.remove(style_property(format));
        }
    });
}

/// Effective state of a format at a node: the nearest ancestor that says
/// anything about it wins.
pub fn format_active(doc: &Document, node: NodeId, format: InlineFormat) -> bool {
    doc.ancestors_inclusive(node)
        .find_map(|n| doc.element(n).and_then(|el| decision(format, el)))
        .unwrap_or(false)
}

/// A text node holding only the caret placeholder, alone in its parent.
fn placeholder_holder(doc: &Document, node: NodeId) -> Option<NodeId> {
    let text = doc.text(node)?;
    if text.chars().ne(std::iter::once(ZWSP)) {
        return None;
    }
    let parent = doc.parent(node)?;
    (doc.element(parent).is_some() && doc.children(parent).len() == 1).then_some(parent)
}

fn cancel_span(doc: &mut Document, format: InlineFormat) -> NodeId {
    let style = format!("{}: {};", style_property(format), cancel_value(format));
    doc.create_element(Element::new("span").with_style(&style))
}

/// Splits `holder` so that `node` ends up alone in a copy of it. Returns the
/// copy.
fn isolate(doc: &mut Document, holder: NodeId, node: NodeId) -> Option<NodeId> {
    let parent = doc.parent(node)?;
    let idx = doc.index_in_parent(node)?;
    let piece = doc.split_at(holder, parent, idx)?;
    discard_if_empty(doc, holder);
    let parent = doc.parent(node)?;
    let idx = doc.index_in_parent(node)?;
    if let Some(tail) = doc.split_at(piece, parent, idx + 1) {
        discard_if_empty(doc, tail);
    }
    Some(piece)
}

/// Turns the format off for one text node, however it was turned on.
fn clear_format(doc: &mut Document, text: NodeId, format: InlineFormat) {
    loop {
        let Some((holder, on)) = doc.ancestors(text).find_map(|n| {
            doc.element(n)
                .and_then(|el| decision(format, el))
                .map(|d| (n, d))
        }) else {
            return;
        };
        if !on {
            return;
        }
        let piece = if doc.is_block(holder) {
            None
        } else {
            isolate(doc, holder, text)
        };
        let Some(piece) = piece else {
            let span = cancel_span(doc, format);
            doc.wrap(text, span);
            return;
        };
        let by_tag = doc
            .tag(piece)
            .is_some_and(|t| format.tags().contains(&t));
        if by_tag {
            doc.unwrap(piece);
            continue;
        }
        if let Some(el) = doc.element_mut(piece) {
            strip_from_style(format, el);
        }
        if doc
            .element(piece)
            .is_some_and(|el| el.is("span") && el.attrs.is_empty())
        {
            doc.unwrap(piece);
        }
    }
}

fn mergeable(doc: &Document, a: NodeId, b: NodeId) -> bool {
    match (doc.element(a), doc.element(b)) {
        (Some(x), Some(y)) => {
            x == y
                && !tags::is_void(&x.tag)
                && !tags::is_block(&x.tag)
                && !tags::is_embedded(&x.tag)
        }
        _ => false,
    }
}

/// Joins adjacent identical inline elements beneath `node`.
pub(crate) fn merge_adjacent(doc: &mut Document, node: NodeId) {
    let mut i = 0;
    while i + 1 < doc.children(node).len() {
        let a = doc.children(node)[i];
        let b = doc.children(node)[i + 1];
        if mergeable(doc, a, b) {
            doc.move_children(b, a);
            doc.detach(b);
        } else {
            i += 1;
        }
    }
    for child in doc.children(node).to_vec() {
        if doc.element(child).is_some() {
            merge_adjacent(doc, child);
        }
    }
}

fn tidy(doc: &mut Document, texts: &[NodeId]) {
    let mut blocks: Vec<NodeId> = Vec::new();
    for &t in texts {
        let block = doc.nearest_block(t);
        if !blocks.contains(&block) {
            blocks.push(block);
        }
    }
    for block in blocks {
        merge_adjacent(doc, block);
    }
}

fn span_of(doc: &Document, texts: &[NodeId]) -> Option<(Position, Position)> {
    let first = *texts.first()?;
    let last = *texts.last()?;
    Some((
        Position::new(first, 0),
        Position::new(last, doc.node_len(last)),
    ))
}

/// Toggles a character format over the range. Returns the new selection,
/// or `None` when the range covers no text.
pub(crate) fn toggle_inline(
    doc: &mut Document,
    range: &Range,
    format: InlineFormat,
) -> Option<(Position, Position)> {
    if range.is_collapsed() {
        let caret = toggle_at_caret(doc, range.start, format);
        return Some((caret, caret));
    }
    let range = split_range(doc, range);
    let texts = covered_text(doc, &range);
    if texts.is_empty() {
        return None;
    }
    let active = texts.iter().all(|&t| format_active(doc, t, format));
    if active {
        for &t in &texts {
            clear_format(doc, t, format);
        }
    } else {
        if let Some(other) = format.exclusive_with() {
            for &t in &texts {
                if format_active(doc, t, other) {
                    clear_format(doc, t, other);
                }
            }
        }
        for &t in &texts {
            if !format_active(doc, t, format) {
                let el = doc.create_element(Element::new(format.tag()));
                doc.wrap(t, el);
            }
        }
    }
    tidy(doc, &texts);
    span_of(doc, &texts)
}

fn toggle_at_caret(doc: &mut Document, pos: Position, format: InlineFormat) -> Position {
    let placeholder = placeholder_holder(doc, pos.node);
    if !format_active(doc, pos.node, format) {
        if placeholder.is_some() {
            let el = doc.create_element(Element::new(format.tag()));
            doc.wrap(pos.node, el);
            return Position::new(pos.node, 1);
        }
        let el = doc.create_element(Element::new(format.tag()));
        let z = doc.create_text(ZWSP.to_string());
        doc.append_child(el, z);
        insert_inline_at(doc, pos, el);
        return Position::new(z, 1);
    }

    // An empty placeholder from an earlier toggle simply goes away
    if let Some(holder) = placeholder
        && doc
            .element(holder)
            .and_then(|el| decision(format, el))
            .unwrap_or(false)
        && let (Some(parent), Some(idx)) = (doc.parent(holder), doc.index_in_parent(holder))
    {
        doc.detach(holder);
        return Position::new(parent, idx);
    }

    // Step out of the formatting element so typing continues unformatted
    let (parent, idx) = boundary_at(doc, pos);
    let z = doc.create_text(ZWSP.to_string());
    let holder = doc.ancestors_inclusive(parent).find(|&n| {
        doc.element(n)
            .and_then(|el| decision(format, el))
            .is_some()
    });
    let split = holder
        .filter(|&h| !doc.is_block(h))
        .and_then(|h| doc.split_at(h, parent, idx).map(|right| (h, right)));
    match split {
        Some((left, right)) => {
            doc.insert_after(left, z);
            discard_if_empty(doc, left);
            discard_if_empty(doc, right);
        }
        None => {
            let span = cancel_span(doc, format);
            doc.append_child(span, z);
            doc.insert_child(parent, idx, span);
        }
    }
    Position::new(z, 1)
}

/// Sets a CSS property on exactly the selected text by wrapping it in
/// spans. A collapsed range gets an empty styled placeholder with the caret
/// inside.
pub(crate) fn apply_inline_style(
    doc: &mut Document,
    range: &Range,
    property: &str,
    value: &str,
) -> Option<(Position, Position)> {
    let style = format!("{property}: {value};");
    if range.is_collapsed() {
        let pos = range.start;
        if let Some(holder) = placeholder_holder(doc, pos.node)
            && doc.has_tag(holder, "span")
        {
            doc.update_style(holder, |s| s.set(property, value));
            return Some((pos, pos));
        }
        let span = doc.create_element(Element::new("span").with_style(&style));
        let z = doc.create_text(ZWSP.to_string());
        doc.append_child(span, z);
        insert_inline_at(doc, pos, span);
        let caret = Position::new(z, 1);
        return Some((caret, caret));
    }
    let range = split_range(doc, range);
    let texts = covered_text(doc, &range);
    if texts.is_empty() {
        return None;
    }
    for &t in &texts {
        match doc.parent(t) {
            Some(p) if doc.has_tag(p, "span") && doc.children(p).len() == 1 => {
                doc.update_style(p, |s| s.set(property, value));
            }
            _ => {
                let span = doc.create_element(Element::new("span").with_style(&style));
                doc.wrap(t, span);
            }
        }
    }
    tidy(doc, &texts);
    span_of(doc, &texts)
}

/// Nearest value of a CSS property on the node or its ancestors.
pub fn inherited_style(doc: &Document, node: NodeId, property: &str) -> Option<String> {
    doc.ancestors_inclusive(node)
        .find_map(|n| doc.element(n).and_then(|el| el.style().get(property).map(str::to_string)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{caret, doc_from, find_text, select};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn toggle(doc: &mut Document, needle: &str, format: InlineFormat) {
        let range = select(doc, needle).range(doc);
        toggle_inline(doc, &range, format).unwrap();
    }

    #[rstest]
    #[case(InlineFormat::Bold, "<p>hello <b>world</b></p>")]
    #[case(InlineFormat::Italic, "<p>hello <i>world</i></p>")]
    #[case(InlineFormat::Underline, "<p>hello <u>world</u></p>")]
    #[case(InlineFormat::Strikethrough, "<p>hello <s>world</s></p>")]
    #[case(InlineFormat::Superscript, "<p>hello <sup>world</sup></p>")]
    #[case(InlineFormat::Subscript, "<p>hello <sub>world</sub></p>")]
    fn test_toggle_wraps_and_unwraps(#[case] format: InlineFormat, #[case] applied: &str) {
        let mut doc = doc_from("<p>hello world</p>");
        toggle(&mut doc, "world", format);
        assert_eq!(doc.to_markup(), applied);
        toggle(&mut doc, "world", format);
        assert_eq!(doc.to_markup(), "<p>hello world</p>");
    }

    #[test]
    fn test_partial_removal_splits_element() {
        let mut doc = doc_from("<p><b>hello world</b></p>");
        toggle(&mut doc, "lo wo", InlineFormat::Bold);
        assert_eq!(doc.to_markup(), "<p><b>hel</b>lo wo<b>rld</b></p>");
    }

    #[test]
    fn test_mixed_selection_becomes_fully_formatted() {
        let mut doc = doc_from("<p>a<b>b</b>c</p>");
        toggle(&mut doc, "abc", InlineFormat::Bold);
        assert_eq!(doc.to_markup(), "<p><b>abc</b></p>");
    }

    #[test]
    fn test_strong_counts_as_bold() {
        let mut doc = doc_from("<p><strong>x</strong>y</p>");
        toggle(&mut doc, "x", InlineFormat::Bold);
        assert_eq!(doc.to_markup(), "<p>xy</p>");
    }

    #[test]
    fn test_style_based_bold_is_removed() {
        let mut doc = doc_from("<p><span style=\"font-weight: bold\">xy</span></p>");
        toggle(&mut doc, "xy", InlineFormat::Bold);
        assert_eq!(doc.to_markup(), "<p>xy</p>");
    }

    #[test]
    fn test_superscript_replaces_subscript() {
        let mut doc = doc_from("<p><sub>x</sub></p>");
        toggle(&mut doc, "x", InlineFormat::Superscript);
        assert_eq!(doc.to_markup(), "<p><sup>x</sup></p>");
    }

    #[test]
    fn test_explicit_normal_cancels_ancestor() {
        let doc = doc_from("<b>a<span style=\"font-weight: normal\">b</span></b>");
        assert!(format_active(&doc, find_text(&doc, "a"), InlineFormat::Bold));
        assert!(!format_active(&doc, find_text(&doc, "b"), InlineFormat::Bold));
    }

    #[test]
    fn test_caret_toggle_inserts_then_removes_placeholder() {
        let mut doc = doc_from("<p>ab</p>");
        let range = caret(&doc, 1).range(&doc);
        let (at, _) = toggle_inline(&mut doc, &range, InlineFormat::Bold).unwrap();
        assert_eq!(doc.to_markup(), "<p>a<b>\u{200B}</b>b</p>");
        assert_eq!(doc.text(at.node), Some("\u{200B}"));

        let (_, _) = toggle_inline(&mut doc, &Range::collapsed(at), InlineFormat::Bold).unwrap();
        assert_eq!(doc.to_markup(), "<p>ab</p>");
    }

    #[test]
    fn test_caret_toggle_inside_formatting_steps_out() {
        let mut doc = doc_from("<p><b>abcd</b></p>");
        let range = caret(&doc, 2).range(&doc);
        let (at, _) = toggle_inline(&mut doc, &range, InlineFormat::Bold).unwrap();
        assert_eq!(doc.to_markup(), "<p><b>ab</b>\u{200B}<b>cd</b></p>");
        assert!(!format_active(&doc, at.node, InlineFormat::Bold));
    }

    #[test]
    fn test_background_wraps_exact_selection() {
        let mut doc = doc_from("<p>hello world</p>");
        let range = select(&doc, "world").range(&doc);
        apply_inline_style(&mut doc, &range, "background-color", "yellow").unwrap();
        assert_eq!(
            doc.to_markup(),
            "<p>hello <span style=\"background-color: yellow;\">world</span></p>"
        );
    }

    #[test]
    fn test_background_at_caret_inserts_placeholder() {
        let mut doc = doc_from("<p>hello world</p>");
        let range = caret(&doc, 5).range(&doc);
        let (at, _) = apply_inline_style(&mut doc, &range, "background-color", "yellow").unwrap();
        assert_eq!(
            doc.to_markup(),
            "<p>hello<span style=\"background-color: yellow;\">\u{200B}</span> world</p>"
        );
        assert_eq!(at.offset, 1);
        assert_eq!(
            inherited_style(&doc, at.node, "background-color").as_deref(),
            Some("yellow")
        );
    }

    #[test]
    fn test_restyling_a_span_updates_it_in_place() {
        let mut doc = doc_from("<p><span style=\"color: red;\">x</span>y</p>");
        let range = select(&doc, "x").range(&doc);
        apply_inline_style(&mut doc, &range, "color", "blue").unwrap();
        assert_eq!(
            doc.to_markup(),
            "<p><span style=\"color: blue;\">x</span>y</p>"
        );
    }
}
