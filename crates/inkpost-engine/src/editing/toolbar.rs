use serde::Serialize;

use crate::editing::boundary::{leaf_at, touched_leaves};
use crate::editing::document::{Document, NodeId};
use crate::editing::formatting::{format_active, inherited_style};
use crate::editing::selection::{
    Ancestry, Selection, TableContext, capture_selection, classify_ancestry,
};
use crate::editor::EditorOptions;
use crate::models::{Alignment, BlockFormat, BulletStyle, InlineFormat, ListKind, NumberStyle};

/// What the toolbar should show for the current selection.
///
/// Derived from the document and selection every time it is needed and
/// never stored as editor state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ToolbarState {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub superscript: bool,
    pub subscript: bool,
    pub alignment: Alignment,
    pub block_format: Option<BlockFormat>,
    /// One of the configured families, or `None` when the text uses
    /// something else.
    pub font_family: Option<String>,
    pub font_size: Option<String>,
    pub list: ListKind,
    pub bullet_style: Option<BulletStyle>,
    pub number_style: Option<NumberStyle>,
    pub ancestry: Ancestry,
    pub table: Option<TableContext>,
}

impl ToolbarState {
    pub fn is_active(&self, format: InlineFormat) -> bool {
        match format {
            InlineFormat::Bold => self.bold,
            InlineFormat::Italic => self.italic,
            InlineFormat::Underline => self.underline,
            InlineFormat::Strikethrough => self.strikethrough,
            InlineFormat::Superscript => self.superscript,
            InlineFormat::Subscript => self.subscript,
        }
    }

    fn set(&mut self, format: InlineFormat, on: bool) {
        let flag = match format {
            InlineFormat::Bold => &mut self.bold,
            InlineFormat::Italic => &mut self.italic,
            InlineFormat::Underline => &mut self.underline,
            InlineFormat::Strikethrough => &mut self.strikethrough,
            InlineFormat::Superscript => &mut self.superscript,
            InlineFormat::Subscript => &mut self.subscript,
        };
        *flag = on;
    }
}

/// First family of a `font-family` list, unquoted.
fn primary_family(value: &str) -> &str {
    value
        .split(',')
        .next()
        .unwrap_or(value)
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
}

fn match_option(options: &[String], value: &str) -> Option<String> {
    options
        .iter()
        .find(|o| o.eq_ignore_ascii_case(value.trim()))
        .cloned()
}

/// Recomputes the toolbar state from scratch.
pub fn inspect(
    doc: &Document,
    selection: Option<&Selection>,
    options: &EditorOptions,
) -> ToolbarState {
    let Some(selection) = capture_selection(doc, selection) else {
        return ToolbarState::default();
    };
    let range = selection.range(doc);
    let mut state = ToolbarState::default();

    let texts: Vec<NodeId> = touched_leaves(doc, &range)
        .into_iter()
        .filter(|&n| doc.is_text(n))
        .collect();
    let anchor = leaf_at(doc, range.start);
    for format in InlineFormat::ALL {
        let on = if texts.is_empty() {
            format_active(doc, anchor, format)
        } else {
            texts.iter().all(|&t| format_active(doc, t, format))
        };
        state.set(format, on);
    }

    let mut alignment = None;
    for node in doc.ancestors_inclusive(anchor) {
        let Some(el) = doc.element(node) else {
            continue;
        };
        if state.block_format.is_none() {
            state.block_format = BlockFormat::from_tag(&el.tag);
        }
        if alignment.is_none() {
            alignment = el
                .style()
                .get("text-align")
                .and_then(Alignment::from_css)
                .or_else(|| el.attr("align").and_then(Alignment::from_css));
        }
        if state.list == ListKind::None && matches!(el.tag.as_str(), "ul" | "ol") {
            state.list = ListKind::from_tag(&el.tag);
            let style_type = el.style().get("list-style-type").map(str::to_string);
            if state.list == ListKind::Bullet {
                state.bullet_style = Some(
                    style_type
                        .as_deref()
                        .and_then(BulletStyle::from_css)
                        .unwrap_or_default(),
                );
            } else {
                state.number_style = Some(
                    style_type
                        .as_deref()
                        .or(el.attr("type"))
                        .and_then(NumberStyle::from_css)
                        .unwrap_or_default(),
                );
            }
        }
    }
    state.alignment = alignment.unwrap_or_default();

    state.font_family = inherited_style(doc, anchor, "font-family")
        .and_then(|v| match_option(&options.font_families, primary_family(&v)));
    state.font_size = inherited_style(doc, anchor, "font-size")
        .and_then(|v| match_option(&options.font_sizes, &v));

    state.ancestry = classify_ancestry(doc, &range);
    state.table = state.ancestry.table_context(doc);
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{caret, doc_from, select};
    use pretty_assertions::assert_eq;

    fn options() -> EditorOptions {
        EditorOptions {
            font_families: vec!["Arial".to_string(), "Georgia".to_string()],
            font_sizes: vec!["12px".to_string(), "16px".to_string()],
            ..EditorOptions::default()
        }
    }

    #[test]
    fn test_no_selection_gives_default_state() {
        let doc = doc_from("<p><b>x</b></p>");
        assert_eq!(inspect(&doc, None, &options()), ToolbarState::default());
    }

    #[test]
    fn test_character_flags_require_whole_selection() {
        let doc = doc_from("<p><b>bo<i>th</i></b> plain</p>");
        let both = select(&doc, "th");
        let state = inspect(&doc, Some(&both), &options());
        assert!(state.bold && state.italic);
        let mixed = select(&doc, "both");
        let state = inspect(&doc, Some(&mixed), &options());
        assert!(state.bold);
        assert!(!state.italic);
    }

    #[test]
    fn test_block_alignment_and_list() {
        let doc = doc_from(
            "<ol type=\"i\"><li style=\"text-align: center\"><h3>item</h3></li></ol>",
        );
        let state = inspect(&doc, Some(&select(&doc, "item")), &options());
        assert_eq!(state.block_format, Some(BlockFormat::Heading(3)));
        assert_eq!(state.alignment, Alignment::Center);
        assert_eq!(state.list, ListKind::Number);
        assert_eq!(state.number_style, Some(NumberStyle::LowerRoman));
        assert_eq!(state.bullet_style, None);
    }

    #[test]
    fn test_fonts_match_supported_options() {
        let doc = doc_from(
            "<p style=\"font-family: 'georgia', serif; font-size: 16px\">a\
             <span style=\"font-family: Comic Sans\">b</span></p>",
        );
        let state = inspect(&doc, Some(&select(&doc, "a")), &options());
        assert_eq!(state.font_family.as_deref(), Some("Georgia"));
        assert_eq!(state.font_size.as_deref(), Some("16px"));
        let state = inspect(&doc, Some(&select(&doc, "b")), &options());
        assert_eq!(state.font_family, None);
    }

    #[test]
    fn test_table_context() {
        let doc = doc_from("<table><tr><td>a</td><td>b</td></tr></table>");
        let state = inspect(&doc, Some(&caret(&doc, 2)), &options());
        assert!(state.ancestry.in_table);
        let table = state.table.unwrap();
        assert_eq!((table.row_index, table.column_index), (0, 1));
    }

    #[test]
    fn test_stale_selection_is_ignored() {
        let mut doc = doc_from("<p><b>x</b></p>");
        let selection = select(&doc, "x");
        doc.bump_version();
        assert!(!inspect(&doc, Some(&selection), &options()).bold);
    }
}
