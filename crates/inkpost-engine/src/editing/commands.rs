use crate::editing::blocks;
use crate::editing::document::Document;
use crate::editing::formatting;
use crate::editing::insert;
use crate::editing::patch::Patch;
use crate::editing::selection::{
    Position, Range, Selection, TableContext, capture_selection, classify_ancestry,
    resolve_insertion_point,
};
use crate::editing::table;
use crate::error::CommandError;
use crate::models::{
    Alignment, BlockFormat, BulletStyle, ColumnSide, ColumnWidth, InlineFormat, ListKind,
    MediaReference, NumberStyle, TableSize, TableStyle,
};

/// Commands that can be applied to the document
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    ToggleFormat(InlineFormat),
    Align(Alignment),
    FormatBlock(BlockFormat),
    FontFamily(String),
    FontSize(String),
    ForeColor(String),
    BackColor(String),
    SetList(ListKind),
    BulletStyle(BulletStyle),
    NumberStyle(NumberStyle),
    Indent,
    Outdent,
    ToggleBlockquote,
    InsertLink {
        url: String,
        text: Option<String>,
    },
    InsertImage(MediaReference),
    InsertVideo {
        url: String,
    },
    InsertTable(TableSize),
    InsertColumn(ColumnSide),
    DeleteColumn,
    SetColumnWidth(ColumnWidth),
    ApplyTableStyle(TableStyle),
}

impl Cmd {
    pub fn name(&self) -> &'static str {
        match self {
            Cmd::ToggleFormat(format) => format.name(),
            Cmd::Align(_) => "align",
            Cmd::FormatBlock(_) => "format block",
            Cmd::FontFamily(_) => "font family",
            Cmd::FontSize(_) => "font size",
            Cmd::ForeColor(_) => "text color",
            Cmd::BackColor(_) => "background color",
            Cmd::SetList(_) => "list",
            Cmd::BulletStyle(_) => "bullet style",
            Cmd::NumberStyle(_) => "number style",
            Cmd::Indent => "indent",
            Cmd::Outdent => "outdent",
            Cmd::ToggleBlockquote => "blockquote",
            Cmd::InsertLink { .. } => "insert link",
            Cmd::InsertImage(_) => "insert image",
            Cmd::InsertVideo { .. } => "insert video",
            Cmd::InsertTable(_) => "insert table",
            Cmd::InsertColumn(_) => "insert column",
            Cmd::DeleteColumn => "delete column",
            Cmd::SetColumnWidth(_) => "column width",
            Cmd::ApplyTableStyle(_) => "table style",
        }
    }

    /// Commands that only make sense with the selection inside a table.
    pub fn needs_table(&self) -> bool {
        matches!(
            self,
            Cmd::InsertColumn(_)
                | Cmd::DeleteColumn
                | Cmd::SetColumnWidth(_)
                | Cmd::ApplyTableStyle(_)
        )
    }
}

/// Where the selection goes after a command ran.
enum Outcome {
    Keep,
    Select(Position, Position),
}

impl Outcome {
    fn from_pair(pair: Option<(Position, Position)>) -> Self {
        match pair {
            Some((anchor, focus)) => Outcome::Select(anchor, focus),
            None => Outcome::Keep,
        }
    }

    fn caret(at: Position) -> Self {
        Outcome::Select(at, at)
    }
}

/// Applies a command at the current selection.
///
/// The selection is captured and resolved to an insertion point first, so a
/// missing or stale selection falls back to the end of the document. The
/// document version only moves when the serialized markup actually changed.
pub fn apply(
    doc: &mut Document,
    selection: Option<&Selection>,
    cmd: &Cmd,
) -> Result<Patch, CommandError> {
    let captured = capture_selection(doc, selection);
    let range = resolve_insertion_point(doc, captured.as_ref());
    let offsets = captured.map(|s| s.text_offsets(doc));

    let table_ctx = if cmd.needs_table() {
        let ctx = classify_ancestry(doc, &range)
            .table_context(doc)
            .ok_or(CommandError::NotInTable)?;
        Some(ctx)
    } else {
        None
    };

    log::debug!(
        "applying {} at {:?}..{:?}",
        cmd.name(),
        range.start,
        range.end
    );
    let before = doc.to_markup();
    let outcome = run(doc, &range, cmd, table_ctx.as_ref())?;
    if doc.to_markup() == before {
        log::debug!("{} left the document unchanged", cmd.name());
        return Ok(Patch::unchanged(captured, doc.version()));
    }
    doc.bump_version();

    let new_selection = match outcome {
        Outcome::Select(anchor, focus) if anchor.is_valid(doc) && focus.is_valid(doc) => {
            Some(Selection::new(doc, anchor, focus))
        }
        _ => restore(doc, captured, offsets),
    };
    Ok(Patch {
        changed: true,
        new_selection,
        version: doc.version(),
    })
}

/// Re-stamps the old selection when its nodes survived, otherwise rebuilds
/// it from plain-text offsets.
fn restore(
    doc: &Document,
    captured: Option<Selection>,
    offsets: Option<(usize, usize)>,
) -> Option<Selection> {
    let captured = captured?;
    if captured.anchor.is_valid(doc) && captured.focus.is_valid(doc) {
        return Some(Selection::new(doc, captured.anchor, captured.focus));
    }
    offsets.map(|(start, end)| Selection::from_text_offsets(doc, start, end))
}

fn run(
    doc: &mut Document,
    range: &Range,
    cmd: &Cmd,
    table_ctx: Option<&TableContext>,
) -> Result<Outcome, CommandError> {
    let outcome = match cmd {
        Cmd::ToggleFormat(format) => {
            Outcome::from_pair(formatting::toggle_inline(doc, range, *format))
        }
        Cmd::Align(alignment) => {
            blocks::set_alignment(doc, range, *alignment);
            Outcome::Keep
        }
        Cmd::FormatBlock(format) => {
            blocks::format_block(doc, range, *format);
            Outcome::Keep
        }
        Cmd::FontFamily(value) => style(doc, range, "font-family", value),
        Cmd::FontSize(value) => style(doc, range, "font-size", value),
        Cmd::ForeColor(value) => style(doc, range, "color", value),
        Cmd::BackColor(value) => style(doc, range, "background-color", value),
        Cmd::SetList(kind) => {
            blocks::set_list(doc, range, *kind);
            Outcome::Keep
        }
        Cmd::BulletStyle(bullet) => {
            blocks::set_list_style(doc, range, "ul", bullet.css());
            Outcome::Keep
        }
        Cmd::NumberStyle(number) => {
            blocks::set_list_style(doc, range, "ol", number.css());
            Outcome::Keep
        }
        Cmd::Indent => {
            blocks::indent(doc, range);
            Outcome::Keep
        }
        Cmd::Outdent => {
            blocks::outdent(doc, range);
            Outcome::Keep
        }
        Cmd::ToggleBlockquote => Outcome::from_pair(blocks::toggle_blockquote(doc, range)),
        Cmd::InsertLink { url, text } => {
            if url.trim().is_empty() {
                return Err(CommandError::NotApplicable("link URL is empty"));
            }
            Outcome::caret(insert::insert_link(doc, range, url, text.as_deref()))
        }
        Cmd::InsertImage(media) => {
            if media.url.trim().is_empty() {
                return Err(CommandError::NotApplicable("image source is empty"));
            }
            Outcome::caret(insert::insert_image(doc, range, media))
        }
        Cmd::InsertVideo { url } => {
            if url.trim().is_empty() {
                return Err(CommandError::NotApplicable("video URL is empty"));
            }
            Outcome::caret(insert::insert_video(doc, range, url))
        }
        Cmd::InsertTable(size) => {
            let size = TableSize::new(size.rows, size.cols)
                .map_err(|_| CommandError::NotApplicable("table size is out of range"))?;
            Outcome::caret(insert::insert_table(doc, range, size))
        }
        Cmd::InsertColumn(side) => {
            let ctx = table_ctx.ok_or(CommandError::NotInTable)?;
            match table::insert_column(doc, ctx, *side) {
                Some(cell) => Outcome::caret(Position::new(cell, 0)),
                None => Outcome::Keep,
            }
        }
        Cmd::DeleteColumn => {
            let ctx = table_ctx.ok_or(CommandError::NotInTable)?;
            Outcome::caret(table::delete_column(doc, ctx)?)
        }
        Cmd::SetColumnWidth(width) => {
            let ctx = table_ctx.ok_or(CommandError::NotInTable)?;
            table::set_column_width(doc, ctx, *width);
            Outcome::Keep
        }
        Cmd::ApplyTableStyle(table_style) => {
            let ctx = table_ctx.ok_or(CommandError::NotInTable)?;
            table::apply_table_style(doc, ctx, table_style);
            Outcome::Keep
        }
    };
    Ok(outcome)
}

fn style(doc: &mut Document, range: &Range, property: &str, value: &str) -> Outcome {
    let value = value.trim();
    if value.is_empty() {
        return Outcome::Keep;
    }
    Outcome::from_pair(formatting::apply_inline_style(doc, range, property, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::selection::selected_text;
    use crate::tests::{caret, doc_from, select};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_unchanged_document_keeps_version() {
        let mut doc = doc_from("<p style=\"text-align: left;\">plain</p>");
        let version = doc.version();
        let selection = select(&doc, "plain");
        let patch = apply(&mut doc, Some(&selection), &Cmd::Align(Alignment::Left)).unwrap();
        assert!(!patch.changed);
        assert_eq!(patch.version, version);
        assert_eq!(patch.new_selection, Some(selection));
    }

    #[test]
    fn test_change_bumps_version_and_restores_selection() {
        let mut doc = doc_from("<p>one two</p>");
        let version = doc.version();
        let selection = select(&doc, "two");
        let patch = apply(
            &mut doc,
            Some(&selection),
            &Cmd::ToggleFormat(InlineFormat::Bold),
        )
        .unwrap();
        assert!(patch.changed);
        assert_eq!(patch.version, version + 1);
        assert_eq!(doc.to_markup(), "<p>one <b>two</b></p>");
        let restored = patch.new_selection.unwrap();
        assert!(restored.is_current(&doc));
        assert_eq!(selected_text(&doc, &restored.range(&doc)), "two");
    }

    #[test]
    fn test_missing_selection_inserts_at_end() {
        let mut doc = doc_from("<p>text</p>");
        let media = MediaReference::new("https://x.test/a.png", None);
        let patch = apply(&mut doc, None, &Cmd::InsertImage(media)).unwrap();
        assert!(patch.changed);
        let root = doc.root();
        let children = doc.children(root);
        let n = children.len();
        assert_eq!(doc.tag(children[n - 2]), Some("img"));
        assert_eq!(doc.tag(children[n - 1]), Some("br"));
        assert!(patch.new_selection.is_some());
    }

    #[rstest]
    #[case(Cmd::InsertColumn(ColumnSide::After))]
    #[case(Cmd::DeleteColumn)]
    #[case(Cmd::SetColumnWidth(ColumnWidth::Auto))]
    #[case(Cmd::ApplyTableStyle(TableStyle::default()))]
    fn test_table_commands_need_a_table(#[case] cmd: Cmd) {
        let mut doc = doc_from("<p>text</p>");
        let selection = caret(&doc, 1);
        let before = doc.to_markup();
        assert_eq!(apply(&mut doc, Some(&selection), &cmd), Err(CommandError::NotInTable));
        assert_eq!(doc.to_markup(), before);
    }

    #[test]
    fn test_delete_last_column_is_refused() {
        let mut doc = doc_from("<table><tr><td>a</td></tr></table>");
        let selection = caret(&doc, 0);
        let before = doc.to_markup();
        assert_eq!(
            apply(&mut doc, Some(&selection), &Cmd::DeleteColumn),
            Err(CommandError::LastColumn)
        );
        assert_eq!(doc.to_markup(), before);
    }

    #[rstest]
    #[case(Cmd::InsertLink { url: " ".to_string(), text: None }, "link URL is empty")]
    #[case(Cmd::InsertVideo { url: String::new() }, "video URL is empty")]
    #[case(
        Cmd::InsertImage(MediaReference::new("", None)),
        "image source is empty"
    )]
    fn test_empty_source_is_rejected(#[case] cmd: Cmd, #[case] message: &str) {
        let mut doc = doc_from("<p>text</p>");
        let selection = caret(&doc, 1);
        let err = apply(&mut doc, Some(&selection), &cmd).unwrap_err();
        assert_eq!(err.to_string(), message);
        assert_eq!(doc.to_markup(), "<p>text</p>");
    }

    #[test]
    fn test_empty_style_value_is_ignored() {
        let mut doc = doc_from("<p>text</p>");
        let selection = select(&doc, "text");
        let blank = Cmd::ForeColor("  ".to_string());
        let patch = apply(&mut doc, Some(&selection), &blank).unwrap();
        assert!(!patch.changed);
    }

    #[test]
    fn test_link_at_caret_inside_image_lands_after_it() {
        let mut doc = doc_from("<p>a<img src=\"x.png\">b</p>");
        let p = doc.child(doc.root(), 0).unwrap();
        let img = doc.child(p, 1).unwrap();
        let selection = Selection::caret(&doc, Position::new(img, 0));
        let link = Cmd::InsertLink {
            url: "https://e.com".to_string(),
            text: Some("L".to_string()),
        };
        let patch = apply(&mut doc, Some(&selection), &link).unwrap();
        assert!(patch.changed);
        assert_eq!(
            doc.to_markup(),
            "<p>a<img src=\"x.png\"><a href=\"https://e.com\">L</a>b</p>"
        );
        assert!(doc.children(img).is_empty());
    }

    #[test]
    fn test_stale_selection_falls_back_to_end() {
        let mut doc = doc_from("<p>a</p>");
        let selection = select(&doc, "a");
        doc.bump_version();
        let video = Cmd::InsertVideo {
            url: "https://v.test/e".to_string(),
        };
        apply(&mut doc, Some(&selection), &video).unwrap();
        let root = doc.root();
        assert_eq!(doc.tag(doc.children(root)[0]), Some("p"));
        assert_eq!(doc.tag(doc.children(root)[1]), Some("iframe"));
    }
}
