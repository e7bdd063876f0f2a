//! Table structure edits: building new tables, column insert/delete/width
//! and scoped styling.
//!
//! Every operation works row by row on the target column index so that a
//! rectangular table stays rectangular.

use crate::editing::document::{Document, Element, NodeId};
use crate::editing::selection::{Position, TableContext};
use crate::error::CommandError;
use crate::markup::{style::parse_px, tags};
use crate::models::{ColumnSide, ColumnWidth, StyleScope, TableSize, TableStyle};

const TABLE_STYLE: &str = "border-collapse: collapse; width: 100%;";
const CELL_STYLE: &str = "border: 1px solid #ccc; padding: 8px;";

const CORNERS: [&str; 4] = [
    "border-top-left-radius",
    "border-top-right-radius",
    "border-bottom-left-radius",
    "border-bottom-right-radius",
];

/// Rows belonging to `table` itself, not to tables nested in its cells.
pub fn rows(doc: &Document, table: NodeId) -> Vec<NodeId> {
    doc.descendants(table)
        .into_iter()
        .filter(|&n| doc.has_tag(n, "tr"))
        .filter(|&n| {
            doc.parent(n)
                .and_then(|p| doc.nearest_tag(p, &["table"]))
                == Some(table)
        })
        .collect()
}

pub fn cells(doc: &Document, row: NodeId) -> Vec<NodeId> {
    doc.children(row)
        .iter()
        .copied()
        .filter(|&c| doc.tag(c).is_some_and(tags::is_cell))
        .collect()
}

/// Widest row.
pub fn column_count(doc: &Document, table: NodeId) -> usize {
    rows(doc, table)
        .into_iter()
        .map(|r| cells(doc, r).len())
        .max()
        .unwrap_or(0)
}

/// Creates a detached `rows x cols` table. Every cell holds a line break so
/// that it can take the caret.
pub(crate) fn build_table(doc: &mut Document, size: TableSize) -> NodeId {
    let table = doc.create_element(Element::new("table").with_style(TABLE_STYLE));
    let body = doc.create_element(Element::new("tbody"));
    doc.append_child(table, body);
    for _ in 0..size.rows {
        let row = doc.create_element(Element::new("tr"));
        doc.append_child(body, row);
        for _ in 0..size.cols {
            let cell = doc.create_element(Element::new("td").with_style(CELL_STYLE));
            let br = doc.create_element(Element::new("br"));
            doc.append_child(cell, br);
            doc.append_child(row, cell);
        }
    }
    table
}

/// Adds a column next to the current cell in every row. Returns the new
/// cell in the current row.
pub(crate) fn insert_column(
    doc: &mut Document,
    ctx: &TableContext,
    side: ColumnSide,
) -> Option<NodeId> {
    let target = match side {
        ColumnSide::Before => ctx.column_index,
        ColumnSide::After => ctx.column_index + 1,
    };
    let mut created = None;
    for row in rows(doc, ctx.table) {
        let row_cells = cells(doc, row);
        let reference = row_cells
            .get(ctx.column_index)
            .or(row_cells.last())
            .copied();
        let mut el = match reference.and_then(|r| doc.element(r)) {
            Some(r) => Element::new(r.tag.clone()).with_style(&r.style().to_string()),
            None => Element::new("td"),
        };
        el.update_style(|s| {
            s.remove("width");
            for corner in CORNERS {
                s.remove(corner);
            }
        });
        let cell = doc.create_element(el);
        let br = doc.create_element(Element::new("br"));
        doc.append_child(cell, br);

        match row_cells.get(target) {
            Some(&next) => doc.insert_before(next, cell),
            None => match row_cells.last() {
                Some(&last) => doc.insert_after(last, cell),
                None => doc.append_child(row, cell),
            },
        }
        if row == ctx.row {
            created = Some(cell);
        }
    }
    created
}

/// Removes the current column from every row. The caret moves to the
/// neighbouring cell in the current row.
pub(crate) fn delete_column(
    doc: &mut Document,
    ctx: &TableContext,
) -> Result<Position, CommandError> {
    if column_count(doc, ctx.table) <= 1 {
        log::warn!("refusing to delete the last column of {:?}", ctx.table);
        return Err(CommandError::LastColumn);
    }
    for row in rows(doc, ctx.table) {
        if let Some(&cell) = cells(doc, row).get(ctx.column_index) {
            doc.detach(cell);
        }
    }
    let remaining = cells(doc, ctx.row);
    let caret = remaining
        .get(ctx.column_index)
        .or(remaining.last())
        .map(|&c| Position::new(c, 0));
    Ok(caret.unwrap_or_else(|| after(doc, ctx.table)))
}

fn after(doc: &Document, node: NodeId) -> Position {
    match (doc.parent(node), doc.index_in_parent(node)) {
        (Some(parent), Some(idx)) => Position::new(parent, idx + 1),
        _ => Position::new(doc.root(), doc.children(doc.root()).len()),
    }
}

/// Sets (or clears, for `auto`) the width of the current column in every
/// row.
pub(crate) fn set_column_width(doc: &mut Document, ctx: &TableContext, width: ColumnWidth) {
    for row in rows(doc, ctx.table) {
        let Some(&cell) = cells(doc, row).get(ctx.column_index) else {
            continue;
        };
        doc.update_style(cell, |s| match width {
            ColumnWidth::Auto => {
                s.remove("width");
            }
            ColumnWidth::Length { .. } => s.set("width", width.to_string()),
        });
    }
}

fn all_cells(doc: &Document, table: NodeId) -> Vec<Vec<NodeId>> {
    rows(doc, table)
        .into_iter()
        .map(|r| cells(doc, r))
        .collect()
}

fn set_background(doc: &mut Document, node: NodeId, color: Option<&str>) {
    doc.update_style(node, |s| match color {
        Some(c) => s.set("background-color", c),
        None => {
            s.remove("background-color");
        }
    });
}

/// Applies border, radius and background at the requested scope.
pub(crate) fn apply_table_style(doc: &mut Document, ctx: &TableContext, style: &TableStyle) {
    let border = style.border();
    let radius = style.border_radius;
    let background = style.background_color.as_deref();
    match style.scope {
        StyleScope::Table => {
            doc.update_style(ctx.table, |s| {
                if radius > 0 {
                    s.set("border-collapse", "separate");
                    s.set("border-spacing", "0");
                    s.set("border-radius", format!("{radius}px"));
                    s.set("overflow", "hidden");
                } else {
                    s.set("border-collapse", "collapse");
                    s.remove("border-spacing");
                    s.remove("border-radius");
                    s.remove("overflow");
                }
                s.set("border", border.clone());
            });
            let grid = all_cells(doc, ctx.table);
            for &cell in grid.iter().flatten() {
                doc.update_style(cell, |s| {
                    s.set("border", border.clone());
                    for corner in CORNERS {
                        s.remove(corner);
                    }
                });
                set_background(doc, cell, background);
            }
            if radius > 0 {
                round_corners(doc, &grid, radius);
            }
            if let Some(header) = style.header_background.as_deref()
                && let Some(first_row) = grid.first()
            {
                for &cell in first_row {
                    set_background(doc, cell, Some(header));
                }
            }
        }
        StyleScope::Row => {
            let row_cells = cells(doc, ctx.row);
            let last = row_cells.len().saturating_sub(1);
            for (i, &cell) in row_cells.iter().enumerate() {
                doc.update_style(cell, |s| {
                    s.set("border", border.clone());
                    for corner in CORNERS {
                        s.remove(corner);
                    }
                    if radius > 0 {
                        let value = format!("{radius}px");
                        if i == 0 {
                            s.set("border-top-left-radius", value.clone());
                            s.set("border-bottom-left-radius", value.clone());
                        }
                        if i == last {
                            s.set("border-top-right-radius", value.clone());
                            s.set("border-bottom-right-radius", value);
                        }
                    }
                });
                set_background(doc, cell, background);
            }
        }
        StyleScope::Cell => {
            doc.update_style(ctx.cell, |s| {
                s.set("border", border.clone());
                if radius > 0 {
                    s.set("border-radius", format!("{radius}px"));
                } else {
                    s.remove("border-radius");
                }
            });
            set_background(doc, ctx.cell, background);
        }
    }
}

/// Rounds the outer corner of each of the four corner cells. Assumes a
/// regular grid; merged cells are not accounted for.
fn round_corners(doc: &mut Document, grid: &[Vec<NodeId>], radius: u32) {
    let value = format!("{radius}px");
    let first = grid.first();
    let last = grid.last();
    let corners = [
        (first.and_then(|r| r.first()), CORNERS[0]),
        (first.and_then(|r| r.last()), CORNERS[1]),
        (last.and_then(|r| r.first()), CORNERS[2]),
        (last.and_then(|r| r.last()), CORNERS[3]),
    ];
    for (cell, property) in corners {
        if let Some(&cell) = cell {
            doc.update_style(cell, |s| s.set(property, value.clone()));
        }
    }
}

/// Reads back the style currently in effect for the given scope, used to
/// seed the table style modal.
pub fn current_table_style(doc: &Document, ctx: &TableContext, scope: StyleScope) -> TableStyle {
    let target = match scope {
        StyleScope::Table => ctx.table,
        StyleScope::Row => cells(doc, ctx.row).first().copied().unwrap_or(ctx.row),
        StyleScope::Cell => ctx.cell,
    };
    let style = doc.style(target);
    let mut current = TableStyle {
        scope,
        ..TableStyle::default()
    };
    let border = style.get("border").map(str::to_string).or_else(|| {
        cells(doc, ctx.row)
            .first()
            .and_then(|&c| doc.style(c).get("border").map(str::to_string))
    });
    if let Some(border) = border {
        let parts: Vec<&str> = border.split_whitespace().collect();
        if let Some(width) = parts.first().and_then(|w| parse_px(w)) {
            current.border_width = width.round() as u32;
        }
        if parts.len() >= 3
            && let Some(color) = parts.last()
        {
            current.border_color = color.to_string();
        }
    }
    let radius = match scope {
        StyleScope::Row => style.get("border-top-left-radius"),
        _ => style.get("border-radius"),
    };
    if let Some(radius) = radius.and_then(parse_px) {
        current.border_radius = radius.round() as u32;
    }
    let grid = all_cells(doc, ctx.table);
    current.background_color = match scope {
        StyleScope::Table => grid
            .get(1)
            .or(grid.first())
            .and_then(|r| r.first())
            .and_then(|&c| doc.style(c).get("background-color").map(str::to_string)),
        _ => style.get("background-color").map(str::to_string),
    };
    if scope == StyleScope::Table && grid.len() > 1 {
        let header = grid
            .first()
            .and_then(|r| r.first())
            .and_then(|&c| doc.style(c).get("background-color").map(str::to_string));
        if header != current.background_color {
            current.header_background = header;
        }
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::selection::classify_ancestry;
    use crate::tests::{caret, doc_from};
    use pretty_assertions::assert_eq;

    const GRID: &str = "<table><tbody>\
        <tr><td>a1</td><td>b1</td><td>c1</td></tr>\
        <tr><td>a2</td><td>b2</td><td>c2</td></tr>\
        </tbody></table>";

    fn context_at(doc: &Document, offset: usize) -> TableContext {
        let range = caret(doc, offset).range(doc);
        classify_ancestry(doc, &range).table_context(doc).unwrap()
    }

    fn widths(doc: &Document, table: NodeId) -> Vec<usize> {
        rows(doc, table).into_iter().map(|r| cells(doc, r).len()).collect()
    }

    #[test]
    fn test_build_table_shape() {
        let mut doc = Document::new();
        let table = build_table(&mut doc, TableSize { rows: 2, cols: 3 });
        doc.append_child(doc.root(), table);
        assert_eq!(widths(&doc, table), vec![3, 3]);
        assert!(
            rows(&doc, table)
                .iter()
                .flat_map(|&r| cells(&doc, r))
                .all(|c| doc.children(c).len() == 1)
        );
    }

    #[test]
    fn test_nested_table_rows_are_not_counted() {
        let doc = doc_from(
            "<table><tr><td>\
             <table><tr><td>x</td></tr><tr><td>y</td></tr></table>\
             </td></tr></table>",
        );
        let outer = doc.child(doc.root(), 0).unwrap();
        assert_eq!(rows(&doc, outer).len(), 1);
    }

    #[test]
    fn test_insert_column_after_keeps_rectangle() {
        let mut doc = doc_from(GRID);
        // caret in "b1"
        let ctx = context_at(&doc, 3);
        assert_eq!(ctx.column_index, 1);
        let created = insert_column(&mut doc, &ctx, ColumnSide::After).unwrap();
        assert_eq!(widths(&doc, ctx.table), vec![4, 4]);
        assert_eq!(cells(&doc, ctx.row)[2], created);
        assert_eq!(
            doc.to_markup(),
            "<table><tbody>\
             <tr><td>a1</td><td>b1</td><td><br></td><td>c1</td></tr>\
             <tr><td>a2</td><td>b2</td><td><br></td><td>c2</td></tr>\
             </tbody></table>"
        );
    }

    #[test]
    fn test_insert_column_copies_header_tag_and_drops_width() {
        let mut doc = doc_from(
            "<table><tr><th style=\"width: 50px; color: red;\">h</th></tr>\
             <tr><td>d</td></tr></table>",
        );
        let ctx = context_at(&doc, 0);
        insert_column(&mut doc, &ctx, ColumnSide::Before);
        assert_eq!(
            doc.to_markup(),
            "<table><tr><th style=\"color: red;\"><br></th>\
             <th style=\"width: 50px; color: red;\">h</th></tr>\
             <tr><td><br></td><td>d</td></tr></table>"
        );
    }

    #[test]
    fn test_delete_column() {
        let mut doc = doc_from(GRID);
        let ctx = context_at(&doc, 3);
        let caret = delete_column(&mut doc, &ctx).unwrap();
        assert_eq!(widths(&doc, ctx.table), vec![2, 2]);
        assert_eq!(doc.text_content(caret.node), "c1");
    }

    #[test]
    fn test_delete_last_column_is_rejected() {
        let mut doc = doc_from("<table><tr><td>a</td></tr><tr><td>b</td></tr></table>");
        let before = doc.to_markup();
        let ctx = context_at(&doc, 0);
        assert_eq!(delete_column(&mut doc, &ctx), Err(CommandError::LastColumn));
        assert_eq!(doc.to_markup(), before);
        assert_eq!(
            CommandError::LastColumn.to_string(),
            "Cannot delete the last column"
        );
    }

    #[test]
    fn test_column_width_touches_only_target_column() {
        let mut doc = doc_from(GRID);
        let ctx = context_at(&doc, 3);
        set_column_width(&mut doc, &ctx, "120px".parse().unwrap());
        for row in rows(&doc, ctx.table) {
            let row_cells = cells(&doc, row);
            assert_eq!(doc.style(row_cells[1]).get("width"), Some("120px"));
            assert_eq!(doc.style(row_cells[0]).get("width"), None);
            assert_eq!(doc.style(row_cells[2]).get("width"), None);
        }
        set_column_width(&mut doc, &ctx, ColumnWidth::Auto);
        assert_eq!(doc.to_markup(), doc_from(GRID).to_markup());
    }

    #[test]
    fn test_table_style_with_radius_and_header() {
        let mut doc = doc_from(GRID);
        let ctx = context_at(&doc, 0);
        let style = TableStyle {
            border_color: "#FF0000".to_string(),
            border_width: 2,
            border_radius: 8,
            background_color: Some("#fff".to_string()),
            header_background: Some("#eee".to_string()),
            scope: StyleScope::Table,
        };
        apply_table_style(&mut doc, &ctx, &style);

        let table_style = doc.style(ctx.table);
        assert_eq!(table_style.get("border-radius"), Some("8px"));
        assert_eq!(table_style.get("overflow"), Some("hidden"));
        let grid = all_cells(&doc, ctx.table);
        assert_eq!(
            doc.style(grid[0][0]).get("border-top-left-radius"),
            Some("8px")
        );
        assert_eq!(
            doc.style(grid[1][2]).get("border-bottom-right-radius"),
            Some("8px")
        );
        assert_eq!(doc.style(grid[0][1]).get("border-top-left-radius"), None);
        assert_eq!(doc.style(grid[0][1]).get("background-color"), Some("#eee"));
        assert_eq!(doc.style(grid[1][1]).get("background-color"), Some("#fff"));
        assert_eq!(doc.style(grid[1][1]).get("border"), Some("2px solid #FF0000"));

        let read_back = current_table_style(&doc, &ctx, StyleScope::Table);
        assert_eq!(read_back, style);
    }

    #[test]
    fn test_zero_radius_clears_corners() {
        let mut doc = doc_from(GRID);
        let ctx = context_at(&doc, 0);
        let mut style = TableStyle {
            border_radius: 6,
            ..TableStyle::default()
        };
        apply_table_style(&mut doc, &ctx, &style);
        style.border_radius = 0;
        apply_table_style(&mut doc, &ctx, &style);
        assert!(!doc.to_markup().contains("radius"));
        assert_eq!(doc.style(ctx.table).get("overflow"), None);
    }

    #[test]
    fn test_row_scope_rounds_row_ends() {
        let mut doc = doc_from(GRID);
        // caret in "a2"
        let ctx = context_at(&doc, 7);
        assert_eq!(ctx.row_index, 1);
        let style = TableStyle {
            border_radius: 4,
            background_color: Some("yellow".to_string()),
            scope: StyleScope::Row,
            ..TableStyle::default()
        };
        apply_table_style(&mut doc, &ctx, &style);
        let row = cells(&doc, ctx.row);
        assert_eq!(doc.style(row[0]).get("border-bottom-left-radius"), Some("4px"));
        assert_eq!(doc.style(row[2]).get("border-top-right-radius"), Some("4px"));
        assert_eq!(doc.style(row[1]).get("background-color"), Some("yellow"));
        let first_row = cells(&doc, rows(&doc, ctx.table)[0]);
        assert_eq!(doc.style(first_row[1]).get("background-color"), None);
    }
}
