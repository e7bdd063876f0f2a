use std::cmp::Ordering;

use serde::Serialize;

use crate::editing::document::{Document, NodeId};
use crate::markup::tags;

/// A boundary point: a char offset inside a text node, or a child index
/// inside an element (DOM semantics).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub node: NodeId,
    pub offset: usize,
}

impl Position {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }

    /// Attached to the document and within the node's bounds.
    pub fn is_valid(&self, doc: &Document) -> bool {
        doc.is_attached(self.node) && self.offset <= doc.node_len(self.node)
    }

    /// A void element holds no content, so a position inside one becomes
    /// the parent boundary just after it.
    pub fn normalized(self, doc: &Document) -> Position {
        if doc.tag(self.node).is_some_and(tags::is_void)
            && let (Some(parent), Some(index)) =
                (doc.parent(self.node), doc.index_in_parent(self.node))
        {
            return Position::new(parent, index + 1);
        }
        self
    }

    /// Document order of two positions.
    pub fn cmp_in(&self, other: &Position, doc: &Document) -> Ordering {
        let mut a = doc.path(self.node);
        a.push(self.offset);
        let mut b = doc.path(other.node);
        b.push(other.offset);
        a.cmp(&b)
    }
}

/// An ordered pair of positions (`start <= end`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(doc: &Document, a: Position, b: Position) -> Self {
        if a.cmp_in(&b, doc) == Ordering::Greater {
            Self { start: b, end: a }
        } else {
            Self { start: a, end: b }
        }
    }

    pub fn collapsed(at: Position) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Deepest node containing both boundaries.
    pub fn common_ancestor(&self, doc: &Document) -> NodeId {
        doc.ancestors_inclusive(self.start.node)
            .find(|&n| doc.contains(n, self.end.node))
            .unwrap_or_else(|| doc.root())
    }
}

/// The user's caret or highlighted span.
///
/// A selection is stamped with the document version it was taken against;
/// once the document mutates, the selection is stale until the command
/// layer hands back a repositioned one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: Position,
    pub focus: Position,
    version: u64,
}

impl Selection {
    pub fn new(doc: &Document, anchor: Position, focus: Position) -> Self {
        Self {
            anchor,
            focus,
            version: doc.version(),
        }
    }

    pub fn caret(doc: &Document, at: Position) -> Self {
        Self::new(doc, at, at)
    }

    /// Selects the given global text offsets (see [`text_offset_of`]).
    pub fn from_text_offsets(doc: &Document, start: usize, end: usize) -> Self {
        if start == end {
            let at = position_at_text_offset(doc, start, Bias::Before);
            return Self::caret(doc, at);
        }
        let (lo, hi) = (start.min(end), start.max(end));
        let anchor = position_at_text_offset(doc, lo, Bias::After);
        let focus = position_at_text_offset(doc, hi, Bias::Before);
        Self::new(doc, anchor, focus)
    }

    /// Selects everything inside `node`.
    pub fn contents_of(doc: &Document, node: NodeId) -> Self {
        Self::new(
            doc,
            Position::new(node, 0),
            Position::new(node, doc.node_len(node)),
        )
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    pub fn range(&self, doc: &Document) -> Range {
        Range::new(doc, self.anchor, self.focus)
    }

    /// Taken against the current document version and still pointing at
    /// attached nodes.
    pub fn is_current(&self, doc: &Document) -> bool {
        self.version == doc.version() && self.anchor.is_valid(doc) && self.focus.is_valid(doc)
    }

    /// Global text offsets of the anchor and focus.
    pub fn text_offsets(&self, doc: &Document) -> (usize, usize) {
        (
            text_offset_of(doc, self.anchor),
            text_offset_of(doc, self.focus),
        )
    }
}

/// Returns the selection when it is usable against `doc`: current version
/// and anchored inside the surface.
pub fn capture_selection(doc: &Document, native: Option<&Selection>) -> Option<Selection> {
    let selection = native?;
    if selection.is_current(doc) {
        log::trace!(
            "captured selection {:?}..{:?}",
            selection.anchor,
            selection.focus
        );
        Some(Selection {
            anchor: selection.anchor.normalized(doc),
            focus: selection.focus.normalized(doc),
            version: selection.version,
        })
    } else {
        log::trace!("discarding stale selection (v{})", selection.version());
        None
    }
}

/// Position just past the last top-level node.
pub fn end_of_document(doc: &Document) -> Position {
    let root = doc.root();
    Position::new(root, doc.children(root).len())
}

/// Where a command should act: the captured selection, or the end of the
/// document when there is none.
pub fn resolve_insertion_point(doc: &Document, captured: Option<&Selection>) -> Range {
    match captured.and_then(|s| capture_selection(doc, Some(s))) {
        Some(selection) => selection.range(doc),
        None => Range::collapsed(end_of_document(doc)),
    }
}

/// Structural context of a selection with respect to tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Ancestry {
    pub in_table: bool,
    pub table: Option<NodeId>,
    pub row: Option<NodeId>,
    pub cell: Option<NodeId>,
}

/// Resolved table coordinates of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableContext {
    pub table: NodeId,
    pub row: NodeId,
    pub cell: NodeId,
    pub row_index: usize,
    pub column_index: usize,
}

impl Ancestry {
    pub fn table_context(&self, doc: &Document) -> Option<TableContext> {
        let (table, row, cell) = (self.table?, self.row?, self.cell?);
        let row_index = crate::editing::table::rows(doc, table)
            .iter()
            .position(|&r| r == row)?;
        let column_index = crate::editing::table::cells(doc, row)
            .iter()
            .position(|&c| c == cell)?;
        Some(TableContext {
            table,
            row,
            cell,
            row_index,
            column_index,
        })
    }
}

/// Walks from the range's common ancestor up to the root recording the
/// nearest enclosing cell, row and table.
pub fn classify_ancestry(doc: &Document, range: &Range) -> Ancestry {
    let mut ancestry = Ancestry::default();
    for node in doc.ancestors_inclusive(range.common_ancestor(doc)) {
        match doc.tag(node) {
            Some("td" | "th") if ancestry.cell.is_none() => ancestry.cell = Some(node),
            Some("tr") if ancestry.row.is_none() => ancestry.row = Some(node),
            Some("table") => {
                ancestry.table = Some(node);
                break;
            }
            _ => {}
        }
    }
    if ancestry.table.is_none() {
        return Ancestry::default();
    }
    ancestry.in_table = true;
    ancestry
}

/// Text nodes in document order.
pub fn text_nodes(doc: &Document) -> Vec<NodeId> {
    doc.descendants(doc.root())
        .into_iter()
        .filter(|&n| doc.is_text(n))
        .collect()
}

/// Number of characters of document text before `pos`.
pub fn text_offset_of(doc: &Document, pos: Position) -> usize {
    let mut offset = 0;
    for t in text_nodes(doc) {
        if t == pos.node {
            return offset + pos.offset;
        }
        if Position::new(t, 0).cmp_in(&pos, doc) == Ordering::Less {
            offset += doc.node_len(t);
        } else {
            break;
        }
    }
    offset
}

/// Which side wins when a text offset falls between two text nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
    /// End of the preceding node.
    Before,
    /// Start of the following node.
    After,
}

pub fn position_at_text_offset(doc: &Document, offset: usize, bias: Bias) -> Position {
    let mut acc = 0;
    let mut last = None;
    for t in text_nodes(doc) {
        let len = doc.node_len(t);
        let hit = match bias {
            Bias::Before => offset <= acc + len,
            Bias::After => offset < acc + len,
        };
        if hit {
            return Position::new(t, offset.saturating_sub(acc));
        }
        acc += len;
        last = Some(Position::new(t, len));
    }
    last.unwrap_or_else(|| end_of_document(doc))
}

/// Document text covered by the range.
pub fn selected_text(doc: &Document, range: &Range) -> String {
    let start = text_offset_of(doc, range.start);
    let end = text_offset_of(doc, range.end);
    text_nodes(doc)
        .into_iter()
        .filter_map(|t| doc.text(t))
        .collect::<String>()
        .chars()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect()
}
