//! Editing core: an arena document of parsed markup, selections over it and
//! the commands that rewrite it.
//!
//! Every command goes through [`commands::apply`], which resolves the
//! selection to an insertion point, runs the operation and reports a
//! [`Patch`]. Toolbar state is never stored; [`toolbar::inspect`] derives it
//! from the document and selection whenever it is asked for.

pub(crate) mod boundary;
pub mod blocks;
pub mod commands;
pub mod document;
pub mod formatting;
pub mod history;
pub mod insert;
pub mod patch;
pub mod selection;
pub mod table;
pub mod toolbar;

pub use commands::{Cmd, apply};
pub use document::{Document, Element, NodeData, NodeId, ZWSP};
pub use history::{History, HistoryEntry};
pub use insert::InsertionStrategy;
pub use patch::Patch;
pub use selection::{
    Ancestry, Position, Range, Selection, TableContext, capture_selection, classify_ancestry,
    resolve_insertion_point,
};
pub use toolbar::{ToolbarState, inspect};
