//! Helpers shared by unit tests across the crate.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::editing::document::{Document, NodeId};
use crate::editing::selection::{Selection, text_nodes};

pub fn doc_from(markup: &str) -> Document {
    Document::from_markup(markup)
}

/// First text node whose content is exactly `content`.
pub fn find_text(doc: &Document, content: &str) -> NodeId {
    text_nodes(doc)
        .into_iter()
        .find(|&t| doc.text(t) == Some(content))
        .unwrap_or_else(|| panic!("no text node {content:?} in {}", doc.to_markup()))
}

/// Selects the first occurrence of `needle` in the document text.
pub fn select(doc: &Document, needle: &str) -> Selection {
    let text: String = text_nodes(doc)
        .into_iter()
        .filter_map(|t| doc.text(t))
        .collect();
    let byte = text
        .find(needle)
        .unwrap_or_else(|| panic!("{needle:?} not found in {text:?}"));
    let start = text[..byte].chars().count();
    Selection::from_text_offsets(doc, start, start + needle.chars().count())
}

/// Collapsed selection at a document text offset.
pub fn caret(doc: &Document, offset: usize) -> Selection {
    Selection::from_text_offsets(doc, offset, offset)
}

pub fn create_test_drafts_dir() -> TempDir {
    TempDir::new().unwrap()
}

pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}
