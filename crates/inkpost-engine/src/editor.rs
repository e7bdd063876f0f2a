//! The editing surface as a host sees it.
//!
//! [`Editor`] owns the document, tracks the selection and focus, runs
//! commands through the dispatcher, records undo history and reports every
//! mutation through the `on_change` callback. Raw markup mode swaps the
//! tree for a text buffer until it is left again.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::editing::commands::{self, Cmd};
use crate::editing::document::Document;
use crate::editing::history::{History, HistoryEntry};
use crate::editing::patch::Patch;
use crate::editing::selection::{Position, Selection, capture_selection};
use crate::editing::toolbar::{ToolbarState, inspect};
use crate::error::CommandError;
use crate::models::{MediaReference, TableSize};
use crate::raw::RawMarkupSession;

pub const DEFAULT_HISTORY_DEPTH: usize = 100;

/// Host-supplied settings for an editor instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorOptions {
    /// Shown while the document is empty.
    pub placeholder: Option<String>,
    pub font_families: Vec<String>,
    pub font_sizes: Vec<String>,
    pub history_depth: usize,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            placeholder: None,
            font_families: [
                "Arial",
                "Georgia",
                "Helvetica",
                "Times New Roman",
                "Courier New",
                "Verdana",
            ]
            .map(String::from)
            .to_vec(),
            font_sizes: ["12px", "14px", "16px", "18px", "24px", "32px"]
                .map(String::from)
                .to_vec(),
            history_depth: DEFAULT_HISTORY_DEPTH,
        }
    }
}

/// An insertion waiting for the surface to get focus back after a modal
/// closed.
#[derive(Debug, Clone, PartialEq)]
pub enum Deferred {
    Image(MediaReference),
    Table(TableSize),
}

impl Deferred {
    fn into_cmd(self) -> Cmd {
        match self {
            Deferred::Image(media) => Cmd::InsertImage(media),
            Deferred::Table(size) => Cmd::InsertTable(size),
        }
    }
}

type ChangeListener = Box<dyn FnMut(&str)>;

pub struct Editor {
    doc: Document,
    options: EditorOptions,
    selection: Option<Selection>,
    /// Selection remembered across a blur.
    saved_selection: Option<Selection>,
    focused: bool,
    raw: Option<RawMarkupSession>,
    history: History,
    deferred: VecDeque<Deferred>,
    on_change: Option<ChangeListener>,
}

impl Editor {
    pub fn new(options: EditorOptions) -> Self {
        Self::with_markup("", options)
    }

    pub fn with_markup(markup: &str, options: EditorOptions) -> Self {
        let history = History::new(options.history_depth);
        Self {
            doc: Document::from_markup(markup),
            options,
            selection: None,
            saved_selection: None,
            focused: false,
            raw: None,
            history,
            deferred: VecDeque::new(),
            on_change: None,
        }
    }

    /// Called with the serialized markup after every mutation.
    pub fn set_on_change(&mut self, listener: impl FnMut(&str) + 'static) {
        self.on_change = Some(Box::new(listener));
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Serializes the document. Has no side effects.
    pub fn markup(&self) -> String {
        self.doc.to_markup()
    }

    /// Replaces the whole document. The selection and undo history are
    /// dropped and the change listener is not called.
    pub fn set_markup(&mut self, markup: &str) {
        self.replace_document(markup);
        self.selection = None;
        self.saved_selection = None;
        self.history.clear();
    }

    /// Pushes a new value from the host unless the user is editing raw
    /// markup or the value is what the editor already holds. Returns whether
    /// the document was replaced.
    pub fn sync_value(&mut self, value: &str) -> bool {
        if self.raw.is_some() || value == self.markup() {
            return false;
        }
        log::debug!("host value differs, replacing document");
        self.set_markup(value);
        true
    }

    fn replace_document(&mut self, markup: &str) {
        let mut doc = Document::from_markup(markup);
        doc.continue_version_from(&self.doc);
        self.doc = doc;
    }

    fn emit_change(&mut self) {
        let markup = self.doc.to_markup();
        if let Some(listener) = self.on_change.as_mut() {
            listener(&markup);
        }
    }

    // Selection and focus

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// The selection, when the surface has focus and it is still valid.
    pub fn selection(&self) -> Option<Selection> {
        capture_selection(&self.doc, self.selection.as_ref())
    }

    /// Places the selection. Selecting inside the surface focuses it.
    pub fn select(&mut self, anchor: Position, focus: Position) {
        self.focused = true;
        self.selection = Some(Selection::new(&self.doc, anchor, focus));
    }

    /// Selects by global character offsets into the document text.
    pub fn select_text(&mut self, start: usize, end: usize) {
        self.focused = true;
        self.selection = Some(Selection::from_text_offsets(&self.doc, start, end));
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Regains focus, restoring the selection from before the blur.
    pub fn focus(&mut self) {
        if self.focused {
            return;
        }
        self.focused = true;
        self.selection = self.saved_selection.take();
    }

    /// Loses focus. The selection is remembered for the next `focus`.
    pub fn blur(&mut self) {
        if !self.focused {
            return;
        }
        self.focused = false;
        self.saved_selection = self.selection.take();
    }

    pub fn toolbar_state(&self) -> ToolbarState {
        inspect(&self.doc, self.selection.as_ref(), &self.options)
    }

    /// Placeholder text to show, only while nothing is in the document.
    pub fn placeholder(&self) -> Option<&str> {
        let root = self.doc.root();
        if self.doc.is_visually_empty(root) {
            self.options.placeholder.as_deref()
        } else {
            None
        }
    }

    // Commands

    fn snapshot(&self) -> HistoryEntry {
        HistoryEntry {
            markup: self.doc.to_markup(),
            selection: self.selection().map(|s| s.text_offsets(&self.doc)),
        }
    }

    /// Runs a command at the current selection.
    pub fn exec(&mut self, cmd: Cmd) -> Result<Patch, CommandError> {
        if self.raw.is_some() {
            return Err(CommandError::RawMarkupActive);
        }
        let before = self.snapshot();
        let patch = commands::apply(&mut self.doc, self.selection.as_ref(), &cmd)?;
        if patch.changed {
            self.history.record(before);
            self.selection = patch.new_selection;
            self.emit_change();
        } else if patch.new_selection.is_some() {
            self.selection = patch.new_selection;
        }
        Ok(patch)
    }

    /// Queues an image or table insertion for after the modal has closed.
    pub fn defer(&mut self, insertion: Deferred) {
        self.deferred.push_back(insertion);
    }

    pub fn pending_insertions(&self) -> usize {
        self.deferred.len()
    }

    /// Focuses the surface, then performs queued insertions in order.
    pub fn run_deferred(&mut self) -> Vec<Result<Patch, CommandError>> {
        if self.deferred.is_empty() {
            return Vec::new();
        }
        self.focus();
        let mut results = Vec::with_capacity(self.deferred.len());
        while let Some(insertion) = self.deferred.pop_front() {
            results.push(self.exec(insertion.into_cmd()));
        }
        results
    }

    pub fn can_undo(&self) -> bool {
        self.raw.is_none() && self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.raw.is_none() && self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        if self.raw.is_some() {
            return false;
        }
        let current = self.snapshot();
        match self.history.undo(current) {
            Some(entry) => {
                self.restore(entry);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        if self.raw.is_some() {
            return false;
        }
        let current = self.snapshot();
        match self.history.redo(current) {
            Some(entry) => {
                self.restore(entry);
                true
            }
            None => false,
        }
    }

    fn restore(&mut self, entry: HistoryEntry) {
        self.replace_document(&entry.markup);
        self.selection = entry
            .selection
            .map(|(start, end)| Selection::from_text_offsets(&self.doc, start, end));
        self.emit_change();
    }

    // Raw markup mode

    pub fn is_raw_mode(&self) -> bool {
        self.raw.is_some()
    }

    pub fn raw_session(&self) -> Option<&RawMarkupSession> {
        self.raw.as_ref()
    }

    pub fn raw_session_mut(&mut self) -> Option<&mut RawMarkupSession> {
        self.raw.as_mut()
    }

    /// Enters or leaves raw markup mode and returns whether it is now on.
    ///
    /// Leaving parses the buffer as-is, replaces the document and fires the
    /// change listener even when the text was not edited.
    pub fn toggle_raw_mode(&mut self) -> bool {
        match self.raw.take() {
            None => {
                self.raw = Some(RawMarkupSession::new(&self.doc.to_markup()));
                self.blur();
                self.saved_selection = None;
                true
            }
            Some(session) => {
                let before = self.snapshot();
                let text = session.text();
                if text != before.markup {
                    self.history.record(before);
                }
                self.replace_document(&text);
                self.selection = None;
                self.emit_change();
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InlineFormat;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn editor(markup: &str) -> Editor {
        Editor::with_markup(markup, EditorOptions::default())
    }

    fn record_changes(editor: &mut Editor) -> Rc<RefCell<Vec<String>>> {
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&changes);
        editor.set_on_change(move |markup| sink.borrow_mut().push(markup.to_string()));
        changes
    }

    #[test]
    fn test_exec_fires_on_change_and_records_history() {
        let mut editor = editor("<p>hello</p>");
        let changes = record_changes(&mut editor);
        editor.select_text(0, 5);
        editor.exec(Cmd::ToggleFormat(InlineFormat::Bold)).unwrap();
        assert_eq!(*changes.borrow(), vec!["<p><b>hello</b></p>".to_string()]);
        assert!(editor.can_undo());
        assert!(editor.toolbar_state().bold);
    }

    #[test]
    fn test_unchanged_command_does_not_fire() {
        let mut editor = editor("<p>hello</p>");
        let changes = record_changes(&mut editor);
        editor.select_text(0, 5);
        editor.exec(Cmd::SetList(crate::models::ListKind::None)).unwrap();
        assert!(changes.borrow().is_empty());
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_undo_and_redo() {
        let mut editor = editor("<p>hello</p>");
        editor.select_text(0, 5);
        editor.exec(Cmd::ToggleFormat(InlineFormat::Italic)).unwrap();
        assert!(editor.undo());
        assert_eq!(editor.markup(), "<p>hello</p>");
        assert_eq!(editor.selection().unwrap().text_offsets(editor.document()), (0, 5));
        assert!(editor.redo());
        assert_eq!(editor.markup(), "<p><i>hello</i></p>");
        assert!(!editor.redo());
    }

    #[test]
    fn test_raw_mode_blocks_commands() {
        let mut editor = editor("<p>Hello</p>");
        assert!(editor.toggle_raw_mode());
        assert_eq!(
            editor.exec(Cmd::Indent),
            Err(CommandError::RawMarkupActive)
        );
        assert!(!editor.sync_value("<p>other</p>"));
        assert!(!editor.toggle_raw_mode());
        assert_eq!(editor.markup(), "<p>Hello</p>");
    }

    #[test]
    fn test_sync_value_skips_identical_markup() {
        let mut editor = editor("<p>a</p>");
        assert!(!editor.sync_value("<p>a</p>"));
        assert!(editor.sync_value("<p>b</p>"));
        assert_eq!(editor.markup(), "<p>b</p>");
    }

    #[test]
    fn test_host_value_starts_fresh_history() {
        let mut editor = editor("<p>a</p>");
        editor.select_text(0, 1);
        editor.exec(Cmd::ToggleFormat(InlineFormat::Bold)).unwrap();
        assert!(editor.can_undo());

        assert!(editor.sync_value("<p>b</p>"));
        assert!(!editor.can_undo());
        assert!(!editor.can_redo());
        assert!(!editor.undo());
        assert_eq!(editor.markup(), "<p>b</p>");
    }

    #[test]
    fn test_deferred_insert_restores_selection_first() {
        let mut editor = editor("<p>one</p><p>two</p>");
        editor.select_text(3, 3);
        editor.blur();
        assert_eq!(editor.selection(), None);
        editor.defer(Deferred::Image(MediaReference::new("https://x.test/i.png", None)));
        assert_eq!(editor.pending_insertions(), 1);
        let results = editor.run_deferred();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_ok());
        assert!(editor.is_focused());
        assert_eq!(editor.pending_insertions(), 0);
        assert!(editor.markup().starts_with("<p>one<img "));
    }

    #[test]
    fn test_placeholder_only_when_empty() {
        let options = EditorOptions {
            placeholder: Some("Write something".to_string()),
            ..EditorOptions::default()
        };
        let mut editor = Editor::with_markup("<p><br></p>", options);
        assert_eq!(editor.placeholder(), Some("Write something"));
        editor.set_markup("<p>x</p>");
        assert_eq!(editor.placeholder(), None);
        editor.set_markup("<p><img src=\"a.png\"></p>");
        assert_eq!(editor.placeholder(), None);
    }
}
