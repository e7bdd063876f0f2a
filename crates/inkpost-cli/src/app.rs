use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use inkpost_engine::editing::selection::selected_text;
use inkpost_engine::editing::table::current_table_style;
use inkpost_engine::modals::{
    ColumnWidthModal, LinkModal, MediaPickerModal, QUICK_PICKS, TableInsertModal,
    TableStyleModal,
};
use inkpost_engine::{
    Alignment, BlockFormat, BulletStyle, Cmd, ColumnSide, CommandError, Deferred, Editor,
    EditorOptions, InlineFormat, ListKind, MediaReference, Modal, NumberStyle, StyleScope, io,
};
use ratatui::widgets::ListState;
use relative_path::RelativePathBuf;

const TEXT_COLORS: [&str; 4] = ["#000000", "#cc0000", "#0066cc", "#008000"];
const HIGHLIGHT: &str = "#ffff00";
const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Drafts,
    Editor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveModal {
    Link,
    Video,
    Table,
    ColumnWidth,
    TableStyle,
    Media,
}

impl ActiveModal {
    pub fn title(self) -> &'static str {
        match self {
            ActiveModal::Link => "Insert link",
            ActiveModal::Video => "Embed video",
            ActiveModal::Table => "Insert table",
            ActiveModal::ColumnWidth => "Column width",
            ActiveModal::TableStyle => "Table style",
            ActiveModal::Media => "Insert image",
        }
    }
}

pub struct App {
    pub drafts_path: PathBuf,
    pub drafts: Vec<RelativePathBuf>,
    pub draft_list_state: ListState,
    pub current: Option<RelativePathBuf>,
    pub editor: Editor,
    options: EditorOptions,
    pub focus: Focus,
    /// Caret as a text offset; `anchor` is the other end of a selection.
    pub caret: usize,
    pub anchor: Option<usize>,
    /// Byte offset into the raw markup buffer.
    pub raw_cursor: usize,
    pub active_modal: Option<ActiveModal>,
    pub field: usize,
    link_modal: LinkModal,
    table_modal: TableInsertModal,
    width_modal: ColumnWidthModal,
    style_modal: TableStyleModal,
    media_modal: MediaPickerModal,
    video_url: String,
    color_index: usize,
    media_library: Vec<MediaReference>,
    pub message: Option<String>,
    dirty: Rc<Cell<bool>>,
    pub should_quit: bool,
}

impl App {
    pub fn new(drafts_path: PathBuf, options: EditorOptions) -> Result<Self> {
        let drafts = io::scan_drafts(&drafts_path)?
            .into_iter()
            .filter_map(|p| {
                let relative = p.strip_prefix(&drafts_path).ok()?;
                RelativePathBuf::from_path(relative).ok()
            })
            .collect::<Vec<_>>();
        let media_library = scan_images(&drafts_path);
        let dirty = Rc::new(Cell::new(false));

        let mut app = Self {
            editor: new_editor("", &options, &dirty),
            drafts_path,
            drafts,
            draft_list_state: ListState::default(),
            current: None,
            options,
            focus: Focus::Drafts,
            caret: 0,
            anchor: None,
            raw_cursor: 0,
            active_modal: None,
            field: 0,
            link_modal: LinkModal::new(),
            table_modal: TableInsertModal::new(),
            width_modal: ColumnWidthModal::new(),
            style_modal: TableStyleModal::new(),
            media_modal: MediaPickerModal::new(),
            video_url: String::new(),
            color_index: 0,
            media_library,
            message: None,
            dirty,
            should_quit: false,
        };

        if !app.drafts.is_empty() {
            app.draft_list_state.select(Some(0));
        }
        Ok(app)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    // Drafts panel

    pub fn next_draft(&mut self) {
        if self.drafts.is_empty() {
            return;
        }
        let i = match self.draft_list_state.selected() {
            Some(i) => (i + 1) % self.drafts.len(),
            None => 0,
        };
        self.draft_list_state.select(Some(i));
    }

    pub fn previous_draft(&mut self) {
        if self.drafts.is_empty() {
            return;
        }
        let i = match self.draft_list_state.selected() {
            Some(0) | None => self.drafts.len() - 1,
            Some(i) => i - 1,
        };
        self.draft_list_state.select(Some(i));
    }

    pub fn open_selected_draft(&mut self) {
        let Some(path) = self
            .draft_list_state
            .selected()
            .and_then(|i| self.drafts.get(i))
            .cloned()
        else {
            return;
        };
        match io::read_draft(&path, &self.drafts_path) {
            Ok(markup) => {
                log::info!("opened draft {path}");
                self.editor = new_editor(&markup, &self.options, &self.dirty);
                self.dirty.set(false);
                self.current = Some(path);
                self.focus = Focus::Editor;
                self.caret = 0;
                self.anchor = None;
                self.editor.select_text(0, 0);
                self.message = None;
            }
            Err(e) => self.message = Some(format!("Error reading draft: {e}")),
        }
    }

    pub fn save(&mut self) {
        let Some(path) = self.current.clone() else {
            self.message = Some("No draft open".to_string());
            return;
        };
        match io::write_draft(&path, &self.drafts_path, &self.editor.markup()) {
            Ok(()) => {
                self.dirty.set(false);
                self.message = Some(format!("Saved {path}"));
            }
            Err(e) => {
                log::error!("failed to save {path}: {e}");
                self.message = Some(format!("Error saving draft: {e}"));
            }
        }
    }

    // Selection

    pub fn text_len(&self) -> usize {
        let doc = self.editor.document();
        doc.text_content(doc.root()).chars().count()
    }

    pub fn selection_text(&self) -> String {
        match self.editor.selection() {
            Some(selection) => {
                let doc = self.editor.document();
                selected_text(doc, &selection.range(doc))
            }
            None => String::new(),
        }
    }

    fn move_caret(&mut self, to: usize, extend: bool) {
        let to = to.min(self.text_len());
        if extend {
            self.anchor.get_or_insert(self.caret);
        } else {
            self.anchor = None;
        }
        self.caret = to;
        let anchor = self.anchor.unwrap_or(to);
        self.editor.select_text(anchor, to);
    }

    fn sync_caret(&mut self) {
        if let Some(selection) = self.editor.selection() {
            let (anchor, focus) = selection.text_offsets(self.editor.document());
            self.caret = focus;
            self.anchor = (anchor != focus).then_some(anchor);
        }
    }

    // Commands

    pub fn run(&mut self, cmd: Cmd) {
        let name = cmd.name();
        match self.editor.exec(cmd) {
            Ok(patch) if !patch.changed => {
                self.message = Some(format!("{name}: nothing to change"));
            }
            Ok(_) => self.message = None,
            Err(e) => self.message = Some(e.to_string()),
        }
        self.sync_caret();
    }

    fn cycle_font(&mut self, sizes: bool) {
        let state = self.editor.toolbar_state();
        let (options, current) = if sizes {
            (&self.options.font_sizes, state.font_size)
        } else {
            (&self.options.font_families, state.font_family)
        };
        let Some(next) = cycle(options, current.as_deref()) else {
            return;
        };
        let cmd = if sizes {
            Cmd::FontSize(next)
        } else {
            Cmd::FontFamily(next)
        };
        self.run(cmd);
    }

    fn cycle_list_style(&mut self) {
        let state = self.editor.toolbar_state();
        let cmd = match state.list {
            ListKind::Bullet => Cmd::BulletStyle(match state.bullet_style.unwrap_or_default() {
                BulletStyle::Disc => BulletStyle::Circle,
                BulletStyle::Circle => BulletStyle::Square,
                BulletStyle::Square => BulletStyle::Disc,
            }),
            ListKind::Number => Cmd::NumberStyle(match state.number_style.unwrap_or_default() {
                NumberStyle::Decimal => NumberStyle::LowerAlpha,
                NumberStyle::LowerAlpha => NumberStyle::UpperAlpha,
                NumberStyle::UpperAlpha => NumberStyle::LowerRoman,
                NumberStyle::LowerRoman => NumberStyle::UpperRoman,
                NumberStyle::UpperRoman => NumberStyle::Decimal,
            }),
            ListKind::None => {
                self.message = Some("Place the cursor in a list first".to_string());
                return;
            }
        };
        self.run(cmd);
    }

    fn toggle_list(&mut self, kind: ListKind) {
        let target = if self.editor.toolbar_state().list == kind {
            ListKind::None
        } else {
            kind
        };
        self.run(Cmd::SetList(target));
    }

    fn toggle_raw_mode(&mut self) {
        let on = self.editor.toggle_raw_mode();
        if on {
            self.raw_cursor = 0;
            self.message = Some("Editing raw HTML, Esc to return".to_string());
        } else {
            self.message = None;
            self.caret = 0;
            self.anchor = None;
            self.editor.select_text(0, 0);
        }
    }

    // Modals

    pub fn open_modal(&mut self, kind: ActiveModal) {
        let table = self.editor.toolbar_state().table;
        let needs_table = matches!(kind, ActiveModal::ColumnWidth | ActiveModal::TableStyle);
        if needs_table && table.is_none() {
            self.message = Some(CommandError::NotInTable.to_string());
            return;
        }
        match kind {
            ActiveModal::Link => self.link_modal.open(),
            ActiveModal::Video => self.video_url.clear(),
            ActiveModal::Table => self.table_modal.open(),
            ActiveModal::ColumnWidth => self.width_modal.open(),
            ActiveModal::TableStyle => {
                if let Some(ctx) = table {
                    let current =
                        current_table_style(self.editor.document(), &ctx, StyleScope::Table);
                    self.style_modal.open_with(&current);
                }
            }
            ActiveModal::Media => {
                self.media_modal.open();
                self.media_modal.search(&self.media_library);
            }
        }
        self.editor.blur();
        self.active_modal = Some(kind);
        self.field = 0;
    }

    pub fn close_modal(&mut self) {
        match self.active_modal.take() {
            Some(ActiveModal::Link) => self.link_modal.close(),
            Some(ActiveModal::Table) => self.table_modal.close(),
            Some(ActiveModal::ColumnWidth) => self.width_modal.close(),
            Some(ActiveModal::TableStyle) => self.style_modal.close(),
            Some(ActiveModal::Media) => self.media_modal.close(),
            Some(ActiveModal::Video) | None => {}
        }
        self.editor.focus();
    }

    pub fn submit_modal(&mut self) {
        let Some(kind) = self.active_modal else {
            return;
        };
        match kind {
            ActiveModal::Link => {
                if let Some(target) = self.link_modal.submit() {
                    self.finish_modal(Some(Cmd::InsertLink {
                        url: target.url,
                        text: target.text,
                    }));
                }
            }
            ActiveModal::Video => {
                let url = self.video_url.trim().to_string();
                self.finish_modal((!url.is_empty()).then_some(Cmd::InsertVideo { url }));
            }
            ActiveModal::Table => {
                if let Some(size) = self.table_modal.submit() {
                    self.editor.defer(Deferred::Table(size));
                    self.finish_modal(None);
                }
            }
            ActiveModal::ColumnWidth => {
                if let Some(width) = self.width_modal.submit() {
                    self.finish_modal(Some(Cmd::SetColumnWidth(width)));
                }
            }
            ActiveModal::TableStyle => {
                if let Some(style) = self.style_modal.submit() {
                    self.finish_modal(Some(Cmd::ApplyTableStyle(style)));
                }
            }
            ActiveModal::Media => {
                if let Some(media) = self.media_modal.submit() {
                    self.editor.defer(Deferred::Image(media));
                    self.finish_modal(None);
                }
            }
        }
    }

    /// The dialog has closed: focus returns to the editor, then queued
    /// insertions and the command run.
    fn finish_modal(&mut self, cmd: Option<Cmd>) {
        self.active_modal = None;
        self.editor.focus();
        for result in self.editor.run_deferred() {
            if let Err(e) = result {
                self.message = Some(e.to_string());
            }
        }
        self.sync_caret();
        if let Some(cmd) = cmd {
            self.run(cmd);
        }
    }

    pub fn modal_error(&self) -> Option<String> {
        let error = match self.active_modal? {
            ActiveModal::Link => self.link_modal.error(),
            ActiveModal::Table => self.table_modal.error(),
            ActiveModal::ColumnWidth => self.width_modal.error(),
            ActiveModal::TableStyle => self.style_modal.error(),
            ActiveModal::Media => self.media_modal.error(),
            ActiveModal::Video => None,
        };
        error.map(ToString::to_string)
    }

    /// Labels and values of the open dialog's fields, for display.
    pub fn modal_fields(&self) -> Vec<(&'static str, String)> {
        match self.active_modal {
            Some(ActiveModal::Link) => vec![
                ("URL", self.link_modal.url.clone()),
                ("Text", self.link_modal.text.clone()),
            ],
            Some(ActiveModal::Video) => vec![("URL", self.video_url.clone())],
            Some(ActiveModal::Table) => vec![
                ("Rows", self.table_modal.rows.clone()),
                ("Columns", self.table_modal.cols.clone()),
            ],
            Some(ActiveModal::ColumnWidth) => vec![("Width", self.width_modal.width.clone())],
            Some(ActiveModal::TableStyle) => vec![
                ("Border color", self.style_modal.border_color.clone()),
                ("Border width", self.style_modal.border_width.clone()),
                ("Corner radius", self.style_modal.border_radius.clone()),
                ("Background", self.style_modal.background.clone()),
                ("Header background", self.style_modal.header_background.clone()),
                ("Apply to", format!("{:?}", self.style_modal.scope)),
            ],
            Some(ActiveModal::Media) => {
                let mut fields = vec![("Search", self.media_modal.query.clone())];
                let selected = self.media_modal.selected().map(|m| m.url.clone());
                for media in self.media_modal.results() {
                    let marker = if Some(&media.url) == selected.as_ref() {
                        ">"
                    } else {
                        " "
                    };
                    fields.push(("", format!("{marker} {}", media.url)));
                }
                fields
            }
            None => Vec::new(),
        }
    }

    fn field_mut(&mut self) -> Option<&mut String> {
        let field = self.field;
        match self.active_modal? {
            ActiveModal::Link => match field {
                0 => Some(&mut self.link_modal.url),
                _ => Some(&mut self.link_modal.text),
            },
            ActiveModal::Video => Some(&mut self.video_url),
            ActiveModal::Table => match field {
                0 => Some(&mut self.table_modal.rows),
                _ => Some(&mut self.table_modal.cols),
            },
            ActiveModal::ColumnWidth => Some(&mut self.width_modal.width),
            ActiveModal::TableStyle => match field {
                0 => Some(&mut self.style_modal.border_color),
                1 => Some(&mut self.style_modal.border_width),
                2 => Some(&mut self.style_modal.border_radius),
                3 => Some(&mut self.style_modal.background),
                4 => Some(&mut self.style_modal.header_background),
                _ => None,
            },
            ActiveModal::Media => Some(&mut self.media_modal.query),
        }
    }

    fn field_count(&self) -> usize {
        match self.active_modal {
            Some(ActiveModal::Link) | Some(ActiveModal::Table) => 2,
            Some(ActiveModal::TableStyle) => 6,
            Some(_) => 1,
            None => 0,
        }
    }

    fn handle_modal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.close_modal(),
            KeyCode::Enter => self.submit_modal(),
            KeyCode::Tab => self.field = (self.field + 1) % self.field_count().max(1),
            KeyCode::Backspace => {
                if let Some(field) = self.field_mut() {
                    field.pop();
                }
                self.refresh_media_search();
            }
            KeyCode::Up | KeyCode::Down => self.cycle_modal_choice(key.code == KeyCode::Down),
            KeyCode::Char(c) => {
                if let Some(field) = self.field_mut() {
                    field.push(c);
                }
                self.refresh_media_search();
            }
            _ => {}
        }
    }

    fn refresh_media_search(&mut self) {
        if self.active_modal == Some(ActiveModal::Media) {
            self.media_modal.search(&self.media_library);
        }
    }

    /// Up/Down pick a quick width, an apply-to scope or a search result.
    fn cycle_modal_choice(&mut self, forward: bool) {
        match self.active_modal {
            Some(ActiveModal::ColumnWidth) => {
                let current = QUICK_PICKS
                    .iter()
                    .position(|p| *p == self.width_modal.width);
                let next = step(current, QUICK_PICKS.len(), forward);
                self.width_modal.pick(QUICK_PICKS[next]);
            }
            Some(ActiveModal::TableStyle) => {
                let scopes = [StyleScope::Table, StyleScope::Row, StyleScope::Cell];
                let current = scopes.iter().position(|s| *s == self.style_modal.scope);
                self.style_modal.scope = scopes[step(current, scopes.len(), forward)];
            }
            Some(ActiveModal::Media) => {
                let count = self.media_modal.results().len();
                if count > 0 {
                    let current = self.media_modal.selected().and_then(|m| {
                        self.media_modal.results().iter().position(|r| r == m)
                    });
                    self.media_modal.choose(step(current, count, forward));
                }
            }
            _ => {}
        }
    }

    // Keys

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.active_modal.is_some() {
            self.handle_modal_key(key);
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
            self.save();
            return;
        }
        match self.focus {
            Focus::Drafts => self.handle_drafts_key(key),
            Focus::Editor if self.editor.is_raw_mode() => self.handle_raw_key(key),
            Focus::Editor => self.handle_editor_key(key),
        }
    }

    fn handle_drafts_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Down | KeyCode::Char('j') => self.next_draft(),
            KeyCode::Up | KeyCode::Char('k') => self.previous_draft(),
            KeyCode::Enter => self.open_selected_draft(),
            KeyCode::Tab if self.current.is_some() => self.focus = Focus::Editor,
            _ => {}
        }
    }

    fn handle_raw_key(&mut self, key: KeyEvent) {
        let Some(session) = self.editor.raw_session_mut() else {
            return;
        };
        let text = session.text();
        let cursor = self.raw_cursor.min(text.len());
        match key.code {
            KeyCode::Esc => self.toggle_raw_mode(),
            KeyCode::Left => {
                if let Some(c) = text[..cursor].chars().next_back() {
                    self.raw_cursor = cursor - c.len_utf8();
                }
            }
            KeyCode::Right => {
                if let Some(c) = text[cursor..].chars().next() {
                    self.raw_cursor = cursor + c.len_utf8();
                }
            }
            KeyCode::Home => self.raw_cursor = 0,
            KeyCode::End => self.raw_cursor = text.len(),
            KeyCode::Backspace => {
                if let Some(c) = text[..cursor].chars().next_back() {
                    let start = cursor - c.len_utf8();
                    if session.delete(start..cursor) {
                        self.raw_cursor = start;
                    }
                }
            }
            KeyCode::Enter => {
                if session.insert(cursor, "\n") {
                    self.raw_cursor = cursor + 1;
                }
            }
            KeyCode::Char(c) => {
                if session.insert(cursor, c.encode_utf8(&mut [0; 4])) {
                    self.raw_cursor = cursor + c.len_utf8();
                }
            }
            _ => {}
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        let extend = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Esc => self.focus = Focus::Drafts,
            KeyCode::Left => self.move_caret(self.caret.saturating_sub(1), extend),
            KeyCode::Right => self.move_caret(self.caret + 1, extend),
            KeyCode::Home => self.move_caret(0, extend),
            KeyCode::End => self.move_caret(self.text_len(), extend),
            KeyCode::Tab => self.run(Cmd::Indent),
            KeyCode::BackTab => self.run(Cmd::Outdent),
            KeyCode::Char(c) => self.handle_editor_char(c),
            _ => {}
        }
    }

    fn handle_editor_char(&mut self, c: char) {
        let cmd = match c {
            'b' => Cmd::ToggleFormat(InlineFormat::Bold),
            'i' => Cmd::ToggleFormat(InlineFormat::Italic),
            'u' => Cmd::ToggleFormat(InlineFormat::Underline),
            's' => Cmd::ToggleFormat(InlineFormat::Strikethrough),
            '^' => Cmd::ToggleFormat(InlineFormat::Superscript),
            '_' => Cmd::ToggleFormat(InlineFormat::Subscript),
            'l' => Cmd::Align(Alignment::Left),
            'c' => Cmd::Align(Alignment::Center),
            'r' => Cmd::Align(Alignment::Right),
            'J' => Cmd::Align(Alignment::Justify),
            'p' => Cmd::FormatBlock(BlockFormat::Paragraph),
            '1'..='6' => Cmd::FormatBlock(BlockFormat::Heading(c as u8 - b'0')),
            '`' => Cmd::FormatBlock(BlockFormat::Preformatted),
            '>' => Cmd::ToggleBlockquote,
            '[' => Cmd::InsertColumn(ColumnSide::Before),
            ']' => Cmd::InsertColumn(ColumnSide::After),
            'x' => Cmd::DeleteColumn,
            'H' => Cmd::BackColor(HIGHLIGHT.to_string()),
            'C' => {
                self.color_index = (self.color_index + 1) % TEXT_COLORS.len();
                Cmd::ForeColor(TEXT_COLORS[self.color_index].to_string())
            }
            'L' => return self.toggle_list(ListKind::Bullet),
            'N' => return self.toggle_list(ListKind::Number),
            'O' => return self.cycle_list_style(),
            'f' => return self.cycle_font(false),
            'F' => return self.cycle_font(true),
            'k' => return self.open_modal(ActiveModal::Link),
            'v' => return self.open_modal(ActiveModal::Video),
            't' => return self.open_modal(ActiveModal::Table),
            'm' => return self.open_modal(ActiveModal::Media),
            'w' => return self.open_modal(ActiveModal::ColumnWidth),
            'T' => return self.open_modal(ActiveModal::TableStyle),
            'e' => return self.toggle_raw_mode(),
            'z' => {
                if !self.editor.undo() {
                    self.message = Some("Nothing to undo".to_string());
                }
                return self.sync_caret();
            }
            'y' => {
                if !self.editor.redo() {
                    self.message = Some("Nothing to redo".to_string());
                }
                return self.sync_caret();
            }
            _ => return,
        };
        self.run(cmd);
    }
}

fn new_editor(markup: &str, options: &EditorOptions, dirty: &Rc<Cell<bool>>) -> Editor {
    let mut editor = Editor::with_markup(markup, options.clone());
    let dirty = Rc::clone(dirty);
    editor.set_on_change(move |_| dirty.set(true));
    editor
}

/// The option after `current`, or the first one.
fn cycle(options: &[String], current: Option<&str>) -> Option<String> {
    let position = current.and_then(|c| options.iter().position(|o| o == c));
    options.get(step(position, options.len(), true)).cloned()
}

fn step(current: Option<usize>, len: usize, forward: bool) -> usize {
    match (current, forward) {
        (None, _) => 0,
        (Some(i), true) => (i + 1) % len,
        (Some(0), false) => len - 1,
        (Some(i), false) => i - 1,
    }
}

/// Images under `<drafts>/images`, offered by the media picker.
fn scan_images(drafts_path: &Path) -> Vec<MediaReference> {
    let Ok(entries) = fs::read_dir(drafts_path.join("images")) else {
        return Vec::new();
    };
    let mut images: Vec<MediaReference> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        })
        .filter_map(|path| {
            let name = path.file_name()?.to_str()?.to_string();
            let alt = path.file_stem()?.to_str()?.replace(['-', '_'], " ");
            Some(MediaReference::new(format!("images/{name}"), Some(alt)))
        })
        .collect();
    images.sort_by(|a, b| a.url.cmp(&b.url));
    images
}
