use std::sync::OnceLock;

use regex::Regex;

use crate::error::ValidationError;
use crate::modals::{Modal, ModalState};
use crate::models::{StyleScope, TableStyle};

fn color_regex() -> &'static Regex {
    static COLOR: OnceLock<Regex> = OnceLock::new();
    COLOR.get_or_init(|| {
        Regex::new(
            r"(?i)^(#([0-9a-f]{3}|[0-9a-f]{4}|[0-9a-f]{6}|[0-9a-f]{8})|(rgb|rgba|hsl|hsla)\([0-9.,%\s/]+\)|[a-z]+)$",
        )
        .expect("Invalid color regex")
    })
}

fn length_regex() -> &'static Regex {
    static LENGTH: OnceLock<Regex> = OnceLock::new();
    LENGTH.get_or_init(|| Regex::new(r"(?i)^(\d+)\s*(px)?$").expect("Invalid length regex"))
}

fn parse_color(input: &str) -> Result<String, ValidationError> {
    let value = input.trim();
    if color_regex().is_match(value) {
        Ok(value.to_string())
    } else {
        Err(ValidationError::InvalidColor(value.to_string()))
    }
}

fn parse_optional_color(input: &str) -> Result<Option<String>, ValidationError> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    parse_color(input).map(Some)
}

/// Whole pixels, with or without a `px` suffix.
fn parse_pixels(input: &str) -> Result<u32, ValidationError> {
    let value = input.trim();
    length_regex()
        .captures(value)
        .and_then(|caps| caps[1].parse().ok())
        .ok_or_else(|| ValidationError::InvalidLength(value.to_string()))
}

/// Border, radius and background fields for a table, row or cell.
#[derive(Debug, Clone)]
pub struct TableStyleModal {
    state: ModalState,
    pub border_color: String,
    pub border_width: String,
    pub border_radius: String,
    pub background: String,
    pub header_background: String,
    pub scope: StyleScope,
}

impl Default for TableStyleModal {
    fn default() -> Self {
        let mut modal = Self {
            state: ModalState::default(),
            border_color: String::new(),
            border_width: String::new(),
            border_radius: String::new(),
            background: String::new(),
            header_background: String::new(),
            scope: StyleScope::Table,
        };
        modal.seed(&TableStyle::default());
        modal
    }
}

impl TableStyleModal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens seeded from the styles currently on the table. An already open
    /// dialog keeps whatever the user has typed.
    pub fn open_with(&mut self, current: &TableStyle) {
        if self.state.open() {
            self.seed(current);
        }
    }

    fn seed(&mut self, style: &TableStyle) {
        self.border_color = style.border_color.clone();
        self.border_width = style.border_width.to_string();
        self.border_radius = style.border_radius.to_string();
        self.background = style.background_color.clone().unwrap_or_default();
        self.header_background = style.header_background.clone().unwrap_or_default();
        self.scope = style.scope;
    }

    fn validate(&self) -> Result<TableStyle, ValidationError> {
        Ok(TableStyle {
            border_color: parse_color(&self.border_color)?,
            border_width: parse_pixels(&self.border_width)?,
            border_radius: parse_pixels(&self.border_radius)?,
            background_color: parse_optional_color(&self.background)?,
            header_background: parse_optional_color(&self.header_background)?,
            scope: self.scope,
        })
    }
}

impl Modal for TableStyleModal {
    type Output = TableStyle;

    fn is_open(&self) -> bool {
        self.state.is_open()
    }

    fn open(&mut self) {
        self.open_with(&TableStyle::default());
    }

    fn close(&mut self) {
        self.state.close();
    }

    fn error(&self) -> Option<&ValidationError> {
        self.state.error()
    }

    fn submit(&mut self) -> Option<TableStyle> {
        let result = self.validate();
        self.state.finish(result)
    }
}
