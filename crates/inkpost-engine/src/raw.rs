//! Raw markup mode: the serialized document as a plain text buffer.
//!
//! Nothing here is validated. Whatever text is in the buffer when the mode
//! is left is parsed and becomes the document.

use std::ops::Range;

use xi_rope::Rope;
use xi_rope::delta::Builder;

#[derive(Debug, Clone)]
pub struct RawMarkupSession {
    buffer: Rope,
}

impl RawMarkupSession {
    pub fn new(markup: &str) -> Self {
        Self {
            buffer: Rope::from(markup),
        }
    }

    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.len() == 0
    }

    pub fn set_text(&mut self, text: &str) {
        self.buffer = Rope::from(text);
    }

    /// Replaces a byte range. Ranges that are out of bounds or split a
    /// character are ignored and `false` is returned.
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> bool {
        if !self.is_valid_range(&range) {
            log::warn!("ignoring raw edit at invalid range {range:?}");
            return false;
        }
        let mut builder = Builder::new(self.buffer.len());
        builder.replace(range, Rope::from(text));
        self.buffer = builder.build().apply(&self.buffer);
        true
    }

    pub fn insert(&mut self, at: usize, text: &str) -> bool {
        self.replace(at..at, text)
    }

    pub fn delete(&mut self, range: Range<usize>) -> bool {
        self.replace(range, "")
    }

    fn is_valid_range(&self, range: &Range<usize>) -> bool {
        let text = self.buffer.to_string();
        range.start <= range.end
            && range.end <= text.len()
            && text.is_char_boundary(range.start)
            && text.is_char_boundary(range.end)
    }
}
