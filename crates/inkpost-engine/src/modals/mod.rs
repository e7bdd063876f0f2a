//! Dialog state for commands that need input before they run.
//!
//! A modal only holds field text and an inline error; it never touches the
//! document. A successful [`Modal::submit`] closes the dialog and hands back
//! a validated payload for the caller to turn into a command.

pub mod column_width;
pub mod link;
pub mod media_picker;
pub mod table_insert;
pub mod table_style;

pub use column_width::{ColumnWidthModal, QUICK_PICKS};
pub use link::{LinkModal, LinkTarget, normalize_url};
pub use media_picker::{MediaLibrary, MediaPickerModal};
pub use table_insert::TableInsertModal;
pub use table_style::TableStyleModal;

use crate::error::ValidationError;

pub trait Modal {
    type Output;

    fn is_open(&self) -> bool;

    /// Opens the dialog. Fields are reset only when it was closed.
    fn open(&mut self);

    fn close(&mut self);

    fn error(&self) -> Option<&ValidationError>;

    /// Validates the fields. On success the dialog closes and the payload is
    /// returned; on failure the error is kept for display and it stays open.
    fn submit(&mut self) -> Option<Self::Output>;
}

/// Open flag and inline error shared by every dialog.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ModalState {
    open: bool,
    error: Option<ValidationError>,
}

impl ModalState {
    /// Returns true on the closed to open transition.
    pub(crate) fn open(&mut self) -> bool {
        if self.open {
            return false;
        }
        self.open = true;
        self.error = None;
        true
    }

    pub(crate) fn close(&mut self) {
        self.open = false;
        self.error = None;
    }

    pub(crate) fn is_open(&self) -> bool {
        self.open
    }

    pub(crate) fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }

    /// Closes on success, records the error otherwise.
    pub(crate) fn finish<T>(&mut self, result: Result<T, ValidationError>) -> Option<T> {
        if !self.open {
            return None;
        }
        match result {
            Ok(value) => {
                self.close();
                Some(value)
            }
            Err(e) => {
                log::debug!("modal input rejected: {e}");
                self.error = Some(e);
                None
            }
        }
    }
}
