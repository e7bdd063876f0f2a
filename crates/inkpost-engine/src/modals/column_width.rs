use crate::error::ValidationError;
use crate::modals::{Modal, ModalState};
use crate::models::ColumnWidth;

/// Shortcuts offered next to the width field.
pub const QUICK_PICKS: [&str; 4] = ["auto", "100px", "150px", "200px"];

#[derive(Debug, Clone)]
pub struct ColumnWidthModal {
    state: ModalState,
    pub width: String,
}

impl Default for ColumnWidthModal {
    fn default() -> Self {
        Self {
            state: ModalState::default(),
            width: "auto".to_string(),
        }
    }
}

impl ColumnWidthModal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fills the field from a quick pick without submitting.
    pub fn pick(&mut self, value: &str) {
        self.width = value.to_string();
    }
}

impl Modal for ColumnWidthModal {
    type Output = ColumnWidth;

    fn is_open(&self) -> bool {
        self.state.is_open()
    }

    fn open(&mut self) {
        if self.state.open() {
            self.width = "auto".to_string();
        }
    }

    fn close(&mut self) {
        self.state.close();
    }

    fn error(&self) -> Option<&ValidationError> {
        self.state.error()
    }

    fn submit(&mut self) -> Option<ColumnWidth> {
        let result = self.width.parse::<ColumnWidth>();
        self.state.finish(result)
    }
}
