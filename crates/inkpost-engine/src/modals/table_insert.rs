use crate::error::ValidationError;
use crate::modals::{Modal, ModalState};
use crate::models::TableSize;

/// Rows and columns for a new table, as typed.
#[derive(Debug, Clone, Default)]
pub struct TableInsertModal {
    state: ModalState,
    pub rows: String,
    pub cols: String,
}

impl TableInsertModal {
    pub fn new() -> Self {
        let defaults = TableSize::default();
        Self {
            state: ModalState::default(),
            rows: defaults.rows.to_string(),
            cols: defaults.cols.to_string(),
        }
    }

    fn parse(field: &str) -> Result<usize, ValidationError> {
        field
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidTableSize)
    }
}

impl Modal for TableInsertModal {
    type Output = TableSize;

    fn is_open(&self) -> bool {
        self.state.is_open()
    }

    fn open(&mut self) {
        if self.state.open() {
            let defaults = TableSize::default();
            self.rows = defaults.rows.to_string();
            self.cols = defaults.cols.to_string();
        }
    }

    fn close(&mut self) {
        self.state.close();
    }

    fn error(&self) -> Option<&ValidationError> {
        self.state.error()
    }

    fn submit(&mut self) -> Option<TableSize> {
        let result = Self::parse(&self.rows)
            .and_then(|rows| Ok((rows, Self::parse(&self.cols)?)))
            .and_then(|(rows, cols)| TableSize::new(rows, cols));
        self.state.finish(result)
    }
}
