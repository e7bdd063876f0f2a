/// Rejected modal input. Messages are shown inline in the modal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter a URL")]
    EmptyUrl,
    #[error("Please enter a valid URL")]
    InvalidUrl,
    #[error("Rows and columns must be whole numbers of at least 1")]
    InvalidTableSize,
    #[error("Tables are limited to {max} rows and {max} columns")]
    TableTooLarge { max: usize },
    #[error("Enter a width such as 120px, 25%, 10em or auto")]
    InvalidWidth,
    #[error("Invalid color: {0}")]
    InvalidColor(String),
    #[error("Invalid length: {0}")]
    InvalidLength(String),
    #[error("Select an image first")]
    NoImageSelected,
}

/// Why a command could not run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Commands are disabled while editing raw HTML")]
    RawMarkupActive,
    #[error("Place the cursor inside a table first")]
    NotInTable,
    #[error("Cannot delete the last column")]
    LastColumn,
    #[error("{0}")]
    NotApplicable(&'static str),
    #[error("{0} insertion does not fit the selection")]
    StrategyMismatch(&'static str),
}
