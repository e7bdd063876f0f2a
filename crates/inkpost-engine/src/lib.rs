pub mod editing;
pub mod editor;
pub mod error;
pub mod io;
pub mod markup;
pub mod modals;
pub mod models;
pub mod raw;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use editing::{Cmd, Document, Patch, Position, Selection, ToolbarState};
pub use editor::{Deferred, Editor, EditorOptions};
pub use error::{CommandError, ValidationError};
pub use io::*;
pub use modals::Modal;
pub use models::*;
pub use raw::RawMarkupSession;
