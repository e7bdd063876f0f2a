use crate::editing::selection::Selection;

/// Result of applying a command
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    /// Whether the serialized document differs from before the command.
    pub changed: bool,
    /// Selection to restore after the command, stamped against `version`.
    pub new_selection: Option<Selection>,
    pub version: u64,
}

impl Patch {
    pub(crate) fn unchanged(selection: Option<Selection>, version: u64) -> Self {
        Self {
            changed: false,
            new_selection: selection,
            version,
        }
    }
}
