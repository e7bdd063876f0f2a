use serde::{Deserialize, Serialize};

/// An image chosen in the media picker. Storage and upload are the host's
/// business; the editor only ever sees the resulting URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaReference {
    pub url: String,
    pub alt: Option<String>,
}

impl MediaReference {
    pub fn new(url: impl Into<String>, alt: Option<String>) -> Self {
        Self {
            url: url.into(),
            alt,
        }
    }

    /// Alt text as written to the `alt` attribute.
    pub fn alt_text(&self) -> &str {
        self.alt.as_deref().unwrap_or("")
    }
}
