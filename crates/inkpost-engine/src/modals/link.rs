use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::error::ValidationError;
use crate::modals::{Modal, ModalState};

fn scheme_regex() -> &'static Regex {
    static SCHEME: OnceLock<Regex> = OnceLock::new();
    SCHEME.get_or_init(|| Regex::new(r"(?i)^https?://").expect("Invalid scheme regex"))
}

/// Trims the input and prepends `https://` when it has no http(s) scheme.
///
/// The URL is checked with a real parser but returned as typed, so
/// `example.com` becomes `https://example.com` without a trailing slash.
pub fn normalize_url(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyUrl);
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidUrl);
    }
    let candidate = if scheme_regex().is_match(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    let parsed = Url::parse(&candidate).map_err(|_| ValidationError::InvalidUrl)?;
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::InvalidUrl);
    }
    Ok(candidate)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    pub url: String,
    /// Text for a new link when nothing is selected.
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LinkModal {
    state: ModalState,
    pub url: String,
    pub text: String,
}

impl LinkModal {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Modal for LinkModal {
    type Output = LinkTarget;

    fn is_open(&self) -> bool {
        self.state.is_open()
    }

    fn open(&mut self) {
        if self.state.open() {
            self.url.clear();
            self.text.clear();
        }
    }

    fn close(&mut self) {
        self.state.close();
    }

    fn error(&self) -> Option<&ValidationError> {
        self.state.error()
    }

    fn submit(&mut self) -> Option<LinkTarget> {
        let text = Some(self.text.trim().to_string()).filter(|t| !t.is_empty());
        let result = normalize_url(&self.url).map(|url| LinkTarget { url, text });
        self.state.finish(result)
    }
}
