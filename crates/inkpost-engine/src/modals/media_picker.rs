use crate::error::ValidationError;
use crate::modals::{Modal, ModalState};
use crate::models::MediaReference;

/// Source of images to pick from. Uploading and storage live with the host.
pub trait MediaLibrary {
    fn search(&self, query: &str) -> Vec<MediaReference>;
}

/// A fixed list, matched case-insensitively on URL and alt text.
impl MediaLibrary for Vec<MediaReference> {
    fn search(&self, query: &str) -> Vec<MediaReference> {
        let query = query.trim().to_lowercase();
        self.iter()
            .filter(|m| {
                query.is_empty()
                    || m.url.to_lowercase().contains(&query)
                    || m.alt_text().to_lowercase().contains(&query)
            })
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MediaPickerModal {
    state: ModalState,
    pub query: String,
    results: Vec<MediaReference>,
    selected: Option<usize>,
}

impl MediaPickerModal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the current query. Any previous choice is dropped.
    pub fn search(&mut self, library: &dyn MediaLibrary) {
        self.results = library.search(&self.query);
        self.selected = None;
    }

    pub fn results(&self) -> &[MediaReference] {
        &self.results
    }

    pub fn choose(&mut self, index: usize) {
        if index < self.results.len() {
            self.selected = Some(index);
        }
    }

    pub fn selected(&self) -> Option<&MediaReference> {
        self.selected.and_then(|i| self.results.get(i))
    }
}

impl Modal for MediaPickerModal {
    type Output = MediaReference;

    fn is_open(&self) -> bool {
        self.state.is_open()
    }

    fn open(&mut self) {
        if self.state.open() {
            self.query.clear();
            self.results.clear();
            self.selected = None;
        }
    }

    fn close(&mut self) {
        self.state.close();
    }

    fn error(&self) -> Option<&ValidationError> {
        self.state.error()
    }

    fn submit(&mut self) -> Option<MediaReference> {
        let result = self.selected().cloned().ok_or(ValidationError::NoImageSelected);
        self.state.finish(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn library() -> Vec<MediaReference> {
        vec![
            MediaReference::new("https://cdn.test/cat.png", Some("A cat".to_string())),
            MediaReference::new("https://cdn.test/dog.png", None),
        ]
    }

    #[test]
    fn test_search_and_pick() {
        let mut modal = MediaPickerModal::new();
        modal.open();
        modal.query = "CAT".to_string();
        modal.search(&library());
        assert_eq!(modal.results().len(), 1);
        modal.choose(0);
        let picked = modal.submit().unwrap();
        assert_eq!(picked.url, "https://cdn.test/cat.png");
        assert_eq!(picked.alt.as_deref(), Some("A cat"));
        assert!(!modal.is_open());
    }

    #[test]
    fn test_submit_without_choice_fails() {
        let mut modal = MediaPickerModal::new();
        modal.open();
        modal.search(&library());
        assert_eq!(modal.results().len(), 2);
        modal.choose(5);
        assert_eq!(modal.submit(), None);
        assert_eq!(modal.error(), Some(&ValidationError::NoImageSelected));
    }
}
