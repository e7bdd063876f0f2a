//! Reading and writing markup drafts on disk.

use relative_path::RelativePath;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid drafts directory: {0}")]
    InvalidDraftsDir(String),
}

const DRAFT_EXTENSIONS: [&str; 2] = ["html", "htm"];

/// Read a draft and return its markup
pub fn read_draft(relative_path: &RelativePath, drafts_root: &Path) -> Result<String, IoError> {
    let absolute_path = relative_path.to_path(drafts_root);
    if !absolute_path.exists() {
        return Err(IoError::NotFound(absolute_path));
    }
    fs::read_to_string(&absolute_path).map_err(IoError::Io)
}

/// Write markup to a draft, creating parent directories as needed
pub fn write_draft(
    relative_path: &RelativePath,
    drafts_root: &Path,
    markup: &str,
) -> Result<(), IoError> {
    let absolute_path = relative_path.to_path(drafts_root);

    if let Some(parent) = absolute_path.parent() {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }

    log::debug!("writing {} bytes to {}", markup.len(), absolute_path.display());
    fs::write(&absolute_path, markup).map_err(IoError::Io)
}

/// Find all html drafts below the drafts directory, sorted
pub fn scan_drafts(drafts_root: &Path) -> Result<Vec<PathBuf>, IoError> {
    validate_drafts_dir(drafts_root)?;

    let mut files = Vec::new();
    scan_directory_recursive(drafts_root, &mut files)?;
    files.sort();
    Ok(files)
}

fn scan_directory_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), IoError> {
    let entries = fs::read_dir(dir).map_err(IoError::Io)?;

    for entry in entries {
        let entry = entry.map_err(IoError::Io)?;
        let path = entry.path();

        if path.is_dir() {
            scan_directory_recursive(&path, files)?;
        } else if let Some(ext) = path.extension().and_then(|e| e.to_str())
            && DRAFT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
        {
            files.push(path);
        }
    }

    Ok(())
}

pub fn validate_drafts_dir(path: &Path) -> Result<(), IoError> {
    if !path.is_dir() {
        return Err(IoError::InvalidDraftsDir(format!(
            "{} is not a directory",
            path.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{create_test_drafts_dir, create_test_file, read};

    #[test]
    fn test_scan_finds_html_drafts() {
        let drafts = create_test_drafts_dir();
        create_test_file(&drafts, "one.html", "<p>1</p>");
        create_test_file(&drafts, "nested/two.HTM", "<p>2</p>");
        create_test_file(&drafts, "notes.md", "# not a draft");

        let files = scan_drafts(drafts.path()).unwrap();

        assert_eq!(files.len(), 2);
        assert!(files.iter().any(|f| f.file_name().unwrap() == "one.html"));
        assert!(files.iter().any(|f| f.file_name().unwrap() == "two.HTM"));
    }

    #[test]
    fn test_scan_rejects_missing_dir() {
        let result = scan_drafts(Path::new("/this/path/does/not/exist"));
        assert!(matches!(result, Err(IoError::InvalidDraftsDir(_))));
    }

    #[test]
    fn test_read_draft() {
        let drafts = create_test_drafts_dir();
        create_test_file(&drafts, "post.html", "<p>Hello</p>");
        let markup = read_draft(RelativePath::new("post.html"), drafts.path()).unwrap();
        assert_eq!(markup, "<p>Hello</p>");
    }

    #[test]
    fn test_read_missing_draft() {
        let drafts = create_test_drafts_dir();
        let result = read_draft(RelativePath::new("missing.html"), drafts.path());
        assert!(matches!(result, Err(IoError::NotFound(_))));
    }

    #[test]
    fn test_write_draft_creates_parents_and_overwrites() {
        let drafts = create_test_drafts_dir();
        let path = RelativePath::new("2026/10/post.html");
        write_draft(path, drafts.path(), "<p>old</p>").unwrap();
        write_draft(path, drafts.path(), "<p>new</p>").unwrap();
        assert_eq!(read(&path.to_path(drafts.path())), "<p>new</p>");
    }
}
