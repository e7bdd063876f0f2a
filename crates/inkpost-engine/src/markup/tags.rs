//! Tag classification shared by the parser, serializer and editing commands.

/// Elements that never have children or an end tag.
const VOID: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is raw text (no markup, no entity escaping).
const RAW_TEXT: &[&str] = &["script", "style"];

const BLOCK: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "caption",
    "dd",
    "div",
    "dl",
    "dt",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "li",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "tbody",
    "td",
    "tfoot",
    "th",
    "thead",
    "tr",
    "ul",
];

/// Blocks that hold inline content directly and are never split into
/// further blocks by editing commands.
const LEAF_BLOCK: &[&str] = &[
    "address",
    "caption",
    "dd",
    "dt",
    "figcaption",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "p",
    "pre",
];

/// Table plumbing where character data is not allowed.
const TABLE_STRUCTURE: &[&str] = &["table", "thead", "tbody", "tfoot", "tr", "ul", "ol"];

/// Content that makes a document non-empty even without any text.
const EMBEDDED: &[&str] = &[
    "audio", "embed", "hr", "iframe", "img", "object", "table", "video",
];

pub fn is_void(tag: &str) -> bool {
    VOID.contains(&tag)
}

pub fn is_raw_text(tag: &str) -> bool {
    RAW_TEXT.contains(&tag)
}

pub fn is_block(tag: &str) -> bool {
    BLOCK.contains(&tag)
}

pub fn is_leaf_block(tag: &str) -> bool {
    LEAF_BLOCK.contains(&tag)
}

pub fn is_table_structure(tag: &str) -> bool {
    TABLE_STRUCTURE.contains(&tag)
}

pub fn is_embedded(tag: &str) -> bool {
    EMBEDDED.contains(&tag)
}

pub fn is_list(tag: &str) -> bool {
    matches!(tag, "ul" | "ol")
}

pub fn is_cell(tag: &str) -> bool {
    matches!(tag, "td" | "th")
}

/// Heading level for `h1`..`h6`.
pub fn heading_level(tag: &str) -> Option<u8> {
    let digit = tag.strip_prefix('h')?;
    match digit.parse::<u8>() {
        Ok(level @ 1..=6) if digit.len() == 1 => Some(level),
        _ => None,
    }
}
