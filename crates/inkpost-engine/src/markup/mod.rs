//! Markup layer: converts between the serialized HTML a host stores and the
//! [`Document`](crate::editing::Document) tree the editor mutates.
//!
//! - `cursor`: byte cursor used by the parser
//! - `parser`: lenient HTML fragment parser
//! - `serialize`: well-formed HTML output
//! - `style`: inline `style` attribute model
//! - `tags`: element classification (void, block, leaf block, ...)

pub mod cursor;
pub mod parser;
pub mod serialize;
pub mod style;
pub mod tags;

pub use parser::parse_markup;
pub use style::Style;
