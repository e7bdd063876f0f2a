use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Largest number of rows or columns a new table may have.
pub const MAX_TABLE_DIMENSION: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSize {
    pub rows: usize,
    pub cols: usize,
}

impl TableSize {
    pub fn new(rows: usize, cols: usize) -> Result<Self, ValidationError> {
        if rows == 0 || cols == 0 {
            return Err(ValidationError::InvalidTableSize);
        }
        if rows > MAX_TABLE_DIMENSION || cols > MAX_TABLE_DIMENSION {
            return Err(ValidationError::TableTooLarge {
                max: MAX_TABLE_DIMENSION,
            });
        }
        Ok(Self { rows, cols })
    }
}

impl Default for TableSize {
    fn default() -> Self {
        Self { rows: 3, cols: 3 }
    }
}

/// Where a new column goes relative to the current cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnSide {
    Before,
    After,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LengthUnit {
    Px,
    Percent,
    Em,
    Rem,
}

impl LengthUnit {
    pub fn suffix(self) -> &'static str {
        match self {
            LengthUnit::Px => "px",
            LengthUnit::Percent => "%",
            LengthUnit::Em => "em",
            LengthUnit::Rem => "rem",
        }
    }
}

/// Width of a table column: `auto` or a positive CSS length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum ColumnWidth {
    #[default]
    Auto,
    Length { value: f64, unit: LengthUnit },
}

impl FromStr for ColumnWidth {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        static WIDTH_REGEX: OnceLock<Regex> = OnceLock::new();
        let re = WIDTH_REGEX.get_or_init(|| {
            Regex::new(r"^(\d+(?:\.\d+)?|\.\d+)\s*(px|%|em|rem)$").expect("Invalid width regex")
        });

        let input = s.trim().to_ascii_lowercase();
        if input == "auto" {
            return Ok(ColumnWidth::Auto);
        }
        let caps = re.captures(&input).ok_or(ValidationError::InvalidWidth)?;
        let value: f64 = caps[1].parse().map_err(|_| ValidationError::InvalidWidth)?;
        if value <= 0.0 {
            return Err(ValidationError::InvalidWidth);
        }
        let unit = match &caps[2] {
            "px" => LengthUnit::Px,
            "%" => LengthUnit::Percent,
            "em" => LengthUnit::Em,
            _ => LengthUnit::Rem,
        };
        Ok(ColumnWidth::Length { value, unit })
    }
}

impl fmt::Display for ColumnWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnWidth::Auto => f.write_str("auto"),
            ColumnWidth::Length { value, unit } => write!(f, "{value}{}", unit.suffix()),
        }
    }
}

/// Which part of a table a style is applied to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StyleScope {
    #[default]
    Table,
    Row,
    Cell,
}

/// Border, radius and background settings edited in the table style modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableStyle {
    pub border_color: String,
    /// Pixels.
    pub border_width: u32,
    /// Pixels. Zero clears any rounding.
    pub border_radius: u32,
    pub background_color: Option<String>,
    /// Overrides the background of row 0 when styling the whole table.
    pub header_background: Option<String>,
    pub scope: StyleScope,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            border_color: "#cccccc".to_string(),
            border_width: 1,
            border_radius: 0,
            background_color: None,
            header_background: None,
            scope: StyleScope::Table,
        }
    }
}

impl TableStyle {
    /// Value of the CSS `border` shorthand.
    pub fn border(&self) -> String {
        format!("{}px solid {}", self.border_width, self.border_color)
    }
}
