use serde::{Deserialize, Serialize};

/// Character formats toggled by the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InlineFormat {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Superscript,
    Subscript,
}

impl InlineFormat {
    pub const ALL: [InlineFormat; 6] = [
        InlineFormat::Bold,
        InlineFormat::Italic,
        InlineFormat::Underline,
        InlineFormat::Strikethrough,
        InlineFormat::Superscript,
        InlineFormat::Subscript,
    ];

    /// Tag written when the format is applied.
    pub fn tag(self) -> &'static str {
        match self {
            InlineFormat::Bold => "b",
            InlineFormat::Italic => "i",
            InlineFormat::Underline => "u",
            InlineFormat::Strikethrough => "s",
            InlineFormat::Superscript => "sup",
            InlineFormat::Subscript => "sub",
        }
    }

    /// Every tag that carries the format.
    pub fn tags(self) -> &'static [&'static str] {
        match self {
            InlineFormat::Bold => &["b", "strong"],
            InlineFormat::Italic => &["i", "em"],
            InlineFormat::Underline => &["u", "ins"],
            InlineFormat::Strikethrough => &["s", "strike", "del"],
            InlineFormat::Superscript => &["sup"],
            InlineFormat::Subscript => &["sub"],
        }
    }

    /// Format that cannot be active at the same time.
    pub fn exclusive_with(self) -> Option<InlineFormat> {
        match self {
            InlineFormat::Superscript => Some(InlineFormat::Subscript),
            InlineFormat::Subscript => Some(InlineFormat::Superscript),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            InlineFormat::Bold => "bold",
            InlineFormat::Italic => "italic",
            InlineFormat::Underline => "underline",
            InlineFormat::Strikethrough => "strikethrough",
            InlineFormat::Superscript => "superscript",
            InlineFormat::Subscript => "subscript",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    pub fn css(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }

    /// Parses a `text-align` value. `start`/`end` map to left/right.
    pub fn from_css(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" | "start" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" | "end" => Some(Alignment::Right),
            "justify" => Some(Alignment::Justify),
            _ => None,
        }
    }
}

/// Tag of a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockFormat {
    Paragraph,
    Heading(u8),
    Preformatted,
}

impl BlockFormat {
    pub fn tag(self) -> String {
        match self {
            BlockFormat::Paragraph => "p".to_string(),
            BlockFormat::Heading(level) => format!("h{}", level.clamp(1, 6)),
            BlockFormat::Preformatted => "pre".to_string(),
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "p" => Some(BlockFormat::Paragraph),
            "pre" => Some(BlockFormat::Preformatted),
            _ => crate::markup::tags::heading_level(tag).map(BlockFormat::Heading),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListKind {
    #[default]
    None,
    Bullet,
    Number,
}

impl ListKind {
    pub fn tag(self) -> Option<&'static str> {
        match self {
            ListKind::None => None,
            ListKind::Bullet => Some("ul"),
            ListKind::Number => Some("ol"),
        }
    }

    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "ul" => ListKind::Bullet,
            "ol" => ListKind::Number,
            _ => ListKind::None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletStyle {
    #[default]
    Disc,
    Circle,
    Square,
}

impl BulletStyle {
    pub fn css(self) -> &'static str {
        match self {
            BulletStyle::Disc => "disc",
            BulletStyle::Circle => "circle",
            BulletStyle::Square => "square",
        }
    }

    pub fn from_css(value: &str) -> Option<Self> {
        match value.trim() {
            "disc" => Some(BulletStyle::Disc),
            "circle" => Some(BulletStyle::Circle),
            "square" => Some(BulletStyle::Square),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumberStyle {
    #[default]
    Decimal,
    LowerAlpha,
    UpperAlpha,
    LowerRoman,
    UpperRoman,
}

impl NumberStyle {
    pub fn css(self) -> &'static str {
        match self {
            NumberStyle::Decimal => "decimal",
            NumberStyle::LowerAlpha => "lower-alpha",
            NumberStyle::UpperAlpha => "upper-alpha",
            NumberStyle::LowerRoman => "lower-roman",
            NumberStyle::UpperRoman => "upper-roman",
        }
    }

    /// Accepts `list-style-type` values and the legacy `type` attribute.
    pub fn from_css(value: &str) -> Option<Self> {
        match value.trim() {
            "decimal" | "1" => Some(NumberStyle::Decimal),
            "lower-alpha" | "lower-latin" | "a" => Some(NumberStyle::LowerAlpha),
            "upper-alpha" | "upper-latin" | "A" => Some(NumberStyle::UpperAlpha),
            "lower-roman" | "i" => Some(NumberStyle::LowerRoman),
            "upper-roman" | "I" => Some(NumberStyle::UpperRoman),
            _ => None,
        }
    }
}
