//! Rich-text spans.

use serde::{Deserialize, Serialize};

/// The smallest styled unit of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Text content
    pub text: String,

    /// Bold weight
    #[serde(default)]
    pub bold: bool,

    /// Italic style
    #[serde(default)]
    pub italic: bool,

    /// Monospace code formatting
    #[serde(default)]
    pub code: bool,

    /// Background highlight
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<Highlight>,

    /// Foreground color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<TextColor>,
}

impl Span {
    /// Create a plain span.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: false,
            code: false,
            highlight: None,
            color: None,
        }
    }

    /// Create a bold span.
    pub fn bold(text: impl Into<String>) -> Self {
        Self::new(text).with_bold(true)
    }

    /// Create an italic span.
    pub fn italic(text: impl Into<String>) -> Self {
        Self::new(text).with_italic(true)
    }

    /// Create an inline code span.
    pub fn code(text: impl Into<String>) -> Self {
        Self::new(text).with_code(true)
    }

    /// Set bold weight.
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// Set italic style.
    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    /// Set code formatting.
    pub fn with_code(mut self, code: bool) -> Self {
        self.code = code;
        self
    }

    /// Set the highlight color.
    pub fn with_highlight(mut self, highlight: Highlight) -> Self {
        self.highlight = Some(highlight);
        self
    }

    /// Set the text color.
    pub fn with_color(mut self, color: TextColor) -> Self {
        self.color = Some(color);
        self
    }

    /// Copy this span's styling onto different text.
    pub fn restyle(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..self.clone()
        }
    }

    /// Check if the span has no visible characters.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Concatenate the text of a span sequence.
pub fn plain_text(spans: &[Span]) -> String {
    spans.iter().map(|s| s.text.as_str()).collect()
}

/// Background highlight palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Highlight {
    Yellow,
    Green,
    Aqua,
    Blue,
    Cornflower,
    Lavender,
    Pink,
    Peach,
    Gray,
}

impl Highlight {
    /// All highlight colors in palette order.
    pub const ALL: [Highlight; 9] = [
        Highlight::Yellow,
        Highlight::Green,
        Highlight::Aqua,
        Highlight::Blue,
        Highlight::Cornflower,
        Highlight::Lavender,
        Highlight::Pink,
        Highlight::Peach,
        Highlight::Gray,
    ];
}

/// Foreground text color palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextColor {
    Blue,
    Purple,
    Magenta,
    Orange,
    Gold,
    Teal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_defaults_from_json() {
        let span: Span = serde_json::from_str(r#"{"text": "hi"}"#).unwrap();
        assert_eq!(span, Span::new("hi"));
    }

    #[test]
    fn test_span_palette_names() {
        let span: Span = serde_json::from_str(
            r#"{"text": "x", "highlight": "cornflower", "color": "teal", "emoji": true}"#,
        )
        .unwrap();
        assert_eq!(span.highlight, Some(Highlight::Cornflower));
        assert_eq!(span.color, Some(TextColor::Teal));
    }

    #[test]
    fn test_restyle_keeps_formatting() {
        let span = Span::bold("a").with_color(TextColor::Gold);
        let copy = span.restyle("b");
        assert_eq!(copy.text, "b");
        assert!(copy.bold);
        assert_eq!(copy.color, Some(TextColor::Gold));
    }

    #[test]
    fn test_plain_text() {
        let spans = vec![Span::new("Hello, "), Span::bold("world")];
        assert_eq!(plain_text(&spans), "Hello, world");
        assert!(Span::new("  \t").is_blank());
    }
}
