//! Glyph metrics: advance widths and line heights.

use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;

use crate::error::{Error, Result};

/// One of the faces a font handle provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontVariant {
    #[default]
    Regular,
    Bold,
    Italic,
    BoldItalic,
    /// Fixed-width face used for code
    Mono,
}

impl FontVariant {
    /// Pick the face for a span's formatting flags. Code wins over weight and slant.
    pub fn from_flags(bold: bool, italic: bool, code: bool) -> Self {
        match (code, bold, italic) {
            (true, _, _) => FontVariant::Mono,
            (false, true, true) => FontVariant::BoldItalic,
            (false, true, false) => FontVariant::Bold,
            (false, false, true) => FontVariant::Italic,
            (false, false, false) => FontVariant::Regular,
        }
    }

    /// This face with bold weight added.
    pub fn emboldened(self) -> Self {
        match self {
            FontVariant::Regular => FontVariant::Bold,
            FontVariant::Italic => FontVariant::BoldItalic,
            other => other,
        }
    }

    /// This face with italic slant added.
    pub fn slanted(self) -> Self {
        match self {
            FontVariant::Regular => FontVariant::Italic,
            FontVariant::Bold => FontVariant::BoldItalic,
            other => other,
        }
    }
}

/// Face and size used to measure text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub variant: FontVariant,
    pub size: f64,
}

impl TextStyle {
    pub fn new(variant: FontVariant, size: f64) -> Self {
        Self { variant, size }
    }
}

/// Measures text for layout.
///
/// Implementations must be deterministic: the same text and style always
/// measure the same.
pub trait GlyphMetrics: Send + Sync {
    /// Advance width of `text` in points.
    fn measure(&self, text: &str, style: &TextStyle) -> f64;

    /// Height of one line of text in points.
    fn line_height(&self, style: &TextStyle) -> f64;

    /// Distance from the top of a line to its baseline, in points.
    fn ascent(&self, style: &TextStyle) -> f64;
}

/// Per-face metrics in em units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceMetrics {
    /// Average advance of one character cell
    pub advance_em: f64,
    pub ascent_em: f64,
    /// Positive distance below the baseline
    pub descent_em: f64,
}

impl FaceMetrics {
    pub const BUILTIN_REGULAR: FaceMetrics = FaceMetrics::builtin(0.5);
    pub const BUILTIN_BOLD: FaceMetrics = FaceMetrics::builtin(0.55);
    pub const BUILTIN_MONO: FaceMetrics = FaceMetrics::builtin(0.6);

    const fn builtin(advance_em: f64) -> Self {
        Self {
            advance_em,
            ascent_em: 0.8,
            descent_em: 0.2,
        }
    }

    /// Derive metrics from TrueType/OpenType font data.
    ///
    /// The advance is the mean advance of the printable ASCII glyphs the
    /// face contains.
    pub fn from_ttf(data: &[u8]) -> Result<Self> {
        let face = ttf_parser::Face::parse(data, 0)
            .map_err(|e| Error::FontUnavailable(format!("cannot parse font: {}", e)))?;

        let units_per_em = face.units_per_em() as f64;
        if units_per_em <= 0.0 {
            return Err(Error::FontUnavailable("font has zero units per em".into()));
        }

        let advances: Vec<f64> = (' '..='~')
            .filter_map(|ch| face.glyph_index(ch))
            .filter_map(|gid| face.glyph_hor_advance(gid))
            .map(|adv| adv as f64)
            .collect();
        if advances.is_empty() {
            return Err(Error::FontUnavailable(
                "font has no printable ASCII glyphs".into(),
            ));
        }
        let mean = advances.iter().sum::<f64>() / advances.len() as f64;

        Ok(Self {
            advance_em: mean / units_per_em,
            ascent_em: face.ascender() as f64 / units_per_em,
            descent_em: (face.descender() as f64).abs() / units_per_em,
        })
    }
}

/// A resolved font: four text faces plus the code face.
#[derive(Debug, Clone, PartialEq)]
pub struct FontHandle {
    family: String,
    builtin: bool,
    regular: FaceMetrics,
    bold: FaceMetrics,
    italic: FaceMetrics,
    bold_italic: FaceMetrics,
    mono: FaceMetrics,
}

/// Family name reported by the built-in handle.
pub const BUILTIN_FAMILY: &str = "Helvetica";

impl FontHandle {
    /// The built-in default font. Always available.
    pub fn builtin() -> Self {
        Self {
            family: BUILTIN_FAMILY.to_string(),
            builtin: true,
            regular: FaceMetrics::BUILTIN_REGULAR,
            bold: FaceMetrics::BUILTIN_BOLD,
            italic: FaceMetrics::BUILTIN_REGULAR,
            bold_italic: FaceMetrics::BUILTIN_BOLD,
            mono: FaceMetrics::BUILTIN_MONO,
        }
    }

    /// A handle built from loaded faces. Missing styled faces reuse `regular`.
    pub fn from_faces(
        family: impl Into<String>,
        regular: FaceMetrics,
        bold: Option<FaceMetrics>,
        italic: Option<FaceMetrics>,
        bold_italic: Option<FaceMetrics>,
    ) -> Self {
        let bold = bold.unwrap_or(regular);
        Self {
            family: family.into(),
            builtin: false,
            regular,
            bold,
            italic: italic.unwrap_or(regular),
            bold_italic: bold_italic.unwrap_or(bold),
            mono: FaceMetrics::BUILTIN_MONO,
        }
    }

    /// Family name.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Whether this is the built-in fallback.
    pub fn is_builtin(&self) -> bool {
        self.builtin
    }

    /// Metrics for one face.
    pub fn face(&self, variant: FontVariant) -> &FaceMetrics {
        match variant {
            FontVariant::Regular => &self.regular,
            FontVariant::Bold => &self.bold,
            FontVariant::Italic => &self.italic,
            FontVariant::BoldItalic => &self.bold_italic,
            FontVariant::Mono => &self.mono,
        }
    }
}

impl Default for FontHandle {
    fn default() -> Self {
        Self::builtin()
    }
}

impl GlyphMetrics for FontHandle {
    fn measure(&self, text: &str, style: &TextStyle) -> f64 {
        let cells: u32 = text.chars().map(cell_width).sum();
        cells as f64 * self.face(style.variant).advance_em * style.size
    }

    fn line_height(&self, style: &TextStyle) -> f64 {
        let face = self.face(style.variant);
        (face.ascent_em + face.descent_em) * style.size
    }

    fn ascent(&self, style: &TextStyle) -> f64 {
        self.face(style.variant).ascent_em * style.size
    }
}

/// Number of character cells a code point occupies.
fn cell_width(c: char) -> u32 {
    if is_combining_mark(c) || matches!(c, '\u{200B}'..='\u{200D}' | '\u{FEFF}') {
        0
    } else if is_wide(c) {
        2
    } else {
        1
    }
}

// East Asian wide and fullwidth ranges.
fn is_wide(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xA000..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x20000..=0x3FFFD)
}
