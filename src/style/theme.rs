//! Design tokens: font sizes, spacing and colors.

use super::color::Color;

/// Font sizes in points.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSizes {
    pub h1: f64,
    pub h2: f64,
    pub h3: f64,
    pub body: f64,
    pub caption: f64,
    pub code: f64,
}

impl FontSizes {
    /// Size for a heading level; levels past 3 use the h3 size.
    pub fn heading(&self, level: u8) -> f64 {
        match level {
            1 => self.h1,
            2 => self.h2,
            _ => self.h3,
        }
    }
}

impl Default for FontSizes {
    fn default() -> Self {
        Self {
            h1: 32.0,
            h2: 24.0,
            h3: 18.0,
            body: 12.0,
            caption: 10.0,
            code: 10.0,
        }
    }
}

/// Vertical and horizontal spacing in points.
#[derive(Debug, Clone, PartialEq)]
pub struct Spacing {
    pub section_gap: f64,
    pub paragraph_gap: f64,
    pub list_indent: f64,
    pub list_item_gap: f64,
    pub code_padding: f64,
    pub table_cell_padding: f64,
    pub caption_gap: f64,
    /// Extra space between consecutive wrapped lines
    pub line_gap: f64,
}

impl Default for Spacing {
    fn default() -> Self {
        Self {
            section_gap: 16.0,
            paragraph_gap: 12.0,
            list_indent: 20.0,
            list_item_gap: 6.0,
            code_padding: 8.0,
            table_cell_padding: 6.0,
            caption_gap: 4.0,
            line_gap: 4.0,
        }
    }
}

/// Named colors.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub text_primary: Color,
    pub text_muted: Color,
    pub heading: Color,
    pub code_background: Color,
    pub code_border: Color,
    pub line_light: Color,
    pub table_header_background: Color,
    pub accent: Color,
    pub page_background: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            text_primary: Color::gray(0.169),
            text_muted: Color::gray(0.416),
            heading: Color::BLACK,
            code_background: Color::gray(0.961),
            code_border: Color::gray(0.898),
            line_light: Color::rgb(0.839, 0.827, 0.808),
            table_header_background: Color::gray(0.97),
            accent: Color::rgb(0.431, 0.388, 0.275),
            page_background: Color::WHITE,
        }
    }
}

/// The complete set of design tokens used by layout.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Theme {
    pub sizes: FontSizes,
    pub spacing: Spacing,
    pub palette: Palette,
}

impl Theme {
    /// Create the default theme.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the font sizes.
    pub fn with_sizes(mut self, sizes: FontSizes) -> Self {
        self.sizes = sizes;
        self
    }

    /// Replace the spacing.
    pub fn with_spacing(mut self, spacing: Spacing) -> Self {
        self.spacing = spacing;
        self
    }

    /// Replace the palette.
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }
}
