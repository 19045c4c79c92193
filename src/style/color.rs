//! RGB colors and the named palettes used by spans.

use serde::{Deserialize, Serialize};

use crate::model::{Highlight, TextColor};

/// An opaque RGB color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    /// Create a color from components.
    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Create a neutral gray.
    pub const fn gray(level: f64) -> Self {
        Self::rgb(level, level, level)
    }

    /// Parse `#rrggbb` or `rrggbb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::rgb(
            channel(0)? as f64 / 255.0,
            channel(2)? as f64 / 255.0,
            channel(4)? as f64 / 255.0,
        ))
    }

    /// Format as `#rrggbb`.
    pub fn to_hex(&self) -> String {
        let to_u8 = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", to_u8(self.r), to_u8(self.g), to_u8(self.b))
    }

    /// Composite this color at `alpha` over `base`.
    pub fn over(&self, base: Color, alpha: f64) -> Color {
        let mix = |top: f64, bottom: f64| bottom + (top - bottom) * alpha;
        Color::rgb(
            mix(self.r, base.r),
            mix(self.g, base.g),
            mix(self.b, base.b),
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl Highlight {
    /// Full-strength palette color.
    pub fn color(&self) -> Color {
        match self {
            Highlight::Yellow => Color::rgb(1.0, 0.961, 0.616),
            Highlight::Green => Color::rgb(0.725, 0.965, 0.792),
            Highlight::Aqua => Color::rgb(0.655, 1.0, 0.922),
            Highlight::Blue => Color::rgb(0.702, 0.898, 0.988),
            Highlight::Cornflower => Color::rgb(0.816, 0.886, 1.0),
            Highlight::Lavender => Color::rgb(0.882, 0.745, 0.906),
            Highlight::Pink => Color::rgb(0.973, 0.733, 0.816),
            Highlight::Peach => Color::rgb(1.0, 0.8, 0.737),
            Highlight::Gray => Color::gray(0.878),
        }
    }
}

impl TextColor {
    /// Palette color.
    pub fn color(&self) -> Color {
        match self {
            TextColor::Blue => Color::rgb(0.118, 0.533, 0.898),
            TextColor::Purple => Color::rgb(0.494, 0.341, 0.761),
            TextColor::Magenta => Color::rgb(0.925, 0.251, 0.478),
            TextColor::Orange => Color::rgb(0.984, 0.549, 0.0),
            TextColor::Gold => Color::rgb(0.984, 0.753, 0.176),
            TextColor::Teal => Color::rgb(0.0, 0.537, 0.482),
        }
    }
}
