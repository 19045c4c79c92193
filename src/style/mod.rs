//! Styling: colors, design tokens, page geometry and layout options.

mod color;
mod options;
mod theme;

pub use color::Color;
pub use options::{LayoutOptions, PageGeometry, PaginationRules};
pub use theme::{FontSizes, Palette, Spacing, Theme};
