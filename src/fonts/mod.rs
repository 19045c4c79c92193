//! Glyph metrics and font resolution.
//!
//! The layout engine only ever sees a resolved [`FontHandle`]. Where the
//! handle comes from is the business of a [`FontResolver`]; the built-in
//! handle is always available as the fallback.

mod metrics;
mod resolver;

pub use metrics::{
    FaceMetrics, FontHandle, FontVariant, GlyphMetrics, TextStyle, BUILTIN_FAMILY,
};
pub use resolver::{BuiltinFonts, DirectoryFontResolver, FontCache, FontResolver};
