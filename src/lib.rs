//! # notesetter
//!
//! Block document layout and pagination engine.
//!
//! A [`Document`] is an ordered list of typed blocks (headings, paragraphs,
//! lists, tables, code, formulas, images, exercise areas, breaks) carrying
//! rich-text spans. The engine measures text with real glyph metrics, wraps
//! it, lays every block out against the page's content width and distributes
//! the result over fixed-size pages. The output is a [`RenderedDocument`]:
//! per page, an ordered list of positioned draw commands that any writer
//! (PDF, SVG, canvas) can replay without further layout decisions.
//!
//! ## Quick Start
//!
//! ```
//! use notesetter::{render_document, Block, Document, ListItem, ListVariant, Span};
//!
//! fn main() -> notesetter::Result<()> {
//!     let doc = Document::with_blocks(vec![
//!         Block::heading(1, vec![Span::new("Lecture 3")]),
//!         Block::paragraph("Limits and continuity."),
//!         Block::list(
//!             ListVariant::Number,
//!             vec![ListItem::new("Definition"), ListItem::new("Examples")],
//!         ),
//!     ]);
//!
//!     let rendered = render_document(&doc)?;
//!     for page in &rendered.pages {
//!         println!("page {}: {} commands", page.number, page.commands.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Deterministic output**: identical input always yields identical pages
//! - **Pagination rules**: widow/orphan control, keep-with-next headings,
//!   splittable paragraphs, lists, code and tables
//! - **Pluggable resources**: fonts and images come from resolvers
//! - **Lenient input**: [`parse_document_lenient`] repairs common JSON mistakes
//! - **Parallel batches**: [`Engine::render_batch`] uses Rayon

pub mod cleanup;
pub mod engine;
pub mod error;
pub mod fonts;
pub mod images;
pub mod layout;
pub mod model;
pub mod render;
pub mod repair;
pub mod style;

#[cfg(feature = "ffi")]
pub mod ffi;

// Re-export commonly used types
pub use cleanup::{CleanupOptions, CleanupPreset, TextCleanup};
pub use engine::Engine;
#[cfg(feature = "async")]
pub use engine::render_with_timeout;
pub use error::{Error, Result};
pub use fonts::{
    BuiltinFonts, DirectoryFontResolver, FontHandle, FontResolver, FontVariant, GlyphMetrics,
    TextStyle,
};
pub use images::{FileImageResolver, ImageHandle, ImageInfo, ImageResolver, NoImages};
pub use model::{
    validate, Block, BreakStrength, Document, ExerciseVariant, Highlight, ImageFit, ListItem,
    ListVariant, Meta, PageSize, Span, TableRow, TextColor,
};
pub use render::{
    DrawCommand, JsonFormat, LayoutStats, PageStream, Rect, RenderedDocument, RenderedPage,
    StreamEvent,
};
pub use repair::{parse_document_lenient, Repaired};
pub use style::{Color, LayoutOptions, PaginationRules, Theme};

/// Lay out a document with the default engine.
///
/// # Example
///
/// ```
/// use notesetter::{render_document, Block, Document};
///
/// let doc = Document::with_blocks(vec![Block::paragraph("Hello"), Block::PageBreak]);
/// let rendered = render_document(&doc).unwrap();
/// assert_eq!(rendered.page_count(), 1);
/// ```
pub fn render_document(doc: &Document) -> Result<RenderedDocument> {
    Engine::new().render(doc)
}

/// Lay out a document with custom options.
pub fn render_document_with_options(
    doc: &Document,
    options: LayoutOptions,
) -> Result<RenderedDocument> {
    Engine::new().with_options(options).render(doc)
}

/// Parse a JSON document description and render it to JSON output.
///
/// # Example
///
/// ```
/// use notesetter::{render_json, JsonFormat};
///
/// let json = render_json(r#"{"blocks": [{"type": "paragraph", "text": [{"text": "Hi"}]}]}"#, JsonFormat::Compact)?;
/// assert!(json.contains("\"place_text_run\""));
/// # Ok::<(), notesetter::Error>(())
/// ```
pub fn render_json(json: &str, format: JsonFormat) -> Result<String> {
    Engine::new().render_json(json, format)
}

/// Parse and validate a JSON document description.
///
/// Malformed JSON is an [`Error::Json`]; well-formed JSON of the wrong shape
/// or with out-of-range values is an [`Error::Validation`].
pub fn parse_document(json: &str) -> Result<Document> {
    let doc: Document = serde_json::from_str(json)?;
    validate(&doc)?;
    Ok(doc)
}

/// Parse a JSON document description from a file.
pub fn parse_file<P: AsRef<std::path::Path>>(path: P) -> Result<Document> {
    let json = std::fs::read_to_string(path)?;
    parse_document(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document() {
        let doc = parse_document(
            r#"{"meta": {"title": "T", "page_size": "LETTER"}, "blocks": [{"type": "page_break"}]}"#,
        )
        .unwrap();
        assert_eq!(doc.meta.title.as_deref(), Some("T"));
        assert_eq!(doc.meta.page_size, PageSize::Letter);
        assert_eq!(doc.blocks, vec![Block::PageBreak]);
    }

    #[test]
    fn test_parse_document_errors() {
        let err = parse_document("{\"blocks\": [").unwrap_err();
        assert!(matches!(err, Error::Json(_)));

        let err = parse_document(r#"{"blocks": [{"type": "card"}]}"#).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));

        let err =
            parse_document(r#"{"blocks": [{"type": "heading", "level": 0, "text": []}]}"#)
                .unwrap_err();
        assert!(matches!(err, Error::Validation { ref path, .. } if path == "blocks[0].level"));
    }

    #[test]
    fn test_parse_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, r#"{"blocks": []}"#).unwrap();
        assert!(parse_file(&path).unwrap().is_empty());

        let err = parse_file(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_empty_document_has_one_page() {
        let rendered = render_document(&Document::new()).unwrap();
        assert_eq!(rendered.page_count(), 1);
        assert!(rendered.pages[0].is_blank());
    }

    #[test]
    fn test_render_with_options() {
        let doc = Document::with_blocks(vec![Block::paragraph("x")]);
        let rendered =
            render_document_with_options(&doc, LayoutOptions::new().with_page_size(PageSize::Letter))
                .unwrap();
        assert_eq!(rendered.page_width, 612.0);
    }

    #[test]
    fn test_render_json_rejects_invalid_margin() {
        let err = render_json(r#"{"meta": {"margin_mm": -1}, "blocks": []}"#, JsonFormat::Pretty)
            .unwrap_err();
        assert!(err.is_user_error());
    }
}
