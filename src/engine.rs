//! The layout engine.
//!
//! An [`Engine`] owns the layout options and the two collaborators the
//! layout needs: a [`FontResolver`] and an [`ImageResolver`]. A render is
//! validate, clean, lay out, paginate. Every call is independent, so one
//! engine can serve many documents concurrently.

use std::sync::Arc;

use rayon::prelude::*;

use crate::cleanup::TextCleanup;
use crate::error::Result;
use crate::fonts::{BuiltinFonts, FontResolver};
use crate::images::{ImageResolver, NoImages};
use crate::layout::{layout_block, BlockLayout, LayoutContext};
use crate::model::{validate, Document};
use crate::render::{paginate, to_json, JsonFormat, RenderedDocument};
use crate::style::LayoutOptions;

/// Builder-style layout engine.
///
/// # Example
///
/// ```
/// use notesetter::{Block, Document, Engine, LayoutOptions};
///
/// let engine = Engine::new().with_options(LayoutOptions::new().with_repeat_table_header(true));
/// let doc = Document::with_blocks(vec![Block::paragraph("Hello, world")]);
/// let rendered = engine.render(&doc)?;
/// assert_eq!(rendered.page_count(), 1);
/// # Ok::<(), notesetter::Error>(())
/// ```
#[derive(Clone)]
pub struct Engine {
    options: LayoutOptions,
    fonts: Arc<dyn FontResolver>,
    images: Arc<dyn ImageResolver>,
}

impl Engine {
    /// Create an engine with default options, the built-in font and no images.
    pub fn new() -> Self {
        Self {
            options: LayoutOptions::default(),
            fonts: Arc::new(BuiltinFonts::new()),
            images: Arc::new(NoImages),
        }
    }

    /// Set layout options.
    pub fn with_options(mut self, options: LayoutOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the font resolver.
    pub fn with_font_resolver(mut self, resolver: impl FontResolver + 'static) -> Self {
        self.fonts = Arc::new(resolver);
        self
    }

    /// Set the image resolver.
    pub fn with_image_resolver(mut self, resolver: impl ImageResolver + 'static) -> Self {
        self.images = Arc::new(resolver);
        self
    }

    /// Get the layout options.
    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Render a document into pages.
    ///
    /// The document is validated in full first; a validation failure is the
    /// only error this returns, and no layout work happens in that case.
    pub fn render(&self, doc: &Document) -> Result<RenderedDocument> {
        self.options.validate()?;
        validate(doc)?;

        match &self.options.cleanup {
            Some(options) => {
                let mut cleaned = doc.clone();
                TextCleanup::new(options.clone()).apply(&mut cleaned);
                Ok(self.layout(&cleaned))
            }
            None => Ok(self.layout(doc)),
        }
    }

    /// Parse, render and serialize a JSON document description.
    pub fn render_json(&self, json: &str, format: JsonFormat) -> Result<String> {
        let doc = crate::parse_document(json)?;
        let rendered = self.render(&doc)?;
        to_json(&rendered, format)
    }

    /// Render many documents in parallel. Results keep the input order.
    pub fn render_batch(&self, docs: &[Document]) -> Vec<Result<RenderedDocument>> {
        docs.par_iter().map(|doc| self.render(doc)).collect()
    }

    fn layout(&self, doc: &Document) -> RenderedDocument {
        let font = self.fonts.resolve(doc.meta.font_family.as_deref());
        let geometry = self.options.geometry(&doc.meta);
        let ctx = LayoutContext {
            metrics: font.as_ref(),
            images: self.images.as_ref(),
            options: &self.options,
            content_width: geometry.content_width(),
            content_height: geometry.content_height(),
        };

        let layouts: Vec<BlockLayout> = doc.blocks.iter().map(|b| layout_block(b, &ctx)).collect();
        let (pages, stats) = paginate(&layouts, geometry, self.options.pagination.clone());
        log::debug!(
            "laid out {} blocks on {} pages with {}",
            doc.blocks.len(),
            pages.len(),
            font.family()
        );

        RenderedDocument {
            title: doc.meta.title.clone(),
            author: doc.meta.author.clone(),
            font_family: font.family().to_string(),
            page_width: geometry.page_width,
            page_height: geometry.page_height,
            pages,
            stats,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Render on the blocking thread pool, giving up after `timeout`.
///
/// On timeout the in-flight render is abandoned and nothing is returned
/// but [`Error::Timeout`](crate::Error::Timeout).
#[cfg(feature = "async")]
pub async fn render_with_timeout(
    engine: &Engine,
    doc: &Document,
    timeout: std::time::Duration,
) -> Result<RenderedDocument> {
    use crate::error::Error;

    let engine = engine.clone();
    let doc = doc.clone();
    let task = tokio::task::spawn_blocking(move || engine.render(&doc));
    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(Error::Render(format!("render task failed: {}", e))),
        Err(_) => Err(Error::Timeout(timeout.as_millis() as u64)),
    }
}
