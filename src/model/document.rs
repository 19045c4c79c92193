//! Document-level types.

use serde::{Deserialize, Serialize};

use super::block::Block;

/// Millimetres to PostScript points.
pub const MM_TO_PT: f64 = 2.83465;

/// Convert millimetres to points.
pub fn mm_to_pt(mm: f64) -> f64 {
    mm * MM_TO_PT
}

/// A declarative document: metadata plus an ordered list of blocks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    /// Document metadata
    #[serde(default)]
    pub meta: Meta,

    /// Content blocks in reading order
    pub blocks: Vec<Block>,
}

impl Document {
    /// Create an empty document with default metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document from blocks.
    pub fn with_blocks(blocks: Vec<Block>) -> Self {
        Self {
            meta: Meta::default(),
            blocks,
        }
    }

    /// Replace the metadata.
    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    /// Append a block.
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Number of blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the document has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Document metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    /// Document title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Document author
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Page size
    #[serde(default)]
    pub page_size: PageSize,

    /// Margin on all four sides, in millimetres
    #[serde(default = "default_margin_mm")]
    pub margin_mm: f64,

    /// Requested font family; falls back to the built-in face when unavailable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
}

fn default_margin_mm() -> f64 {
    20.0
}

impl Default for Meta {
    fn default() -> Self {
        Self {
            title: None,
            author: None,
            page_size: PageSize::default(),
            margin_mm: default_margin_mm(),
            font_family: None,
        }
    }
}

impl Meta {
    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the page size.
    pub fn with_page_size(mut self, size: PageSize) -> Self {
        self.page_size = size;
        self
    }

    /// Set the margin in millimetres.
    pub fn with_margin_mm(mut self, margin: f64) -> Self {
        self.margin_mm = margin;
        self
    }

    /// Set the font family.
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }
}

/// Supported paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    #[serde(rename = "A4", alias = "a4")]
    A4,
    #[serde(rename = "LETTER", alias = "letter", alias = "Letter")]
    Letter,
}

impl PageSize {
    /// Page dimensions in points as `(width, height)`.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.27, 841.89),
            PageSize::Letter => (612.0, 792.0),
        }
    }
}
