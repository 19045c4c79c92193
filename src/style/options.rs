//! Layout options and page geometry.

use super::Theme;
use crate::cleanup::{CleanupOptions, CleanupPreset};
use crate::error::Result;
use crate::model::{mm_to_pt, validate_margin, Meta, PageSize};

/// Rules controlling where page breaks may fall inside a block.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationRules {
    /// Minimum lines left on a page before a break (orphan control)
    pub min_lines_before_break: usize,

    /// Minimum lines carried to the next page (widow control)
    pub min_lines_after_break: usize,

    /// Keep a heading on the same page as the start of the next block
    pub keep_heading_with_next: bool,
}

impl Default for PaginationRules {
    fn default() -> Self {
        Self {
            min_lines_before_break: 2,
            min_lines_after_break: 2,
            keep_heading_with_next: true,
        }
    }
}

impl PaginationRules {
    /// Rules with no widow, orphan or keep-with-next constraints.
    pub fn relaxed() -> Self {
        Self {
            min_lines_before_break: 1,
            min_lines_after_break: 1,
            keep_heading_with_next: false,
        }
    }
}

/// Options for laying out a document.
#[derive(Debug, Clone)]
pub struct LayoutOptions {
    /// Design tokens
    pub theme: Theme,

    /// Page break rules
    pub pagination: PaginationRules,

    /// Repeat a split table's header row at the top of each continuation page
    pub repeat_table_header: bool,

    /// Nesting depth after which list indentation stops growing
    pub max_list_depth: usize,

    /// Smallest text width a nested list item may be squeezed to, in points
    pub min_text_width: f64,

    /// Text cleanup applied to span text before layout
    pub cleanup: Option<CleanupOptions>,

    /// Page size override; `None` uses the document's own
    pub page_size: Option<PageSize>,

    /// Margin override in millimetres; `None` uses the document's own
    pub margin_mm: Option<f64>,
}

impl LayoutOptions {
    /// Create new layout options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the theme.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Set the pagination rules.
    pub fn with_pagination(mut self, rules: PaginationRules) -> Self {
        self.pagination = rules;
        self
    }

    /// Enable or disable table header repetition.
    pub fn with_repeat_table_header(mut self, repeat: bool) -> Self {
        self.repeat_table_header = repeat;
        self
    }

    /// Set the list depth cap.
    pub fn with_max_list_depth(mut self, depth: usize) -> Self {
        self.max_list_depth = depth;
        self
    }

    /// Set the minimum text width for nested list items.
    pub fn with_min_text_width(mut self, width: f64) -> Self {
        self.min_text_width = width.max(0.0);
        self
    }

    /// Set cleanup options.
    pub fn with_cleanup(mut self, cleanup: CleanupOptions) -> Self {
        self.cleanup = Some(cleanup);
        self
    }

    /// Set cleanup preset.
    pub fn with_cleanup_preset(mut self, preset: CleanupPreset) -> Self {
        self.cleanup = Some(CleanupOptions::from_preset(preset));
        self
    }

    /// Disable text cleanup.
    pub fn without_cleanup(mut self) -> Self {
        self.cleanup = None;
        self
    }

    /// Override the page size.
    pub fn with_page_size(mut self, size: PageSize) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Override the margin.
    pub fn with_margin_mm(mut self, margin: f64) -> Self {
        self.margin_mm = Some(margin);
        self
    }

    /// Check the overrides that feed page geometry.
    pub fn validate(&self) -> Result<()> {
        match self.margin_mm {
            Some(margin) => validate_margin(margin, "options.margin_mm"),
            None => Ok(()),
        }
    }

    /// Resolve page geometry for a document's metadata.
    pub fn geometry(&self, meta: &Meta) -> PageGeometry {
        let size = self.page_size.unwrap_or(meta.page_size);
        let margin = self.margin_mm.unwrap_or(meta.margin_mm);
        PageGeometry::new(size, margin)
    }
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            pagination: PaginationRules::default(),
            repeat_table_header: false,
            max_list_depth: 6,
            min_text_width: 72.0,
            cleanup: Some(CleanupOptions::default()),
            page_size: None,
            margin_mm: None,
        }
    }
}

/// Absolute page dimensions in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub page_width: f64,
    pub page_height: f64,
    pub margin: f64,
}

impl PageGeometry {
    /// Geometry for a page size and uniform margin in millimetres.
    pub fn new(size: PageSize, margin_mm: f64) -> Self {
        let (page_width, page_height) = size.dimensions();
        Self {
            page_width,
            page_height,
            margin: mm_to_pt(margin_mm),
        }
    }

    /// Width available to content.
    pub fn content_width(&self) -> f64 {
        (self.page_width - 2.0 * self.margin).max(0.0)
    }

    /// Height available to content.
    pub fn content_height(&self) -> f64 {
        (self.page_height - 2.0 * self.margin).max(0.0)
    }
}
