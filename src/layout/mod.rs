//! Block layout.
//!
//! Every block is laid out against the content width into a
//! [`BlockLayout`]: a stack of [`LayoutUnit`]s whose draw commands are
//! relative to the unit's own top-left corner. Units are the indivisible
//! pieces the paginator works with; a split can only fall between two
//! units of a splittable block.

mod figure;
pub mod formula;
mod list;
pub mod shaper;
mod table;
mod text;

pub use figure::{clamp_exercise_mm, EXERCISE_MAX_MM, EXERCISE_MIN_MM};
pub use shaper::{BaseStyle, GlyphRun, LaidOutLine, RunStyle, ShapedText, Shaper};
pub use table::column_layout;

use serde::{Deserialize, Serialize};

use crate::fonts::GlyphMetrics;
use crate::images::ImageResolver;
use crate::model::Block;
use crate::render::DrawCommand;
use crate::style::{Color, LayoutOptions, Theme};

/// Block variant tag carried through layout and pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Heading,
    Paragraph,
    Caption,
    List,
    Code,
    Formula,
    Table,
    Break,
    PageBreak,
    Image,
    Exercise,
}

/// An indivisible slice of a block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutUnit {
    pub height: f64,
    pub commands: Vec<DrawCommand>,
}

impl LayoutUnit {
    pub fn new(height: f64, commands: Vec<DrawCommand>) -> Self {
        Self { height, commands }
    }
}

/// Decoration drawn around every placed piece of a block.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Space inside the frame above the first and below the last unit
    pub padding: f64,
    pub fill: Option<Color>,
    /// Border `(width, color)`
    pub stroke: Option<(f64, Color)>,
    pub radius: f64,
    pub width: f64,
}

impl Frame {
    /// Commands for a frame whose top-left corner is at `(x, y)`.
    pub fn commands(&self, x: f64, y: f64, height: f64) -> Vec<DrawCommand> {
        let mut commands = Vec::with_capacity(2);
        if let Some(color) = self.fill {
            commands.push(DrawCommand::FillRect {
                x,
                y,
                w: self.width,
                h: height,
                color,
                radius: self.radius,
            });
        }
        if let Some((width, color)) = self.stroke {
            commands.push(DrawCommand::StrokeRect {
                x,
                y,
                w: self.width,
                h: height,
                width,
                color,
                radius: self.radius,
            });
        }
        commands
    }
}

/// The laid-out form of one block.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockLayout {
    pub kind: BlockKind,
    pub space_before: f64,
    /// Trailing space; collapses at the bottom of a page
    pub space_after: f64,
    pub units: Vec<LayoutUnit>,
    pub splittable: bool,
    /// Fewest units that may stay on a page before a split
    pub min_head: usize,
    /// Fewest units that may move to the next page after a split
    pub min_tail: usize,
    pub frame: Option<Frame>,
    /// Unit re-drawn at the top of every continuation piece
    pub repeat_head: Option<LayoutUnit>,
    /// Forces a page transition and occupies no space
    pub page_break: bool,
    /// Wrapped text lines produced
    pub line_count: usize,
    /// List items or table rows
    pub item_count: usize,
    /// Content was replaced by a fallback
    pub degraded: bool,
}

impl BlockLayout {
    /// A layout with no units.
    pub fn empty(kind: BlockKind) -> Self {
        Self {
            kind,
            space_before: 0.0,
            space_after: 0.0,
            units: Vec::new(),
            splittable: false,
            min_head: 1,
            min_tail: 1,
            frame: None,
            repeat_head: None,
            page_break: false,
            line_count: 0,
            item_count: 0,
            degraded: false,
        }
    }

    /// The page-break marker.
    pub fn page_break() -> Self {
        Self {
            page_break: true,
            ..Self::empty(BlockKind::PageBreak)
        }
    }

    pub fn with_spacing(mut self, before: f64, after: f64) -> Self {
        self.space_before = before;
        self.space_after = after;
        self
    }

    pub fn with_units(mut self, units: Vec<LayoutUnit>) -> Self {
        self.units = units;
        self
    }

    /// Allow splits between units, keeping at least `min_head` units before
    /// and `min_tail` units after each split.
    pub fn splittable(mut self, min_head: usize, min_tail: usize) -> Self {
        self.splittable = true;
        self.min_head = min_head.max(1);
        self.min_tail = min_tail.max(1);
        self
    }

    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.frame = Some(frame);
        self
    }

    pub fn counting_lines(mut self, lines: usize) -> Self {
        self.line_count = lines;
        self
    }

    pub fn counting_items(mut self, items: usize) -> Self {
        self.item_count = items;
        self
    }

    /// Vertical space the frame adds to every piece.
    pub fn frame_padding(&self) -> f64 {
        self.frame.as_ref().map(|f| 2.0 * f.padding).unwrap_or(0.0)
    }

    /// Height of the units alone.
    pub fn content_height(&self) -> f64 {
        self.units.iter().map(|u| u.height).sum()
    }

    /// Total height including spacing and frame padding.
    pub fn required_height(&self) -> f64 {
        if self.page_break {
            return 0.0;
        }
        self.space_before + self.frame_padding() + self.content_height() + self.space_after
    }

    /// Height of the smallest piece that can start this block on a page.
    pub fn min_lead_height(&self) -> f64 {
        let take = if self.splittable {
            self.min_head.min(self.units.len())
        } else {
            self.units.len()
        };
        self.space_before
            + self.frame_padding()
            + self.units.iter().take(take).map(|u| u.height).sum::<f64>()
    }
}

/// Everything a block needs to lay itself out.
pub struct LayoutContext<'a> {
    pub metrics: &'a dyn GlyphMetrics,
    pub images: &'a dyn ImageResolver,
    pub options: &'a LayoutOptions,
    pub content_width: f64,
    pub content_height: f64,
}

impl<'a> LayoutContext<'a> {
    pub fn theme(&self) -> &Theme {
        &self.options.theme
    }

    pub fn shaper(&self) -> Shaper<'a> {
        Shaper::new(self.metrics, self.options.theme.spacing.line_gap)
    }
}

/// Lay out one block at the context's content width.
pub fn layout_block(block: &Block, ctx: &LayoutContext<'_>) -> BlockLayout {
    match block {
        Block::Heading { level, spans } => text::layout_heading(*level, spans, ctx),
        Block::Paragraph { spans } => text::layout_paragraph(spans, ctx),
        Block::Caption { spans } => text::layout_caption(spans, ctx),
        Block::List { variant, items } => list::layout_list(*variant, items, ctx),
        Block::Code { content, .. } => figure::layout_code(content, ctx),
        Block::Formula { latex } => figure::layout_formula(latex, ctx),
        Block::Table {
            columns,
            widths,
            rows,
        } => table::layout_table(*columns, widths.as_deref(), rows, ctx),
        Block::Break { strength } => figure::layout_break(*strength, ctx),
        Block::PageBreak => BlockLayout::page_break(),
        Block::Image {
            src,
            alt,
            width_mm,
            height_mm,
            fit,
        } => figure::layout_image(
            src,
            alt.as_deref(),
            *width_mm,
            *height_mm,
            *fit,
            ctx,
        ),
        Block::Exercise { variant, height_mm } => {
            figure::layout_exercise(*variant, *height_mm, ctx)
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::fonts::FontHandle;
    use crate::images::NoImages;
    use crate::model::{Meta, PageSize};

    /// Builtin metrics and no images on A4 with 20 mm margins.
    pub struct Fixture {
        pub font: FontHandle,
        pub options: LayoutOptions,
    }

    impl Fixture {
        pub fn new() -> Self {
            Self {
                font: FontHandle::builtin(),
                options: LayoutOptions::default(),
            }
        }

        pub fn ctx(&self) -> LayoutContext<'_> {
            let geometry = self
                .options
                .geometry(&Meta::default().with_page_size(PageSize::A4));
            LayoutContext {
                metrics: &self.font,
                images: &NoImages,
                options: &self.options,
                content_width: geometry.content_width(),
                content_height: geometry.content_height(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(h: f64) -> LayoutUnit {
        LayoutUnit::new(h, Vec::new())
    }

    #[test]
    fn test_required_height() {
        let layout = BlockLayout::empty(BlockKind::Paragraph)
            .with_spacing(12.0, 8.0)
            .with_units(vec![unit(10.0), unit(10.0)]);
        assert_eq!(layout.required_height(), 40.0);
        assert_eq!(BlockLayout::page_break().required_height(), 0.0);
    }

    #[test]
    fn test_min_lead_respects_head_limit() {
        let layout = BlockLayout::empty(BlockKind::Paragraph)
            .with_spacing(5.0, 0.0)
            .with_units(vec![unit(10.0); 5])
            .splittable(2, 2);
        assert_eq!(layout.min_lead_height(), 25.0);
    }

    #[test]
    fn test_unsplittable_leads_with_everything() {
        let layout = BlockLayout::empty(BlockKind::Heading).with_units(vec![unit(10.0); 3]);
        assert_eq!(layout.min_lead_height(), 30.0);
    }

    #[test]
    fn test_frame_commands() {
        let frame = Frame {
            padding: 8.0,
            fill: Some(Color::WHITE),
            stroke: Some((0.5, Color::BLACK)),
            radius: 6.0,
            width: 100.0,
        };
        let cmds = frame.commands(10.0, 20.0, 50.0);
        assert_eq!(cmds.len(), 2);
        assert!(matches!(cmds[0], DrawCommand::FillRect { .. }));
        assert!(matches!(cmds[1], DrawCommand::StrokeRect { .. }));
    }
}
