//! Headings, paragraphs and captions.

use super::formula::expand_inline_math;
use super::{BaseStyle, BlockKind, BlockLayout, LaidOutLine, LayoutContext, LayoutUnit, ShapedText};
use crate::model::Span;
use crate::render::DrawCommand;
use crate::style::Color;

const HIGHLIGHT_ALPHA: f64 = 0.35;
const HIGHLIGHT_PAD: f64 = 1.0;
const HIGHLIGHT_RADIUS: f64 = 2.0;

pub(super) fn layout_heading(level: u8, spans: &[Span], ctx: &LayoutContext<'_>) -> BlockLayout {
    let theme = ctx.theme();
    let base = BaseStyle::new(theme.sizes.heading(level), theme.palette.heading)
        .bold()
        .with_forced_color();
    let shaped = shape(spans, &base, ctx);
    if shaped.is_empty() {
        return BlockLayout::empty(BlockKind::Heading);
    }

    // Headings move as a whole.
    BlockLayout::empty(BlockKind::Heading)
        .with_spacing(theme.spacing.section_gap, theme.spacing.paragraph_gap)
        .with_units(shaped_units(&shaped, 0.0))
        .counting_lines(shaped.lines.len())
}

pub(super) fn layout_paragraph(spans: &[Span], ctx: &LayoutContext<'_>) -> BlockLayout {
    let theme = ctx.theme();
    let base = BaseStyle::new(theme.sizes.body, theme.palette.text_primary);
    let gap = theme.spacing.paragraph_gap;
    flowing(BlockKind::Paragraph, &shape(spans, &base, ctx), gap, gap, ctx)
}

pub(super) fn layout_caption(spans: &[Span], ctx: &LayoutContext<'_>) -> BlockLayout {
    let theme = ctx.theme();
    let gap = theme.spacing.caption_gap;
    flowing(BlockKind::Caption, &shape(spans, &caption_style(ctx), ctx), gap, gap, ctx)
}

/// Italic muted text at caption size.
pub(super) fn caption_style(ctx: &LayoutContext<'_>) -> BaseStyle {
    let theme = ctx.theme();
    BaseStyle::new(theme.sizes.caption, theme.palette.text_muted).italic()
}

fn shape(spans: &[Span], base: &BaseStyle, ctx: &LayoutContext<'_>) -> ShapedText {
    let spans = expand_inline_math(spans);
    ctx.shaper().shape(&spans, ctx.content_width, base)
}

/// A text block that may split between lines under the widow/orphan rules.
fn flowing(
    kind: BlockKind,
    shaped: &ShapedText,
    before: f64,
    after: f64,
    ctx: &LayoutContext<'_>,
) -> BlockLayout {
    if shaped.is_empty() {
        return BlockLayout::empty(kind);
    }
    let rules = &ctx.options.pagination;
    BlockLayout::empty(kind)
        .with_spacing(before, after)
        .with_units(shaped_units(shaped, 0.0))
        .splittable(rules.min_lines_before_break, rules.min_lines_after_break)
        .counting_lines(shaped.lines.len())
}

/// One unit per line; every line but the last carries the line gap.
pub(super) fn shaped_units(shaped: &ShapedText, x: f64) -> Vec<LayoutUnit> {
    let last = shaped.lines.len().saturating_sub(1);
    shaped
        .lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let gap = if i < last { shaped.line_gap } else { 0.0 };
            LayoutUnit::new(line.height + gap, line_commands(line, x, 0.0))
        })
        .collect()
}

/// Draw commands for a line whose top edge is at `top`.
///
/// Highlights are emitted before any text so they sit behind it.
pub(super) fn line_commands(line: &LaidOutLine, x: f64, top: f64) -> Vec<DrawCommand> {
    let mut commands = Vec::new();
    let visible = || line.runs.iter().filter(|run| !run.is_blank());

    for run in visible() {
        if let Some(highlight) = run.style.highlight {
            commands.push(DrawCommand::FillRect {
                x: x + run.x - HIGHLIGHT_PAD,
                y: top - HIGHLIGHT_PAD,
                w: run.width + 2.0 * HIGHLIGHT_PAD,
                h: line.height + 2.0 * HIGHLIGHT_PAD,
                color: highlight.color().over(Color::WHITE, HIGHLIGHT_ALPHA),
                radius: HIGHLIGHT_RADIUS,
            });
        }
    }

    let baseline = top + line.ascent;
    for run in visible() {
        commands.push(DrawCommand::PlaceTextRun {
            x: x + run.x,
            y: baseline,
            font: run.style.font,
            size: run.style.size,
            color: run.style.color,
            text: run.text.clone(),
        });
    }
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FontVariant;
    use crate::layout::testing::Fixture;
    use crate::model::{Highlight, TextColor};

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn test_heading_is_bold_black_and_unsplittable() {
        let fixture = Fixture::new();
        let spans = vec![Span::new("Title").with_color(TextColor::Orange)];
        let layout = layout_heading(1, &spans, &fixture.ctx());

        assert!(!layout.splittable);
        assert_eq!(layout.space_before, 16.0);
        match &layout.units[0].commands[0] {
            DrawCommand::PlaceTextRun {
                font, size, color, ..
            } => {
                assert_eq!(*font, FontVariant::Bold);
                assert_eq!(*size, 32.0);
                assert_eq!(*color, Color::BLACK);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_paragraph_units_per_line() {
        let fixture = Fixture::new();
        let layout = layout_paragraph(&[Span::new(words(200))], &fixture.ctx());

        assert!(layout.splittable);
        assert_eq!((layout.min_head, layout.min_tail), (2, 2));
        assert_eq!(layout.units.len(), layout.line_count);
        assert!(layout.units.len() > 3);
        // Body lines are 12pt tall plus the 4pt gap; the last has no gap.
        assert_eq!(layout.units[0].height, 16.0);
        assert_eq!(layout.units.last().map(|u| u.height), Some(12.0));
    }

    #[test]
    fn test_empty_paragraph_is_empty() {
        let fixture = Fixture::new();
        let layout = layout_paragraph(&[], &fixture.ctx());
        assert!(layout.units.is_empty());
        assert_eq!(layout.required_height(), 0.0);
    }

    #[test]
    fn test_caption_style() {
        let fixture = Fixture::new();
        let layout = layout_caption(&[Span::new("Figure 1")], &fixture.ctx());
        match &layout.units[0].commands[0] {
            DrawCommand::PlaceTextRun {
                font, size, color, ..
            } => {
                assert_eq!(*font, FontVariant::Italic);
                assert_eq!(*size, 10.0);
                assert_eq!(*color, fixture.options.theme.palette.text_muted);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_highlight_drawn_behind_text() {
        let fixture = Fixture::new();
        let spans = vec![
            Span::new("plain "),
            Span::new("marked").with_highlight(Highlight::Yellow),
        ];
        let layout = layout_paragraph(&spans, &fixture.ctx());
        let commands = &layout.units[0].commands;

        assert_eq!(commands.len(), 3);
        match &commands[0] {
            DrawCommand::FillRect { x, w, color, .. } => {
                // "plain " is six 6pt glyphs.
                assert_eq!(*x, 35.0);
                assert_eq!(*w, 38.0);
                assert_eq!(*color, Highlight::Yellow.color().over(Color::WHITE, 0.35));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_inline_math_is_converted() {
        let fixture = Fixture::new();
        let layout = layout_paragraph(&[Span::new("area $\\pi r^2$")], &fixture.ctx());
        let texts: Vec<&str> = layout.units[0]
            .commands
            .iter()
            .filter_map(DrawCommand::text)
            .collect();
        assert_eq!(texts.concat(), "area π r²");
    }
}
