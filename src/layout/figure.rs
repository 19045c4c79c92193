//! Code, formulas, breaks, images and exercise areas.

use super::formula::latex_to_unicode;
use super::text::{caption_style, shaped_units};
use super::{BaseStyle, BlockKind, BlockLayout, Frame, LayoutContext, LayoutUnit};
use crate::fonts::{FontVariant, TextStyle};
use crate::model::{mm_to_pt, BreakStrength, ExerciseVariant, ImageFit, Span};
use crate::render::{DrawCommand, Rect};
use crate::style::Color;

/// Smallest exercise area height in millimetres.
pub const EXERCISE_MIN_MM: f64 = 10.0;
/// Largest exercise area height in millimetres.
pub const EXERCISE_MAX_MM: f64 = 200.0;

const CODE_RADIUS: f64 = 6.0;
const CODE_BORDER: f64 = 0.5;
const FORMULA_SCALE: f64 = 1.1;
const BREAK_PAD: f64 = 2.0;
const TAB: &str = "    ";

const EXERCISE_RADIUS: f64 = 4.0;
const EXERCISE_BORDER: f64 = 0.5;
const PATTERN_WIDTH: f64 = 0.3;
const RULE_SPACING: f64 = 12.0;
const RULE_INSET: f64 = 5.0;
const DOT_SPACING: f64 = 10.0;
const DOT_RADIUS: f64 = 0.75;
/// 5 mm grid
const SQUARE_SPACING: f64 = 14.17;

/// Clamp a requested exercise height into the supported range.
pub fn clamp_exercise_mm(height_mm: f64) -> f64 {
    if height_mm.is_nan() {
        return EXERCISE_MIN_MM;
    }
    height_mm.clamp(EXERCISE_MIN_MM, EXERCISE_MAX_MM)
}

pub(super) fn layout_code(content: &str, ctx: &LayoutContext<'_>) -> BlockLayout {
    let theme = ctx.theme();
    let style = TextStyle::new(FontVariant::Mono, theme.sizes.code);
    let line_height = ctx.metrics.line_height(&style);
    let ascent = ctx.metrics.ascent(&style);
    let pad = theme.spacing.code_padding;
    let gap = theme.spacing.line_gap;

    let mut source: Vec<String> = content
        .lines()
        .map(|line| line.replace('\t', TAB))
        .collect();
    if source.is_empty() {
        source.push(String::new());
    }

    let last = source.len() - 1;
    let units = source
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let mut commands = Vec::new();
            if !line.trim().is_empty() {
                commands.push(DrawCommand::PlaceTextRun {
                    x: pad,
                    y: ascent,
                    font: FontVariant::Mono,
                    size: style.size,
                    color: theme.palette.text_primary,
                    text: line.clone(),
                });
            }
            let height = if i < last { line_height + gap } else { line_height };
            LayoutUnit::new(height, commands)
        })
        .collect();

    BlockLayout::empty(BlockKind::Code)
        .with_spacing(theme.spacing.section_gap, theme.spacing.section_gap)
        .with_units(units)
        .splittable(1, 1)
        .with_frame(Frame {
            padding: pad,
            fill: Some(theme.palette.code_background),
            stroke: Some((CODE_BORDER, theme.palette.code_border)),
            radius: CODE_RADIUS,
            width: ctx.content_width,
        })
        .counting_lines(source.len())
}

pub(super) fn layout_formula(latex: &str, ctx: &LayoutContext<'_>) -> BlockLayout {
    let text = latex_to_unicode(latex);
    if text.is_empty() {
        return BlockLayout::empty(BlockKind::Formula);
    }

    let theme = ctx.theme();
    let base = BaseStyle::new(theme.sizes.body * FORMULA_SCALE, theme.palette.text_primary);
    let shaped = ctx.shaper().single_line(&[Span::new(text)], &base);
    let x = ((ctx.content_width - shaped.max_width()) / 2.0).max(0.0);

    BlockLayout::empty(BlockKind::Formula)
        .with_spacing(theme.spacing.section_gap, theme.spacing.section_gap)
        .with_units(shaped_units(&shaped, x))
        .counting_lines(shaped.lines.len())
}

/// Ornament glyphs, size and color for a break strength.
fn ornament(strength: BreakStrength, ctx: &LayoutContext<'_>) -> (&'static str, f64, Color) {
    let palette = &ctx.theme().palette;
    match strength {
        BreakStrength::ExtraLight => ("· · ·", 8.0, palette.line_light),
        BreakStrength::Light => ("• • •", 10.0, palette.line_light),
        BreakStrength::Regular => ("• • •", 12.0, palette.text_muted),
        BreakStrength::Strong => ("◆ ◆ ◆", 14.0, palette.accent),
    }
}

pub(super) fn layout_break(strength: BreakStrength, ctx: &LayoutContext<'_>) -> BlockLayout {
    let (glyphs, size, color) = ornament(strength, ctx);
    let style = TextStyle::new(FontVariant::Regular, size);
    let width = ctx.metrics.measure(glyphs, &style);
    let height = ctx.metrics.line_height(&style) + 2.0 * BREAK_PAD;

    let command = DrawCommand::PlaceTextRun {
        x: ((ctx.content_width - width) / 2.0).max(0.0),
        y: BREAK_PAD + ctx.metrics.ascent(&style),
        font: FontVariant::Regular,
        size,
        color,
        text: glyphs.to_string(),
    };
    let spacing = ctx.theme().spacing.section_gap;
    BlockLayout::empty(BlockKind::Break)
        .with_spacing(spacing, spacing)
        .with_units(vec![LayoutUnit::new(height, vec![command])])
}

/// Box size in points for an image, before fitting to the page.
fn requested_box(
    aspect: f64,
    pixel_width: f64,
    width_mm: Option<f64>,
    height_mm: Option<f64>,
    content_width: f64,
) -> (f64, f64) {
    let given = |v: Option<f64>| v.filter(|v| *v > 0.0).map(mm_to_pt);
    match (given(width_mm), given(height_mm)) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, w * aspect),
        (None, Some(h)) => (h / aspect, h),
        (None, None) => {
            let w = pixel_width.min(content_width);
            (w, w * aspect)
        }
    }
}

pub(super) fn layout_image(
    src: &str,
    alt: Option<&str>,
    width_mm: Option<f64>,
    height_mm: Option<f64>,
    fit: ImageFit,
    ctx: &LayoutContext<'_>,
) -> BlockLayout {
    let resolved = ctx
        .images
        .resolve(src)
        .and_then(|info| info.aspect().map(|aspect| (info, aspect)));
    let Some((info, aspect)) = resolved else {
        log::warn!("image unavailable, rendering alt text: {}", src);
        return degraded_image(src, alt, ctx);
    };

    let (pw, ph) = (info.pixel_width as f64, info.pixel_height as f64);
    let (mut w, mut h) = requested_box(aspect, pw, width_mm, height_mm, ctx.content_width);
    if w > ctx.content_width {
        h *= ctx.content_width / w;
        w = ctx.content_width;
    }
    if h > ctx.content_height {
        w *= ctx.content_height / h;
        h = ctx.content_height;
    }

    let box_x = (ctx.content_width - w) / 2.0;
    let scale = match fit {
        ImageFit::Contain => (w / pw).min(h / ph),
        ImageFit::Cover => (w / pw).max(h / ph),
    };
    let (iw, ih) = (pw * scale, ph * scale);
    let clip = match fit {
        ImageFit::Cover => Some(Rect::new(box_x, 0.0, w, h)),
        ImageFit::Contain => None,
    };
    let command = DrawCommand::PlaceImage {
        x: box_x + (w - iw) / 2.0,
        y: (h - ih) / 2.0,
        w: iw,
        h: ih,
        handle: info.handle,
        clip,
    };

    let spacing = ctx.theme().spacing.section_gap;
    BlockLayout::empty(BlockKind::Image)
        .with_spacing(spacing, spacing)
        .with_units(vec![LayoutUnit::new(h, vec![command])])
}

fn degraded_image(src: &str, alt: Option<&str>, ctx: &LayoutContext<'_>) -> BlockLayout {
    let text = match alt.map(str::trim).filter(|a| !a.is_empty()) {
        Some(alt) => alt.to_string(),
        None => format!("[image: {}]", src),
    };
    let shaped = ctx
        .shaper()
        .shape(&[Span::new(text)], ctx.content_width, &caption_style(ctx));
    let gap = ctx.theme().spacing.caption_gap;

    let mut layout = BlockLayout::empty(BlockKind::Image)
        .with_spacing(gap, gap)
        .with_units(shaped_units(&shaped, 0.0))
        .counting_lines(shaped.lines.len());
    layout.degraded = true;
    layout
}

pub(super) fn layout_exercise(
    variant: ExerciseVariant,
    height_mm: f64,
    ctx: &LayoutContext<'_>,
) -> BlockLayout {
    let palette = &ctx.theme().palette;
    let w = ctx.content_width;
    let h = mm_to_pt(clamp_exercise_mm(height_mm));
    let color = palette.line_light;

    let mut commands = vec![DrawCommand::StrokeRect {
        x: 0.0,
        y: 0.0,
        w,
        h,
        width: EXERCISE_BORDER,
        color,
        radius: EXERCISE_RADIUS,
    }];
    let line = |x1: f64, y1: f64, x2: f64, y2: f64| DrawCommand::StrokeLine {
        x1,
        y1,
        x2,
        y2,
        width: PATTERN_WIDTH,
        color,
    };

    match variant {
        ExerciseVariant::Ruled => {
            for y in steps(RULE_SPACING, h - RULE_INSET) {
                commands.push(line(RULE_INSET, y, w - RULE_INSET, y));
            }
        }
        ExerciseVariant::Dotgrid => {
            for y in steps(DOT_SPACING, h) {
                for x in steps(DOT_SPACING, w) {
                    commands.push(DrawCommand::FillRect {
                        x: x - DOT_RADIUS,
                        y: y - DOT_RADIUS,
                        w: 2.0 * DOT_RADIUS,
                        h: 2.0 * DOT_RADIUS,
                        color,
                        radius: DOT_RADIUS,
                    });
                }
            }
        }
        ExerciseVariant::Square => {
            for x in steps(SQUARE_SPACING, w) {
                commands.push(line(x, 0.0, x, h));
            }
            for y in steps(SQUARE_SPACING, h) {
                commands.push(line(0.0, y, w, y));
            }
        }
        ExerciseVariant::Blank => {}
    }

    let spacing = ctx.theme().spacing.section_gap;
    BlockLayout::empty(BlockKind::Exercise)
        .with_spacing(spacing, spacing)
        .with_units(vec![LayoutUnit::new(h, commands)])
}

/// Multiples of `spacing` strictly inside `(0, limit)`.
fn steps(spacing: f64, limit: f64) -> impl Iterator<Item = f64> {
    (1..)
        .map(move |i| i as f64 * spacing)
        .take_while(move |v| *v < limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::{ImageHandle, ImageInfo};
    use crate::layout::testing::Fixture;

    fn count<F: Fn(&DrawCommand) -> bool>(layout: &BlockLayout, pred: F) -> usize {
        layout.units.iter().flat_map(|u| &u.commands).filter(|c| pred(c)).count()
    }

    #[test]
    fn test_exercise_clamp() {
        assert_eq!(clamp_exercise_mm(500.0), 200.0);
        assert_eq!(clamp_exercise_mm(1.0), 10.0);
        assert_eq!(clamp_exercise_mm(-5.0), 10.0);
        assert_eq!(clamp_exercise_mm(f64::NAN), 10.0);
        assert_eq!(clamp_exercise_mm(55.5), 55.5);
    }

    #[test]
    fn test_exercise_height_in_range() {
        let fixture = Fixture::new();
        for mm in [0.0, 5.0, 40.0, 200.0, 500.0, 1e9] {
            let layout = layout_exercise(ExerciseVariant::Blank, mm, &fixture.ctx());
            let h = layout.content_height();
            assert!(h >= mm_to_pt(10.0) - 1e-9 && h <= mm_to_pt(200.0) + 1e-9, "{}", mm);
            assert!(!layout.splittable);
        }
    }

    #[test]
    fn test_exercise_patterns() {
        let fixture = Fixture::new();
        let ctx = fixture.ctx();
        let ruled = layout_exercise(ExerciseVariant::Ruled, 40.0, &ctx);
        // 40mm is 113.4pt; rules at 12..=96 stay clear of the 5pt inset.
        assert_eq!(count(&ruled, |c| matches!(c, DrawCommand::StrokeLine { .. })), 9);

        let blank = layout_exercise(ExerciseVariant::Blank, 40.0, &ctx);
        assert_eq!(blank.units[0].commands.len(), 1);

        let dots = layout_exercise(ExerciseVariant::Dotgrid, 40.0, &ctx);
        assert!(count(&dots, |c| matches!(c, DrawCommand::FillRect { .. })) > 100);

        let squares = layout_exercise(ExerciseVariant::Square, 40.0, &ctx);
        assert!(count(&squares, |c| matches!(c, DrawCommand::StrokeLine { .. })) > 10);
    }

    #[test]
    fn test_code_lines_not_wrapped() {
        let fixture = Fixture::new();
        let long = "x".repeat(500);
        let content = format!("fn main() {{\n\t{}\n}}\n", long);
        let layout = layout_code(&content, &fixture.ctx());

        assert_eq!(layout.units.len(), 3);
        assert!(layout.splittable);
        assert_eq!(layout.frame_padding(), 16.0);
        let texts: Vec<&str> = layout
            .units
            .iter()
            .flat_map(|u| u.commands.iter().filter_map(DrawCommand::text))
            .collect();
        assert_eq!(texts[1], format!("    {}", long));
    }

    #[test]
    fn test_empty_code_keeps_frame() {
        let fixture = Fixture::new();
        let layout = layout_code("", &fixture.ctx());
        assert_eq!(layout.units.len(), 1);
        assert!(layout.frame.is_some());
    }

    #[test]
    fn test_formula_centered() {
        let fixture = Fixture::new();
        let ctx = fixture.ctx();
        let layout = layout_formula(r"$$\alpha + \beta$$", &ctx);
        assert_eq!(layout.units.len(), 1);
        match &layout.units[0].commands[0] {
            DrawCommand::PlaceTextRun { x, size, text, .. } => {
                assert_eq!(text, "α + β");
                assert!((size - 13.2).abs() < 1e-9);
                let width = 5.0 * 0.5 * 13.2;
                assert!((x - (ctx.content_width - width) / 2.0).abs() < 1e-9);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_empty_formula_renders_nothing() {
        let fixture = Fixture::new();
        let layout = layout_formula("  $$ $$ ", &fixture.ctx());
        assert!(layout.units.is_empty());
        assert_eq!(layout.required_height(), 0.0);
    }

    #[test]
    fn test_break_height_grows_with_strength() {
        let fixture = Fixture::new();
        let ctx = fixture.ctx();
        let heights: Vec<f64> = [
            BreakStrength::ExtraLight,
            BreakStrength::Light,
            BreakStrength::Regular,
            BreakStrength::Strong,
        ]
        .iter()
        .map(|s| layout_break(*s, &ctx).content_height())
        .collect();
        assert_eq!(heights, vec![12.0, 14.0, 16.0, 18.0]);
    }

    fn with_image<'a>(fixture: &'a Fixture, resolver: &'a dyn crate::images::ImageResolver) -> LayoutContext<'a> {
        LayoutContext {
            images: resolver,
            ..fixture.ctx()
        }
    }

    #[test]
    fn test_image_width_from_pixels() {
        let fixture = Fixture::new();
        let resolver = |_: &str| Some(ImageInfo::new(200, 100, ImageHandle::new("pic")));
        let ctx = with_image(&fixture, &resolver);
        let layout = layout_image("pic.png", None, None, None, ImageFit::Contain, &ctx);

        assert_eq!(layout.content_height(), 100.0);
        match &layout.units[0].commands[0] {
            DrawCommand::PlaceImage { w, h, clip, .. } => {
                assert_eq!((*w, *h), (200.0, 100.0));
                assert!(clip.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_image_scaled_to_content_width() {
        let fixture = Fixture::new();
        let resolver = |_: &str| Some(ImageInfo::new(100, 100, ImageHandle::new("pic")));
        let ctx = with_image(&fixture, &resolver);
        let layout = layout_image("pic.png", None, Some(1000.0), None, ImageFit::Contain, &ctx);
        assert!((layout.content_height() - ctx.content_width).abs() < 1e-9);
    }

    #[test]
    fn test_image_cover_clips_to_box() {
        let fixture = Fixture::new();
        let resolver = |_: &str| Some(ImageInfo::new(200, 100, ImageHandle::new("pic")));
        let ctx = with_image(&fixture, &resolver);
        let layout = layout_image("pic.png", None, Some(50.0), Some(50.0), ImageFit::Cover, &ctx);
        let side = mm_to_pt(50.0);
        match &layout.units[0].commands[0] {
            DrawCommand::PlaceImage { w, h, clip: Some(clip), .. } => {
                assert!((h - side).abs() < 1e-9);
                assert!((w - 2.0 * side).abs() < 1e-9);
                assert!((clip.w - side).abs() < 1e-9);
                assert!((clip.h - side).abs() < 1e-9);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_missing_image_degrades_to_alt() {
        let fixture = Fixture::new();
        let ctx = fixture.ctx();
        let layout = layout_image("gone.png", Some("A chart"), None, None, ImageFit::Contain, &ctx);
        assert!(layout.degraded);
        let text = layout.units[0].commands.iter().find_map(DrawCommand::text);
        assert_eq!(text, Some("A chart"));

        let layout = layout_image("gone.png", None, None, None, ImageFit::Contain, &ctx);
        let text = layout.units[0].commands.iter().find_map(DrawCommand::text);
        assert_eq!(text, Some("[image: gone.png]"));
    }
}
