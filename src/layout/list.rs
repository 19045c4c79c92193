//! Bullet, numbered, task and toggle lists.
//!
//! Items are flattened depth-first. Every wrapped line of every item is
//! its own unit, so a list can split between items and inside a long item.

use super::text::shaped_units;
use super::{BaseStyle, BlockKind, BlockLayout, LayoutContext, LayoutUnit};
use crate::fonts::FontVariant;
use crate::model::{ListItem, ListVariant};
use crate::render::DrawCommand;
use crate::style::Color;

const BULLET: &str = "•";
const TOGGLE_CLOSED: &str = "▶";
const TOGGLE_OPEN: &str = "▼";
const CHECKBOX_SIZE: f64 = 10.0;
const CHECKBOX_RADIUS: f64 = 2.0;
const CHECK_STROKE: f64 = 1.5;

pub(super) fn layout_list(
    variant: ListVariant,
    items: &[ListItem],
    ctx: &LayoutContext<'_>,
) -> BlockLayout {
    let mut entries = Vec::new();
    flatten(variant, items, 0, ctx, &mut entries);
    if entries.is_empty() {
        return BlockLayout::empty(BlockKind::List);
    }

    let theme = ctx.theme();
    let item_gap = theme.spacing.list_item_gap;
    let last = entries.len() - 1;
    let mut lines = 0;
    let mut units = Vec::new();
    for (i, mut entry) in entries.into_iter().enumerate() {
        lines += entry.lines;
        if i < last {
            if let Some(unit) = entry.units.last_mut() {
                unit.height += item_gap;
            }
        }
        units.append(&mut entry.units);
    }

    BlockLayout::empty(BlockKind::List)
        .with_spacing(theme.spacing.section_gap, theme.spacing.paragraph_gap)
        .with_units(units)
        .splittable(1, 1)
        .counting_lines(lines)
        .counting_items(items.iter().map(ListItem::count).sum())
}

struct Entry {
    units: Vec<LayoutUnit>,
    lines: usize,
}

fn flatten(
    variant: ListVariant,
    items: &[ListItem],
    depth: usize,
    ctx: &LayoutContext<'_>,
    out: &mut Vec<Entry>,
) {
    for (index, item) in items.iter().enumerate() {
        out.push(layout_item(variant, item, index, depth, ctx));
        flatten(variant, &item.children, depth + 1, ctx, out);
    }
}

/// Left edge of the marker at `depth`.
///
/// Indentation stops growing past the configured depth, and never leaves
/// less than the minimum text width.
pub(super) fn marker_indent(depth: usize, ctx: &LayoutContext<'_>) -> f64 {
    let indent_unit = ctx.theme().spacing.list_indent;
    let wanted = depth.min(ctx.options.max_list_depth) as f64 * indent_unit;
    let widest = ctx.content_width - indent_unit - ctx.options.min_text_width;
    wanted.min(widest).max(0.0)
}

fn layout_item(
    variant: ListVariant,
    item: &ListItem,
    index: usize,
    depth: usize,
    ctx: &LayoutContext<'_>,
) -> Entry {
    let theme = ctx.theme();
    let indent = marker_indent(depth, ctx);
    let text_x = indent + theme.spacing.list_indent;
    let width = (ctx.content_width - text_x).max(1.0);
    let base = BaseStyle::new(theme.sizes.body, theme.palette.text_primary);
    let spans = super::formula::expand_inline_math(&item.spans);
    let shaped = ctx.shaper().shape(&spans, width, &base);

    let body = base.text_style();
    let (mut units, first_height, first_ascent) = match shaped.lines.first() {
        Some(line) => (shaped_units(&shaped, text_x), line.height, line.ascent),
        None => {
            let height = ctx.metrics.line_height(&body);
            (vec![LayoutUnit::new(height, Vec::new())], height, ctx.metrics.ascent(&body))
        }
    };

    let marker = marker_commands(variant, item, index, indent, first_height, first_ascent, ctx);
    if let Some(first) = units.first_mut() {
        let text = std::mem::take(&mut first.commands);
        first.commands = marker;
        first.commands.extend(text);
    }

    Entry {
        units,
        lines: shaped.lines.len(),
    }
}

fn marker_commands(
    variant: ListVariant,
    item: &ListItem,
    index: usize,
    x: f64,
    line_height: f64,
    ascent: f64,
    ctx: &LayoutContext<'_>,
) -> Vec<DrawCommand> {
    let palette = &ctx.theme().palette;
    let size = ctx.theme().sizes.body;
    let glyph = |text: String, color: Color| {
        vec![DrawCommand::PlaceTextRun {
            x,
            y: ascent,
            font: FontVariant::Regular,
            size,
            color,
            text,
        }]
    };

    match variant {
        ListVariant::Bullet => glyph(BULLET.to_string(), palette.text_primary),
        ListVariant::Number => glyph(format!("{}.", index + 1), palette.text_primary),
        ListVariant::Toggle => {
            let marker = if item.children.is_empty() {
                TOGGLE_CLOSED
            } else {
                TOGGLE_OPEN
            };
            glyph(marker.to_string(), palette.text_muted)
        }
        ListVariant::Task => checkbox(item.checked, x, (line_height - CHECKBOX_SIZE) / 2.0, ctx),
    }
}

fn checkbox(checked: bool, x: f64, y: f64, ctx: &LayoutContext<'_>) -> Vec<DrawCommand> {
    let palette = &ctx.theme().palette;
    if !checked {
        return vec![DrawCommand::StrokeRect {
            x,
            y,
            w: CHECKBOX_SIZE,
            h: CHECKBOX_SIZE,
            width: 1.0,
            color: palette.line_light,
            radius: CHECKBOX_RADIUS,
        }];
    }

    let s = CHECKBOX_SIZE;
    let check = |x1: f64, y1: f64, x2: f64, y2: f64| DrawCommand::StrokeLine {
        x1: x + x1 * s,
        y1: y + y1 * s,
        x2: x + x2 * s,
        y2: y + y2 * s,
        width: CHECK_STROKE,
        color: palette.accent,
    };
    vec![
        DrawCommand::FillRect {
            x,
            y,
            w: s,
            h: s,
            color: palette.accent.over(Color::WHITE, 0.2),
            radius: CHECKBOX_RADIUS,
        },
        check(0.2, 0.5, 0.42, 0.72),
        check(0.42, 0.72, 0.8, 0.28),
    ]
}
