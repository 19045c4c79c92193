//! Tables.
//!
//! Each row is one unit. Cells are shaped independently at their column
//! width and vertically centered in the row; the row is as tall as its
//! tallest cell plus padding above and below. The first row is the header.

use super::text::line_commands;
use super::{BaseStyle, BlockKind, BlockLayout, Frame, LayoutContext, LayoutUnit, ShapedText};
use crate::model::TableRow;
use crate::render::DrawCommand;

const SEPARATOR_WIDTH: f64 = 0.5;
const BORDER_WIDTH: f64 = 1.0;
const BORDER_RADIUS: f64 = 4.0;

/// Column `(x, width)` pairs across `total_width`.
///
/// Explicit widths are treated as proportions. Without them, or when they
/// cannot be normalized, columns share the width equally.
pub fn column_layout(widths: Option<&[f64]>, columns: usize, total_width: f64) -> Vec<(f64, f64)> {
    if columns == 0 {
        return Vec::new();
    }
    let proportions: Vec<f64> = match widths {
        Some(w) if w.len() == columns && w.iter().all(|v| v.is_finite() && *v >= 0.0) => {
            let sum: f64 = w.iter().sum();
            if sum > 0.0 {
                w.iter().map(|v| v / sum).collect()
            } else {
                vec![1.0 / columns as f64; columns]
            }
        }
        _ => vec![1.0 / columns as f64; columns],
    };

    let mut x = 0.0;
    proportions
        .into_iter()
        .map(|p| {
            let width = p * total_width;
            let column = (x, width);
            x += width;
            column
        })
        .collect()
}

pub(super) fn layout_table(
    columns: usize,
    widths: Option<&[f64]>,
    rows: &[TableRow],
    ctx: &LayoutContext<'_>,
) -> BlockLayout {
    if columns == 0 || rows.is_empty() {
        return BlockLayout::empty(BlockKind::Table);
    }

    let theme = ctx.theme();
    let layout = column_layout(widths, columns, ctx.content_width);
    let last = rows.len() - 1;
    let mut lines = 0;
    let units: Vec<LayoutUnit> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let (unit, row_lines) = layout_row(row, i == 0, i == last, &layout, ctx);
            lines += row_lines;
            unit
        })
        .collect();

    let repeat_head = (ctx.options.repeat_table_header && rows.len() > 1)
        .then(|| units[0].clone());
    // A piece holding only the header is not useful.
    let min_head = if rows.len() > 2 { 2 } else { 1 };

    let mut block = BlockLayout::empty(BlockKind::Table)
        .with_spacing(theme.spacing.section_gap, theme.spacing.section_gap)
        .with_units(units)
        .splittable(min_head, 1)
        .with_frame(Frame {
            padding: 0.0,
            fill: None,
            stroke: Some((BORDER_WIDTH, theme.palette.line_light)),
            radius: BORDER_RADIUS,
            width: ctx.content_width,
        })
        .counting_lines(lines)
        .counting_items(rows.len());
    block.repeat_head = repeat_head;
    block
}

fn layout_row(
    row: &TableRow,
    header: bool,
    last: bool,
    columns: &[(f64, f64)],
    ctx: &LayoutContext<'_>,
) -> (LayoutUnit, usize) {
    let theme = ctx.theme();
    let pad = theme.spacing.table_cell_padding;
    let mut base = BaseStyle::new(theme.sizes.body, theme.palette.text_primary);
    if header {
        base = base.bold();
    }

    let shaper = ctx.shaper();
    let cells: Vec<ShapedText> = columns
        .iter()
        .zip(&row.cells)
        .map(|(&(_, width), spans)| {
            let spans = super::formula::expand_inline_math(spans);
            shaper.shape(&spans, (width - 2.0 * pad).max(1.0), &base)
        })
        .collect();

    let tallest = cells
        .iter()
        .map(ShapedText::total_height)
        .fold(ctx.metrics.line_height(&base.text_style()), f64::max);
    let height = tallest + 2.0 * pad;
    let total_width = ctx.content_width;

    let mut commands = Vec::new();
    if header {
        commands.push(DrawCommand::FillRect {
            x: 0.0,
            y: 0.0,
            w: total_width,
            h: height,
            color: theme.palette.table_header_background,
            radius: 0.0,
        });
    }

    for (&(x, _), shaped) in columns.iter().zip(&cells) {
        let mut top = (height - shaped.total_height()) / 2.0;
        for line in &shaped.lines {
            commands.extend(line_commands(line, x + pad, top));
            top += line.height + shaped.line_gap;
        }
    }

    let separator = |x1: f64, y1: f64, x2: f64, y2: f64| DrawCommand::StrokeLine {
        x1,
        y1,
        x2,
        y2,
        width: SEPARATOR_WIDTH,
        color: theme.palette.line_light,
    };
    for &(x, _) in columns.iter().skip(1) {
        commands.push(separator(x, 0.0, x, height));
    }
    if !last {
        commands.push(separator(0.0, height, total_width, height));
    }

    let lines = cells.iter().map(|c| c.lines.len()).sum();
    (LayoutUnit::new(height, commands), lines)
}
