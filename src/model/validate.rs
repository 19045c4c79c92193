//! Whole-document validation, run before any layout work.

use crate::error::{Error, Result};

use super::block::{Block, ListItem};
use super::document::Document;
use super::span::Span;

/// Largest accepted margin, in millimetres.
pub const MAX_MARGIN_MM: f64 = 50.0;

/// Check a document for malformed fields.
///
/// Returns the first problem found, in document order.
pub fn validate(doc: &Document) -> Result<()> {
    validate_margin(doc.meta.margin_mm, "meta.margin_mm")?;

    for (index, block) in doc.blocks.iter().enumerate() {
        validate_block(block, &format!("blocks[{}]", index))?;
    }

    Ok(())
}

/// Check a margin in millimetres against `[0, MAX_MARGIN_MM]`.
pub fn validate_margin(margin: f64, path: &str) -> Result<()> {
    if !margin.is_finite() || !(0.0..=MAX_MARGIN_MM).contains(&margin) {
        return Err(Error::validation(
            path,
            format!("margin must be between 0 and {} mm, got {}", MAX_MARGIN_MM, margin),
        ));
    }
    Ok(())
}

fn validate_block(block: &Block, path: &str) -> Result<()> {
    match block {
        Block::Heading { level, spans } => {
            if !(1..=3).contains(level) {
                return Err(Error::validation(
                    format!("{}.level", path),
                    format!("heading level must be 1, 2 or 3, got {}", level),
                ));
            }
            validate_spans(spans, &format!("{}.text", path))
        }
        Block::Paragraph { spans } | Block::Caption { spans } => {
            validate_spans(spans, &format!("{}.text", path))
        }
        Block::List { items, .. } => validate_items(items, &format!("{}.items", path)),
        Block::Table {
            columns,
            widths,
            rows,
        } => {
            if *columns == 0 {
                return Err(Error::validation(
                    format!("{}.columns", path),
                    "table must have at least one column",
                ));
            }
            if let Some(widths) = widths {
                if widths.len() != *columns {
                    return Err(Error::validation(
                        format!("{}.widths", path),
                        format!("widths length must match columns count ({})", columns),
                    ));
                }
                if let Some(bad) = widths.iter().position(|w| !w.is_finite() || *w < 0.0) {
                    return Err(Error::validation(
                        format!("{}.widths[{}]", path, bad),
                        "column width must be a non-negative number",
                    ));
                }
                if widths.iter().sum::<f64>() <= 0.0 {
                    return Err(Error::validation(
                        format!("{}.widths", path),
                        "column widths must not all be zero",
                    ));
                }
            }
            for (r, row) in rows.iter().enumerate() {
                let row_path = format!("{}.rows[{}].cells", path, r);
                if row.cells.len() != *columns {
                    return Err(Error::validation(
                        row_path,
                        format!(
                            "row has {} cells but the table has {} columns",
                            row.cells.len(),
                            columns
                        ),
                    ));
                }
                for (c, cell) in row.cells.iter().enumerate() {
                    validate_spans(cell, &format!("{}[{}]", row_path, c))?;
                }
            }
            Ok(())
        }
        Block::Image {
            src,
            width_mm,
            height_mm,
            ..
        } => {
            if src.trim().is_empty() {
                return Err(Error::validation(
                    format!("{}.src", path),
                    "image source must not be empty",
                ));
            }
            check_dimension(*width_mm, &format!("{}.width_mm", path))?;
            check_dimension(*height_mm, &format!("{}.height_mm", path))
        }
        Block::Exercise { height_mm, .. } => {
            if !height_mm.is_finite() {
                return Err(Error::validation(
                    format!("{}.height_mm", path),
                    "exercise height must be a number",
                ));
            }
            Ok(())
        }
        Block::Code { .. }
        | Block::Formula { .. }
        | Block::Break { .. }
        | Block::PageBreak => Ok(()),
    }
}

fn validate_items(items: &[ListItem], path: &str) -> Result<()> {
    for (index, item) in items.iter().enumerate() {
        let item_path = format!("{}[{}]", path, index);
        validate_spans(&item.spans, &format!("{}.text", item_path))?;
        validate_items(&item.children, &format!("{}.children", item_path))?;
    }
    Ok(())
}

// NUL is the only character rejected in span text.
fn validate_spans(spans: &[Span], path: &str) -> Result<()> {
    match spans.iter().position(|s| s.text.contains('\0')) {
        Some(index) => Err(Error::validation(
            format!("{}[{}]", path, index),
            "text must not contain NUL characters",
        )),
        None => Ok(()),
    }
}

fn check_dimension(value: Option<f64>, path: &str) -> Result<()> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(Error::validation(
            path,
            format!("dimension must be a non-negative number, got {}", v),
        )),
        _ => Ok(()),
    }
}
