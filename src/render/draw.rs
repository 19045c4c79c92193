//! Draw commands and laid-out pages.
//!
//! Coordinates are in points with the origin at the top-left corner of
//! the page and `y` growing downward. Text runs are positioned at their
//! baseline.

use serde::{Deserialize, Serialize};

use super::LayoutStats;
use crate::fonts::FontVariant;
use crate::images::ImageHandle;
use crate::style::Color;

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
}

/// One primitive drawing operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    PlaceTextRun {
        x: f64,
        y: f64,
        font: FontVariant,
        size: f64,
        color: Color,
        text: String,
    },
    StrokeLine {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        width: f64,
        color: Color,
    },
    FillRect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        color: Color,
        radius: f64,
    },
    StrokeRect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        width: f64,
        color: Color,
        radius: f64,
    },
    PlaceImage {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        handle: ImageHandle,
        /// Visible region when the image overflows its box
        #[serde(default, skip_serializing_if = "Option::is_none")]
        clip: Option<Rect>,
    },
}

impl DrawCommand {
    /// Shift the command by `(dx, dy)`.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        match self {
            DrawCommand::PlaceTextRun { x, y, .. }
            | DrawCommand::FillRect { x, y, .. }
            | DrawCommand::StrokeRect { x, y, .. } => {
                *x += dx;
                *y += dy;
            }
            DrawCommand::StrokeLine { x1, y1, x2, y2, .. } => {
                *x1 += dx;
                *y1 += dy;
                *x2 += dx;
                *y2 += dy;
            }
            DrawCommand::PlaceImage { x, y, clip, .. } => {
                *x += dx;
                *y += dy;
                if let Some(clip) = clip {
                    clip.x += dx;
                    clip.y += dy;
                }
            }
        }
    }

    /// A translated copy of the command.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        let mut cmd = self.clone();
        cmd.translate(dx, dy);
        cmd
    }

    /// Text carried by the command, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            DrawCommand::PlaceTextRun { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Vertical extent `(top, bottom)` of the command.
    ///
    /// Text runs report their baseline for both edges.
    pub fn vertical_extent(&self) -> (f64, f64) {
        match self {
            DrawCommand::PlaceTextRun { y, .. } => (*y, *y),
            DrawCommand::StrokeLine { y1, y2, .. } => (y1.min(*y2), y1.max(*y2)),
            DrawCommand::FillRect { y, h, .. }
            | DrawCommand::StrokeRect { y, h, .. }
            | DrawCommand::PlaceImage { y, h, .. } => (*y, *y + *h),
        }
    }
}

/// One laid-out page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedPage {
    /// 1-indexed page number
    pub number: u32,
    pub width: f64,
    pub height: f64,
    pub commands: Vec<DrawCommand>,
}

impl RenderedPage {
    pub fn new(number: u32, width: f64, height: f64) -> Self {
        Self {
            number,
            width,
            height,
            commands: Vec::new(),
        }
    }

    /// Check if nothing is drawn on the page.
    pub fn is_blank(&self) -> bool {
        self.commands.is_empty()
    }

    /// Text of every run placed on the page.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(DrawCommand::text)
    }
}

/// The complete output of one render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Family of the font the layout was measured with
    pub font_family: String,
    pub page_width: f64,
    pub page_height: f64,
    pub pages: Vec<RenderedPage>,
    pub stats: LayoutStats,
}

impl RenderedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Total number of draw commands across all pages.
    pub fn command_count(&self) -> usize {
        self.pages.iter().map(|p| p.commands.len()).sum()
    }

    /// All text runs in page order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flat_map(RenderedPage::texts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_line() {
        let line = DrawCommand::StrokeLine {
            x1: 0.0,
            y1: 1.0,
            x2: 10.0,
            y2: 1.0,
            width: 0.5,
            color: Color::BLACK,
        };
        let moved = line.translated(5.0, 100.0);
        assert_eq!(moved.vertical_extent(), (101.0, 101.0));
        match moved {
            DrawCommand::StrokeLine { x1, x2, .. } => assert_eq!((x1, x2), (5.0, 15.0)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_translate_image_clip() {
        let mut img = DrawCommand::PlaceImage {
            x: 0.0,
            y: 0.0,
            w: 10.0,
            h: 10.0,
            handle: ImageHandle::new("a"),
            clip: Some(Rect::new(1.0, 1.0, 5.0, 5.0)),
        };
        img.translate(2.0, 3.0);
        match img {
            DrawCommand::PlaceImage { clip: Some(clip), .. } => {
                assert_eq!(clip, Rect::new(3.0, 4.0, 5.0, 5.0))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_command_json_tag() {
        let cmd = DrawCommand::FillRect {
            x: 1.0,
            y: 2.0,
            w: 3.0,
            h: 4.0,
            color: Color::WHITE,
            radius: 0.0,
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.starts_with(r#"{"op":"fill_rect""#));
    }
}
