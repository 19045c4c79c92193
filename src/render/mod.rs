//! Rendering: pagination and the page output handed to emitters.

mod draw;
mod json;
pub mod paginate;
mod result;
pub mod streaming;

pub use draw::{DrawCommand, Rect, RenderedDocument, RenderedPage};
pub use json::{to_json, JsonFormat};
pub use paginate::{paginate, PageCursor, Paginator, PaginatorState};
pub use result::LayoutStats;
pub use streaming::{PageStream, StreamEvent};
