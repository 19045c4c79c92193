//! Document model types.
//!
//! A [`Document`] is the declarative input of the engine: page metadata
//! plus an ordered list of typed [`Block`]s carrying rich-text [`Span`]s.
//! The model mirrors the JSON wire format one to one.

mod block;
mod document;
mod span;
mod validate;

pub use block::{
    Block, BreakStrength, ExerciseVariant, ImageFit, ListItem, ListVariant, TableRow,
};
pub use document::{mm_to_pt, Document, Meta, PageSize, MM_TO_PT};
pub use span::{plain_text, Highlight, Span, TextColor};
pub use validate::{validate, validate_margin, MAX_MARGIN_MM};
