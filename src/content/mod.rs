//! PDF content stream interpretation.
//!
//! Content streams are decoded by `lopdf`; this module provides the typed
//! operator view and the graphics state machine the run extractor drives.
//! Inline images are split out of the raw stream first, since `lopdf` stops
//! decoding at the first one.

pub mod graphics_state;
pub mod inline_image;
pub mod operators;

pub use graphics_state::{GraphicsState, GraphicsStateStack, Matrix};
pub use inline_image::{count_operators, split_inline_images, ContentSegment};
pub use operators::{as_number, Operator, TextElement};
