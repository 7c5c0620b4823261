//! Content generation for patched pages.

pub mod content_stream;
pub mod font_manager;

pub use content_stream::{compress_data, ContentStreamBuilder, ContentStreamOp};
pub use font_manager::{CjkFont, FontChoice, FontRegistry};
