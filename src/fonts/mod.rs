//! Font handling and encoding.
//!
//! Font dictionary decoding, ToUnicode CMap parsing, WinAnsi/UCS-2 text
//! encoding, and the standard 14 fonts.

pub mod cmap;
pub mod encoding;
pub mod font_dict;
pub mod standard14;

pub use cmap::ToUnicode;
pub use font_dict::{strip_subset_tag, FontEncoding, FontInfo};
pub use standard14::StandardFont;
