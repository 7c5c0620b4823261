//! Layout-preserving PDF translation.
//!
//! Each page is interpreted into a block/line/span layout tree, every
//! non-blank span becomes a [`PositionedRun`], and each run is translated and
//! replaced in place: its glyphs are erased, an opaque rectangle covers its
//! box and the translation is drawn from the same baseline with the same font
//! size. There is no reflow: text longer than its slot overflows to the
//! right.

pub mod assembler;
pub mod codec;
pub mod interpreter;
pub mod layout;
pub mod objects;
pub mod page;
pub mod patcher;
pub mod resources;
pub mod run;

pub use assembler::{PageAssembler, PageReport};
pub use codec::PdfDocument;
pub use interpreter::LayoutInterpreter;
pub use layout::{Block, ShowRef, TextLine, TextPage, TextSpan};
pub use page::PdfPage;
pub use patcher::{LayoutPatcher, OverlayOp, PagePatch};
pub use resources::{PageResources, XObjectKind};
pub use run::{PositionedRun, RunExtractor};
