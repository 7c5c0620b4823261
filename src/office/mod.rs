//! Office Open XML codecs.
//!
//! Both formats are zip packages of XML parts. Only the parts holding
//! translated text are re-serialized; everything else is copied through.

pub mod docx;
pub mod package;
pub mod pptx;
pub mod xml;

pub use docx::DocxDocument;
pub use package::Package;
pub use pptx::PptxDocument;
pub use xml::{Element, Node, XmlDocument};
