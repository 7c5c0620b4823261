// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::too_many_arguments)]
#![allow(clippy::should_implement_trait)]
#![allow(clippy::match_like_matches_macro)]

//! # Doc Oxide
//!
//! Layout-preserving document translation for Word (`.docx`), PowerPoint
//! (`.pptx`) and PDF files.
//!
//! ## How each format is handled
//!
//! - **DOCX**: every paragraph of the main document (table cells included)
//!   is translated as one unit and written back with the first run's style.
//! - **PPTX**: every text shape is translated as one unit, slide by slide.
//! - **PDF**: each page's content stream is interpreted into positioned text
//!   runs. Every run is translated on its own; its glyphs are erased, an
//!   opaque rectangle covers its box, and the translation is drawn from the
//!   same baseline with the same font size. Nothing is reflowed: longer
//!   translations overflow to the right.
//!
//! The translation service itself is a [`Translator`]. The bundled
//! [`translator::OpenAiTranslator`] talks to any OpenAI-compatible
//! chat-completions endpoint; tests and embedders can plug in their own.
//!
//! ## Quick Start
//!
//! ```no_run
//! use doc_oxide::translator::OpenAiTranslator;
//! use doc_oxide::{translate_file, TargetLanguage, TranslateConfig};
//! use std::path::Path;
//!
//! # fn main() -> doc_oxide::Result<()> {
//! let translator = OpenAiTranslator::from_env()?;
//! let target: TargetLanguage = "zh".parse()?;
//! let output = translate_file(
//!     Path::new("report.pdf"),
//!     Path::new("out"),
//!     &target,
//!     &translator,
//!     &TranslateConfig::default(),
//! )?;
//! println!("{}", output.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure policy
//!
//! Every failure is terminal for the document: a single failed translation
//! call aborts the request and no partial output is produced. Retrying is
//! left to a wrapping translator such as
//! [`translator::RetryingTranslator`].

#![warn(missing_docs)]

// Error handling
pub mod error;

// Configuration
pub mod config;
pub mod language;

// Geometry and PDF content interpretation
pub mod content;
pub mod fonts;
pub mod geometry;

// Overlay content generation
pub mod writer;

// Format codecs
pub mod codec;
pub mod office;
pub mod pdf;

// Translation bridge
pub mod translator;

// Request orchestration
pub mod pipeline;

// Re-exports
pub use codec::{DocumentCodec, DocumentFormat, TranslationStats};
pub use config::{Color, TranslateConfig};
pub use error::{Error, Result};
pub use language::TargetLanguage;
pub use office::{DocxDocument, PptxDocument};
pub use pdf::{PdfDocument, PositionedRun, RunExtractor, TextPage};
pub use pipeline::{translate_bytes, translate_file, TranslatedDocument};
pub use translator::{TranslationBridge, Translator};
