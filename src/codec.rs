//! Container formats and the codec capability they share.

use crate::config::TranslateConfig;
use crate::error::{Error, Result};
use crate::language::TargetLanguage;
use crate::translator::TranslationBridge;
use std::fmt;
use std::path::Path;

/// Prefix of every output file name.
pub const OUTPUT_PREFIX: &str = "translated_";

/// A supported container format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    /// Word-processing package (`.docx`)
    Docx,
    /// Presentation package (`.pptx`)
    Pptx,
    /// Page-fixed document (`.pdf`)
    Pdf,
}

impl DocumentFormat {
    /// Pick the format from a file name's extension, case-insensitively.
    ///
    /// The extension is whatever follows the last dot, so a bare `.pdf`
    /// names a PDF.
    ///
    /// # Examples
    ///
    /// ```
    /// use doc_oxide::DocumentFormat;
    ///
    /// assert_eq!(DocumentFormat::from_file_name("Report.PDF").unwrap(), DocumentFormat::Pdf);
    /// assert!(DocumentFormat::from_file_name("notes.txt").is_err());
    /// ```
    pub fn from_file_name(name: &str) -> Result<Self> {
        let extension = name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
        match extension.as_deref() {
            Some("docx") => Ok(DocumentFormat::Docx),
            Some("pptx") => Ok(DocumentFormat::Pptx),
            Some("pdf") => Ok(DocumentFormat::Pdf),
            _ => Err(Error::UnsupportedFormat(name.to_string())),
        }
    }

    /// Like [`DocumentFormat::from_file_name`], for a path.
    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_file_name(&path.to_string_lossy())
    }

    /// Media type of the output.
    pub fn media_type(&self) -> &'static str {
        match self {
            DocumentFormat::Docx => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            DocumentFormat::Pptx => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
            DocumentFormat::Pdf => "application/pdf",
        }
    }

    /// Lowercase extension, also used as the format label in errors.
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Docx => "docx",
            DocumentFormat::Pptx => "pptx",
            DocumentFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Output name for an uploaded file: `translated_<name>`.
///
/// Only the final path component of `name` is kept.
pub fn output_file_name(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(name);
    format!("{}{}", OUTPUT_PREFIX, base)
}

/// Counters for one translated document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslationStats {
    /// Text units sent through the bridge (runs, paragraphs or shapes)
    pub units_translated: usize,
    /// Blank text units left alone
    pub units_skipped: usize,
    /// Pages, slides or paragraphs visited
    pub containers: usize,
}

impl fmt::Display for TranslationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} translated, {} skipped, {} containers",
            self.units_translated, self.units_skipped, self.containers
        )
    }
}

/// A container format that can be opened, translated in place and written
/// back.
pub trait DocumentCodec: Sized {
    /// Format handled by this codec.
    const FORMAT: DocumentFormat;

    /// Parse uploaded bytes. Failures are [`Error::MalformedContainer`].
    fn open(bytes: &[u8]) -> Result<Self>;

    /// Replace every text unit with its translation.
    ///
    /// The first failed translation aborts the document.
    fn translate(
        &mut self,
        bridge: &TranslationBridge<'_>,
        target: &TargetLanguage,
        config: &TranslateConfig,
    ) -> Result<TranslationStats>;

    /// Write the document back. Failures are [`Error::SerializationFailure`].
    fn serialize(self) -> Result<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_dispatch() {
        assert_eq!(DocumentFormat::from_file_name("a.docx").unwrap(), DocumentFormat::Docx);
        assert_eq!(DocumentFormat::from_file_name("deck.PpTx").unwrap(), DocumentFormat::Pptx);
        assert_eq!(DocumentFormat::from_file_name("dir/paper.pdf").unwrap(), DocumentFormat::Pdf);
        for name in ["notes.txt", "pdf", "archive.docx.zip", "", "paper.pdf/notes", "docx."] {
            assert!(matches!(DocumentFormat::from_file_name(name), Err(Error::UnsupportedFormat(_))));
        }
    }

    #[test]
    fn test_dot_file_names_are_accepted() {
        assert_eq!(DocumentFormat::from_file_name(".pdf").unwrap(), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::from_file_name("uploads/.DOCX").unwrap(), DocumentFormat::Docx);
        assert_eq!(DocumentFormat::from_path(Path::new("/tmp/.pptx")).unwrap(), DocumentFormat::Pptx);
    }

    #[test]
    fn test_media_types() {
        assert_eq!(DocumentFormat::Pdf.media_type(), "application/pdf");
        assert!(DocumentFormat::Docx.media_type().ends_with("wordprocessingml.document"));
        assert!(DocumentFormat::Pptx.media_type().ends_with("presentationml.presentation"));
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("report.pdf"), "translated_report.pdf");
        assert_eq!(output_file_name("/tmp/up/deck.pptx"), "translated_deck.pptx");
    }

    #[test]
    fn test_stats_display() {
        let stats = TranslationStats {
            units_translated: 3,
            units_skipped: 1,
            containers: 2,
        };
        assert_eq!(stats.to_string(), "3 translated, 1 skipped, 2 containers");
    }
}
