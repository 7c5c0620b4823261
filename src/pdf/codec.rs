//! The page-fixed document codec.

use super::assembler::{PageAssembler, PageReport};
use super::layout::TextPage;
use super::page::PdfPage;
use crate::codec::{DocumentCodec, DocumentFormat, TranslationStats};
use crate::config::TranslateConfig;
use crate::error::{Error, Result};
use crate::language::TargetLanguage;
use crate::translator::TranslationBridge;
use lopdf::Document;

/// An open PDF.
///
/// # Examples
///
/// ```no_run
/// use doc_oxide::codec::DocumentCodec;
/// use doc_oxide::pdf::PdfDocument;
///
/// # fn main() -> doc_oxide::Result<()> {
/// let bytes = std::fs::read("paper.pdf")?;
/// let doc = PdfDocument::open(&bytes)?;
/// for (number, page) in doc.text_pages()?.iter().enumerate() {
///     println!("page {}: {}", number + 1, page.text());
/// }
/// # Ok(())
/// # }
/// ```
pub struct PdfDocument {
    doc: Document,
    reports: Vec<PageReport>,
    modified: bool,
}

impl PdfDocument {
    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Layout of every page, in page order.
    pub fn text_pages(&self) -> Result<Vec<TextPage>> {
        self.doc
            .get_pages()
            .into_iter()
            .map(|(number, id)| PdfPage::load(&self.doc, number, id).map(|page| page.text_page()))
            .collect()
    }

    /// Overlays drawn by the last [`DocumentCodec::translate`] call.
    pub fn page_reports(&self) -> &[PageReport] {
        &self.reports
    }

    /// Underlying `lopdf` document.
    pub fn inner(&self) -> &Document {
        &self.doc
    }
}

impl DocumentCodec for PdfDocument {
    const FORMAT: DocumentFormat = DocumentFormat::Pdf;

    fn open(bytes: &[u8]) -> Result<Self> {
        let mut doc = Document::load_mem(bytes).map_err(|e| Error::malformed("pdf", e))?;
        if doc.is_encrypted() {
            doc.decrypt("")
                .map_err(|e| Error::malformed("pdf", format!("cannot decrypt with an empty password: {}", e)))?;
            log::debug!("Decrypted PDF with the empty user password");
        }
        log::debug!("Opened PDF {} with {} pages", doc.version, doc.get_pages().len());
        Ok(Self {
            doc,
            reports: Vec::new(),
            modified: false,
        })
    }

    fn translate(
        &mut self,
        bridge: &TranslationBridge<'_>,
        target: &TargetLanguage,
        config: &TranslateConfig,
    ) -> Result<TranslationStats> {
        let (stats, reports) = PageAssembler::new(bridge, target, config).assemble(&mut self.doc)?;
        self.modified = stats.units_translated > 0;
        self.reports = reports;
        log::info!("PDF translated into {}: {}", target, stats);
        Ok(stats)
    }

    fn serialize(mut self) -> Result<Vec<u8>> {
        if self.modified {
            let pruned = self.doc.prune_objects();
            log::debug!("Pruned {} unreachable objects", pruned.len());
        }
        let mut out = Vec::new();
        self.doc
            .save_to(&mut out)
            .map_err(|e| Error::serialization("pdf", e))?;
        Ok(out)
    }
}
