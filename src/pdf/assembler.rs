//! Page-by-page translation of a whole PDF.

use super::page::PdfPage;
use super::patcher::{LayoutPatcher, OverlayOp, PagePatch};
use super::run::RunExtractor;
use crate::codec::TranslationStats;
use crate::config::TranslateConfig;
use crate::error::Result;
use crate::language::TargetLanguage;
use crate::translator::TranslationBridge;
use lopdf::Document;

/// Overlays committed to one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageReport {
    /// Page number, starting at 1
    pub page_number: u32,
    /// Overlays in the order they were drawn
    pub overlays: Vec<OverlayOp>,
}

/// Drives extraction, patching and commit over every page in order.
pub struct PageAssembler<'a, 't> {
    patcher: LayoutPatcher<'a, 't>,
    config: &'a TranslateConfig,
}

impl<'a, 't> PageAssembler<'a, 't> {
    /// Create an assembler for one document.
    pub fn new(bridge: &'a TranslationBridge<'t>, target: &'a TargetLanguage, config: &'a TranslateConfig) -> Self {
        Self {
            patcher: LayoutPatcher::new(bridge, target, config),
            config,
        }
    }

    /// Translate every page. Stops at the first error; pages committed before
    /// it stay modified in `doc`, so the caller must drop the document.
    pub fn assemble(&self, doc: &mut Document) -> Result<(TranslationStats, Vec<PageReport>)> {
        let mut stats = TranslationStats::default();
        let mut reports = Vec::new();

        for (number, id) in doc.get_pages() {
            let page = PdfPage::load(doc, number, id)?;
            let layout = page.text_page();

            let mut runs = RunExtractor::new(&layout);
            let mut patch = PagePatch::default();
            for run in runs.by_ref() {
                self.patcher.patch(&run, &mut patch)?;
            }
            stats.units_skipped += runs.skipped();
            stats.units_translated += patch.overlays.len();
            stats.containers += 1;

            page.commit(doc, &patch, self.config)?;
            log::debug!("Page {}: {} runs patched", number, patch.overlays.len());
            reports.push(PageReport {
                page_number: number,
                overlays: patch.overlays,
            });
        }

        Ok((stats, reports))
    }
}
