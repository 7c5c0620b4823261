//! Per-run translation and overlay planning.
//!
//! The patcher never touches the document. It records what to paint for a
//! run in a [`PagePatch`], and the page applies the whole patch at once when
//! it is committed.

use super::layout::ShowRef;
use super::run::PositionedRun;
use crate::config::TranslateConfig;
use crate::error::Result;
use crate::geometry::{Point, Rect};
use crate::language::TargetLanguage;
use crate::translator::TranslationBridge;
use crate::writer::FontChoice;

/// Margin (points) added around a run's box so antialiased glyph edges are
/// covered too.
const COVER_MARGIN: f32 = 0.5;

/// One cover-and-redraw operation.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayOp {
    /// Original run origin (top-left of its box)
    pub origin: Point,
    /// Baseline start the new text is drawn from
    pub baseline_origin: Point,
    /// Rectangle painted over the original run
    pub cover: Rect,
    /// Translated text as drawn
    pub text: String,
    /// Font the text is drawn with
    pub font: FontChoice,
    /// Font size, copied from the run
    pub font_size: f32,
}

/// Everything to change on one page.
#[derive(Debug, Clone, Default)]
pub struct PagePatch {
    /// Overlays in run order
    pub overlays: Vec<OverlayOp>,
    /// Original text-showing operators to erase
    pub erased: Vec<ShowRef>,
}

impl PagePatch {
    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }
}

/// Translates runs and plans their overlays.
pub struct LayoutPatcher<'a, 't> {
    bridge: &'a TranslationBridge<'t>,
    target: &'a TargetLanguage,
    config: &'a TranslateConfig,
}

impl<'a, 't> LayoutPatcher<'a, 't> {
    /// Create a patcher for one document.
    pub fn new(bridge: &'a TranslationBridge<'t>, target: &'a TargetLanguage, config: &'a TranslateConfig) -> Self {
        Self { bridge, target, config }
    }

    /// Translate `run` and add its overlay to `patch`.
    ///
    /// Translation failures are returned as-is; nothing is added to the
    /// patch in that case.
    pub fn patch(&self, run: &PositionedRun, patch: &mut PagePatch) -> Result<()> {
        let translated = self.bridge.translate(&run.text, self.target)?;
        let text = drawable_text(&translated);
        let font = FontChoice::choose(&run.font_name, &text, self.target, &self.config.fallback_font);

        log::debug!(
            "Run at ({:.1}, {:.1}) {} {:.1}pt: {:?} -> {:?}",
            run.origin.x,
            run.origin.y,
            font.base_font_name(),
            run.font_size,
            run.text,
            text
        );

        patch.overlays.push(OverlayOp {
            origin: run.origin,
            baseline_origin: run.baseline_origin,
            cover: run.bbox.expand(COVER_MARGIN),
            text,
            font,
            font_size: run.font_size,
        });
        if self.config.erase_original_glyphs {
            patch.erased.extend(run.sources.iter().copied());
        }
        Ok(())
    }
}

/// Single-line form of a translation: surrounding line breaks dropped, inner
/// control characters shown as spaces.
fn drawable_text(translated: &str) -> String {
    translated
        .trim_matches(|c| c == '\r' || c == '\n')
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::translator::Translator;
    use crate::writer::CjkFont;

    struct Fixed(&'static str);

    impl Translator for Fixed {
        fn translate(&self, _: &str, _: &TargetLanguage) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct Failing;

    impl Translator for Failing {
        fn translate(&self, _: &str, _: &TargetLanguage) -> Result<String> {
            Err(Error::TranslationFailure("quota exceeded".to_string()))
        }
    }

    fn run() -> PositionedRun {
        PositionedRun {
            text: "Hello".to_string(),
            origin: Point::new(100.0, 74.768),
            bbox: Rect::new(100.0, 74.768, 54.672, 22.2),
            baseline_origin: Point::new(100.0, 92.0),
            font_name: "Helvetica".to_string(),
            font_size: 24.0,
            sources: vec![ShowRef {
                op_index: 3,
                pen_adjustment: -2278.0,
            }],
        }
    }

    #[test]
    fn test_patch_records_overlay() {
        let backend = Fixed("你好\n");
        let bridge = TranslationBridge::new(&backend);
        let config = TranslateConfig::default();
        let target = TargetLanguage::Chinese;
        let patcher = LayoutPatcher::new(&bridge, &target, &config);

        let mut patch = PagePatch::default();
        patcher.patch(&run(), &mut patch).unwrap();

        assert_eq!(patch.overlays.len(), 1);
        let overlay = &patch.overlays[0];
        assert_eq!(overlay.text, "你好");
        assert_eq!(overlay.origin, Point::new(100.0, 74.768));
        assert_eq!(overlay.baseline_origin, Point::new(100.0, 92.0));
        assert_eq!(overlay.font, FontChoice::Cjk(CjkFont::SimplifiedChinese));
        assert_eq!(overlay.font_size, 24.0);
        assert!(overlay.cover.contains_rect(&run().bbox));
        assert_eq!(patch.erased.len(), 1);
        assert_eq!(patch.erased[0].op_index, 3);
    }

    #[test]
    fn test_patch_keeps_glyphs_when_erase_disabled() {
        let backend = Fixed("Hallo");
        let bridge = TranslationBridge::new(&backend);
        let config = TranslateConfig::default().with_erase_original_glyphs(false);
        let target = TargetLanguage::German;
        let patcher = LayoutPatcher::new(&bridge, &target, &config);

        let mut patch = PagePatch::default();
        patcher.patch(&run(), &mut patch).unwrap();
        assert_eq!(patch.overlays[0].font.base_font_name(), "Helvetica");
        assert!(patch.erased.is_empty());
    }

    #[test]
    fn test_failure_leaves_patch_untouched() {
        let bridge = TranslationBridge::new(&Failing);
        let config = TranslateConfig::default();
        let target = TargetLanguage::English;
        let patcher = LayoutPatcher::new(&bridge, &target, &config);

        let mut patch = PagePatch::default();
        let err = patcher.patch(&run(), &mut patch).unwrap_err();
        assert!(matches!(err, Error::TranslationFailure(_)));
        assert!(patch.is_empty());
        assert!(patch.erased.is_empty());
    }

    #[test]
    fn test_drawable_text() {
        assert_eq!(drawable_text("Hallo Welt\n"), "Hallo Welt");
        assert_eq!(drawable_text("a\tb\nc"), "a b c");
        assert_eq!(drawable_text(""), "");
    }
}
