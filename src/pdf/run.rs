//! Positioned text runs and the per-page run extractor.

use super::layout::{ShowRef, TextPage, TextSpan};
use crate::geometry::{Point, Rect};

/// One contiguous span of same-styled text on a page.
///
/// Coordinates are page space (top-left origin) as fixed at extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedRun {
    /// Run text, never empty after trimming
    pub text: String,
    /// Top-left corner of the run's bounding box
    pub origin: Point,
    /// Bounding box of the painted glyphs
    pub bbox: Rect,
    /// Start of the baseline
    pub baseline_origin: Point,
    /// Font name, or the default font when the source name is unrecoverable
    pub font_name: String,
    /// Rendered font size, taken verbatim from the page
    pub font_size: f32,
    /// Operators that painted the run
    pub sources: Vec<ShowRef>,
}

impl PositionedRun {
    fn from_span(span: &TextSpan) -> Self {
        Self {
            text: span.text.clone(),
            origin: span.origin(),
            bbox: span.bbox,
            baseline_origin: span.baseline_origin,
            font_name: span.font_name.clone(),
            font_size: span.font_size,
            sources: span.sources.clone(),
        }
    }
}

/// Lazy sequence of the non-empty runs of one page.
///
/// Walks text blocks, then lines, then spans, in content order. Image blocks
/// are never visited. Whitespace-only spans are skipped and counted.
///
/// # Examples
///
/// ```
/// use doc_oxide::pdf::{RunExtractor, TextPage};
///
/// let page = TextPage { width: 612.0, height: 792.0, blocks: vec![] };
/// let mut runs = RunExtractor::new(&page);
/// assert!(runs.next().is_none());
/// assert_eq!(runs.skipped(), 0);
/// ```
pub struct RunExtractor<'p> {
    spans: Box<dyn Iterator<Item = &'p TextSpan> + 'p>,
    skipped: usize,
}

impl<'p> RunExtractor<'p> {
    /// Start extracting runs from a page layout.
    pub fn new(page: &'p TextPage) -> Self {
        Self {
            spans: Box::new(page.spans()),
            skipped: 0,
        }
    }

    /// Number of whitespace-only spans skipped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl Iterator for RunExtractor<'_> {
    type Item = PositionedRun;

    fn next(&mut self) -> Option<PositionedRun> {
        for span in self.spans.by_ref() {
            if span.text.trim().is_empty() {
                log::trace!("Skipping blank span at {:?}", span.baseline_origin);
                self.skipped += 1;
                continue;
            }
            return Some(PositionedRun::from_span(span));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::layout::{Block, TextLine};

    fn span(text: &str, x: f32, y: f32) -> TextSpan {
        TextSpan {
            text: text.to_string(),
            bbox: Rect::new(x, y - 10.0, 30.0, 12.0),
            baseline_origin: Point::new(x, y),
            font_name: "Helvetica".to_string(),
            font_resource: "F1".to_string(),
            font_size: 12.0,
            sources: vec![ShowRef {
                op_index: 3,
                pen_adjustment: -1500.0,
            }],
        }
    }

    fn page(lines: Vec<Vec<TextSpan>>) -> TextPage {
        TextPage {
            width: 612.0,
            height: 792.0,
            blocks: vec![
                Block::Image {
                    bbox: Rect::new(0.0, 0.0, 50.0, 50.0),
                },
                Block::Text {
                    lines: lines.into_iter().map(|spans| TextLine { spans }).collect(),
                },
            ],
        }
    }

    #[test]
    fn test_runs_in_content_order() {
        let page = page(vec![vec![span("Hello", 72.0, 100.0), span("World", 120.0, 100.0)]]);
        let runs: Vec<_> = RunExtractor::new(&page).collect();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].text, "Hello");
        assert_eq!(runs[1].text, "World");
        assert_eq!(runs[0].origin, Point::new(72.0, 90.0));
        assert_eq!(runs[0].font_size, 12.0);
        assert_eq!(runs[0].sources[0].op_index, 3);
    }

    #[test]
    fn test_blank_spans_are_skipped_and_counted() {
        let page = page(vec![
            vec![span("  ", 72.0, 100.0), span("Text", 100.0, 100.0)],
            vec![span("\t\n", 72.0, 120.0)],
        ]);
        let mut runs = RunExtractor::new(&page);
        assert_eq!(runs.next().map(|r| r.text), Some("Text".to_string()));
        assert!(runs.next().is_none());
        assert_eq!(runs.skipped(), 2);
    }

    #[test]
    fn test_extractor_is_not_restartable() {
        let page = page(vec![vec![span("Once", 72.0, 100.0)]]);
        let mut runs = RunExtractor::new(&page);
        assert_eq!(runs.by_ref().count(), 1);
        assert!(runs.next().is_none());
    }
}
