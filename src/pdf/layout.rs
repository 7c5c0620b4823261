//! Page text layout tree: blocks, lines and spans.
//!
//! ```text
//! TextPage
//!  ├─ Block::Text ── TextLine ── TextSpan, TextSpan, ...
//!  │               └ TextLine ── TextSpan
//!  └─ Block::Image
//! ```
//!
//! A text block is one text object (`BT` ... `ET`). A span is a run of
//! glyphs sharing font, size and baseline; it always starts and ends on a
//! text-showing operator boundary, so every span knows exactly which
//! operators painted it.

use crate::geometry::{Point, Rect};

/// A text-showing operator that contributed glyphs to a span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShowRef {
    /// Index of the operator in the page's decoded content stream
    pub op_index: usize,
    /// `TJ` adjustment (thousandths of text space) that moves the pen by the
    /// same distance the operator's glyphs did
    pub pen_adjustment: f32,
}

/// A run of uniformly styled glyphs.
#[derive(Debug, Clone)]
pub struct TextSpan {
    /// Decoded text
    pub text: String,
    /// Bounding box in page space
    pub bbox: Rect,
    /// Start of the baseline (first glyph origin) in page space
    pub baseline_origin: Point,
    /// Base font name, subset tag removed
    pub font_name: String,
    /// Font resource name the span was shown with
    pub font_resource: String,
    /// Rendered font size (Tf size scaled by the text and CTM matrices)
    pub font_size: f32,
    /// Operators that painted this span, in content order
    pub sources: Vec<ShowRef>,
}

impl TextSpan {
    /// Top-left corner of the bounding box.
    pub fn origin(&self) -> Point {
        self.bbox.origin()
    }
}

/// Spans sharing a baseline within one block.
#[derive(Debug, Clone, Default)]
pub struct TextLine {
    /// Spans in content order
    pub spans: Vec<TextSpan>,
}

impl TextLine {
    /// Union of the span boxes.
    pub fn bbox(&self) -> Option<Rect> {
        let mut spans = self.spans.iter();
        let first = spans.next()?.bbox;
        Some(spans.fold(first, |acc, span| acc.union(&span.bbox)))
    }

    /// Line text, spans joined without separators.
    pub fn text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }
}

/// A layout block.
#[derive(Debug, Clone)]
pub enum Block {
    /// Text object
    Text {
        /// Lines in content order
        lines: Vec<TextLine>,
    },
    /// Painted image XObject
    Image {
        /// Image placement in page space
        bbox: Rect,
    },
}

impl Block {
    /// Whether this is a text block.
    pub fn is_text(&self) -> bool {
        matches!(self, Block::Text { .. })
    }
}

/// The layout of one page.
#[derive(Debug, Clone)]
pub struct TextPage {
    /// Page width
    pub width: f32,
    /// Page height
    pub height: f32,
    /// Blocks in content order
    pub blocks: Vec<Block>,
}

impl TextPage {
    /// All spans of all text blocks, in content order.
    pub fn spans(&self) -> impl Iterator<Item = &TextSpan> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Text { lines } => Some(lines),
                Block::Image { .. } => None,
            })
            .flatten()
            .flat_map(|line| line.spans.iter())
    }

    /// Page text, one line per layout line.
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Text { lines } => Some(lines),
                Block::Image { .. } => None,
            })
            .flatten()
            .map(TextLine::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, x: f32) -> TextSpan {
        TextSpan {
            text: text.to_string(),
            bbox: Rect::new(x, 10.0, 20.0, 12.0),
            baseline_origin: Point::new(x, 20.0),
            font_name: "Helvetica".to_string(),
            font_resource: "F1".to_string(),
            font_size: 12.0,
            sources: vec![],
        }
    }

    #[test]
    fn test_line_bbox_and_text() {
        let line = TextLine {
            spans: vec![span("Hello ", 0.0), span("World", 40.0)],
        };
        assert_eq!(line.text(), "Hello World");
        assert_eq!(line.bbox(), Some(Rect::new(0.0, 10.0, 60.0, 12.0)));
        assert_eq!(TextLine::default().bbox(), None);
    }

    #[test]
    fn test_page_spans_skip_image_blocks() {
        let page = TextPage {
            width: 612.0,
            height: 792.0,
            blocks: vec![
                Block::Image {
                    bbox: Rect::new(0.0, 0.0, 100.0, 100.0),
                },
                Block::Text {
                    lines: vec![
                        TextLine {
                            spans: vec![span("a", 0.0)],
                        },
                        TextLine {
                            spans: vec![span("b", 0.0)],
                        },
                    ],
                },
            ],
        };
        assert_eq!(page.spans().count(), 2);
        assert_eq!(page.text(), "a\nb");
        assert!(!page.blocks[0].is_text());
        assert_eq!(page.spans().next().map(|s| s.origin()), Some(Point::new(0.0, 10.0)));
    }
}
