//! Content stream interpreter that builds a page's [`TextPage`].
//!
//! Glyph positions follow the text rendering matrix
//! `Trm = [Tfs·Th 0 0 Tfs 0 Trise] × Tm × CTM`; after each glyph the text
//! matrix advances by `tx = (w0·Tfs + Tc + Tw) · Th` (Tw only for the
//! single-byte code 32).

use super::layout::{Block, ShowRef, TextLine, TextPage, TextSpan};
use super::resources::{PageResources, XObjectKind, DEFAULT_FONT_NAME};
use crate::content::{GraphicsStateStack, Matrix, Operator, TextElement};
use crate::geometry::{PageSpace, Point, Rect};
use lopdf::content::Operation;

/// TJ offsets moving the pen right by more than this (in em) read as a space.
const TJ_SPACE_THRESHOLD: f32 = 0.2;
/// Horizontal gap between operators (in em) that reads as a space.
const GAP_SPACE_THRESHOLD: f32 = 0.2;
/// Horizontal gap (in em) that starts a new span.
const GAP_SPLIT_THRESHOLD: f32 = 2.0;
/// Backwards movement (in em) that starts a new span.
const BACKTRACK_SPLIT_THRESHOLD: f32 = 0.5;
/// Baseline difference (in em) still treated as the same baseline.
const BASELINE_TOLERANCE: f32 = 0.1;

/// Glyphs painted by one text-showing operator.
#[derive(Debug)]
struct Chunk {
    op_index: usize,
    text: String,
    bbox: Rect,
    start: Point,
    end_x: f32,
    font_resource: String,
    font_name: String,
    font_size: f32,
    pen_adjustment: f32,
}

impl Chunk {
    fn into_span(self) -> (TextSpan, f32) {
        let span = TextSpan {
            text: self.text,
            bbox: self.bbox,
            baseline_origin: self.start,
            font_name: self.font_name,
            font_resource: self.font_resource,
            font_size: self.font_size,
            sources: vec![ShowRef {
                op_index: self.op_index,
                pen_adjustment: self.pen_adjustment,
            }],
        };
        (span, self.end_x)
    }
}

/// Builds the layout tree of one page from its decoded operations.
pub struct LayoutInterpreter<'a> {
    resources: &'a PageResources,
    space: PageSpace,
    gs: GraphicsStateStack,
    tm: Matrix,
    tlm: Matrix,
    blocks: Vec<Block>,
    lines: Vec<TextLine>,
    /// Open span and the page-space x where its last glyph ended
    current: Option<(TextSpan, f32)>,
}

impl<'a> LayoutInterpreter<'a> {
    /// Create an interpreter for a page.
    pub fn new(resources: &'a PageResources, space: PageSpace) -> Self {
        Self {
            resources,
            space,
            gs: GraphicsStateStack::new(),
            tm: Matrix::identity(),
            tlm: Matrix::identity(),
            blocks: Vec::new(),
            lines: Vec::new(),
            current: None,
        }
    }

    /// Interpret the operations and return the page layout.
    pub fn run(mut self, operations: &[Operation]) -> TextPage {
        for (index, op) in operations.iter().enumerate() {
            self.execute(index, Operator::from_operation(op));
        }
        self.close_block();

        TextPage {
            width: self.space.width(),
            height: self.space.height(),
            blocks: self.blocks,
        }
    }

    fn execute(&mut self, index: usize, op: Operator) {
        match op {
            Operator::SaveState => self.gs.save(),
            Operator::RestoreState => self.gs.restore(),
            Operator::Cm([a, b, c, d, e, f]) => {
                let state = self.gs.current_mut();
                state.ctm = Matrix::new(a, b, c, d, e, f).multiply(&state.ctm);
            },
            Operator::BeginText => {
                self.close_block();
                self.tm = Matrix::identity();
                self.tlm = Matrix::identity();
            },
            Operator::EndText => self.close_block(),
            Operator::Tc(v) => self.gs.current_mut().char_space = v,
            Operator::Tw(v) => self.gs.current_mut().word_space = v,
            Operator::Tz(v) => self.gs.current_mut().horizontal_scaling = v,
            Operator::TL(v) => self.gs.current_mut().leading = v,
            Operator::Ts(v) => self.gs.current_mut().text_rise = v,
            Operator::Tr(v) => self.gs.current_mut().render_mode = v,
            Operator::Tf { font, size } => {
                let state = self.gs.current_mut();
                state.font_name = Some(font);
                state.font_size = size;
            },
            Operator::Td { tx, ty } => self.move_line(tx, ty),
            Operator::TD { tx, ty } => {
                self.gs.current_mut().leading = -ty;
                self.move_line(tx, ty);
            },
            Operator::Tm([a, b, c, d, e, f]) => {
                self.tlm = Matrix::new(a, b, c, d, e, f);
                self.tm = self.tlm;
            },
            Operator::TStar => self.next_line(),
            Operator::Tj(bytes) => self.show(index, &[TextElement::String(bytes)]),
            Operator::TJ(elements) => self.show(index, &elements),
            Operator::Quote(bytes) => {
                self.next_line();
                self.show(index, &[TextElement::String(bytes)]);
            },
            Operator::DoubleQuote {
                word_space,
                char_space,
                text,
            } => {
                let state = self.gs.current_mut();
                state.word_space = word_space;
                state.char_space = char_space;
                self.next_line();
                self.show(index, &[TextElement::String(text)]);
            },
            Operator::Do(name) => self.paint_xobject(&name),
            Operator::InlineImage => self.paint_image(),
            Operator::Other => {},
        }
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.tlm = Matrix::translation(tx, ty).multiply(&self.tlm);
        self.tm = self.tlm;
    }

    fn next_line(&mut self) {
        let leading = self.gs.current().leading;
        self.move_line(0.0, -leading);
    }

    fn paint_xobject(&mut self, name: &str) {
        match self.resources.xobject(name) {
            XObjectKind::Image => self.paint_image(),
            XObjectKind::Form => log::debug!("Not descending into form XObject /{}", name),
            XObjectKind::Other => log::trace!("Ignoring XObject /{}", name),
        }
    }

    /// Images fill the unit square of the current CTM.
    fn paint_image(&mut self) {
        let ctm = self.gs.current().ctm;
        let bbox = self.page_rect(&ctm, 0.0, 0.0, 1.0, 1.0);
        self.blocks.push(Block::Image { bbox });
    }

    /// Page-space bounding box of a rectangle given in the space of `m`.
    fn page_rect(&self, m: &Matrix, x0: f32, y0: f32, x1: f32, y1: f32) -> Rect {
        let corners = [
            m.transform_point(x0, y0),
            m.transform_point(x1, y0),
            m.transform_point(x0, y1),
            m.transform_point(x1, y1),
        ]
        .map(|p| self.space.to_page(p.x, p.y));
        let min_x = corners.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
        let max_x = corners.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
        let min_y = corners.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        let max_y = corners.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
        Rect::from_corners(min_x, min_y, max_x, max_y)
    }

    fn show(&mut self, op_index: usize, elements: &[TextElement]) {
        let state = self.gs.current().clone();
        let resource = state.font_name.clone().unwrap_or_default();
        let resources = self.resources;
        let font = resources.font(&resource);
        let tfs = state.font_size;
        let th = state.h_scale();

        let mut text = String::new();
        let mut bbox: Option<Rect> = None;
        let mut start: Option<Point> = None;
        let mut font_size = 0.0;
        let mut advance = 0.0;
        let mut pending_space = false;

        for element in elements {
            match element {
                TextElement::String(bytes) => {
                    for code in font.codes(bytes) {
                        let w0 = font.glyph_width(code) / 1000.0;
                        let trm = Matrix::new(tfs * th, 0.0, 0.0, tfs, 0.0, state.text_rise)
                            .multiply(&self.tm)
                            .multiply(&state.ctm);

                        if start.is_none() {
                            let origin = trm.transform_point(0.0, 0.0);
                            start = Some(self.space.to_page(origin.x, origin.y));
                            font_size = tfs * self.tm.multiply(&state.ctm).vertical_scale();
                        }

                        let glyph_box =
                            self.page_rect(&trm, 0.0, font.descent / 1000.0, w0, font.ascent / 1000.0);
                        bbox = Some(match bbox {
                            Some(b) => b.union(&glyph_box),
                            None => glyph_box,
                        });

                        let decoded = font.decode_code(code);
                        if pending_space && !decoded.is_empty() {
                            if !text.ends_with(char::is_whitespace) && !decoded.starts_with(char::is_whitespace) {
                                text.push(' ');
                            }
                            pending_space = false;
                        }
                        text.push_str(&decoded);

                        let mut tx = w0 * tfs + state.char_space;
                        if font.is_single_byte() && code == 32 {
                            tx += state.word_space;
                        }
                        tx *= th;
                        self.tm = Matrix::translation(tx, 0.0).multiply(&self.tm);
                        advance += tx;
                    }
                },
                TextElement::Offset(n) => {
                    let tx = -n / 1000.0 * tfs * th;
                    self.tm = Matrix::translation(tx, 0.0).multiply(&self.tm);
                    advance += tx;
                    if -n / 1000.0 > TJ_SPACE_THRESHOLD && !text.is_empty() {
                        pending_space = true;
                    }
                },
            }
        }

        let (Some(bbox), Some(start)) = (bbox, start) else {
            return;
        };

        let end = self.tm.multiply(&state.ctm).transform_point(0.0, state.text_rise);
        let end_x = self.space.to_page(end.x, end.y).x;
        let scale = tfs * th;
        let pen_adjustment = if scale.abs() > f32::EPSILON {
            -advance * 1000.0 / scale
        } else {
            0.0
        };

        let font_name = if font.base_font.is_empty() {
            DEFAULT_FONT_NAME.to_string()
        } else {
            font.base_font.clone()
        };

        log::trace!("Op #{} shows {:?} at {:?} ({} {})", op_index, text, start, font_name, font_size);

        self.push_chunk(Chunk {
            op_index,
            text,
            bbox,
            start,
            end_x,
            font_resource: resource,
            font_name,
            font_size,
            pen_adjustment,
        });
    }

    /// Extend the open span with a chunk, or close it and start a new one.
    fn push_chunk(&mut self, chunk: Chunk) {
        if let Some((span, end_x)) = self.current.as_mut() {
            let em = span.font_size.max(1.0);
            let gap = chunk.start.x - *end_x;
            let same_style = span.font_resource == chunk.font_resource
                && (span.font_size - chunk.font_size).abs() < 0.01;
            let same_baseline = (span.baseline_origin.y - chunk.start.y).abs() <= BASELINE_TOLERANCE * em;
            let close_enough = gap <= GAP_SPLIT_THRESHOLD * em && gap >= -BACKTRACK_SPLIT_THRESHOLD * em;

            if same_style && same_baseline && close_enough {
                if gap > GAP_SPACE_THRESHOLD * em
                    && !span.text.ends_with(char::is_whitespace)
                    && !chunk.text.starts_with(char::is_whitespace)
                {
                    span.text.push(' ');
                }
                span.text.push_str(&chunk.text);
                span.bbox = span.bbox.union(&chunk.bbox);
                span.sources.push(ShowRef {
                    op_index: chunk.op_index,
                    pen_adjustment: chunk.pen_adjustment,
                });
                *end_x = chunk.end_x;
                return;
            }
        }

        self.close_span();
        self.current = Some(chunk.into_span());
    }

    fn close_span(&mut self) {
        let Some((span, _)) = self.current.take() else {
            return;
        };
        let em = span.font_size.max(1.0);
        let same_line = self
            .lines
            .last()
            .and_then(|line| line.spans.last())
            .map(|last| (last.baseline_origin.y - span.baseline_origin.y).abs() <= BASELINE_TOLERANCE * em)
            .unwrap_or(false);
        match self.lines.last_mut() {
            Some(line) if same_line => line.spans.push(span),
            _ => self.lines.push(TextLine { spans: vec![span] }),
        }
    }

    fn close_block(&mut self) {
        self.close_span();
        if !self.lines.is_empty() {
            let lines = std::mem::take(&mut self.lines);
            self.blocks.push(Block::Text { lines });
        }
    }
}
