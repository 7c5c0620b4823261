//! PDF content stream builder.
//!
//! Builds the overlay stream appended to a patched page: cover rectangles
//! followed by the redrawn text.

use crate::config::Color;
use lopdf::content::Operation;
use lopdf::{Object, StringFormat};
use std::io::Write;

/// Operations that can be added to a content stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentStreamOp {
    /// Save graphics state (q)
    SaveState,
    /// Restore graphics state (Q)
    RestoreState,
    /// Begin text object (BT)
    BeginText,
    /// End text object (ET)
    EndText,
    /// Set font and size (Tf)
    SetFont(String, f32),
    /// Set text matrix (Tm)
    SetTextMatrix(f32, f32, f32, f32, f32, f32),
    /// Show text (Tj) as a literal string of encoded bytes
    ShowText(Vec<u8>),
    /// Show text (Tj) as a hex string, for two-byte encodings
    ShowHexText(Vec<u8>),
    /// Set fill color RGB (rg)
    SetFillColorRGB(f32, f32, f32),
    /// Rectangle (re)
    Rectangle(f32, f32, f32, f32),
    /// Fill (f)
    Fill,
}

impl ContentStreamOp {
    /// Convert to a `lopdf` operation.
    pub fn to_operation(&self) -> Operation {
        match self {
            ContentStreamOp::SaveState => Operation::new("q", vec![]),
            ContentStreamOp::RestoreState => Operation::new("Q", vec![]),
            ContentStreamOp::BeginText => Operation::new("BT", vec![]),
            ContentStreamOp::EndText => Operation::new("ET", vec![]),
            ContentStreamOp::SetFont(name, size) => Operation::new(
                "Tf",
                vec![Object::Name(name.as_bytes().to_vec()), Object::Real(*size)],
            ),
            ContentStreamOp::SetTextMatrix(a, b, c, d, e, f) => {
                Operation::new("Tm", reals(&[*a, *b, *c, *d, *e, *f]))
            },
            ContentStreamOp::ShowText(bytes) => Operation::new(
                "Tj",
                vec![Object::String(bytes.clone(), StringFormat::Literal)],
            ),
            ContentStreamOp::ShowHexText(bytes) => Operation::new(
                "Tj",
                vec![Object::String(bytes.clone(), StringFormat::Hexadecimal)],
            ),
            ContentStreamOp::SetFillColorRGB(r, g, b) => Operation::new("rg", reals(&[*r, *g, *b])),
            ContentStreamOp::Rectangle(x, y, w, h) => Operation::new("re", reals(&[*x, *y, *w, *h])),
            ContentStreamOp::Fill => Operation::new("f", vec![]),
        }
    }
}

fn reals(values: &[f32]) -> Vec<Object> {
    values.iter().map(|v| Object::Real(*v)).collect()
}

/// Builder for PDF content streams.
///
/// Redundant `Tf` and `rg` operators are elided, and `BT`/`ET` are only
/// emitted when the text object state actually changes.
#[derive(Debug, Default)]
pub struct ContentStreamBuilder {
    /// Operations in the stream
    operations: Vec<ContentStreamOp>,
    /// Current font resource name and size
    current_font: Option<(String, f32)>,
    /// Current fill color
    current_fill: Option<Color>,
    /// Whether we're in a text object
    in_text_object: bool,
}

impl ContentStreamBuilder {
    /// Create a new content stream builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an operation to the stream.
    pub fn op(&mut self, op: ContentStreamOp) -> &mut Self {
        self.operations.push(op);
        self
    }

    /// Begin a text object.
    pub fn begin_text(&mut self) -> &mut Self {
        if !self.in_text_object {
            self.op(ContentStreamOp::BeginText);
            self.in_text_object = true;
        }
        self
    }

    /// End a text object.
    pub fn end_text(&mut self) -> &mut Self {
        if self.in_text_object {
            self.op(ContentStreamOp::EndText);
            self.in_text_object = false;
        }
        self
    }

    /// Set font for text operations.
    pub fn set_font(&mut self, resource_name: &str, size: f32) -> &mut Self {
        let unchanged = matches!(
            &self.current_font,
            Some((name, current)) if name == resource_name && *current == size
        );
        if !unchanged {
            self.op(ContentStreamOp::SetFont(resource_name.to_string(), size));
            self.current_font = Some((resource_name.to_string(), size));
        }
        self
    }

    /// Set fill color.
    pub fn fill_color(&mut self, color: Color) -> &mut Self {
        if self.current_fill != Some(color) {
            self.op(ContentStreamOp::SetFillColorRGB(color.r, color.g, color.b));
            self.current_fill = Some(color);
        }
        self
    }

    /// Fill a rectangle given in user space.
    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> &mut Self {
        self.op(ContentStreamOp::Rectangle(x, y, width, height));
        self.op(ContentStreamOp::Fill)
    }

    /// Show encoded text with its baseline origin at `(x, y)` in user space.
    pub fn text(&mut self, encoded: Vec<u8>, hex: bool, x: f32, y: f32) -> &mut Self {
        self.begin_text();
        self.op(ContentStreamOp::SetTextMatrix(1.0, 0.0, 0.0, 1.0, x, y));
        if hex {
            self.op(ContentStreamOp::ShowHexText(encoded))
        } else {
            self.op(ContentStreamOp::ShowText(encoded))
        }
    }

    /// Save graphics state.
    pub fn save_state(&mut self) -> &mut Self {
        self.op(ContentStreamOp::SaveState)
    }

    /// Restore graphics state. Font and color tracking is reset since `Q`
    /// may bring back earlier values.
    pub fn restore_state(&mut self) -> &mut Self {
        self.current_font = None;
        self.current_fill = None;
        self.op(ContentStreamOp::RestoreState)
    }

    /// Operations added so far.
    pub fn operations(&self) -> &[ContentStreamOp] {
        &self.operations
    }

    /// Convert to `lopdf` operations, closing an open text object.
    pub fn to_operations(&self) -> Vec<Operation> {
        let mut ops: Vec<Operation> = self.operations.iter().map(|op| op.to_operation()).collect();
        if self.in_text_object {
            ops.push(ContentStreamOp::EndText.to_operation());
        }
        ops
    }
}

/// Compress stream data for the FlateDecode filter.
pub fn compress_data(data: &[u8]) -> std::io::Result<Vec<u8>> {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}
