//! The slice of the PDF graphics state that positions glyphs.
//!
//! Colors, line styles and clipping never move a text run, so only the CTM
//! and the text state parameters (Tc, Tw, Tz, TL, Tf, Ts, Tr) are kept.

use crate::geometry::Point;
use std::ops::Mul;

/// Affine transform `[a b c d e f]`, applied to row vectors `[x y 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    /// x scale
    pub a: f32,
    /// y shear
    pub b: f32,
    /// x shear
    pub c: f32,
    /// y scale
    pub d: f32,
    /// x offset
    pub e: f32,
    /// y offset
    pub f: f32,
}

impl Matrix {
    /// Matrix from the six operands of `cm` / `Tm`.
    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Identity.
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    /// Shift by `(tx, ty)`.
    ///
    /// ```
    /// use doc_oxide::content::Matrix;
    ///
    /// let p = Matrix::translation(10.0, 20.0).transform_point(5.0, 10.0);
    /// assert_eq!((p.x, p.y), (15.0, 30.0));
    /// ```
    pub fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// Concatenate: the result applies `self`, then `next`.
    ///
    /// `cm` updates the CTM as `operand.multiply(&ctm)`; a glyph's rendering
    /// matrix is `params.multiply(&tm).multiply(&ctm)`.
    pub fn multiply(&self, next: &Matrix) -> Matrix {
        let m = next;
        Matrix::new(
            self.a * m.a + self.b * m.c,
            self.a * m.b + self.b * m.d,
            self.c * m.a + self.d * m.c,
            self.c * m.b + self.d * m.d,
            self.e * m.a + self.f * m.c + m.e,
            self.e * m.b + self.f * m.d + m.f,
        )
    }

    /// Map `(x, y)` through the transform.
    pub fn transform_point(&self, x: f32, y: f32) -> Point {
        Point::new(self.a * x + self.c * y + self.e, self.b * x + self.d * y + self.f)
    }

    /// How much a unit of height grows: the rendered size of a 1pt font.
    pub fn vertical_scale(&self) -> f32 {
        self.c.hypot(self.d)
    }

    /// How much a unit of width grows.
    pub fn horizontal_scale(&self) -> f32 {
        self.a.hypot(self.b)
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Matrix {
    type Output = Matrix;

    /// Same as [`Matrix::multiply`].
    fn mul(self, next: Matrix) -> Matrix {
        self.multiply(&next)
    }
}

/// Text-relevant graphics state. Starts at the values PDF mandates at the
/// beginning of every page.
#[derive(Debug, Clone)]
pub struct GraphicsState {
    /// User space to default user space
    pub ctm: Matrix,
    /// Tc
    pub char_space: f32,
    /// Tw
    pub word_space: f32,
    /// Tz, in percent
    pub horizontal_scaling: f32,
    /// TL
    pub leading: f32,
    /// Resource name from Tf
    pub font_name: Option<String>,
    /// Size operand of Tf
    pub font_size: f32,
    /// Ts
    pub text_rise: f32,
    /// Tr
    pub render_mode: u8,
}

impl GraphicsState {
    /// Initial page state.
    pub fn new() -> Self {
        Self {
            ctm: Matrix::identity(),
            char_space: 0.0,
            word_space: 0.0,
            horizontal_scaling: 100.0,
            leading: 0.0,
            font_name: None,
            font_size: 0.0,
            text_rise: 0.0,
            render_mode: 0,
        }
    }

    /// Tz as a factor.
    pub fn h_scale(&self) -> f32 {
        self.horizontal_scaling / 100.0
    }
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self::new()
    }
}

/// `q`/`Q` nesting. The page's base state can never be popped.
#[derive(Debug, Clone, Default)]
pub struct GraphicsStateStack {
    active: GraphicsState,
    saved: Vec<GraphicsState>,
}

impl GraphicsStateStack {
    /// Stack holding only the initial state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Active state.
    pub fn current(&self) -> &GraphicsState {
        &self.active
    }

    /// Active state, for the state-setting operators.
    pub fn current_mut(&mut self) -> &mut GraphicsState {
        &mut self.active
    }

    /// `q`
    pub fn save(&mut self) {
        self.saved.push(self.active.clone());
    }

    /// `Q`. Content streams in the wild contain stray `Q`s; they are ignored.
    pub fn restore(&mut self) {
        match self.saved.pop() {
            Some(state) => self.active = state,
            None => log::debug!("Ignoring unbalanced Q operator"),
        }
    }

    /// Nesting depth, 1 at the page level.
    pub fn depth(&self) -> usize {
        self.saved.len() + 1
    }
}
