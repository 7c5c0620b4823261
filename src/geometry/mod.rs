//! Geometric primitives and page coordinate conversion.
//!
//! Two coordinate systems meet on the PDF path:
//!
//! ```text
//! PDF user space                 page space (what runs report)
//! (x0,y1) ┌──────────┐           (0,0) ┌──────────┐
//!         │  y up    │                 │  y down  │
//! (x0,y0) └──────────┘           (0,h) └──────────┘
//! ```
//!
//! Page space is anchored at the MediaBox's top-left corner and is fixed at
//! extraction time; [`PageSpace`] converts between the two.

/// A position in page space (or user space, where noted).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Horizontal position
    pub x: f32,
    /// Vertical position
    pub y: f32,
}

impl Point {
    /// Point at `(x, y)`.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned box in page space: top-left corner plus extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Extent to the right
    pub width: f32,
    /// Extent downward
    pub height: f32,
}

impl Rect {
    /// Box with top-left corner `(x, y)`.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Box spanning two opposite corners given in any order.
    ///
    /// ```
    /// use doc_oxide::geometry::Rect;
    ///
    /// assert_eq!(Rect::from_corners(110.0, 70.0, 10.0, 20.0), Rect::new(10.0, 20.0, 100.0, 50.0));
    /// ```
    pub fn from_corners(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        let (x, y) = (x0.min(x1), y0.min(y1));
        Self::new(x, y, x0.max(x1) - x, y0.max(y1) - y)
    }

    /// Left edge.
    pub fn left(&self) -> f32 {
        self.x
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge.
    pub fn top(&self) -> f32 {
        self.y
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Top-left corner: where a run "starts" on the page.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Whether `other` fits inside, edges included.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        (self.left()..=self.right()).contains(&other.left())
            && (self.left()..=self.right()).contains(&other.right())
            && (self.top()..=self.bottom()).contains(&other.top())
            && (self.top()..=self.bottom()).contains(&other.bottom())
    }

    /// Bounding box of both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::from_corners(
            self.left().min(other.left()),
            self.top().min(other.top()),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// Same box with every edge pushed out by `margin`.
    pub fn expand(&self, margin: f32) -> Rect {
        Rect::from_corners(
            self.left() - margin,
            self.top() - margin,
            self.right() + margin,
            self.bottom() + margin,
        )
    }
}

/// Conversion between PDF user space and top-left page space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSpace {
    /// MediaBox lower-left x
    pub x0: f32,
    /// MediaBox lower-left y
    pub y0: f32,
    /// MediaBox upper-right x
    pub x1: f32,
    /// MediaBox upper-right y
    pub y1: f32,
}

impl PageSpace {
    /// Build from a MediaBox `[x0 y0 x1 y1]`, normalizing swapped corners.
    pub fn from_media_box(media_box: [f32; 4]) -> Self {
        let [a, b, c, d] = media_box;
        Self {
            x0: a.min(c),
            y0: b.min(d),
            x1: a.max(c),
            y1: b.max(d),
        }
    }

    /// US Letter, used when a page carries no usable MediaBox.
    pub fn letter() -> Self {
        Self::from_media_box([0.0, 0.0, 612.0, 792.0])
    }

    /// Page width.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Page height.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// PDF user-space point to page space.
    pub fn to_page(&self, x: f32, y: f32) -> Point {
        Point::new(x - self.x0, self.y1 - y)
    }

    /// Page-space point to PDF user space.
    ///
    /// # Examples
    ///
    /// ```
    /// use doc_oxide::geometry::PageSpace;
    ///
    /// let space = PageSpace::from_media_box([0.0, 0.0, 612.0, 792.0]);
    /// let pdf = space.to_user(72.0, 92.0);
    /// assert_eq!(pdf.x, 72.0);
    /// assert_eq!(pdf.y, 700.0);
    /// ```
    pub fn to_user(&self, x: f32, y: f32) -> Point {
        Point::new(x + self.x0, self.y1 - y)
    }

    /// Page-space rectangle to the `re` operands `(x, y, w, h)` in user space.
    pub fn rect_to_user(&self, rect: &Rect) -> (f32, f32, f32, f32) {
        let lower_left = self.to_user(rect.left(), rect.bottom());
        (lower_left.x, lower_left.y, rect.width, rect.height)
    }
}
