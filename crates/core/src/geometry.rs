//! Axis-aligned rectangle math and unit conversions.
//!
//! All geometry in this crate is expressed in inches. OOXML stores
//! positions in EMU (English Metric Units), so conversion helpers live here.

use serde::{Deserialize, Serialize};

/// EMU per inch as defined by OOXML.
pub const EMU_PER_INCH: f64 = 914_400.0;

/// Points per inch.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Convert an EMU value to inches.
pub fn emu_to_inches(emu: i64) -> f64 {
    emu as f64 / EMU_PER_INCH
}

/// Convert inches to the nearest EMU value.
pub fn inches_to_emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH).round() as i64
}

/// Convert a point size to inches.
pub fn points_to_inches(points: f64) -> f64 {
    points / POINTS_PER_INCH
}

/// An axis-aligned rectangle in inches.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a rectangle from its origin and size.
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Create a rectangle from EMU offsets and extents.
    pub fn from_emu(x: i64, y: i64, cx: i64, cy: i64) -> Self {
        Self::new(
            emu_to_inches(x),
            emu_to_inches(y),
            emu_to_inches(cx),
            emu_to_inches(cy),
        )
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Area in square inches.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Grow the rectangle by `margin` on every side.
    pub fn expanded(&self, margin: f64) -> Self {
        Self::new(
            self.left - margin,
            self.top - margin,
            self.width + 2.0 * margin,
            self.height + 2.0 * margin,
        )
    }

    /// Separating-axis overlap test.
    ///
    /// Two rectangles overlap unless one lies entirely to the left, right,
    /// above or below the other. Shared edges do not count as overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(self.right() <= other.left
            || other.right() <= self.left
            || self.bottom() <= other.top
            || other.bottom() <= self.top)
    }

    /// Overlap test with `buffer` of clearance required around `other`.
    pub fn overlaps_with_buffer(&self, other: &Rect, buffer: f64) -> bool {
        self.overlaps(&other.expanded(buffer))
    }

    /// Whether `other` lies entirely within this rectangle.
    pub fn contains(&self, other: &Rect) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Express this rectangle as percentages of a canvas.
    pub fn to_percent(&self, canvas_width: f64, canvas_height: f64) -> RectPercent {
        if canvas_width <= 0.0 || canvas_height <= 0.0 {
            return RectPercent::default();
        }
        RectPercent {
            left: self.left / canvas_width * 100.0,
            top: self.top / canvas_height * 100.0,
            width: self.width / canvas_width * 100.0,
            height: self.height / canvas_height * 100.0,
        }
    }
}

/// A rectangle expressed as percentages of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RectPercent {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl RectPercent {
    /// Share of the canvas area covered, in percent.
    pub fn area(&self) -> f64 {
        self.width * self.height / 100.0
    }
}
