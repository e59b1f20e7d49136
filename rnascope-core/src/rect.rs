//! Axis-aligned ROI rectangles in image pixel coordinates.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle with its origin at the minimum corner.
///
/// Coordinates are image pixels: `left` is the column of the first included
/// pixel, `top` the row, and `width`/`height` the extent in each direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    /// Leftmost column.
    pub left: usize,
    /// Topmost row.
    pub top: usize,
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
}

impl Rect {
    /// Creates a rectangle from its minimum corner and extent.
    #[inline]
    #[must_use]
    pub fn new(left: usize, top: usize, width: usize, height: usize) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Creates a rectangle from two opposite corners in any drag direction.
    ///
    /// The result is normalized so `left`/`top` are the minimum corner.
    #[must_use]
    pub fn from_corners(a: (usize, usize), b: (usize, usize)) -> Self {
        let left = a.0.min(b.0);
        let top = a.1.min(b.1);
        Self {
            left,
            top,
            width: a.0.max(b.0) - left,
            height: a.1.max(b.1) - top,
        }
    }

    /// Number of pixels covered by the rectangle.
    #[inline]
    #[must_use]
    pub fn pixel_area(&self) -> usize {
        self.width * self.height
    }

    /// Physical area covered by the rectangle for a given pixel spacing.
    ///
    /// Spacing is in physical units (microns) per pixel, applied to both
    /// axes.
    #[inline]
    #[must_use]
    pub fn physical_area(&self, pixel_spacing: f64) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let (w, h) = (self.width as f64, self.height as f64);
        (w * pixel_spacing) * (h * pixel_spacing)
    }

    /// Whether the rectangle fits inside a channel of the given dimensions.
    #[inline]
    #[must_use]
    pub fn fits_within(&self, height: usize, width: usize) -> bool {
        self.left + self.width <= width && self.top + self.height <= height
    }
}
