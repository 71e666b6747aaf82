// THEORY:
// A `BoundingBox` is the unit of output for the whole detector: an axis-aligned
// rectangle marking a region where the picture changed. It is a plain value type.
// Nothing mutates a box in place; growing, merging and rescaling all return a new
// box. Coordinates are in working-resolution pixels until the renderer rescales
// them to the source frame.
//
// Edges follow the half-open convention: a box covers columns `x..x + width` and
// rows `y..y + height`, so `right()` and `bottom()` are exclusive.

use crate::error::{DetectorError, Result};

/// An axis-aligned rectangle in integer pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A single-cell box at (col, row).
    pub const fn cell(col: u32, row: u32) -> Self {
        Self::new(col, row, 1, 1)
    }

    /// Exclusive right edge.
    pub const fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub const fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// The smallest box enclosing both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        BoundingBox::new(x, y, right - x, bottom - y)
    }

    /// Whether the two boxes are close enough to be merged.
    ///
    /// Each box is grown by `threshold` pixels and the boxes must then overlap or
    /// touch on both axes. The axes are tested independently, so this is a
    /// rectangle test, not a distance test.
    pub fn is_neighbor(&self, other: &BoundingBox, threshold: u32) -> bool {
        spans_within(self.x, self.right(), other.x, other.right(), threshold)
            && spans_within(self.y, self.bottom(), other.y, other.bottom(), threshold)
    }

    /// Whether the box lies entirely inside a `width` x `height` frame.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.width > 0 && self.height > 0 && self.right() <= width && self.bottom() <= height
    }

    /// Maps a working-resolution box back to source resolution, truncating each
    /// coordinate and dimension independently.
    pub fn rescale(&self, scale: &ScaleFactors) -> BoundingBox {
        BoundingBox::new(
            scale.to_source_x(self.x),
            scale.to_source_y(self.y),
            scale.to_source_x(self.width),
            scale.to_source_y(self.height),
        )
    }

    /// Clips the box to a `width` x `height` frame. Returns `None` when nothing is left.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<BoundingBox> {
        if self.x >= width || self.y >= height {
            return None;
        }
        let right = self.right().min(width);
        let bottom = self.bottom().min(height);
        if right <= self.x || bottom <= self.y {
            return None;
        }
        Some(BoundingBox::new(
            self.x,
            self.y,
            right - self.x,
            bottom - self.y,
        ))
    }
}

/// Interval test for one axis: `[a0, a1)` and `[b0, b1)` overlap or touch once each is
/// widened by `threshold`.
fn spans_within(a0: u32, a1: u32, b0: u32, b1: u32, threshold: u32) -> bool {
    let t = threshold as i64;
    (a0 as i64) <= b1 as i64 + t && (b0 as i64) <= a1 as i64 + t
}

/// Per-axis ratio between working and source resolution.
///
/// The ratio is kept as exact integers so that rescaling truncates the true
/// quotient rather than a rounded floating point approximation of it. All four
/// dimensions are positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleFactors {
    working_width: u32,
    working_height: u32,
    source_width: u32,
    source_height: u32,
}

impl ScaleFactors {
    pub fn new(working: (u32, u32), source: (u32, u32)) -> Result<Self> {
        if working.0 == 0 || working.1 == 0 || source.0 == 0 || source.1 == 0 {
            return Err(DetectorError::InvalidConfiguration(format!(
                "scale factors need positive sizes, got working {}x{} and source {}x{}",
                working.0, working.1, source.0, source.1
            )));
        }
        Ok(Self {
            working_width: working.0,
            working_height: working.1,
            source_width: source.0,
            source_height: source.1,
        })
    }

    pub fn working_size(&self) -> (u32, u32) {
        (self.working_width, self.working_height)
    }

    pub fn source_size(&self) -> (u32, u32) {
        (self.source_width, self.source_height)
    }

    /// workingWidth / sourceWidth
    pub fn x(&self) -> f64 {
        self.working_width as f64 / self.source_width as f64
    }

    /// workingHeight / sourceHeight
    pub fn y(&self) -> f64 {
        self.working_height as f64 / self.source_height as f64
    }

    pub fn to_source_x(&self, value: u32) -> u32 {
        (value as u64 * self.source_width as u64 / self.working_width as u64) as u32
    }

    pub fn to_source_y(&self, value: u32) -> u32 {
        (value as u64 * self.source_height as u64 / self.working_height as u64) as u32
    }
}
