//! Geometry types shared by the fence windows and the bounds reconciler.
//!
//! Fence bounds are always expressed in device-independent units (DIP).
//! Monitors report their geometry in device pixels together with a scale
//! factor; [`Monitor::work_area_dip`] converts between the two.

use serde::{Deserialize, Serialize};

// ============================================================================
// Geometry Types
// ============================================================================

/// A rectangle with position and size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Create a zero-sized rectangle at origin.
    #[must_use]
    pub const fn zero() -> Self { Self::new(0.0, 0.0, 0.0, 0.0) }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f64 { self.x + self.width }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f64 { self.y + self.height }

    /// Check if this rectangle has valid dimensions.
    #[must_use]
    pub fn is_valid(&self) -> bool { self.width > 0.0 && self.height > 0.0 }

    /// Check if this rectangle contains a point.
    #[must_use]
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Area of the overlap with another rectangle (0 when disjoint).
    #[must_use]
    pub fn intersection_area(&self, other: &Self) -> f64 {
        let width = self.right().min(other.right()) - self.x.max(other.x);
        let height = self.bottom().min(other.bottom()) - self.y.max(other.y);
        if width > 0.0 && height > 0.0 { width * height } else { 0.0 }
    }

    /// Returns a copy scaled by `factor` (position and size).
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.width * factor, self.height * factor)
    }

    /// Check if two rectangles are approximately equal (within epsilon).
    #[must_use]
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self.x - other.x).abs() < epsilon
            && (self.y - other.y).abs() < epsilon
            && (self.width - other.width).abs() < epsilon
            && (self.height - other.height).abs() < epsilon
    }
}

// ============================================================================
// Monitor Type
// ============================================================================

/// A physical display as reported by the host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Monitor {
    /// Host-specific display identifier.
    pub id: u32,

    /// Display name.
    pub name: String,

    /// Full frame in device pixels.
    pub bounds: Rect,

    /// Usable frame (excluding taskbars/docks) in device pixels.
    pub work_area: Rect,

    /// DPI scale factor (1.0 = 96 DPI, 1.5 = 144 DPI, ...).
    pub scale_factor: f64,

    /// Is this the primary display?
    pub is_primary: bool,
}

impl Default for Monitor {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            bounds: Rect::zero(),
            work_area: Rect::zero(),
            scale_factor: 1.0,
            is_primary: false,
        }
    }
}

impl Monitor {
    /// Creates a monitor whose work area equals its bounds.
    #[must_use]
    pub fn new(id: u32, bounds: Rect, scale_factor: f64) -> Self {
        Self {
            id,
            name: format!("Display {id}"),
            bounds,
            work_area: bounds,
            scale_factor,
            is_primary: id == 0,
        }
    }

    /// Returns the scale factor, treating nonsense values as 1.0.
    #[must_use]
    pub fn effective_scale(&self) -> f64 {
        if self.scale_factor.is_finite() && self.scale_factor > 0.0 {
            self.scale_factor
        } else {
            1.0
        }
    }

    /// Returns the work area converted to device-independent units.
    #[must_use]
    pub fn work_area_dip(&self) -> Rect { self.work_area.scaled(1.0 / self.effective_scale()) }

    /// Returns the full bounds converted to device-independent units.
    #[must_use]
    pub fn bounds_dip(&self) -> Rect { self.bounds.scaled(1.0 / self.effective_scale()) }
}
