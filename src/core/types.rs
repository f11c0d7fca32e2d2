use serde::{Deserialize, Serialize};

/// Pixel dimensions of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Resolution-independent chart coordinate.
///
/// `t` is a fractional bar index (bar `i` spans `[i, i + 1)`), `p` is a price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    pub t: f64,
    pub p: f64,
}

impl WorldPoint {
    #[must_use]
    pub fn new(t: f64, p: f64) -> Self {
        Self { t, p }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.t.is_finite() && self.p.is_finite()
    }

    #[must_use]
    pub fn offset(self, dt: f64, dp: f64) -> Self {
        Self {
            t: self.t + dt,
            p: self.p + dp,
        }
    }
}

/// Canvas coordinate in pixels, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}
