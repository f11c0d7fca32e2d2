use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Linear mapping between a domain interval and a pixel extent `[0, extent_px]`.
///
/// With `inverted` set, the domain start maps to the far end of the extent,
/// which is how price axes grow upward on a top-left origin canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
    extent_px: f64,
    inverted: bool,
}

impl LinearScale {
    pub fn new(domain_start: f64, domain_end: f64, extent_px: f64) -> ChartResult<Self> {
        if !domain_start.is_finite() || !domain_end.is_finite() || domain_start == domain_end {
            return Err(ChartError::InvalidData(
                "scale domain must be finite and non-zero".to_owned(),
            ));
        }
        if !extent_px.is_finite() || extent_px <= 0.0 {
            return Err(ChartError::InvalidData(
                "scale pixel extent must be finite and > 0".to_owned(),
            ));
        }

        Ok(Self {
            domain_start,
            domain_end,
            extent_px,
            inverted: false,
        })
    }

    #[must_use]
    pub fn with_inverted(mut self, inverted: bool) -> Self {
        self.inverted = inverted;
        self
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    #[must_use]
    pub fn extent_px(self) -> f64 {
        self.extent_px
    }

    /// Domain units covered by one pixel.
    #[must_use]
    pub fn units_per_pixel(self) -> f64 {
        (self.domain_end - self.domain_start) / self.extent_px
    }

    #[must_use]
    pub fn domain_to_pixel(self, value: f64) -> f64 {
        let span = self.domain_end - self.domain_start;
        let normalized = (value - self.domain_start) / span;
        let normalized = if self.inverted {
            1.0 - normalized
        } else {
            normalized
        };
        normalized * self.extent_px
    }

    #[must_use]
    pub fn pixel_to_domain(self, pixel: f64) -> f64 {
        let span = self.domain_end - self.domain_start;
        let normalized = pixel / self.extent_px;
        let normalized = if self.inverted {
            1.0 - normalized
        } else {
            normalized
        };
        self.domain_start + normalized * span
    }
}
