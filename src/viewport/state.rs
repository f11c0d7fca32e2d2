use serde::{Deserialize, Serialize};

use crate::core::Timeframe;

/// Immutable view of the viewport handed to renderers and plugins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub visible_start: f64,
    pub visible_end: f64,
    pub price_min: f64,
    pub price_max: f64,
    pub width_px: u32,
    pub height_px: u32,
    pub timeframe: Timeframe,
    pub bar_count: usize,
}

impl ViewportState {
    #[must_use]
    pub fn visible_span(&self) -> f64 {
        self.visible_end - self.visible_start
    }
}

/// Either a drawable viewport or the "draw nothing" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ViewportSnapshot {
    NoData,
    Ready(ViewportState),
}

impl ViewportSnapshot {
    #[must_use]
    pub fn ready(self) -> Option<ViewportState> {
        match self {
            Self::NoData => None,
            Self::Ready(state) => Some(state),
        }
    }

    #[must_use]
    pub fn is_ready(self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Visible world range after a mutation, forwarded to linked charts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeChange {
    pub start: f64,
    pub end: f64,
}
