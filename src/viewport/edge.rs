use serde::{Deserialize, Serialize};

use crate::core::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeSide {
    /// Older history, before the first bar.
    Left,
    /// Newer bars, after the last one.
    Right,
}

/// Ask for more bars beyond one edge of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRequest {
    pub side: EdgeSide,
    /// Data generation the request was issued under.
    pub generation: u64,
    /// Timestamp of the edge bar; returned bars must lie strictly beyond it.
    pub anchor_timestamp: i64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeResponse {
    pub side: EdgeSide,
    pub generation: u64,
    pub bars: Vec<Bar>,
}

impl EdgeResponse {
    #[must_use]
    pub fn for_request(request: &EdgeRequest, bars: Vec<Bar>) -> Self {
        Self {
            side: request.side,
            generation: request.generation,
            bars,
        }
    }
}

/// What an [`EdgeResponse`] did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeApplyOutcome {
    /// Issued under an older generation and dropped.
    Stale,
    /// Nothing to apply to (no data loaded).
    Ignored,
    /// No new bars; the side will not be requested again until new data.
    Exhausted { side: EdgeSide },
    /// Bars inserted before index 0; every world index moved right by `count`.
    Prepended { count: usize },
    Appended { count: usize },
}

impl EdgeApplyOutcome {
    /// World-index shift existing coordinates must follow.
    #[must_use]
    pub fn time_shift(self) -> f64 {
        match self {
            Self::Prepended { count } => count as f64,
            _ => 0.0,
        }
    }

    #[must_use]
    pub fn changed_data(self) -> bool {
        matches!(self, Self::Prepended { .. } | Self::Appended { .. })
    }
}

/// Source of additional bars, fed asynchronously by the host.
///
/// Calls are fire-and-forget; results come back through the chart's
/// `apply_edge_response`.
pub trait BarSupply {
    fn load_more_left(&mut self, request: EdgeRequest);

    fn load_more_right(&mut self, request: EdgeRequest);
}

/// Supply that never answers, for charts with a fixed data set.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBarSupply;

impl BarSupply for NoBarSupply {
    fn load_more_left(&mut self, _request: EdgeRequest) {}

    fn load_more_right(&mut self, _request: EdgeRequest) {}
}

/// Per-side request bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct EdgeTracker {
    pub(crate) generation: u64,
    in_flight: [bool; 2],
    exhausted: [bool; 2],
}

const fn slot(side: EdgeSide) -> usize {
    match side {
        EdgeSide::Left => 0,
        EdgeSide::Right => 1,
    }
}

impl EdgeTracker {
    /// Starts a new generation; outstanding responses become stale.
    pub(crate) fn bump_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.in_flight = [false; 2];
        self.exhausted = [false; 2];
    }

    pub(crate) fn can_request(&self, side: EdgeSide) -> bool {
        !self.in_flight[slot(side)] && !self.exhausted[slot(side)]
    }

    pub(crate) fn mark_in_flight(&mut self, side: EdgeSide) {
        self.in_flight[slot(side)] = true;
    }

    pub(crate) fn complete(&mut self, side: EdgeSide, exhausted: bool) {
        self.in_flight[slot(side)] = false;
        if exhausted {
            self.exhausted[slot(side)] = true;
        }
    }

    pub(crate) fn is_exhausted(&self, side: EdgeSide) -> bool {
        self.exhausted[slot(side)]
    }
}
