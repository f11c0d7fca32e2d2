use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::core::{
    Bar, CanvasSize, CoordinateTransform, Timeframe, bars_in_index_window, visible_index_range,
};
use crate::error::ChartResult;

use super::config::ViewportConfig;
use super::edge::{EdgeApplyOutcome, EdgeRequest, EdgeResponse, EdgeSide, EdgeTracker};
use super::state::{RangeChange, ViewportSnapshot, ViewportState};

#[derive(Debug, Clone, Copy, PartialEq)]
struct PanAnchor {
    origin_x: f64,
    start: f64,
    end: f64,
}

/// Owns the bar store, the visible window and the derived price range.
///
/// Every mutation is infallible: anomalies (no data, zero canvas, non-finite
/// input) are logged and ignored. After each range change the price range is
/// recomputed from the visible bars and data edges are re-evaluated.
#[derive(Debug, Clone)]
pub struct ViewportManager {
    config: ViewportConfig,
    bars: Arc<[Bar]>,
    canvas: CanvasSize,
    visible_start: f64,
    visible_end: f64,
    price_min: f64,
    price_max: f64,
    timeframe: Timeframe,
    data_initialized: bool,
    pan: Option<PanAnchor>,
    edges: EdgeTracker,
    pending_requests: Vec<EdgeRequest>,
    range_change: Option<RangeChange>,
}

impl ViewportManager {
    pub fn new(config: ViewportConfig) -> ChartResult<Self> {
        let config = config.validate()?;
        Ok(Self {
            config,
            bars: Arc::from(Vec::new()),
            canvas: CanvasSize::new(0, 0),
            visible_start: 0.0,
            visible_end: config.min_visible_bars,
            price_min: 0.0,
            price_max: 1.0,
            timeframe: Timeframe::default(),
            data_initialized: false,
            pan: None,
            edges: EdgeTracker::default(),
            pending_requests: Vec::new(),
            range_change: None,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    #[must_use]
    pub fn bars(&self) -> &Arc<[Bar]> {
        &self.bars
    }

    #[must_use]
    pub fn bar_count(&self) -> usize {
        self.bars.len()
    }

    #[must_use]
    pub fn canvas_size(&self) -> CanvasSize {
        self.canvas
    }

    #[must_use]
    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.edges.generation
    }

    #[must_use]
    pub fn visible_range(&self) -> (f64, f64) {
        (self.visible_start, self.visible_end)
    }

    #[must_use]
    pub fn price_range(&self) -> (f64, f64) {
        (self.price_min, self.price_max)
    }

    #[must_use]
    pub fn is_panning(&self) -> bool {
        self.pan.is_some()
    }

    #[must_use]
    pub fn is_exhausted(&self, side: EdgeSide) -> bool {
        self.edges.is_exhausted(side)
    }

    #[must_use]
    pub fn state(&self) -> ViewportSnapshot {
        if self.bars.is_empty() || !self.canvas.is_valid() {
            return ViewportSnapshot::NoData;
        }
        ViewportSnapshot::Ready(ViewportState {
            visible_start: self.visible_start,
            visible_end: self.visible_end,
            price_min: self.price_min,
            price_max: self.price_max,
            width_px: self.canvas.width,
            height_px: self.canvas.height,
            timeframe: self.timeframe,
            bar_count: self.bars.len(),
        })
    }

    /// World/pixel mapping of the current state; `None` without data.
    #[must_use]
    pub fn transform(&self) -> Option<CoordinateTransform> {
        let state = self.state().ready()?;
        CoordinateTransform::new(
            (state.visible_start, state.visible_end),
            (state.price_min, state.price_max),
            self.canvas,
        )
        .ok()
    }

    /// Bars `floor(start) .. ceil(end)` clamped to the store.
    #[must_use]
    pub fn visible_data(&self) -> &[Bar] {
        bars_in_index_window(&self.bars, self.visible_start, self.visible_end)
    }

    /// Index of the first visible bar, used to rebase visible slices.
    #[must_use]
    pub fn visible_data_offset(&self) -> usize {
        visible_index_range(self.visible_start, self.visible_end, self.bars.len()).start
    }

    pub fn set_canvas_size(&mut self, width: u32, height: u32) {
        self.canvas = CanvasSize::new(width, height);
        if !self.canvas.is_valid() {
            debug!(width, height, "zero canvas dimension, viewport has no data to draw");
        }
    }

    /// Replaces the bar store, for example after a symbol change.
    ///
    /// Outstanding edge requests become stale. The first non-empty data set
    /// applies the current timeframe; later sets keep the visible range.
    pub fn set_data(&mut self, bars: impl Into<Arc<[Bar]>>) {
        self.bars = bars.into();
        self.edges.bump_generation();
        self.pending_requests.clear();
        self.pan = None;
        debug!(
            bar_count = self.bars.len(),
            generation = self.edges.generation,
            "viewport data replaced"
        );

        if self.bars.is_empty() {
            self.data_initialized = false;
            return;
        }
        if self.data_initialized {
            self.commit_range(self.visible_start, self.visible_end);
        } else {
            self.data_initialized = true;
            self.reset_to_timeframe();
        }
    }

    pub fn apply_timeframe(&mut self, timeframe: Timeframe) {
        self.timeframe = timeframe;
        self.edges.bump_generation();
        self.pending_requests.clear();
        self.pan = None;
        debug!(%timeframe, generation = self.edges.generation, "timeframe applied");
        if !self.bars.is_empty() {
            self.data_initialized = true;
            self.reset_to_timeframe();
        }
    }

    fn reset_to_timeframe(&mut self) {
        let range = self
            .timeframe
            .index_range(&self.bars, self.config.utc_offset_minutes);
        let end = range.end as f64;
        let span = ((range.end - range.start) as f64)
            .clamp(self.config.min_visible_bars, self.config.max_visible_bars);
        self.commit_range(end - span, end);
    }

    /// Zooms by `zoom_factor` (> 1 zooms in) keeping the world point under
    /// `pixel_x` at the same pixel.
    pub fn zoom_at(&mut self, pixel_x: f64, zoom_factor: f64) {
        if !zoom_factor.is_finite() || zoom_factor <= 0.0 || !pixel_x.is_finite() {
            warn!(pixel_x, zoom_factor, "ignoring invalid zoom request");
            return;
        }
        let Some(width) = self.interactive_width() else {
            debug!("zoom before data or canvas is ready");
            return;
        };

        let span = self.visible_end - self.visible_start;
        let anchor_ratio = pixel_x / width;
        let anchor = self.visible_start + anchor_ratio * span;
        let new_span = (span / zoom_factor)
            .clamp(self.config.min_visible_bars, self.config.max_visible_bars);
        let Some(new_span) = self.anchored_overlap_span(anchor, anchor_ratio, new_span) else {
            debug!(anchor, anchor_ratio, "zoom would overscroll, range kept");
            return;
        };
        let new_start = anchor - anchor_ratio * new_span;
        trace!(pixel_x, zoom_factor, anchor, new_span, "zoom at anchor");
        self.apply_range(new_start, new_start + new_span);
    }

    /// Smallest span `>= span` that keeps `min_overlap_bars` real bars visible
    /// while `anchor` stays at `anchor_ratio` of the window.
    ///
    /// Zooming never shifts the window, so an overscrolled zoom widens instead.
    /// `None` when no span within `max_visible_bars` satisfies the overlap.
    fn anchored_overlap_span(&self, anchor: f64, anchor_ratio: f64, span: f64) -> Option<f64> {
        let len = self.bars.len() as f64;
        let required = self.config.min_overlap_bars.min(len);
        // Each bound reads `offset + slope * span >= 0`: the right edge must
        // reach `required`, the left edge must start by `len - required`.
        let bounds = [
            (anchor - required, 1.0 - anchor_ratio),
            (len - required - anchor, anchor_ratio),
        ];
        let mut resolved = span;
        for (offset, slope) in bounds {
            if offset + slope * resolved >= 0.0 {
                continue;
            }
            if slope <= 0.0 {
                return None;
            }
            resolved = -offset / slope;
        }
        let satisfied = bounds
            .iter()
            .all(|(offset, slope)| offset + slope * resolved >= -1e-9);
        (satisfied && resolved <= self.config.max_visible_bars).then_some(resolved)
    }

    /// One wheel notch: `delta_y < 0` zooms in, `delta_y > 0` zooms out by the
    /// exact inverse factor.
    pub fn wheel_zoom(&mut self, pixel_x: f64, delta_y: f64) {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return;
        }
        let step = 1.0 + self.config.wheel_zoom_sensitivity;
        let factor = if delta_y < 0.0 { step } else { 1.0 / step };
        self.zoom_at(pixel_x, factor);
    }

    pub fn start_pan(&mut self, pixel_x: f64) {
        if !pixel_x.is_finite() || self.interactive_width().is_none() {
            debug!(pixel_x, "pan start ignored");
            return;
        }
        self.pan = Some(PanAnchor {
            origin_x: pixel_x,
            start: self.visible_start,
            end: self.visible_end,
        });
        trace!(pixel_x, "pan started");
    }

    /// Moves the range by the pixel distance from the drag start.
    pub fn update_pan(&mut self, pixel_x: f64) {
        let (Some(anchor), Some(width)) = (self.pan, self.interactive_width()) else {
            return;
        };
        if !pixel_x.is_finite() {
            return;
        }
        let span = anchor.end - anchor.start;
        let offset = -((pixel_x - anchor.origin_x) / width) * span;
        self.commit_range(anchor.start + offset, anchor.end + offset);
    }

    pub fn end_pan(&mut self) {
        if self.pan.take().is_some() {
            trace!(
                start = self.visible_start,
                end = self.visible_end,
                "pan ended"
            );
        }
    }

    /// Shifts both ends by `bars_delta` world units.
    pub fn pan_by(&mut self, bars_delta: f64) {
        if !bars_delta.is_finite() || self.bars.is_empty() {
            return;
        }
        self.commit_range(self.visible_start + bars_delta, self.visible_end + bars_delta);
    }

    /// Pans as if the content had been dragged by `delta_px`.
    pub fn pan_by_pixels(&mut self, delta_px: f64) {
        let Some(width) = self.interactive_width() else {
            return;
        };
        let span = self.visible_end - self.visible_start;
        self.pan_by(-(delta_px / width) * span);
    }

    /// Sets the window directly, e.g. from a linked chart. The span is
    /// clamped around the window centre.
    pub fn set_visible_range(&mut self, start: f64, end: f64) {
        if !start.is_finite() || !end.is_finite() || end <= start || self.bars.is_empty() {
            debug!(start, end, "ignoring visible range");
            return;
        }
        let center = (start + end) / 2.0;
        let span = (end - start).clamp(self.config.min_visible_bars, self.config.max_visible_bars);
        self.commit_range(center - span / 2.0, center + span / 2.0);
    }

    /// Merges bars delivered for an [`EdgeRequest`].
    pub fn apply_edge_response(&mut self, response: EdgeResponse) -> EdgeApplyOutcome {
        if response.generation != self.edges.generation {
            debug!(
                response_generation = response.generation,
                generation = self.edges.generation,
                "dropping stale edge response"
            );
            return EdgeApplyOutcome::Stale;
        }
        let (Some(first), Some(last)) = (self.bars.first().copied(), self.bars.last().copied())
        else {
            debug!("edge response without loaded data");
            return EdgeApplyOutcome::Ignored;
        };

        let side = response.side;
        let mut incoming = response.bars;
        incoming.sort_by_key(|bar| bar.timestamp);
        incoming.dedup_by_key(|bar| bar.timestamp);
        match side {
            EdgeSide::Left => incoming.retain(|bar| bar.timestamp < first.timestamp),
            EdgeSide::Right => incoming.retain(|bar| bar.timestamp > last.timestamp),
        }

        if incoming.is_empty() {
            self.edges.complete(side, true);
            debug!(?side, "edge exhausted");
            return EdgeApplyOutcome::Exhausted { side };
        }
        self.edges.complete(side, false);

        let count = incoming.len();
        let outcome = match side {
            EdgeSide::Left => {
                self.bars = incoming.iter().chain(self.bars.iter()).copied().collect();
                let shift = count as f64;
                self.visible_start += shift;
                self.visible_end += shift;
                if let Some(anchor) = self.pan.as_mut() {
                    anchor.start += shift;
                    anchor.end += shift;
                }
                self.range_change = Some(RangeChange {
                    start: self.visible_start,
                    end: self.visible_end,
                });
                EdgeApplyOutcome::Prepended { count }
            }
            EdgeSide::Right => {
                self.bars = self.bars.iter().chain(incoming.iter()).copied().collect();
                EdgeApplyOutcome::Appended { count }
            }
        };
        debug!(?side, count, bar_count = self.bars.len(), "edge bars merged");
        self.commit_range(self.visible_start, self.visible_end);
        outcome
    }

    /// Requests issued since the last call, to forward to a bar supply.
    pub fn take_edge_requests(&mut self) -> Vec<EdgeRequest> {
        std::mem::take(&mut self.pending_requests)
    }

    /// Latest range change since the last call.
    pub fn take_range_change(&mut self) -> Option<RangeChange> {
        self.range_change.take()
    }

    fn interactive_width(&self) -> Option<f64> {
        (self.canvas.is_valid() && !self.bars.is_empty()).then(|| f64::from(self.canvas.width))
    }

    fn commit_range(&mut self, start: f64, end: f64) {
        let (start, end) = self.guard_overscroll(start, end);
        self.apply_range(start, end);
    }

    fn apply_range(&mut self, start: f64, end: f64) {
        if start != self.visible_start || end != self.visible_end {
            self.range_change = Some(RangeChange { start, end });
        }
        self.visible_start = start;
        self.visible_end = end;
        self.recompute_price_range();
        self.evaluate_edges();
    }

    /// Shifts the window so at least `min_overlap_bars` real bars stay visible.
    fn guard_overscroll(&self, start: f64, end: f64) -> (f64, f64) {
        let len = self.bars.len() as f64;
        if len == 0.0 {
            return (start, end);
        }
        let required = self.config.min_overlap_bars.min(len).min(end - start);
        let shift = if end < required {
            required - end
        } else if start > len - required {
            (len - required) - start
        } else {
            0.0
        };
        (start + shift, end + shift)
    }

    fn recompute_price_range(&mut self) {
        let visible = self.visible_data();
        let fallback;
        let slice = if visible.is_empty() {
            let nearest = if self.visible_end <= 0.0 {
                self.bars.first()
            } else {
                self.bars.last()
            };
            let Some(bar) = nearest else {
                return;
            };
            fallback = [*bar];
            &fallback[..]
        } else {
            visible
        };

        let (mut low, mut high) = slice.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(low, high), bar| (low.min(bar.low), high.max(bar.high)),
        );
        if high - low < self.config.min_price_span {
            let mid = (low + high) / 2.0;
            let half = (mid.abs() * 0.005).max(self.config.min_price_span / 2.0);
            low = mid - half;
            high = mid + half;
        }
        let padding = (high - low) * self.config.price_padding_ratio;
        self.price_min = low - padding;
        self.price_max = high + padding;
    }

    fn evaluate_edges(&mut self) {
        let (Some(first), Some(last)) = (self.bars.first(), self.bars.last()) else {
            return;
        };
        let edge = self.config.edge;
        let len = self.bars.len() as f64;
        let generation = self.edges.generation;

        if edge.load_left
            && self.visible_start < edge.threshold_bars
            && self.edges.can_request(EdgeSide::Left)
        {
            let request = EdgeRequest {
                side: EdgeSide::Left,
                generation,
                anchor_timestamp: first.timestamp,
                count: edge.batch_size,
            };
            self.edges.mark_in_flight(EdgeSide::Left);
            trace!(generation, anchor = first.timestamp, "requesting older bars");
            self.pending_requests.push(request);
        }
        if edge.load_right
            && self.visible_end > len - edge.threshold_bars
            && self.edges.can_request(EdgeSide::Right)
        {
            let request = EdgeRequest {
                side: EdgeSide::Right,
                generation,
                anchor_timestamp: last.timestamp,
                count: edge.batch_size,
            };
            self.edges.mark_in_flight(EdgeSide::Right);
            trace!(generation, anchor = last.timestamp, "requesting newer bars");
            self.pending_requests.push(request);
        }
    }
}
