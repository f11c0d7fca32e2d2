use std::sync::Arc;

use tracing::{debug, trace};

use crate::axis::PriceAxisMode;
use crate::core::{Bar, Timeframe};
use crate::extensions::PluginEvent;
use crate::render::Renderer;
use crate::viewport::{EdgeApplyOutcome, EdgeResponse, EdgeSide};

use super::{ChartEngine, InvalidationTopic};

impl<R: Renderer> ChartEngine<R> {
    /// Replaces the bar store. Outstanding edge responses become stale.
    pub fn set_data(&mut self, bars: impl Into<Arc<[Bar]>>) {
        self.core.viewport.set_data(bars);
        self.core.data_revision = self.core.data_revision.wrapping_add(1);
        self.invalidate(InvalidationTopic::Data);
        let bar_count = self.core.viewport.bar_count();
        self.emit_plugin_event(PluginEvent::DataReplaced { bar_count });
        self.after_viewport_mutation();
    }

    pub fn apply_timeframe(&mut self, timeframe: Timeframe) {
        self.core.viewport.apply_timeframe(timeframe);
        self.after_viewport_mutation();
    }

    pub fn set_canvas_size(&mut self, width: u32, height: u32) {
        if self.core.viewport.canvas_size().width == width
            && self.core.viewport.canvas_size().height == height
        {
            return;
        }
        self.core.viewport.set_canvas_size(width, height);
        self.invalidate(InvalidationTopic::Viewport);
    }

    /// Switches linear, log and percentage price ticks.
    pub fn set_price_axis_mode(&mut self, mode: PriceAxisMode) {
        if self.core.config.price_axis.mode == mode {
            return;
        }
        debug!(?mode, "price axis mode changed");
        self.core.config.price_axis.mode = mode;
        self.invalidate(InvalidationTopic::Style);
    }

    pub fn zoom_at(&mut self, pixel_x: f64, zoom_factor: f64) {
        self.core.viewport.zoom_at(pixel_x, zoom_factor);
        self.after_viewport_mutation();
    }

    pub fn pan_by(&mut self, bars_delta: f64) {
        self.core.viewport.pan_by(bars_delta);
        self.after_viewport_mutation();
    }

    /// Applies a range from a linked chart.
    pub fn set_visible_range(&mut self, start: f64, end: f64) {
        self.core.viewport.set_visible_range(start, end);
        self.after_viewport_mutation();
    }

    /// Merges bars delivered by the [`crate::viewport::BarSupply`].
    ///
    /// Prepends rebase every drawing by the number of inserted bars so
    /// annotations stay attached to the same candles.
    pub fn apply_edge_response(&mut self, response: EdgeResponse) -> EdgeApplyOutcome {
        let outcome = self.core.viewport.apply_edge_response(response);
        match outcome {
            EdgeApplyOutcome::Stale | EdgeApplyOutcome::Ignored => {
                trace!(?outcome, "edge response dropped");
                return outcome;
            }
            EdgeApplyOutcome::Exhausted { side } => {
                debug!(?side, "edge exhausted");
                return outcome;
            }
            EdgeApplyOutcome::Prepended { count } => {
                self.core.drawings.shift_time(outcome.time_shift());
                self.after_drawings_changed();
                self.emit_plugin_event(PluginEvent::DataExtended {
                    prepended: count,
                    appended: 0,
                });
            }
            EdgeApplyOutcome::Appended { count } => {
                self.emit_plugin_event(PluginEvent::DataExtended {
                    prepended: 0,
                    appended: count,
                });
            }
        }
        self.core.data_revision = self.core.data_revision.wrapping_add(1);
        self.invalidate(InvalidationTopic::Data);
        self.after_viewport_mutation();
        outcome
    }

    /// Forwards queued edge requests to the supply, then announces the new
    /// range.
    pub(super) fn after_viewport_mutation(&mut self) {
        for request in self.core.viewport.take_edge_requests() {
            debug!(
                side = ?request.side,
                generation = request.generation,
                count = request.count,
                "requesting more bars"
            );
            match request.side {
                EdgeSide::Left => self.core.supply.load_more_left(request),
                EdgeSide::Right => self.core.supply.load_more_right(request),
            }
        }
        self.emit_visible_range_changed();
    }
}
