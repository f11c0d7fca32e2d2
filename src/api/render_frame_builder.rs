use std::ops::Range;
use std::sync::Arc;

use tracing::trace;

use crate::axis::{
    PriceAxis, PriceAxisConfig, PriceAxisMode, PriceAxisRequest, TimeAxis, calculate_price_axis,
    calculate_time_axis,
};
use crate::drawing::{DrawingState, geometry};
use crate::layout::{
    LabelCandidate, LabelPriority, PixelBox, estimate_label_text_width_px,
    resolve_collisions_adaptive, resolve_collisions_with_truncation,
};
use crate::levels::{KeyLevel, detect_key_levels};
use crate::render::{RenderFrame, Renderer};
use crate::viewport::ViewportState;

use super::{ChartEngine, ChartEngineConfig};

const PRICE_LABEL_SPACING_PX: f64 = 4.0;
const LABEL_PADDING_PX: f64 = 4.0;

/// Hit/miss counters of the frame memo cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameCacheStats {
    pub axis_hits: u64,
    pub axis_misses: u64,
    pub level_hits: u64,
    pub level_misses: u64,
}

#[derive(Debug, Clone, PartialEq)]
struct AxisKey {
    state: ViewportState,
    data_revision: u64,
    price_axis: PriceAxisConfig,
}

#[derive(Debug, Clone)]
struct CachedAxes {
    time_axis: TimeAxis,
    price_axis: PriceAxis,
    time_labels: Vec<LabelCandidate>,
    price_labels: Vec<LabelCandidate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LevelKey {
    window: Range<usize>,
    data_revision: u64,
}

/// Memoized axis and key-level output keyed on their exact inputs.
#[derive(Debug, Clone, Default)]
pub(super) struct FrameCache {
    axes: Option<(AxisKey, CachedAxes)>,
    levels: Option<(LevelKey, Vec<KeyLevel>)>,
    stats: FrameCacheStats,
}

impl FrameCache {
    pub(super) fn clear(&mut self) {
        self.axes = None;
        self.levels = None;
    }
}

fn time_label_candidates(axis: &TimeAxis, config: &ChartEngineConfig) -> Vec<LabelCandidate> {
    let font = config.label_font_size_px;
    let height = font + LABEL_PADDING_PX;
    axis.major_ticks()
        .map(|tick| {
            let width = estimate_label_text_width_px(&tick.label, font) + LABEL_PADDING_PX;
            let priority = if tick.is_key_moment {
                LabelPriority::Pinned
            } else {
                LabelPriority::Major
            };
            LabelCandidate::new(
                tick.label.clone(),
                PixelBox::centered(tick.pixel_pos, height / 2.0, width, height),
                priority,
            )
        })
        .collect()
}

fn price_label_candidates(axis: &PriceAxis, config: &ChartEngineConfig) -> Vec<LabelCandidate> {
    let font = config.label_font_size_px;
    let height = font + LABEL_PADDING_PX;
    axis.major_ticks()
        .map(|tick| {
            let width = estimate_label_text_width_px(&tick.label, font) + LABEL_PADDING_PX;
            LabelCandidate::new(
                tick.label.clone(),
                PixelBox::new(0.0, tick.pixel_pos - height / 2.0, width, height),
                LabelPriority::Major,
            )
        })
        .collect()
}

fn build_axes<R: Renderer>(engine: &ChartEngine<R>, state: ViewportState) -> CachedAxes {
    let config = &engine.core.config;
    let viewport = &engine.core.viewport;
    let time_axis = calculate_time_axis(
        viewport.bars(),
        state.timeframe,
        f64::from(state.width_px),
        Some((state.visible_start, state.visible_end)),
        &config.time_axis,
    );
    let mut request = PriceAxisRequest::from_config(
        state.price_min,
        state.price_max,
        f64::from(state.height_px),
        config.price_axis,
    );
    if config.price_axis.mode == PriceAxisMode::Percentage {
        if let Some(first) = viewport.visible_data().first() {
            request = request.with_base_price(first.close);
        }
    }
    let price_axis = calculate_price_axis(&request);

    let time_labels =
        resolve_collisions_adaptive(&time_label_candidates(&time_axis, config), config.time_label_layout);
    let price_labels = resolve_collisions_with_truncation(
        &price_label_candidates(&price_axis, config),
        PRICE_LABEL_SPACING_PX,
        config.price_label_truncation,
    );
    CachedAxes {
        time_axis,
        price_axis,
        time_labels,
        price_labels,
    }
}

impl<R: Renderer> ChartEngine<R> {
    #[must_use]
    pub fn frame_cache_stats(&self) -> FrameCacheStats {
        self.core.frame_cache.stats
    }

    fn cached_axes(&mut self, state: ViewportState) -> CachedAxes {
        let key = AxisKey {
            state,
            data_revision: self.core.data_revision,
            price_axis: self.core.config.price_axis,
        };
        if self.core.config.enable_frame_cache {
            if let Some((cached_key, axes)) = &self.core.frame_cache.axes {
                if *cached_key == key {
                    self.core.frame_cache.stats.axis_hits += 1;
                    return axes.clone();
                }
            }
        }
        self.core.frame_cache.stats.axis_misses += 1;
        let axes = build_axes(self, state);
        if self.core.config.enable_frame_cache {
            self.core.frame_cache.axes = Some((key, axes.clone()));
        }
        axes
    }

    fn cached_key_levels(&mut self) -> Vec<KeyLevel> {
        if !self.core.config.show_key_levels {
            return Vec::new();
        }
        let offset = self.core.viewport.visible_data_offset();
        let key = LevelKey {
            window: offset..offset + self.core.viewport.visible_data().len(),
            data_revision: self.core.data_revision,
        };
        if self.core.config.enable_frame_cache {
            if let Some((cached_key, levels)) = &self.core.frame_cache.levels {
                if *cached_key == key {
                    self.core.frame_cache.stats.level_hits += 1;
                    return levels.clone();
                }
            }
        }
        self.core.frame_cache.stats.level_misses += 1;
        let levels = detect_key_levels(self.core.viewport.visible_data(), &self.core.config.key_levels);
        if self.core.config.enable_frame_cache {
            self.core.frame_cache.levels = Some((key, levels.clone()));
        }
        levels
    }

    /// Materializes the current scene, or `None` while the viewport has no data.
    pub fn build_render_frame(&mut self) -> Option<RenderFrame> {
        let state = self.core.viewport.state().ready()?;
        let transform = self.core.viewport.transform()?;
        let axes = self.cached_axes(state);
        let key_levels = self.cached_key_levels();

        let drawings = self.core.drawings.snapshot();
        let mut drawing_geometry: Vec<_> = drawings
            .iter()
            .map(|object| geometry(object, &transform))
            .collect();
        let in_progress = self.core.drawings.in_progress().cloned();
        if self.core.drawings.state() == DrawingState::Drawing {
            if let Some(draft) = &in_progress {
                drawing_geometry.push(geometry(draft, &transform));
            }
        }

        let offset = self.core.viewport.visible_data_offset();
        let visible_len = self.core.viewport.visible_data().len();
        trace!(
            time_labels = axes.time_labels.len(),
            price_labels = axes.price_labels.len(),
            key_levels = key_levels.len(),
            drawings = drawings.len(),
            "render frame built"
        );
        Some(RenderFrame {
            viewport: state,
            bars: Arc::clone(self.core.viewport.bars()),
            visible_bars: offset..offset + visible_len,
            time_axis: axes.time_axis,
            price_axis: axes.price_axis,
            visible_time_labels: axes.time_labels,
            visible_price_labels: axes.price_labels,
            key_levels,
            drawings,
            drawing_geometry,
            in_progress,
            selected: self.core.drawings.selected().cloned(),
        })
    }
}
