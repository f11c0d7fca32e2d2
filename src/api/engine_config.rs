use serde::{Deserialize, Serialize};

use crate::axis::{PriceAxisConfig, TimeAxisConfig};
use crate::drawing::DrawingConfig;
use crate::error::{ChartError, ChartResult};
use crate::layout::{AdaptiveLayoutConfig, TruncationConfig};
use crate::levels::KeyLevelConfig;
use crate::viewport::ViewportConfig;

/// Complete configuration of one chart instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartEngineConfig {
    pub viewport: ViewportConfig,
    pub time_axis: TimeAxisConfig,
    pub price_axis: PriceAxisConfig,
    /// Collision pass applied to time-axis labels.
    pub time_label_layout: AdaptiveLayoutConfig,
    /// Truncation pass applied to price-axis labels.
    pub price_label_truncation: TruncationConfig,
    pub key_levels: KeyLevelConfig,
    pub drawing: DrawingConfig,
    pub label_font_size_px: f64,
    pub show_key_levels: bool,
    /// Reuse axes and key levels across frames whose inputs did not change.
    pub enable_frame_cache: bool,
}

impl Default for ChartEngineConfig {
    fn default() -> Self {
        Self {
            viewport: ViewportConfig::default(),
            time_axis: TimeAxisConfig::default(),
            price_axis: PriceAxisConfig::default(),
            time_label_layout: AdaptiveLayoutConfig::default(),
            price_label_truncation: TruncationConfig::default(),
            key_levels: KeyLevelConfig::default(),
            drawing: DrawingConfig::default(),
            label_font_size_px: 11.0,
            show_key_levels: true,
            enable_frame_cache: true,
        }
    }
}

impl ChartEngineConfig {
    #[must_use]
    pub fn with_viewport(mut self, viewport: ViewportConfig) -> Self {
        self.viewport = viewport;
        self
    }

    #[must_use]
    pub fn with_time_axis(mut self, time_axis: TimeAxisConfig) -> Self {
        self.time_axis = time_axis;
        self
    }

    #[must_use]
    pub fn with_price_axis(mut self, price_axis: PriceAxisConfig) -> Self {
        self.price_axis = price_axis;
        self
    }

    #[must_use]
    pub fn with_key_levels(mut self, key_levels: KeyLevelConfig) -> Self {
        self.key_levels = key_levels;
        self
    }

    #[must_use]
    pub fn with_drawing(mut self, drawing: DrawingConfig) -> Self {
        self.drawing = drawing;
        self
    }

    #[must_use]
    pub fn with_frame_cache(mut self, enabled: bool) -> Self {
        self.enable_frame_cache = enabled;
        self
    }

    /// Validates every section and aligns the viewport calendar with the
    /// time-axis timezone.
    pub fn validate(mut self) -> ChartResult<Self> {
        self.viewport.utc_offset_minutes = self.time_axis.timezone.offset_minutes();
        self.viewport = self.viewport.validate()?;
        self.time_axis = self.time_axis.validate()?;
        self.price_axis = self.price_axis.validate()?;
        self.time_label_layout = self.time_label_layout.validate()?;
        self.price_label_truncation = self.price_label_truncation.validate()?;
        self.key_levels = self.key_levels.validate()?;
        self.drawing = self.drawing.validate()?;
        if !self.label_font_size_px.is_finite() || self.label_font_size_px <= 0.0 {
            return Err(ChartError::InvalidConfig(
                "label font size must be finite and > 0".to_owned(),
            ));
        }
        Ok(self)
    }
}
