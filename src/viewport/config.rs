use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// When and how much history to request as the view nears a data edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeLoadingConfig {
    /// Distance in bars from an edge that triggers a request.
    pub threshold_bars: f64,
    /// Bars asked for per request.
    pub batch_size: usize,
    pub load_left: bool,
    pub load_right: bool,
}

impl Default for EdgeLoadingConfig {
    fn default() -> Self {
        Self {
            threshold_bars: 50.0,
            batch_size: 500,
            load_left: true,
            load_right: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub min_visible_bars: f64,
    pub max_visible_bars: f64,
    /// Fraction of the visible price span added above and below.
    pub price_padding_ratio: f64,
    /// Flat price ranges narrower than this are widened before padding.
    pub min_price_span: f64,
    /// Real bars that must stay on screen while overscrolling.
    pub min_overlap_bars: f64,
    pub wheel_zoom_sensitivity: f64,
    /// Offset used to find January 1 for the year-to-date preset.
    pub utc_offset_minutes: i16,
    pub edge: EdgeLoadingConfig,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_visible_bars: 20.0,
            max_visible_bars: 2000.0,
            price_padding_ratio: 0.08,
            min_price_span: 1e-6,
            min_overlap_bars: 5.0,
            wheel_zoom_sensitivity: 0.1,
            utc_offset_minutes: 0,
            edge: EdgeLoadingConfig::default(),
        }
    }
}

impl ViewportConfig {
    #[must_use]
    pub fn with_visible_bar_limits(mut self, min: f64, max: f64) -> Self {
        self.min_visible_bars = min;
        self.max_visible_bars = max;
        self
    }

    #[must_use]
    pub fn with_edge_loading(mut self, edge: EdgeLoadingConfig) -> Self {
        self.edge = edge;
        self
    }

    pub fn validate(self) -> ChartResult<Self> {
        if !self.min_visible_bars.is_finite()
            || !self.max_visible_bars.is_finite()
            || self.min_visible_bars <= 0.0
            || self.max_visible_bars < self.min_visible_bars
        {
            return Err(ChartError::InvalidConfig(
                "visible bar limits require 0 < min <= max".to_owned(),
            ));
        }
        if !(0.0..0.5).contains(&self.price_padding_ratio) {
            return Err(ChartError::InvalidConfig(
                "price padding ratio must be within [0, 0.5)".to_owned(),
            ));
        }
        if !self.min_price_span.is_finite() || self.min_price_span <= 0.0 {
            return Err(ChartError::InvalidConfig(
                "min price span must be finite and > 0".to_owned(),
            ));
        }
        if !self.min_overlap_bars.is_finite() || self.min_overlap_bars < 0.0 {
            return Err(ChartError::InvalidConfig(
                "min overlap bars must be finite and >= 0".to_owned(),
            ));
        }
        if !self.wheel_zoom_sensitivity.is_finite() || self.wheel_zoom_sensitivity <= 0.0 {
            return Err(ChartError::InvalidConfig(
                "wheel zoom sensitivity must be finite and > 0".to_owned(),
            ));
        }
        if !self.edge.threshold_bars.is_finite() || self.edge.threshold_bars < 0.0 {
            return Err(ChartError::InvalidConfig(
                "edge threshold must be finite and >= 0".to_owned(),
            ));
        }
        if self.edge.batch_size == 0 {
            return Err(ChartError::InvalidConfig(
                "edge batch size must be > 0".to_owned(),
            ));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::ViewportConfig;

    #[test]
    fn default_config_is_valid() {
        assert!(ViewportConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_inverted_limits() {
        let config = ViewportConfig::default().with_visible_bar_limits(100.0, 10.0);
        assert!(config.validate().is_err());
    }
}
