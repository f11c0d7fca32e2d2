use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Spacing of round-number levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RoundStep {
    /// Multiples of a fixed price step.
    Fixed(f64),
    /// Nice-number step giving about `target_count` levels over the window range.
    Auto { target_count: usize },
}

impl Default for RoundStep {
    fn default() -> Self {
        Self::Fixed(10.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyLevelConfig {
    pub detect_swings: bool,
    /// Bars compared on each side of a swing candidate.
    pub swing_window: usize,
    pub detect_support_resistance: bool,
    /// Relative distance under which closes join one cluster.
    pub cluster_threshold: f64,
    pub min_touch_count: usize,
    pub detect_round_numbers: bool,
    pub round_step: RoundStep,
    pub max_round_levels: usize,
    pub detect_vwap: bool,
    /// Relative distance under which detected levels merge.
    pub merge_tolerance: f64,
    pub min_strength: f64,
}

impl Default for KeyLevelConfig {
    fn default() -> Self {
        Self {
            detect_swings: true,
            swing_window: 10,
            detect_support_resistance: true,
            cluster_threshold: 0.005,
            min_touch_count: 2,
            detect_round_numbers: true,
            round_step: RoundStep::default(),
            max_round_levels: 10,
            detect_vwap: true,
            merge_tolerance: 0.001,
            min_strength: 0.0,
        }
    }
}

impl KeyLevelConfig {
    #[must_use]
    pub fn with_round_step(mut self, round_step: RoundStep) -> Self {
        self.round_step = round_step;
        self
    }

    #[must_use]
    pub fn with_swing_window(mut self, swing_window: usize) -> Self {
        self.swing_window = swing_window;
        self
    }

    #[must_use]
    pub fn with_min_strength(mut self, min_strength: f64) -> Self {
        self.min_strength = min_strength;
        self
    }

    pub fn validate(self) -> ChartResult<Self> {
        if self.swing_window == 0 {
            return Err(ChartError::InvalidConfig(
                "swing window must be > 0".to_owned(),
            ));
        }
        for (name, value) in [
            ("cluster_threshold", self.cluster_threshold),
            ("merge_tolerance", self.merge_tolerance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ChartError::InvalidConfig(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.min_strength) {
            return Err(ChartError::InvalidConfig(
                "min_strength must be within [0, 1]".to_owned(),
            ));
        }
        match self.round_step {
            RoundStep::Fixed(step) if !step.is_finite() || step <= 0.0 => {
                return Err(ChartError::InvalidConfig(
                    "round-number step must be finite and > 0".to_owned(),
                ));
            }
            RoundStep::Auto { target_count: 0 } => {
                return Err(ChartError::InvalidConfig(
                    "round-number target count must be > 0".to_owned(),
                ));
            }
            _ => {}
        }
        Ok(self)
    }
}
