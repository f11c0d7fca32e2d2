use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::{PriceAxisConfig, PriceAxisMode};
use super::label_format::{
    decimals_for_magnitude, decimals_for_step, format_percentage_label, format_price_label,
};
use super::time_axis::TickLevel;

/// Input of [`calculate_price_axis`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceAxisRequest {
    pub price_min: f64,
    pub price_max: f64,
    pub height_px: f64,
    #[serde(default = "default_tick_count_target")]
    pub tick_count_target: usize,
    #[serde(default)]
    pub mode: PriceAxisMode,
    /// Reference price of percentage mode, usually the first visible close.
    #[serde(default)]
    pub base_price: Option<f64>,
    #[serde(default)]
    pub minor_per_step: u8,
}

fn default_tick_count_target() -> usize {
    5
}

impl PriceAxisRequest {
    #[must_use]
    pub fn new(price_min: f64, price_max: f64, height_px: f64) -> Self {
        Self {
            price_min,
            price_max,
            height_px,
            tick_count_target: default_tick_count_target(),
            mode: PriceAxisMode::Linear,
            base_price: None,
            minor_per_step: 0,
        }
    }

    /// Request shaped by an axis configuration.
    #[must_use]
    pub fn from_config(
        price_min: f64,
        price_max: f64,
        height_px: f64,
        config: PriceAxisConfig,
    ) -> Self {
        Self {
            tick_count_target: config.resolve_tick_target(height_px),
            mode: config.mode,
            minor_per_step: config.minor_per_step,
            ..Self::new(price_min, price_max, height_px)
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: PriceAxisMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_base_price(mut self, base_price: f64) -> Self {
        self.base_price = Some(base_price);
        self
    }

    #[must_use]
    pub fn with_tick_count_target(mut self, target: usize) -> Self {
        self.tick_count_target = target;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAxisTick {
    /// Price at which the tick is drawn.
    pub world_pos: f64,
    pub pixel_pos: f64,
    /// Displayed value in mode units (price, log-price, or percent).
    pub value: f64,
    pub label: String,
    pub level: TickLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAxis {
    pub ticks: Vec<PriceAxisTick>,
    /// Tick step in mode units: price, `log10(price)`, or percent.
    pub step: f64,
    pub mode: PriceAxisMode,
}

impl PriceAxis {
    fn empty(mode: PriceAxisMode) -> Self {
        Self {
            ticks: Vec::new(),
            step: 0.0,
            mode,
        }
    }

    pub fn major_ticks(&self) -> impl Iterator<Item = &PriceAxisTick> {
        self.ticks.iter().filter(|tick| tick.level == TickLevel::Major)
    }
}

/// Snaps `range / target` to the nearest of `{1, 2, 5, 10} * 10^n`.
#[must_use]
pub fn nice_step(range: f64, target: usize) -> f64 {
    if !range.is_finite() || range <= 0.0 {
        return 0.0;
    }
    let rough = range / target.max(1) as f64;
    let magnitude = 10_f64.powf(rough.log10().floor());
    let residual = rough / magnitude;
    let nice = if residual < 1.5 {
        1.0
    } else if residual < 3.5 {
        2.0
    } else if residual < 7.5 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Tick target derived from the canvas height at the default label spacing.
#[must_use]
pub fn price_tick_target_for_height(height_px: f64) -> usize {
    PriceAxisConfig {
        tick_count_target: None,
        ..PriceAxisConfig::default()
    }
    .resolve_tick_target(height_px)
}

/// Maps between prices and the value space the ticks are chosen in.
#[derive(Debug, Clone, Copy)]
enum ValueSpace {
    Linear,
    Log,
    Percentage { base: f64 },
}

impl ValueSpace {
    fn to_value(self, price: f64) -> f64 {
        match self {
            Self::Linear => price,
            Self::Log => price.log10(),
            Self::Percentage { base } => (price / base - 1.0) * 100.0,
        }
    }

    fn to_price(self, value: f64) -> f64 {
        match self {
            Self::Linear => value,
            Self::Log => 10_f64.powf(value),
            Self::Percentage { base } => base * (1.0 + value / 100.0),
        }
    }

    fn label(self, value: f64, step: f64) -> String {
        match self {
            Self::Linear => format_price_label(value, decimals_for_step(step)),
            Self::Log => {
                let price = self.to_price(value);
                format_price_label(price, decimals_for_magnitude(price))
            }
            Self::Percentage { .. } => {
                format_percentage_label(value, decimals_for_step(step).max(2))
            }
        }
    }
}

/// Nice-number price ticks over `[price_min, price_max]`.
///
/// Ticks are integer multiples of the step covering
/// `floor(min / step) ..= ceil(max / step)`, so the outermost ticks may fall
/// just outside the range. Pixel positions use the linear price mapping of the
/// plot. Log mode needs a positive range and percentage mode a positive base;
/// otherwise the request falls back to linear ticks.
#[must_use]
pub fn calculate_price_axis(request: &PriceAxisRequest) -> PriceAxis {
    let PriceAxisRequest {
        price_min,
        price_max,
        height_px,
        ..
    } = *request;
    if !price_min.is_finite() || !price_max.is_finite() || price_max <= price_min {
        return PriceAxis::empty(request.mode);
    }

    let (space, mode) = match request.mode {
        PriceAxisMode::Linear => (ValueSpace::Linear, PriceAxisMode::Linear),
        PriceAxisMode::Log if price_min > 0.0 => (ValueSpace::Log, PriceAxisMode::Log),
        PriceAxisMode::Percentage => match request.base_price {
            Some(base) if base.is_finite() && base > 0.0 => {
                (ValueSpace::Percentage { base }, PriceAxisMode::Percentage)
            }
            _ => {
                debug!(
                    base = ?request.base_price,
                    "percentage axis without base price, using linear"
                );
                (ValueSpace::Linear, PriceAxisMode::Linear)
            }
        },
        PriceAxisMode::Log => {
            debug!(price_min, "log axis over non-positive prices, using linear");
            (ValueSpace::Linear, PriceAxisMode::Linear)
        }
    };

    let value_min = space.to_value(price_min);
    let value_max = space.to_value(price_max);
    let step = nice_step(value_max - value_min, request.tick_count_target);
    if step <= 0.0 || !step.is_finite() {
        return PriceAxis::empty(mode);
    }

    let to_pixel = |price: f64| (price_max - price) / (price_max - price_min) * height_px;
    let make_tick = |value: f64, level: TickLevel| {
        let price = space.to_price(value);
        PriceAxisTick {
            world_pos: price,
            pixel_pos: to_pixel(price),
            value,
            label: space.label(value, step),
            level,
        }
    };

    let first = (value_min / step).floor() as i64;
    let last = (value_max / step).ceil() as i64;
    let minor_per_step = usize::from(request.minor_per_step);
    let mut ticks = Vec::with_capacity(((last - first + 1) as usize) * (minor_per_step + 1));
    for k in first..=last {
        let value = k as f64 * step;
        ticks.push(make_tick(value, TickLevel::Major));
        if k == last {
            break;
        }
        for minor in 1..=minor_per_step {
            let fraction = minor as f64 / (minor_per_step + 1) as f64;
            let minor_value = value + step * fraction;
            if minor_value >= value_min && minor_value <= value_max {
                ticks.push(make_tick(minor_value, TickLevel::Minor));
            }
        }
    }

    PriceAxis { ticks, step, mode }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{PriceAxisRequest, calculate_price_axis, nice_step, price_tick_target_for_height};
    use crate::axis::config::PriceAxisMode;
    use crate::axis::time_axis::TickLevel;

    #[test]
    fn nice_step_snaps_to_one_two_five() {
        assert_relative_eq!(nice_step(100.0, 5), 20.0);
        assert_relative_eq!(nice_step(13.0, 5), 2.0);
        assert_relative_eq!(nice_step(7.0, 5), 1.0);
        assert_relative_eq!(nice_step(0.4, 5), 0.1, max_relative = 1e-12);
        assert_relative_eq!(nice_step(36.0, 5), 5.0);
        assert_relative_eq!(nice_step(38.0, 5), 10.0);
        assert_eq!(nice_step(0.0, 5), 0.0);
    }

    #[test]
    fn nice_step_picks_nearest_candidate_between_midpoints() {
        // Residual 3.2 sits closer to 2 than to 5.
        assert_relative_eq!(nice_step(16.0, 5), 2.0);
        assert_relative_eq!(nice_step(17.4, 5), 2.0, max_relative = 1e-12);
        assert_relative_eq!(nice_step(17.5, 5), 5.0);
        // Residual 7.2 sits closer to 5 than to 10.
        assert_relative_eq!(nice_step(0.72, 1), 0.5, max_relative = 1e-12);
        assert_relative_eq!(nice_step(750.0, 1), 1000.0);
    }

    #[test]
    fn linear_ticks_cover_range_on_step_multiples() {
        let axis = calculate_price_axis(&PriceAxisRequest::new(1663.0, 1701.0, 400.0));
        assert_relative_eq!(axis.step, 10.0);
        let values: Vec<f64> = axis.ticks.iter().map(|tick| tick.value).collect();
        assert_eq!(values, vec![1660.0, 1670.0, 1680.0, 1690.0, 1700.0, 1710.0]);
        assert_eq!(axis.ticks[2].label, "1680");
        assert_relative_eq!(axis.ticks[2].pixel_pos, (1701.0 - 1680.0) / 38.0 * 400.0);
    }

    #[test]
    fn log_mode_exponentiates_nice_log_steps() {
        let request = PriceAxisRequest::new(10.0, 1000.0, 400.0).with_mode(PriceAxisMode::Log);
        let axis = calculate_price_axis(&request);
        assert_eq!(axis.mode, PriceAxisMode::Log);
        assert!(axis.ticks.iter().any(|tick| (tick.world_pos - 100.0).abs() < 1e-9));
        assert!(axis.ticks.windows(2).all(|pair| pair[0].world_pos < pair[1].world_pos));
    }

    #[test]
    fn percentage_mode_rebases_on_base_price() {
        let request = PriceAxisRequest::new(95.0, 110.0, 300.0)
            .with_mode(PriceAxisMode::Percentage)
            .with_base_price(100.0);
        let axis = calculate_price_axis(&request);
        let zero = axis
            .ticks
            .iter()
            .find(|tick| tick.value == 0.0)
            .expect("zero percent tick");
        assert_relative_eq!(zero.world_pos, 100.0);
        assert_eq!(zero.label, "0.00%");
        // -5..+10 percent over five ticks snaps to a 2% step.
        assert_relative_eq!(axis.step, 2.0);
        assert!(axis.ticks.iter().any(|tick| tick.label == "+4.00%"));
        assert!(axis.ticks.iter().any(|tick| tick.label == "-4.00%"));
    }

    #[test]
    fn percentage_without_base_falls_back_to_linear() {
        let request = PriceAxisRequest::new(95.0, 110.0, 300.0).with_mode(PriceAxisMode::Percentage);
        assert_eq!(calculate_price_axis(&request).mode, PriceAxisMode::Linear);
    }

    #[test]
    fn minor_ticks_stay_inside_range() {
        let mut request = PriceAxisRequest::new(1663.0, 1701.0, 400.0);
        request.minor_per_step = 1;
        let axis = calculate_price_axis(&request);
        let minors: Vec<f64> = axis
            .ticks
            .iter()
            .filter(|tick| tick.level == TickLevel::Minor)
            .map(|tick| tick.value)
            .collect();
        assert_eq!(minors, vec![1665.0, 1675.0, 1685.0, 1695.0]);
    }

    #[test]
    fn degenerate_ranges_produce_no_ticks() {
        assert!(calculate_price_axis(&PriceAxisRequest::new(5.0, 5.0, 100.0)).ticks.is_empty());
        assert!(calculate_price_axis(&PriceAxisRequest::new(f64::NAN, 5.0, 100.0)).ticks.is_empty());
        assert_eq!(price_tick_target_for_height(480.0), 11);
    }
}
