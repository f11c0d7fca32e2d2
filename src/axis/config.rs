use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{ChartError, ChartResult};

/// Timezone used to align calendar boundaries and format time labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TimeAxisTimeZone {
    #[default]
    Utc,
    FixedOffsetMinutes {
        minutes: i16,
    },
}

impl TimeAxisTimeZone {
    #[must_use]
    pub fn offset_minutes(self) -> i16 {
        match self {
            Self::Utc => 0,
            Self::FixedOffsetMinutes { minutes } => minutes,
        }
    }

    #[must_use]
    pub fn fixed_offset(self) -> FixedOffset {
        let seconds = i32::from(self.offset_minutes()) * 60;
        FixedOffset::east_opt(seconds)
            .unwrap_or_else(|| Utc.fix())
    }

    fn validate(self) -> ChartResult<Self> {
        if self.offset_minutes().unsigned_abs() >= 24 * 60 {
            return Err(ChartError::InvalidConfig(
                "timezone offset must be within +/-24h".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// Trading-session envelope whose boundaries are flagged as key moments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeAxisSessionConfig {
    pub start_hour: u8,
    pub start_minute: u8,
    pub end_hour: u8,
    pub end_minute: u8,
    /// Optional midday break `(start_minute_of_day, end_minute_of_day)`.
    #[serde(default)]
    pub break_minutes: Option<(u16, u16)>,
}

impl TimeAxisSessionConfig {
    /// Shanghai/Shenzhen cash session: 09:30–15:00 with a 11:30–13:00 break.
    #[must_use]
    pub fn a_share() -> Self {
        Self {
            start_hour: 9,
            start_minute: 30,
            end_hour: 15,
            end_minute: 0,
            break_minutes: Some((11 * 60 + 30, 13 * 60)),
        }
    }

    #[must_use]
    pub fn start_minute_of_day(self) -> u16 {
        u16::from(self.start_hour) * 60 + u16::from(self.start_minute)
    }

    #[must_use]
    pub fn end_minute_of_day(self) -> u16 {
        u16::from(self.end_hour) * 60 + u16::from(self.end_minute)
    }

    /// Session open/close plus break edges, in local minutes of day.
    #[must_use]
    pub fn key_minutes(self) -> SmallVec<[u16; 4]> {
        let mut minutes = SmallVec::new();
        minutes.push(self.start_minute_of_day());
        if let Some((break_start, break_end)) = self.break_minutes {
            minutes.push(break_start);
            minutes.push(break_end);
        }
        minutes.push(self.end_minute_of_day());
        minutes
    }

    #[must_use]
    pub fn is_key_minute(self, minute_of_day: u16) -> bool {
        self.key_minutes().contains(&minute_of_day)
    }

    fn validate(self) -> ChartResult<Self> {
        if self.start_hour > 23 || self.end_hour > 23 || self.start_minute > 59 || self.end_minute > 59
        {
            return Err(ChartError::InvalidConfig(
                "session hours must be < 24 and minutes < 60".to_owned(),
            ));
        }
        if let Some((start, end)) = self.break_minutes {
            if start >= end || end >= 24 * 60 {
                return Err(ChartError::InvalidConfig(
                    "session break must be a non-empty minute range within the day".to_owned(),
                ));
            }
        }
        Ok(self)
    }
}

/// Tuning for the time-axis tick generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeAxisConfig {
    pub min_ticks: usize,
    pub max_ticks: usize,
    /// Minor gridlines are skipped when they would exceed `max_ticks * factor`.
    pub max_minor_ticks_factor: usize,
    pub timezone: TimeAxisTimeZone,
    pub session: Option<TimeAxisSessionConfig>,
}

impl Default for TimeAxisConfig {
    fn default() -> Self {
        Self {
            min_ticks: 5,
            max_ticks: 9,
            max_minor_ticks_factor: 4,
            timezone: TimeAxisTimeZone::Utc,
            session: None,
        }
    }
}

impl TimeAxisConfig {
    #[must_use]
    pub fn with_timezone(mut self, timezone: TimeAxisTimeZone) -> Self {
        self.timezone = timezone;
        self
    }

    #[must_use]
    pub fn with_session(mut self, session: TimeAxisSessionConfig) -> Self {
        self.session = Some(session);
        self
    }

    pub fn validate(self) -> ChartResult<Self> {
        if self.min_ticks == 0 || self.max_ticks < self.min_ticks {
            return Err(ChartError::InvalidConfig(
                "time axis requires 0 < min_ticks <= max_ticks".to_owned(),
            ));
        }
        self.timezone.validate()?;
        if let Some(session) = self.session {
            session.validate()?;
        }
        Ok(self)
    }
}

/// Value space used to place price ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PriceAxisMode {
    /// Nice numbers in raw price units.
    #[default]
    Linear,
    /// Nice numbers in `log10(price)` units.
    Log,
    /// Nice numbers in percent change from the first visible close.
    Percentage,
}

/// Tuning for the price-axis tick generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceAxisConfig {
    pub mode: PriceAxisMode,
    /// Fixed tick target; `None` derives it from the canvas height.
    pub tick_count_target: Option<usize>,
    pub target_spacing_px: f64,
    pub min_ticks: usize,
    pub max_ticks: usize,
    /// Minor gridlines drawn between two labeled ticks.
    pub minor_per_step: u8,
}

impl Default for PriceAxisConfig {
    fn default() -> Self {
        Self {
            mode: PriceAxisMode::Linear,
            tick_count_target: Some(5),
            target_spacing_px: 48.0,
            min_ticks: 2,
            max_ticks: 12,
            minor_per_step: 0,
        }
    }
}

impl PriceAxisConfig {
    #[must_use]
    pub fn with_mode(mut self, mode: PriceAxisMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn validate(self) -> ChartResult<Self> {
        if let Some(target) = self.tick_count_target {
            if target == 0 {
                return Err(ChartError::InvalidConfig(
                    "price axis tick target must be > 0".to_owned(),
                ));
            }
        }
        if !self.target_spacing_px.is_finite() || self.target_spacing_px <= 0.0 {
            return Err(ChartError::InvalidConfig(
                "price axis target spacing must be finite and > 0".to_owned(),
            ));
        }
        if self.min_ticks == 0 || self.max_ticks < self.min_ticks {
            return Err(ChartError::InvalidConfig(
                "price axis requires 0 < min_ticks <= max_ticks".to_owned(),
            ));
        }
        Ok(self)
    }

    /// Tick target for a canvas of `height_px` pixels.
    #[must_use]
    pub fn resolve_tick_target(self, height_px: f64) -> usize {
        match self.tick_count_target {
            Some(target) => target,
            None => super::ticks::axis_tick_target_count(
                height_px,
                self.target_spacing_px,
                self.min_ticks,
                self.max_ticks,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{TimeAxisConfig, TimeAxisSessionConfig};

    #[test]
    fn a_share_session_exposes_four_key_minutes() {
        let minutes = TimeAxisSessionConfig::a_share().key_minutes();
        assert_eq!(minutes.as_slice(), &[570, 690, 780, 900]);
    }

    #[test]
    fn rejects_inverted_tick_bounds() {
        let config = TimeAxisConfig {
            min_ticks: 9,
            max_ticks: 5,
            ..TimeAxisConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
