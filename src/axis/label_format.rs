use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Text pattern applied to time-axis labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeLabelFormat {
    /// `HH:MM`
    TimeOfDay,
    /// `MM-DD`
    MonthDay,
    /// `YYYY-MM`
    YearMonth,
    /// `YYYY`
    Year,
}

impl TimeLabelFormat {
    #[must_use]
    pub const fn pattern(self) -> &'static str {
        match self {
            Self::TimeOfDay => "%H:%M",
            Self::MonthDay => "%m-%d",
            Self::YearMonth => "%Y-%m",
            Self::Year => "%Y",
        }
    }
}

pub(crate) fn local_datetime(timestamp_ms: i64, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms).map(|dt| dt.with_timezone(&offset))
}

#[must_use]
pub fn format_time_label(timestamp_ms: i64, format: TimeLabelFormat, offset: FixedOffset) -> String {
    match local_datetime(timestamp_ms, offset) {
        Some(local) => local.format(format.pattern()).to_string(),
        None => timestamp_ms.to_string(),
    }
}

/// Local minute of day (0..1440) of a timestamp.
#[must_use]
pub fn local_minute_of_day(timestamp_ms: i64, offset: FixedOffset) -> Option<u16> {
    let local = local_datetime(timestamp_ms, offset)?;
    Some((local.hour() * 60 + local.minute()) as u16)
}

/// `(year, zero-based month)` of a timestamp in local time.
#[must_use]
pub fn local_year_month(timestamp_ms: i64, offset: FixedOffset) -> Option<(i32, u32)> {
    let local = local_datetime(timestamp_ms, offset)?;
    Some((local.year(), local.month0()))
}

/// Decimals needed to print every multiple of `step` exactly.
#[must_use]
pub fn decimals_for_step(step: f64) -> usize {
    if !step.is_finite() || step <= 0.0 {
        return 2;
    }
    let mut decimals = 0usize;
    let mut scaled = step;
    while decimals < 10 && (scaled - scaled.round()).abs() > 1e-7 * scaled.abs().max(1.0) {
        decimals += 1;
        scaled *= 10.0;
    }
    decimals
}

/// Decimals keeping four significant digits, used for log-mode labels.
#[must_use]
pub fn decimals_for_magnitude(value: f64) -> usize {
    if !value.is_finite() || value == 0.0 {
        return 2;
    }
    let magnitude = value.abs().log10().floor() as i32;
    (3 - magnitude).clamp(0, 8) as usize
}

#[must_use]
pub fn format_price_label(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "nan".to_owned();
    }
    // Avoid printing "-0.00" for values that round to zero.
    let cleaned = if value.abs() < 0.5 * 10_f64.powi(-(decimals as i32)) {
        0.0
    } else {
        value
    };
    format!("{cleaned:.decimals$}")
}

#[must_use]
pub fn format_percentage_label(value: f64, decimals: usize) -> String {
    let body = format_price_label(value, decimals);
    if body.starts_with('-') || body.trim_start_matches(['0', '.']).is_empty() {
        format!("{body}%")
    } else {
        format!("+{body}%")
    }
}
