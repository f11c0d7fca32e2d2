use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use chrono::{Datelike, FixedOffset, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::core::Bar;
use crate::core::windowing::index_at_or_after;
use crate::error::{ChartError, ChartResult};

/// Bar resolution a host should request for a timeframe preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarResolution {
    OneMinute,
    FiveMinutes,
    FifteenMinutes,
    OneHour,
    OneDay,
    OneWeek,
    OneMonth,
}

impl BarResolution {
    #[must_use]
    pub const fn duration_ms(self) -> i64 {
        match self {
            Self::OneMinute => 60_000,
            Self::FiveMinutes => 300_000,
            Self::FifteenMinutes => 900_000,
            Self::OneHour => 3_600_000,
            Self::OneDay => 86_400_000,
            Self::OneWeek => 604_800_000,
            Self::OneMonth => 2_592_000_000,
        }
    }
}

/// How many bars a preset shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresetSpan {
    /// The most recent `n` bars.
    Bars(usize),
    /// From the first bar of the latest bar's calendar year.
    YearToDate,
    /// Every available bar.
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeframePreset {
    pub span: PresetSpan,
    pub resolution: BarResolution,
}

/// Period selector shown in the chart toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Timeframe {
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "5D")]
    FiveDays,
    #[serde(rename = "1M")]
    OneMonth,
    #[default]
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "YTD")]
    YearToDate,
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "5Y")]
    FiveYears,
    #[serde(rename = "ALL")]
    All,
}

impl Timeframe {
    pub const ALL: [Self; 9] = [
        Self::OneDay,
        Self::FiveDays,
        Self::OneMonth,
        Self::ThreeMonths,
        Self::SixMonths,
        Self::YearToDate,
        Self::OneYear,
        Self::FiveYears,
        Self::All,
    ];

    /// Bars-of-history and default resolution for this period.
    ///
    /// Intraday presets assume a 240-minute trading session; daily presets use
    /// 21 trading days per month and 252 per year.
    #[must_use]
    pub const fn preset(self) -> TimeframePreset {
        let (span, resolution) = match self {
            Self::OneDay => (PresetSpan::Bars(240), BarResolution::OneMinute),
            Self::FiveDays => (PresetSpan::Bars(240), BarResolution::FiveMinutes),
            Self::OneMonth => (PresetSpan::Bars(21), BarResolution::OneDay),
            Self::ThreeMonths => (PresetSpan::Bars(63), BarResolution::OneDay),
            Self::SixMonths => (PresetSpan::Bars(126), BarResolution::OneDay),
            Self::YearToDate => (PresetSpan::YearToDate, BarResolution::OneDay),
            Self::OneYear => (PresetSpan::Bars(252), BarResolution::OneDay),
            Self::FiveYears => (PresetSpan::Bars(260), BarResolution::OneWeek),
            Self::All => (PresetSpan::All, BarResolution::OneWeek),
        };
        TimeframePreset { span, resolution }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneDay => "1D",
            Self::FiveDays => "5D",
            Self::OneMonth => "1M",
            Self::ThreeMonths => "3M",
            Self::SixMonths => "6M",
            Self::YearToDate => "YTD",
            Self::OneYear => "1Y",
            Self::FiveYears => "5Y",
            Self::All => "ALL",
        }
    }

    /// Bar indices this preset selects from `bars`.
    ///
    /// Year-to-date starts at the first bar on or after January 1 of the latest
    /// bar's year in the given UTC offset. The range is not capped here.
    #[must_use]
    pub fn index_range(self, bars: &[Bar], utc_offset_minutes: i16) -> Range<usize> {
        let len = bars.len();
        match self.preset().span {
            PresetSpan::Bars(count) => len.saturating_sub(count)..len,
            PresetSpan::All => 0..len,
            PresetSpan::YearToDate => {
                let Some(last) = bars.last() else {
                    return 0..0;
                };
                match year_start_millis(last.timestamp, utc_offset_minutes) {
                    Some(year_start) => index_at_or_after(bars, year_start).min(len - 1)..len,
                    None => 0..len,
                }
            }
        }
    }
}

fn year_start_millis(timestamp_ms: i64, utc_offset_minutes: i16) -> Option<i64> {
    let offset = FixedOffset::east_opt(i32::from(utc_offset_minutes) * 60)?;
    let local = Utc.timestamp_millis_opt(timestamp_ms).single()?.with_timezone(&offset);
    let midnight = NaiveDate::from_ymd_opt(local.year(), 1, 1)?.and_hms_opt(0, 0, 0)?;
    let start = offset.from_local_datetime(&midnight).single()?;
    Some(start.timestamp_millis())
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = ChartError;

    fn from_str(value: &str) -> ChartResult<Self> {
        let normalized = value.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|timeframe| timeframe.as_str() == normalized)
            .ok_or_else(|| ChartError::InvalidConfig(format!("unknown timeframe `{value}`")))
    }
}

#[cfg(test)]
mod tests {
    use super::{PresetSpan, Timeframe};
    use crate::core::Bar;

    const DAY_MS: i64 = 86_400_000;

    fn daily_bars(first_ms: i64, count: usize) -> Vec<Bar> {
        (0..count)
            .map(|i| Bar::new(first_ms + i as i64 * DAY_MS, 10.0, 11.0, 9.0, 10.0, 1.0).expect("bar"))
            .collect()
    }

    #[test]
    fn parses_toolbar_labels() {
        assert_eq!("1m".parse::<Timeframe>().expect("1M"), Timeframe::OneMonth);
        assert_eq!("ytd".parse::<Timeframe>().expect("YTD"), Timeframe::YearToDate);
        assert!("2W".parse::<Timeframe>().is_err());
    }

    #[test]
    fn one_month_preset_is_twenty_one_bars() {
        assert_eq!(Timeframe::OneMonth.preset().span, PresetSpan::Bars(21));
    }

    #[test]
    fn bar_presets_select_latest_bars() {
        let bars = daily_bars(0, 500);
        assert_eq!(Timeframe::OneMonth.index_range(&bars, 0), 479..500);
        assert_eq!(Timeframe::All.index_range(&bars, 0), 0..500);
        assert_eq!(Timeframe::OneYear.index_range(&bars[..10], 0), 0..10);
    }

    #[test]
    fn year_to_date_starts_at_first_bar_of_year() {
        // 2023-12-22T00:00:00Z, daily bars run into January 2024.
        let bars = daily_bars(1_703_203_200_000, 20);
        let range = Timeframe::YearToDate.index_range(&bars, 0);
        assert_eq!(range, 10..20);
        // In UTC-10 the 2024-01-01T00:00Z bar is still Dec 31 local.
        let range = Timeframe::YearToDate.index_range(&bars, -600);
        assert_eq!(range, 11..20);
    }
}
