use serde::{Deserialize, Serialize};

const MINUTE_MS: i64 = 60_000;
const DAY_MINUTES: i64 = 24 * 60;

/// Candidate spacing for time-axis ticks, ordered fine to coarse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeInterval {
    Minutes(u16),
    Hours(u16),
    Days(u16),
    Weeks(u16),
    Months(u16),
    Years(u16),
}

/// Round, human-legible intervals from one minute to ten years.
pub const TIME_INTERVAL_LADDER: [TimeInterval; 23] = [
    TimeInterval::Minutes(1),
    TimeInterval::Minutes(2),
    TimeInterval::Minutes(5),
    TimeInterval::Minutes(10),
    TimeInterval::Minutes(15),
    TimeInterval::Minutes(30),
    TimeInterval::Hours(1),
    TimeInterval::Hours(2),
    TimeInterval::Hours(4),
    TimeInterval::Hours(6),
    TimeInterval::Hours(12),
    TimeInterval::Days(1),
    TimeInterval::Days(2),
    TimeInterval::Weeks(1),
    TimeInterval::Weeks(2),
    TimeInterval::Months(1),
    TimeInterval::Months(2),
    TimeInterval::Months(3),
    TimeInterval::Months(6),
    TimeInterval::Years(1),
    TimeInterval::Years(2),
    TimeInterval::Years(5),
    TimeInterval::Years(10),
];

/// Calendar fields of one timestamp in the axis timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LocalCalendar {
    /// Minutes since the local epoch.
    pub minutes: i64,
    pub year: i32,
    pub month0: u32,
}

impl LocalCalendar {
    pub(crate) fn from_timestamp(timestamp_ms: i64, offset_minutes: i16) -> Option<Self> {
        let (year, month0) = super::label_format::local_year_month(
            timestamp_ms,
            chrono::FixedOffset::east_opt(i32::from(offset_minutes) * 60)?,
        )?;
        Some(Self {
            minutes: timestamp_ms.div_euclid(MINUTE_MS) + i64::from(offset_minutes),
            year,
            month0,
        })
    }

    pub(crate) fn day(self) -> i64 {
        self.minutes.div_euclid(DAY_MINUTES)
    }

    pub(crate) fn minute_of_day(self) -> u16 {
        self.minutes.rem_euclid(DAY_MINUTES) as u16
    }

    fn month_index(self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month0)
    }
}

impl TimeInterval {
    /// Nominal length used for span comparisons and label selection.
    #[must_use]
    pub const fn approx_duration_ms(self) -> i64 {
        match self {
            Self::Minutes(n) => n as i64 * MINUTE_MS,
            Self::Hours(n) => n as i64 * 60 * MINUTE_MS,
            Self::Days(n) => n as i64 * DAY_MINUTES * MINUTE_MS,
            Self::Weeks(n) => n as i64 * 7 * DAY_MINUTES * MINUTE_MS,
            Self::Months(n) => n as i64 * 30 * DAY_MINUTES * MINUTE_MS,
            Self::Years(n) => n as i64 * 365 * DAY_MINUTES * MINUTE_MS,
        }
    }

    #[must_use]
    pub const fn is_intraday(self) -> bool {
        matches!(self, Self::Minutes(_) | Self::Hours(_))
    }

    /// Aligned bucket containing a local timestamp.
    ///
    /// Minutes and hours align to the local-midnight grid, days to local
    /// midnight, weeks to Monday, months and years to calendar starts.
    pub(crate) fn bucket(self, calendar: LocalCalendar) -> i64 {
        match self {
            Self::Minutes(n) => calendar.minutes.div_euclid(i64::from(n.max(1))),
            Self::Hours(n) => calendar.minutes.div_euclid(i64::from(n.max(1)) * 60),
            Self::Days(n) => calendar.day().div_euclid(i64::from(n.max(1))),
            // 1970-01-01 was a Thursday; shifting by three days puts Monday at bucket start.
            Self::Weeks(n) => (calendar.day() + 3).div_euclid(7 * i64::from(n.max(1))),
            Self::Months(n) => calendar.month_index().div_euclid(i64::from(n.max(1))),
            Self::Years(n) => i64::from(calendar.year).div_euclid(i64::from(n.max(1))),
        }
    }

    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::Minutes(n) => format!("{n}m"),
            Self::Hours(n) => format!("{n}h"),
            Self::Days(n) => format!("{n}D"),
            Self::Weeks(n) => format!("{n}W"),
            Self::Months(n) => format!("{n}M"),
            Self::Years(n) => format!("{n}Y"),
        }
    }
}
