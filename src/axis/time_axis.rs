use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{Bar, Timeframe, median_bar_spacing_ms, timestamp_at_index};

use super::config::TimeAxisConfig;
use super::label_format::{TimeLabelFormat, format_time_label};
use super::ticks::thinning_stride;
use super::time_interval::{LocalCalendar, TIME_INTERVAL_LADDER, TimeInterval};

const DAY_MS: i64 = 86_400_000;
const YEAR_MS: i64 = 365 * DAY_MS;
/// Extrapolated indices enumerated on each side of the bar array.
pub const MAX_EXTRAPOLATED_BARS: i64 = 2_000;

/// Visual weight of an axis tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TickLevel {
    /// Gridline only; the label is dropped first under collision.
    Minor,
    /// Labeled tick.
    Major,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeAxisTick {
    /// Bar centre (`index + 0.5`) in world units.
    pub world_pos: f64,
    pub pixel_pos: f64,
    pub timestamp: i64,
    pub label: String,
    pub level: TickLevel,
    pub is_key_moment: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeparatorKind {
    Day,
    Month,
    Quarter,
    Year,
}

impl SeparatorKind {
    fn interval(self) -> TimeInterval {
        match self {
            Self::Day => TimeInterval::Days(1),
            Self::Month => TimeInterval::Months(1),
            Self::Quarter => TimeInterval::Months(3),
            Self::Year => TimeInterval::Years(1),
        }
    }
}

/// Vertical rule drawn at a calendar period boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodSeparator {
    /// Left edge of the first bar of the new period.
    pub world_pos: f64,
    pub pixel_pos: f64,
    pub timestamp: i64,
    pub kind: SeparatorKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeAxis {
    pub ticks: Vec<TimeAxisTick>,
    pub separators: Vec<PeriodSeparator>,
    /// `None` when the window holds no bars.
    pub interval: Option<TimeInterval>,
    pub format: TimeLabelFormat,
    pub span_ms: i64,
}

impl TimeAxis {
    fn empty() -> Self {
        Self {
            ticks: Vec::new(),
            separators: Vec::new(),
            interval: None,
            format: TimeLabelFormat::MonthDay,
            span_ms: 0,
        }
    }

    pub fn major_ticks(&self) -> impl Iterator<Item = &TimeAxisTick> {
        self.ticks.iter().filter(|tick| tick.level == TickLevel::Major)
    }
}

#[derive(Debug, Clone, Copy)]
struct TimelineEntry {
    index: i64,
    timestamp: i64,
    calendar: LocalCalendar,
}

/// Integer indices whose bar centre lies inside the window, plus the calendar
/// of the index just before the first one.
struct Timeline {
    previous: Option<LocalCalendar>,
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    fn build(bars: &[Bar], start: f64, end: f64, spacing_ms: i64, offset_minutes: i16) -> Self {
        let len = bars.len() as i64;
        let first = ((start - 0.5).ceil() as i64).max(-MAX_EXTRAPOLATED_BARS);
        let last = ((end - 0.5).floor() as i64).min(len - 1 + MAX_EXTRAPOLATED_BARS);
        let calendar_at = |index: i64| {
            let timestamp = timestamp_at_index(bars, index, spacing_ms)?;
            let calendar = LocalCalendar::from_timestamp(timestamp, offset_minutes)?;
            Some((timestamp, calendar))
        };

        let entries = (first..=last)
            .filter_map(|index| {
                calendar_at(index).map(|(timestamp, calendar)| TimelineEntry {
                    index,
                    timestamp,
                    calendar,
                })
            })
            .collect();
        Self {
            previous: calendar_at(first - 1).map(|(_, calendar)| calendar),
            entries,
        }
    }

    fn span_ms(&self) -> i64 {
        match (self.entries.first(), self.entries.last()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => 0,
        }
    }

    /// Positions in `entries` that open a new bucket of `interval`.
    fn boundaries(&self, interval: TimeInterval) -> Vec<usize> {
        let mut previous = self.previous.map(|calendar| interval.bucket(calendar));
        let mut positions = Vec::new();
        for (position, entry) in self.entries.iter().enumerate() {
            let bucket = interval.bucket(entry.calendar);
            if previous != Some(bucket) {
                positions.push(position);
            }
            previous = Some(bucket);
        }
        positions
    }

    fn is_day_boundary(&self, position: usize) -> bool {
        let day = self.entries[position].calendar.day();
        let previous = match position {
            0 => self.previous,
            _ => Some(self.entries[position - 1].calendar),
        };
        previous.is_none_or(|calendar| calendar.day() != day)
    }
}

/// Generates time ticks, period separators and label format for a window.
///
/// `visible_range` is a fractional bar-index window; `None` uses the
/// timeframe preset over the latest bars. Indices further than
/// [`MAX_EXTRAPOLATED_BARS`] from the bar array are not labelled. Ticks snap to bars, so gaps in the
/// data never produce empty label slots.
#[must_use]
pub fn calculate_time_axis(
    bars: &[Bar],
    timeframe: Timeframe,
    pixel_width: f64,
    visible_range: Option<(f64, f64)>,
    config: &TimeAxisConfig,
) -> TimeAxis {
    if bars.is_empty() {
        return TimeAxis::empty();
    }
    let offset_minutes = config.timezone.offset_minutes();
    let (start, end) = visible_range.unwrap_or_else(|| {
        let range = timeframe.index_range(bars, offset_minutes);
        (range.start as f64, range.end as f64)
    });
    if !start.is_finite() || !end.is_finite() || !(end - start).is_finite() || end <= start {
        return TimeAxis::empty();
    }

    let spacing_ms = median_bar_spacing_ms(bars)
        .unwrap_or_else(|| timeframe.preset().resolution.duration_ms());
    let timeline = Timeline::build(bars, start, end, spacing_ms, offset_minutes);
    if timeline.entries.is_empty() {
        return TimeAxis::empty();
    }
    let span_ms = timeline.span_ms();

    let (ladder_position, major_positions) = choose_interval(&timeline, config.min_ticks);
    let interval = TIME_INTERVAL_LADDER[ladder_position];
    let format = label_format_for(interval, span_ms);

    let to_pixel = |world: f64| (world - start) / (end - start) * pixel_width;
    let make_tick = |position: usize, level: TickLevel| {
        let entry = timeline.entries[position];
        let day_boundary =
            format == TimeLabelFormat::TimeOfDay && timeline.is_day_boundary(position);
        let tick_format = if day_boundary {
            TimeLabelFormat::MonthDay
        } else {
            format
        };
        let world_pos = entry.index as f64 + 0.5;
        let is_key_moment = interval.is_intraday()
            && config
                .session
                .is_some_and(|session| session.is_key_minute(entry.calendar.minute_of_day()));
        TimeAxisTick {
            world_pos,
            pixel_pos: to_pixel(world_pos),
            timestamp: entry.timestamp,
            label: format_time_label(entry.timestamp, tick_format, config.timezone.fixed_offset()),
            level,
            is_key_moment,
        }
    };

    let mut ticks: Vec<TimeAxisTick>;
    if major_positions.len() > config.max_ticks {
        let stride = thinning_stride(major_positions.len(), config.max_ticks);
        ticks = major_positions
            .iter()
            .enumerate()
            .map(|(n, &position)| {
                let level = if n % stride == 0 {
                    TickLevel::Major
                } else {
                    TickLevel::Minor
                };
                make_tick(position, level)
            })
            .collect();
    } else {
        let mut levelled: Vec<(usize, TickLevel)> = major_positions
            .iter()
            .map(|&position| (position, TickLevel::Major))
            .collect();
        if ladder_position > 0 {
            let finer = timeline.boundaries(TIME_INTERVAL_LADDER[ladder_position - 1]);
            let minor: Vec<usize> = finer
                .into_iter()
                .filter(|position| major_positions.binary_search(position).is_err())
                .collect();
            if minor.len() <= config.max_ticks * config.max_minor_ticks_factor {
                levelled.extend(minor.into_iter().map(|position| (position, TickLevel::Minor)));
                levelled.sort_unstable_by_key(|(position, _)| *position);
            }
        }
        ticks = levelled
            .into_iter()
            .map(|(position, level)| make_tick(position, level))
            .collect();
    }
    ticks.shrink_to_fit();

    let separators = match separator_kind_for(interval, span_ms) {
        Some(kind) => timeline
            .boundaries(kind.interval())
            .into_iter()
            .map(|position| {
                let entry = timeline.entries[position];
                let world_pos = entry.index as f64;
                PeriodSeparator {
                    world_pos,
                    pixel_pos: to_pixel(world_pos),
                    timestamp: entry.timestamp,
                    kind,
                }
            })
            .collect(),
        None => Vec::new(),
    };

    trace!(
        interval = %interval.label(),
        ticks = ticks.len(),
        separators = separators.len(),
        span_ms,
        "time axis computed"
    );

    TimeAxis {
        ticks,
        separators,
        interval: Some(interval),
        format,
        span_ms,
    }
}

/// Coarsest ladder interval producing at least `min_ticks` buckets, falling
/// back to the interval with the most buckets.
fn choose_interval(timeline: &Timeline, min_ticks: usize) -> (usize, Vec<usize>) {
    let mut best: Option<(usize, Vec<usize>)> = None;
    for (ladder_position, interval) in TIME_INTERVAL_LADDER.iter().enumerate().rev() {
        let positions = timeline.boundaries(*interval);
        if positions.len() >= min_ticks {
            return (ladder_position, positions);
        }
        if best
            .as_ref()
            .is_none_or(|(_, current)| positions.len() > current.len())
        {
            best = Some((ladder_position, positions));
        }
    }
    best.unwrap_or_default()
}

fn label_format_for(interval: TimeInterval, span_ms: i64) -> TimeLabelFormat {
    if matches!(interval, TimeInterval::Years(_)) {
        TimeLabelFormat::Year
    } else if interval.is_intraday() {
        TimeLabelFormat::TimeOfDay
    } else if span_ms > YEAR_MS {
        TimeLabelFormat::YearMonth
    } else {
        TimeLabelFormat::MonthDay
    }
}

fn separator_kind_for(interval: TimeInterval, span_ms: i64) -> Option<SeparatorKind> {
    if span_ms >= 5 * YEAR_MS {
        Some(SeparatorKind::Year)
    } else if span_ms >= 2 * YEAR_MS {
        Some(SeparatorKind::Quarter)
    } else if span_ms >= 90 * DAY_MS {
        Some(SeparatorKind::Month)
    } else if interval.is_intraday() && span_ms >= 2 * DAY_MS {
        Some(SeparatorKind::Day)
    } else {
        None
    }
}
