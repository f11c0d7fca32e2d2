use std::ops::Range;

use crate::core::Bar;

/// Half-open index range `floor(start) .. ceil(end)` clamped to `0..len`.
#[must_use]
pub fn visible_index_range(start: f64, end: f64, len: usize) -> Range<usize> {
    if len == 0 || !start.is_finite() || !end.is_finite() {
        return 0..0;
    }
    let (min_t, max_t) = if start <= end {
        (start, end)
    } else {
        (end, start)
    };

    let lo = min_t.floor().max(0.0);
    let hi = max_t.ceil().max(0.0);
    let lo = if lo >= len as f64 { len } else { lo as usize };
    let hi = if hi >= len as f64 { len } else { hi as usize };
    lo..hi.max(lo)
}

/// Returns the bars covering a fractional index window.
#[must_use]
pub fn bars_in_index_window(bars: &[Bar], start: f64, end: f64) -> &[Bar] {
    &bars[visible_index_range(start, end, bars.len())]
}

/// Median spacing between consecutive timestamps.
///
/// Median instead of mean so weekend/holiday gaps do not stretch the
/// extrapolated timeline.
#[must_use]
pub fn median_bar_spacing_ms(bars: &[Bar]) -> Option<i64> {
    if bars.len() < 2 {
        return None;
    }
    let mut deltas: Vec<i64> = bars
        .windows(2)
        .map(|pair| pair[1].timestamp - pair[0].timestamp)
        .filter(|delta| *delta > 0)
        .collect();
    if deltas.is_empty() {
        return None;
    }
    deltas.sort_unstable();
    Some(deltas[deltas.len() / 2])
}

/// Timestamp of an integer bar index, extrapolated outside the array.
#[must_use]
pub fn timestamp_at_index(bars: &[Bar], index: i64, spacing_ms: i64) -> Option<i64> {
    let first = bars.first()?;
    let last = bars.last()?;
    if index < 0 {
        return Some(first.timestamp.saturating_add(index.saturating_mul(spacing_ms)));
    }
    let len = bars.len() as i64;
    if index >= len {
        let beyond = index - (len - 1);
        return Some(last.timestamp.saturating_add(beyond.saturating_mul(spacing_ms)));
    }
    Some(bars[index as usize].timestamp)
}

/// Index of the first bar whose timestamp is `>= timestamp`.
#[must_use]
pub fn index_at_or_after(bars: &[Bar], timestamp: i64) -> usize {
    bars.partition_point(|bar| bar.timestamp < timestamp)
}
