#[cfg(feature = "parallel-levels")]
use rayon::prelude::*;

use crate::core::Bar;

use super::{KeyLevel, KeyLevelKind, recency};

/// Swing highs and lows with `window` bars on each side.
///
/// A bar is a swing high when its high is above every high to its left and
/// not below any high to its right inside the window, so a flat top yields
/// one swing at its first bar. Lows mirror this.
pub(super) fn detect_swings(bars: &[Bar], window: usize) -> Vec<KeyLevel> {
    if window == 0 || bars.len() < 2 * window + 1 {
        return Vec::new();
    }
    let candidates = window..bars.len() - window;

    #[cfg(feature = "parallel-levels")]
    {
        candidates
            .into_par_iter()
            .flat_map_iter(|index| swing_at(bars, index, window))
            .collect()
    }

    #[cfg(not(feature = "parallel-levels"))]
    {
        candidates
            .flat_map(|index| swing_at(bars, index, window))
            .collect()
    }
}

fn swing_at(bars: &[Bar], index: usize, window: usize) -> impl Iterator<Item = KeyLevel> {
    let bar = bars[index];
    let left = &bars[index - window..index];
    let right = &bars[index + 1..=index + window];

    let is_high = left.iter().all(|other| other.high < bar.high)
        && right.iter().all(|other| other.high <= bar.high);
    let is_low = left.iter().all(|other| other.low > bar.low)
        && right.iter().all(|other| other.low >= bar.low);

    let strength = 0.4 + 0.3 * recency(index, bars.len());
    let high = is_high.then_some(KeyLevel {
        price: bar.high,
        kind: KeyLevelKind::SwingHigh,
        strength,
        touch_count: 1,
    });
    let low = is_low.then_some(KeyLevel {
        price: bar.low,
        kind: KeyLevelKind::SwingLow,
        strength,
        touch_count: 1,
    });
    high.into_iter().chain(low)
}

#[cfg(test)]
mod tests {
    use super::detect_swings;
    use crate::core::Bar;
    use crate::levels::KeyLevelKind;

    fn bar(i: i64, high: f64, low: f64) -> Bar {
        let mid = (high + low) / 2.0;
        Bar::new(i * 60_000, mid, high, low, mid, 1.0).expect("bar")
    }

    #[test]
    fn finds_single_peak_and_trough() {
        let highs = [10.0, 11.0, 12.0, 15.0, 12.0, 11.0, 10.0];
        let lows = [9.0, 8.0, 7.0, 8.0, 5.0, 8.0, 9.0];
        let bars: Vec<Bar> = highs
            .iter()
            .zip(lows)
            .enumerate()
            .map(|(i, (&high, low))| bar(i as i64, high, low))
            .collect();
        let swings = detect_swings(&bars, 2);
        let highs: Vec<f64> = swings
            .iter()
            .filter(|level| level.kind == KeyLevelKind::SwingHigh)
            .map(|level| level.price)
            .collect();
        let lows: Vec<f64> = swings
            .iter()
            .filter(|level| level.kind == KeyLevelKind::SwingLow)
            .map(|level| level.price)
            .collect();
        assert_eq!(highs, vec![15.0]);
        assert_eq!(lows, vec![5.0]);
    }

    #[test]
    fn short_series_has_no_swings() {
        let bars: Vec<Bar> = (0..4).map(|i| bar(i, 10.0, 9.0)).collect();
        assert!(detect_swings(&bars, 2).is_empty());
    }
}
