use ordered_float::OrderedFloat;

use crate::axis::nice_step;
use crate::core::Bar;

use super::config::RoundStep;
use super::{KeyLevel, KeyLevelKind};

const ROUND_STRENGTH: f64 = 0.2;
const VWAP_STRENGTH: f64 = 0.5;

fn touches(bars: &[Bar], price: f64) -> usize {
    bars.iter().filter(|bar| bar.contains_price(price)).count()
}

/// Round-number levels inside the window's low..high range.
///
/// When more than `max_levels` fit, the ones nearest the last close win.
pub(super) fn detect_round_numbers(
    bars: &[Bar],
    round_step: RoundStep,
    max_levels: usize,
) -> Vec<KeyLevel> {
    let Some(last) = bars.last() else {
        return Vec::new();
    };
    let low = bars.iter().map(|bar| bar.low).fold(f64::INFINITY, f64::min);
    let high = bars.iter().map(|bar| bar.high).fold(f64::NEG_INFINITY, f64::max);
    let step = match round_step {
        RoundStep::Fixed(step) => step,
        RoundStep::Auto { target_count } => nice_step(high - low, target_count),
    };
    if !step.is_finite() || step <= 0.0 || max_levels == 0 {
        return Vec::new();
    }

    let first = (low / step).ceil() as i64;
    let last_k = (high / step).floor() as i64;
    if last_k < first {
        return Vec::new();
    }
    let mut prices: Vec<f64> = (first..=last_k).map(|k| k as f64 * step).collect();
    if prices.len() > max_levels {
        prices.sort_by_key(|price| OrderedFloat((price - last.close).abs()));
        prices.truncate(max_levels);
        prices.sort_by_key(|price| OrderedFloat(*price));
    }

    prices
        .into_iter()
        .map(|price| KeyLevel {
            price,
            kind: KeyLevelKind::Round,
            strength: ROUND_STRENGTH,
            touch_count: touches(bars, price),
        })
        .collect()
}

/// Volume-weighted average typical price of the window.
pub(super) fn detect_vwap(bars: &[Bar]) -> Option<KeyLevel> {
    let (weighted, volume) = bars.iter().fold((0.0, 0.0), |(weighted, volume), bar| {
        (weighted + bar.typical_price() * bar.volume, volume + bar.volume)
    });
    if volume <= 0.0 {
        return None;
    }
    let price = weighted / volume;
    Some(KeyLevel {
        price,
        kind: KeyLevelKind::Vwap,
        strength: VWAP_STRENGTH,
        touch_count: touches(bars, price),
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{detect_round_numbers, detect_vwap};
    use crate::core::Bar;
    use crate::levels::config::RoundStep;

    fn bar(i: i64, low: f64, high: f64, close: f64, volume: f64) -> Bar {
        Bar::new(i * 60_000, close, high, low, close, volume).expect("bar")
    }

    #[test]
    fn round_levels_cover_window_range() {
        let bars = vec![bar(0, 1662.0, 1671.0, 1668.0, 1.0), bar(1, 1668.0, 1694.0, 1690.0, 1.0)];
        let levels = detect_round_numbers(&bars, RoundStep::Fixed(10.0), 10);
        let prices: Vec<f64> = levels.iter().map(|level| level.price).collect();
        assert_eq!(prices, vec![1670.0, 1680.0, 1690.0]);
        assert_eq!(levels[0].touch_count, 2);
        assert_eq!(levels[1].touch_count, 1);
    }

    #[test]
    fn round_levels_are_capped_near_last_close() {
        let bars = vec![bar(0, 100.0, 200.0, 190.0, 1.0)];
        let levels = detect_round_numbers(&bars, RoundStep::Fixed(10.0), 3);
        let prices: Vec<f64> = levels.iter().map(|level| level.price).collect();
        assert_eq!(prices, vec![180.0, 190.0, 200.0]);
    }

    #[test]
    fn vwap_weights_typical_price_by_volume() {
        let bars = vec![bar(0, 9.0, 12.0, 9.0, 1.0), bar(1, 19.0, 22.0, 19.0, 3.0)];
        // Typical prices 10 and 20.
        let vwap = detect_vwap(&bars).expect("vwap");
        assert_relative_eq!(vwap.price, 17.5, epsilon = 1e-12);
        assert!(detect_vwap(&[bar(0, 9.0, 12.0, 9.0, 0.0)]).is_none());
    }
}
