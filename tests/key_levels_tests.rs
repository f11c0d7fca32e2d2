use std::f64::consts::TAU;

use chart_engine::core::Bar;
use chart_engine::levels::{KeyLevelConfig, KeyLevelKind, RoundStep, detect_key_levels};
use proptest::prelude::*;

fn wave_bars(count: usize, period: f64) -> Vec<Bar> {
    (0..count)
        .map(|i| {
            let close = 100.0 + 10.0 * (i as f64 * TAU / period).sin();
            Bar::new(i as i64 * 60_000, close, close + 1.0, close - 1.0, close, 100.0 + i as f64)
                .expect("valid bar")
        })
        .collect()
}

#[test]
fn wave_exposes_swing_extremes() {
    let bars = wave_bars(120, 40.0);
    let config = KeyLevelConfig::default().with_swing_window(5);
    let levels = detect_key_levels(&bars, &config);

    assert!(
        levels
            .iter()
            .any(|level| level.kind == KeyLevelKind::SwingHigh && (level.price - 111.0).abs() < 1e-6)
    );
    assert!(
        levels
            .iter()
            .any(|level| level.kind == KeyLevelKind::SwingLow && (level.price - 89.0).abs() < 1e-6)
    );
}

#[test]
fn levels_are_sorted_and_scored_in_unit_interval() {
    let bars = wave_bars(300, 33.0);
    let levels = detect_key_levels(&bars, &KeyLevelConfig::default());
    assert!(!levels.is_empty());
    assert!(levels.windows(2).all(|pair| pair[0].price <= pair[1].price));
    assert!(
        levels
            .iter()
            .all(|level| (0.0..=1.0).contains(&level.strength) && level.touch_count >= 1)
    );
}

#[test]
fn min_strength_filters_weak_levels() {
    let bars = wave_bars(200, 25.0);
    let all = detect_key_levels(&bars, &KeyLevelConfig::default());
    let strong = detect_key_levels(&bars, &KeyLevelConfig::default().with_min_strength(0.6));
    assert!(strong.len() <= all.len());
    assert!(strong.iter().all(|level| level.strength >= 0.6));
}

#[test]
fn disabled_detectors_yield_only_round_numbers() {
    let bars = wave_bars(100, 20.0);
    let config = KeyLevelConfig {
        detect_swings: false,
        detect_support_resistance: false,
        detect_vwap: false,
        ..KeyLevelConfig::default()
    }
    .with_round_step(RoundStep::Fixed(5.0));
    let levels = detect_key_levels(&bars, &config);
    assert!(!levels.is_empty());
    for level in &levels {
        assert_eq!(level.kind, KeyLevelKind::Round);
        assert!((level.price / 5.0 - (level.price / 5.0).round()).abs() < 1e-9);
    }
}

#[test]
fn empty_window_has_no_levels() {
    assert!(detect_key_levels(&[], &KeyLevelConfig::default()).is_empty());
}

proptest! {
    #[test]
    fn detection_is_deterministic(
        closes in prop::collection::vec(10.0f64..500.0, 1..250),
        window in 1usize..12,
    ) {
        let bars: Vec<Bar> = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                Bar::new(i as i64 * 60_000, close, close * 1.01, close * 0.99, close, 10.0)
                    .expect("valid bar")
            })
            .collect();
        let config = KeyLevelConfig::default().with_swing_window(window);
        let first = detect_key_levels(&bars, &config);
        let second = detect_key_levels(&bars, &config);
        prop_assert_eq!(first, second);
    }
}
