//! Price levels worth highlighting over a bar window.
//!
//! Detection is deterministic: the same bars and configuration always yield
//! the same levels in the same order.

mod clusters;
pub mod config;
mod reference;
mod swing;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::Bar;

pub use config::{KeyLevelConfig, RoundStep};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KeyLevelKind {
    SwingHigh,
    SwingLow,
    Support,
    Resistance,
    Round,
    Vwap,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyLevel {
    pub price: f64,
    pub kind: KeyLevelKind,
    /// Score in `[0, 1]`.
    pub strength: f64,
    pub touch_count: usize,
}

/// Position of `index` in the window, 0 for the oldest bar and 1 for the latest.
pub(crate) fn recency(index: usize, len: usize) -> f64 {
    if len <= 1 {
        1.0
    } else {
        index as f64 / (len - 1) as f64
    }
}

/// Runs every enabled detector over `bars` and merges nearby levels.
#[must_use]
pub fn detect_key_levels(bars: &[Bar], config: &KeyLevelConfig) -> Vec<KeyLevel> {
    if bars.is_empty() {
        return Vec::new();
    }

    let mut levels = Vec::new();
    if config.detect_swings {
        levels.extend(swing::detect_swings(bars, config.swing_window));
    }
    if config.detect_support_resistance {
        levels.extend(clusters::detect_support_resistance(
            bars,
            config.cluster_threshold,
            config.min_touch_count,
        ));
    }
    if config.detect_round_numbers {
        levels.extend(reference::detect_round_numbers(
            bars,
            config.round_step,
            config.max_round_levels,
        ));
    }
    if config.detect_vwap {
        levels.extend(reference::detect_vwap(bars));
    }
    let detected = levels.len();

    for level in &mut levels {
        level.strength = level.strength.clamp(0.0, 1.0);
    }
    let mut merged = merge_levels(levels, config.merge_tolerance);
    merged.retain(|level| level.strength >= config.min_strength);

    trace!(
        bars = bars.len(),
        detected,
        kept = merged.len(),
        "key levels detected"
    );
    merged
}

/// Merges levels whose prices are within `tolerance` (relative) of the first
/// level of a group.
///
/// The strongest member supplies kind, price and strength; ties go to the
/// lower price, then the earlier kind. The touch count is the group maximum.
fn merge_levels(mut levels: Vec<KeyLevel>, tolerance: f64) -> Vec<KeyLevel> {
    levels.sort_by_key(|level| (OrderedFloat(level.price), level.kind));

    let mut merged: Vec<KeyLevel> = Vec::with_capacity(levels.len());
    let mut group_anchor = f64::NAN;
    for level in levels {
        let joins = merged.last().is_some()
            && (level.price - group_anchor).abs() <= tolerance * group_anchor.abs();
        if !joins {
            group_anchor = level.price;
            merged.push(level);
            continue;
        }
        if let Some(current) = merged.last_mut() {
            let touch_count = current.touch_count.max(level.touch_count);
            if level.strength > current.strength {
                *current = level;
            }
            current.touch_count = touch_count;
        }
    }
    merged.sort_by_key(|level| (OrderedFloat(level.price), level.kind));
    merged
}
