use ordered_float::OrderedFloat;

use crate::core::Bar;

use super::{KeyLevel, KeyLevelKind, recency};

struct Cluster {
    anchor: f64,
    sum: f64,
    touches: usize,
    last_index: usize,
}

/// Support and resistance from clustered closes.
///
/// Closes are visited in ascending price order; a close joins the current
/// cluster while it stays within `threshold` of the cluster's lowest close.
pub(super) fn detect_support_resistance(
    bars: &[Bar],
    threshold: f64,
    min_touch_count: usize,
) -> Vec<KeyLevel> {
    let Some(last) = bars.last() else {
        return Vec::new();
    };
    let mut closes: Vec<(OrderedFloat<f64>, usize)> = bars
        .iter()
        .enumerate()
        .map(|(index, bar)| (OrderedFloat(bar.close), index))
        .collect();
    closes.sort_unstable();

    let mut clusters: Vec<Cluster> = Vec::new();
    for (OrderedFloat(close), index) in closes {
        match clusters.last_mut() {
            Some(cluster) if close <= cluster.anchor * (1.0 + threshold) => {
                cluster.sum += close;
                cluster.touches += 1;
                cluster.last_index = cluster.last_index.max(index);
            }
            _ => clusters.push(Cluster {
                anchor: close,
                sum: close,
                touches: 1,
                last_index: index,
            }),
        }
    }

    clusters
        .into_iter()
        .filter(|cluster| cluster.touches >= min_touch_count.max(1))
        .map(|cluster| {
            let price = cluster.sum / cluster.touches as f64;
            let kind = if price < last.close {
                KeyLevelKind::Support
            } else {
                KeyLevelKind::Resistance
            };
            let touch_score = (cluster.touches as f64 / 5.0).min(1.0);
            KeyLevel {
                price,
                kind,
                strength: 0.5 * touch_score + 0.5 * recency(cluster.last_index, bars.len()),
                touch_count: cluster.touches,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::detect_support_resistance;
    use crate::core::Bar;
    use crate::levels::KeyLevelKind;

    fn close_bar(i: i64, close: f64) -> Bar {
        Bar::new(i * 60_000, close, close + 0.5, close - 0.5, close, 1.0).expect("bar")
    }

    #[test]
    fn clusters_closes_into_support_and_resistance() {
        let closes = [100.0, 100.2, 110.0, 110.3, 105.0, 100.1, 110.1, 106.0];
        let bars: Vec<Bar> = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| close_bar(i as i64, close))
            .collect();
        let levels = detect_support_resistance(&bars, 0.005, 2);
        assert_eq!(levels.len(), 2);

        assert_eq!(levels[0].kind, KeyLevelKind::Support);
        assert_eq!(levels[0].touch_count, 3);
        assert_relative_eq!(levels[0].price, 100.1, epsilon = 1e-9);
        assert_eq!(levels[1].kind, KeyLevelKind::Resistance);
        assert_eq!(levels[1].touch_count, 3);
        // Three touches, last one at index 6 of 8.
        assert_relative_eq!(levels[1].strength, 0.5 * 0.6 + 0.5 * (6.0 / 7.0), epsilon = 1e-9);
    }
}
