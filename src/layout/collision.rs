use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{ChartError, ChartResult};

use super::label::{LabelCandidate, PixelBox, boxes_overlap};

/// Order in which candidates are considered: priority desc, then input order.
pub(crate) fn priority_order(labels: &[LabelCandidate]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..labels.len()).collect();
    order.sort_by(|&left, &right| {
        labels[right]
            .priority
            .cmp(&labels[left].priority)
            .then(left.cmp(&right))
    });
    order
}

/// Accepted boxes, already expanded by half the spacing.
#[derive(Debug, Default)]
pub(crate) struct KeptBoxes {
    boxes: Vec<PixelBox>,
    half_spacing: f64,
}

impl KeptBoxes {
    pub(crate) fn new(min_spacing_px: f64) -> Self {
        let half_spacing = if min_spacing_px.is_finite() {
            min_spacing_px.max(0.0) / 2.0
        } else {
            0.0
        };
        Self {
            boxes: Vec::new(),
            half_spacing,
        }
    }

    /// Accepts `candidate` if its expanded box is free.
    pub(crate) fn try_accept(&mut self, candidate: PixelBox) -> bool {
        let expanded = candidate.expanded(self.half_spacing);
        if self.boxes.iter().any(|kept| boxes_overlap(kept, &expanded)) {
            return false;
        }
        self.boxes.push(expanded);
        true
    }
}

/// Greedy priority-ordered label placement.
///
/// Each accepted box is grown by `min_spacing_px / 2` on every side, so two
/// kept labels are always at least `min_spacing_px` apart. The result keeps
/// the input order.
#[must_use]
pub fn resolve_collisions(labels: &[LabelCandidate], min_spacing_px: f64) -> Vec<LabelCandidate> {
    let mut kept = KeptBoxes::new(min_spacing_px);
    let mut accepted = vec![false; labels.len()];
    for index in priority_order(labels) {
        accepted[index] = kept.try_accept(labels[index].pixel_box);
    }
    labels
        .iter()
        .zip(accepted)
        .filter_map(|(label, keep)| keep.then(|| label.clone()))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveLayoutConfig {
    pub min_spacing_px: f64,
    /// Density target; passes continue while more labels survive.
    pub max_labels: usize,
    /// Spacing multiplier applied between passes.
    pub spacing_growth: f64,
    pub max_passes: usize,
}

impl Default for AdaptiveLayoutConfig {
    fn default() -> Self {
        Self {
            min_spacing_px: 8.0,
            max_labels: 9,
            spacing_growth: 1.5,
            max_passes: 4,
        }
    }
}

impl AdaptiveLayoutConfig {
    pub fn validate(self) -> ChartResult<Self> {
        if !self.min_spacing_px.is_finite() || self.min_spacing_px < 0.0 {
            return Err(ChartError::InvalidConfig(
                "label spacing must be finite and >= 0".to_owned(),
            ));
        }
        if !self.spacing_growth.is_finite() || self.spacing_growth <= 1.0 {
            return Err(ChartError::InvalidConfig(
                "label spacing growth must be > 1".to_owned(),
            ));
        }
        if self.max_labels == 0 || self.max_passes == 0 {
            return Err(ChartError::InvalidConfig(
                "adaptive layout requires max_labels > 0 and max_passes > 0".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// Re-runs [`resolve_collisions`] with growing spacing until at most
/// `max_labels` survive.
///
/// If the last pass still exceeds the target, the highest-priority labels
/// (then earliest) are kept.
#[must_use]
pub fn resolve_collisions_adaptive(
    labels: &[LabelCandidate],
    config: AdaptiveLayoutConfig,
) -> Vec<LabelCandidate> {
    let mut spacing = config.min_spacing_px;
    let mut kept = resolve_collisions(labels, spacing);
    let mut passes = 1;
    while kept.len() > config.max_labels && passes < config.max_passes.max(1) {
        spacing *= config.spacing_growth;
        kept = resolve_collisions(labels, spacing);
        passes += 1;
    }
    trace!(
        candidates = labels.len(),
        kept = kept.len(),
        passes,
        spacing,
        "adaptive label layout resolved"
    );

    if kept.len() > config.max_labels {
        let order = priority_order(&kept);
        let mut keep = vec![false; kept.len()];
        for index in order.into_iter().take(config.max_labels) {
            keep[index] = true;
        }
        kept = kept
            .into_iter()
            .zip(keep)
            .filter_map(|(label, keep)| keep.then_some(label))
            .collect();
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::{AdaptiveLayoutConfig, resolve_collisions, resolve_collisions_adaptive};
    use crate::layout::label::{LabelCandidate, LabelPriority, PixelBox};

    fn label(text: &str, x: f64, priority: LabelPriority) -> LabelCandidate {
        LabelCandidate::new(text, PixelBox::new(x, 0.0, 40.0, 12.0), priority)
    }

    #[test]
    fn major_label_wins_over_earlier_minor() {
        let labels = vec![
            label("a", 0.0, LabelPriority::Minor),
            label("b", 20.0, LabelPriority::Major),
            label("c", 100.0, LabelPriority::Minor),
        ];
        let kept = resolve_collisions(&labels, 4.0);
        let texts: Vec<&str> = kept.iter().map(|label| label.text.as_str()).collect();
        assert_eq!(texts, vec!["b", "c"]);
    }

    #[test]
    fn spacing_is_enforced_between_neighbours() {
        let labels = vec![
            label("a", 0.0, LabelPriority::Major),
            label("b", 42.0, LabelPriority::Major),
        ];
        assert_eq!(resolve_collisions(&labels, 0.0).len(), 2);
        assert_eq!(resolve_collisions(&labels, 4.0).len(), 1);
    }

    #[test]
    fn adaptive_pass_reduces_density() {
        let labels: Vec<LabelCandidate> = (0..20)
            .map(|i| label("x", i as f64 * 45.0, LabelPriority::Major))
            .collect();
        let config = AdaptiveLayoutConfig {
            min_spacing_px: 4.0,
            max_labels: 8,
            spacing_growth: 2.0,
            max_passes: 6,
        };
        let kept = resolve_collisions_adaptive(&labels, config);
        assert!(kept.len() <= 8);
        assert!(!kept.is_empty());
    }

    #[test]
    fn adaptive_config_rejects_non_growing_spacing() {
        let config = AdaptiveLayoutConfig {
            spacing_growth: 1.0,
            ..AdaptiveLayoutConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
