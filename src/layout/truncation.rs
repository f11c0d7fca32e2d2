use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

use super::collision::{KeptBoxes, priority_order};
use super::label::LabelCandidate;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TruncationConfig {
    /// Average glyph advance used to size the shortened box.
    pub char_width_px: f64,
    /// Largest fraction of the original width a shortening may remove.
    pub max_shrink_ratio: f64,
}

impl Default for TruncationConfig {
    fn default() -> Self {
        Self {
            char_width_px: 7.0,
            max_shrink_ratio: 0.5,
        }
    }
}

impl TruncationConfig {
    pub fn validate(self) -> ChartResult<Self> {
        if !self.char_width_px.is_finite() || self.char_width_px <= 0.0 {
            return Err(ChartError::InvalidConfig(
                "truncation char width must be finite and > 0".to_owned(),
            ));
        }
        if !(0.0..=1.0).contains(&self.max_shrink_ratio) {
            return Err(ChartError::InvalidConfig(
                "truncation max_shrink_ratio must be within [0, 1]".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// Derived short form of a label: trailing seconds dropped from `HH:MM:SS`,
/// or a leading `YYYY-`/`YYYY/` removed.
#[must_use]
pub fn shorten_label(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    let len = bytes.len();
    if text.matches(':').count() == 2
        && len >= 3
        && bytes[len - 3] == b':'
        && bytes[len - 2..].iter().all(u8::is_ascii_digit)
    {
        return Some(text[..len - 3].to_owned());
    }
    if len > 5 && bytes[..4].iter().all(u8::is_ascii_digit) && matches!(bytes[4], b'-' | b'/') {
        return Some(text[5..].to_owned());
    }
    None
}

/// [`resolve_collisions`](super::resolve_collisions) with a shortening retry.
///
/// A rejected label is retried once with its `short_text` (or a derived
/// shortening) in a narrower box centred on the original one. The retry is
/// skipped when the shorter box would lose more than `max_shrink_ratio` of
/// the width. Kept labels carry the text and box actually placed.
#[must_use]
pub fn resolve_collisions_with_truncation(
    labels: &[LabelCandidate],
    min_spacing_px: f64,
    config: TruncationConfig,
) -> Vec<LabelCandidate> {
    let mut kept = KeptBoxes::new(min_spacing_px);
    let mut placed: Vec<Option<LabelCandidate>> = vec![None; labels.len()];

    for index in priority_order(labels) {
        let label = &labels[index];
        if kept.try_accept(label.pixel_box) {
            placed[index] = Some(label.clone());
            continue;
        }

        let Some(short) = label.short_text.clone().or_else(|| shorten_label(&label.text)) else {
            continue;
        };
        let original_width = label.pixel_box.width;
        let short_width = (short.chars().count() as f64 * config.char_width_px).min(original_width);
        if short_width < original_width * (1.0 - config.max_shrink_ratio) {
            continue;
        }
        let short_box = label.pixel_box.with_width_centered(short_width);
        if kept.try_accept(short_box) {
            placed[index] = Some(LabelCandidate {
                text: short,
                short_text: None,
                pixel_box: short_box,
                priority: label.priority,
            });
        }
    }

    placed.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::{TruncationConfig, resolve_collisions_with_truncation, shorten_label};
    use crate::layout::label::{LabelCandidate, LabelPriority, PixelBox};

    #[test]
    fn derives_short_forms() {
        assert_eq!(shorten_label("09:30:00").as_deref(), Some("09:30"));
        assert_eq!(shorten_label("2024-03-15").as_deref(), Some("03-15"));
        assert_eq!(shorten_label("09:30"), None);
        assert_eq!(shorten_label("1680.50"), None);
    }

    #[test]
    fn slightly_crowded_label_survives_shortened() {
        let config = TruncationConfig {
            char_width_px: 7.0,
            max_shrink_ratio: 0.5,
        };
        // "2024-03-15" is 70px wide; "03-15" needs 35px.
        let labels = vec![
            LabelCandidate::new("2024-03-14", PixelBox::new(0.0, 0.0, 70.0, 12.0), LabelPriority::Major),
            LabelCandidate::new("2024-03-15", PixelBox::new(60.0, 0.0, 70.0, 12.0), LabelPriority::Minor),
        ];
        let kept = resolve_collisions_with_truncation(&labels, 2.0, config);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[1].text, "03-15");
        assert_eq!(kept[1].pixel_box.width, 35.0);
        assert_eq!(kept[1].pixel_box.center_x(), 95.0);
    }

    #[test]
    fn drops_label_when_shortening_would_shrink_too_much() {
        let config = TruncationConfig {
            char_width_px: 7.0,
            max_shrink_ratio: 0.2,
        };
        let labels = vec![
            LabelCandidate::new("2024-03-14", PixelBox::new(0.0, 0.0, 70.0, 12.0), LabelPriority::Major),
            LabelCandidate::new("2024-03-15", PixelBox::new(60.0, 0.0, 70.0, 12.0), LabelPriority::Minor),
        ];
        assert_eq!(resolve_collisions_with_truncation(&labels, 2.0, config).len(), 1);
    }
}
