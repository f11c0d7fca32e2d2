use serde::{Deserialize, Serialize};

/// Axis-aligned pixel rectangle, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelBox {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Box of the given size centred on `(center_x, center_y)`.
    #[must_use]
    pub fn centered(center_x: f64, center_y: f64, width: f64, height: f64) -> Self {
        Self::new(center_x - width / 2.0, center_y - height / 2.0, width, height)
    }

    #[must_use]
    pub fn right(self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn center_x(self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Grows the box by `margin` on every side.
    #[must_use]
    pub fn expanded(self, margin: f64) -> Self {
        Self::new(
            self.x - margin,
            self.y - margin,
            self.width + 2.0 * margin,
            self.height + 2.0 * margin,
        )
    }

    /// Same vertical extent and horizontal centre with a new width.
    #[must_use]
    pub fn with_width_centered(self, width: f64) -> Self {
        Self::new(self.center_x() - width / 2.0, self.y, width, self.height)
    }
}

/// Strict intersection test; boxes that only touch do not overlap.
#[must_use]
pub fn boxes_overlap(a: &PixelBox, b: &PixelBox) -> bool {
    a.x < b.right() && b.x < a.right() && a.y < b.bottom() && b.y < a.bottom()
}

/// Collision priority, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LabelPriority {
    Minor,
    Major,
    /// Explicitly pinned labels such as the last-price marker.
    Pinned,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelCandidate {
    pub text: String,
    /// Narrower alternative tried before the label is dropped.
    #[serde(default)]
    pub short_text: Option<String>,
    pub pixel_box: PixelBox,
    pub priority: LabelPriority,
}

impl LabelCandidate {
    #[must_use]
    pub fn new(text: impl Into<String>, pixel_box: PixelBox, priority: LabelPriority) -> Self {
        Self {
            text: text.into(),
            short_text: None,
            pixel_box,
            priority,
        }
    }

    #[must_use]
    pub fn with_short_text(mut self, short_text: impl Into<String>) -> Self {
        self.short_text = Some(short_text.into());
        self
    }
}

/// Deterministic text width estimate used when no font metrics are available.
#[must_use]
pub fn estimate_label_text_width_px(text: &str, font_size_px: f64) -> f64 {
    let units = text.chars().fold(0.0, |acc, ch| {
        acc + match ch {
            '0'..='9' => 0.62,
            '.' | ',' | ':' => 0.34,
            '-' | '+' | '%' => 0.42,
            ' ' => 0.33,
            _ => 0.58,
        }
    });
    (units * font_size_px).max(font_size_px)
}
