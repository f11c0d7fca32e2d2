use std::cmp::Ordering;
use std::ops::Range;
use std::sync::Arc;

use crate::axis::{PriceAxis, TimeAxis};
use crate::core::Bar;
use crate::drawing::{DrawingGeometry, DrawingId, DrawingObject};
use crate::error::{ChartError, ChartResult};
use crate::layout::LabelCandidate;
use crate::levels::KeyLevel;
use crate::viewport::ViewportState;

/// Backend-agnostic scene for one chart draw pass.
///
/// Everything a painter needs is materialized here; bars and drawings are
/// shared snapshots, so a frame may be handed across an async boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub viewport: ViewportState,
    pub bars: Arc<[Bar]>,
    /// Indices of `bars` inside the visible window.
    pub visible_bars: Range<usize>,
    pub time_axis: TimeAxis,
    pub price_axis: PriceAxis,
    /// Time labels left after collision resolution.
    pub visible_time_labels: Vec<LabelCandidate>,
    pub visible_price_labels: Vec<LabelCandidate>,
    pub key_levels: Vec<KeyLevel>,
    pub drawings: Vec<Arc<DrawingObject>>,
    /// Pixel geometry of `drawings` plus the in-progress object, if any.
    pub drawing_geometry: Vec<DrawingGeometry>,
    pub in_progress: Option<DrawingObject>,
    pub selected: Option<DrawingId>,
}

impl RenderFrame {
    #[must_use]
    pub fn visible_bars(&self) -> &[Bar] {
        self.bars.get(self.visible_bars.clone()).unwrap_or(&[])
    }

    pub fn validate(&self) -> ChartResult<()> {
        if self.viewport.width_px == 0 || self.viewport.height_px == 0 {
            return Err(ChartError::InvalidViewport {
                width: self.viewport.width_px,
                height: self.viewport.height_px,
            });
        }
        if self.viewport.price_min.partial_cmp(&self.viewport.price_max) != Some(Ordering::Less) {
            return Err(ChartError::InvalidData(
                "frame price range must satisfy min < max".to_owned(),
            ));
        }
        if self.visible_bars.end > self.bars.len() {
            return Err(ChartError::InvalidData(
                "visible bar range exceeds the bar store".to_owned(),
            ));
        }
        for geometry in &self.drawing_geometry {
            for line in &geometry.lines {
                line.validate()?;
            }
            for rect in &geometry.rects {
                rect.validate()?;
            }
            for text in &geometry.texts {
                text.validate()?;
            }
        }
        Ok(())
    }

    /// Primitive count across all drawing geometry.
    #[must_use]
    pub fn drawing_primitive_count(&self) -> usize {
        self.drawing_geometry
            .iter()
            .map(|geometry| geometry.lines.len() + geometry.rects.len() + geometry.texts.len())
            .sum()
    }
}
