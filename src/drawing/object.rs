use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::WorldPoint;
use crate::error::{ChartError, ChartResult};
use crate::render::{Color, LineDash};

/// Retracement ratios rendered for every fibonacci object, top to bottom of
/// the drag direction.
pub const FIBONACCI_RATIOS: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];

/// Stable identifier of one annotation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DrawingId(String);

impl DrawingId {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DrawingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrawingTool {
    TrendLine,
    HorizontalLine,
    VerticalLine,
    Rectangle,
    Ray,
    Arrow,
    Text,
    Fibonacci,
}

impl DrawingTool {
    pub const ALL: [Self; 8] = [
        Self::TrendLine,
        Self::HorizontalLine,
        Self::VerticalLine,
        Self::Rectangle,
        Self::Ray,
        Self::Arrow,
        Self::Text,
        Self::Fibonacci,
    ];

    /// Number of world points a finished object of this tool stores.
    #[must_use]
    pub const fn point_count(self) -> usize {
        match self {
            Self::HorizontalLine | Self::VerticalLine | Self::Text => 1,
            Self::TrendLine | Self::Rectangle | Self::Ray | Self::Arrow | Self::Fibonacci => 2,
        }
    }

    /// One-point tools complete on the first pointer down.
    #[must_use]
    pub const fn is_single_point(self) -> bool {
        self.point_count() == 1
    }
}

/// Tool selected in the toolbar: either selection/editing or one drawing tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ActiveTool {
    #[default]
    Select,
    Draw(DrawingTool),
}

impl ActiveTool {
    #[must_use]
    pub const fn drawing_tool(self) -> Option<DrawingTool> {
        match self {
            Self::Select => None,
            Self::Draw(tool) => Some(tool),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawingStyle {
    pub color: Color,
    pub line_width: f64,
    pub dash: LineDash,
}

impl Default for DrawingStyle {
    fn default() -> Self {
        Self {
            color: Color::rgb(0.16, 0.38, 1.0),
            line_width: 1.5,
            dash: LineDash::Solid,
        }
    }
}

impl DrawingStyle {
    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub fn with_line_width(mut self, line_width: f64) -> Self {
        self.line_width = line_width;
        self
    }

    #[must_use]
    pub fn with_dash(mut self, dash: LineDash) -> Self {
        self.dash = dash;
        self
    }

    pub fn validate(self) -> ChartResult<Self> {
        if !self.line_width.is_finite() || self.line_width <= 0.0 {
            return Err(ChartError::InvalidData(
                "drawing line width must be finite and > 0".to_owned(),
            ));
        }
        self.color.validate()?;
        Ok(self)
    }
}

/// One annotation in world coordinates.
///
/// Points are stored as fractional bar indices and prices, so an object keeps
/// its place on the chart across zoom, pan and timeframe changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingObject {
    pub id: DrawingId,
    pub tool: DrawingTool,
    pub points: SmallVec<[WorldPoint; 2]>,
    #[serde(default)]
    pub style: DrawingStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Creation time, unix milliseconds.
    pub created_at: i64,
}

impl DrawingObject {
    #[must_use]
    pub fn new(
        id: DrawingId,
        tool: DrawingTool,
        points: impl IntoIterator<Item = WorldPoint>,
        style: DrawingStyle,
        created_at: i64,
    ) -> Self {
        Self {
            id,
            tool,
            points: points.into_iter().collect(),
            style,
            text: None,
            created_at,
        }
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn first_point(&self) -> Option<WorldPoint> {
        self.points.first().copied()
    }

    /// Moves every point by a world delta.
    pub fn translate(&mut self, dt: f64, dp: f64) {
        for point in &mut self.points {
            *point = point.offset(dt, dp);
        }
    }

    /// Price levels of a fibonacci object, paired with their ratio.
    ///
    /// Empty for any other tool or for an object still missing its second point.
    #[must_use]
    pub fn fibonacci_levels(&self) -> SmallVec<[(f64, f64); 7]> {
        match (self.tool, self.points.as_slice()) {
            (DrawingTool::Fibonacci, [start, end]) => fibonacci_levels(start.p, end.p),
            _ => SmallVec::new(),
        }
    }

    pub fn validate(&self) -> ChartResult<()> {
        if self.id.as_str().is_empty() {
            return Err(ChartError::InvalidData(
                "drawing id must not be empty".to_owned(),
            ));
        }
        if self.points.len() != self.tool.point_count() {
            return Err(ChartError::InvalidData(format!(
                "drawing `{}` ({:?}) needs {} point(s), got {}",
                self.id,
                self.tool,
                self.tool.point_count(),
                self.points.len()
            )));
        }
        if self.points.iter().any(|point| !point.is_finite()) {
            return Err(ChartError::InvalidData(format!(
                "drawing `{}` has non-finite coordinates",
                self.id
            )));
        }
        self.style.validate()?;
        Ok(())
    }
}

/// `(ratio, price)` pairs with `price = start + (end - start) * ratio`.
#[must_use]
pub fn fibonacci_levels(start_price: f64, end_price: f64) -> SmallVec<[(f64, f64); 7]> {
    FIBONACCI_RATIOS
        .iter()
        .map(|&ratio| (ratio, start_price + (end_price - start_price) * ratio))
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{DrawingId, DrawingObject, DrawingStyle, DrawingTool, fibonacci_levels};
    use crate::core::WorldPoint;

    #[test]
    fn fibonacci_levels_interpolate_between_prices() {
        let levels = fibonacci_levels(100.0, 200.0);
        assert_eq!(levels.len(), 7);
        assert_relative_eq!(levels[0].1, 100.0);
        assert_relative_eq!(levels[1].1, 123.6, max_relative = 1e-12);
        assert_relative_eq!(levels[3].1, 150.0);
        assert_relative_eq!(levels[6].1, 200.0);
    }

    #[test]
    fn validate_checks_point_count_per_tool() {
        let line = DrawingObject::new(
            DrawingId::new("d1"),
            DrawingTool::TrendLine,
            [WorldPoint::new(1.0, 10.0)],
            DrawingStyle::default(),
            0,
        );
        assert!(line.validate().is_err());

        let horizontal = DrawingObject::new(
            DrawingId::new("d2"),
            DrawingTool::HorizontalLine,
            [WorldPoint::new(1.0, 10.0)],
            DrawingStyle::default(),
            0,
        );
        assert!(horizontal.validate().is_ok());
    }

    #[test]
    fn zero_length_two_point_object_is_valid() {
        let point = WorldPoint::new(5.0, 42.0);
        let object = DrawingObject::new(
            DrawingId::new("d3"),
            DrawingTool::Rectangle,
            [point, point],
            DrawingStyle::default(),
            0,
        );
        assert!(object.validate().is_ok());
    }

    #[test]
    fn id_serializes_as_plain_string() {
        let json = serde_json::to_string(&DrawingId::new("d7")).expect("serialize");
        assert_eq!(json, "\"d7\"");
    }
}
