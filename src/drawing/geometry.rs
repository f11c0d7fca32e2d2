use smallvec::SmallVec;

use crate::axis::format_price_label;
use crate::axis::label_format::decimals_for_magnitude;
use crate::core::{CoordinateTransform, PixelPoint};
use crate::drawing::{DrawingId, DrawingObject, DrawingTool};
use crate::layout::{PixelBox, estimate_label_text_width_px};
use crate::render::{Color, LineDash, LinePrimitive, RectPrimitive, TextHAlign, TextPrimitive};

pub const DRAWING_FONT_SIZE_PX: f64 = 12.0;
const ARROW_HEAD_LENGTH_PX: f64 = 10.0;
const ARROW_HEAD_ANGLE_RAD: f64 = std::f64::consts::PI / 6.0;
const RECT_FILL_ALPHA: f64 = 0.12;

/// Pixel-space projection of one drawing for the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingGeometry {
    pub id: DrawingId,
    pub lines: Vec<LinePrimitive>,
    pub rects: Vec<RectPrimitive>,
    pub texts: Vec<TextPrimitive>,
    /// Control-point positions, drawn as grab handles when selected.
    pub handles: SmallVec<[PixelPoint; 2]>,
}

impl DrawingGeometry {
    fn empty(object: &DrawingObject) -> Self {
        Self {
            id: object.id.clone(),
            lines: Vec::new(),
            rects: Vec::new(),
            texts: Vec::new(),
            handles: SmallVec::new(),
        }
    }
}

fn pixel_points(object: &DrawingObject, transform: &CoordinateTransform) -> SmallVec<[PixelPoint; 2]> {
    object
        .points
        .iter()
        .map(|point| transform.world_to_pixel(*point))
        .collect()
}

fn styled_line(object: &DrawingObject, a: PixelPoint, b: PixelPoint) -> LinePrimitive {
    LinePrimitive::new(a.x, a.y, b.x, b.y, object.style.line_width, object.style.color)
        .with_dash(object.style.dash)
}

/// Far end of a ray starting at `a` and passing through `b`, pushed past the canvas.
fn ray_end(a: PixelPoint, b: PixelPoint, transform: &CoordinateTransform) -> PixelPoint {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length = dx.hypot(dy);
    if length <= f64::EPSILON {
        return b;
    }
    let canvas = transform.canvas();
    let reach = f64::from(canvas.width) + f64::from(canvas.height);
    PixelPoint::new(b.x + dx / length * reach, b.y + dy / length * reach)
}

fn text_box(object: &DrawingObject, anchor: PixelPoint) -> PixelBox {
    let width = estimate_label_text_width_px(object.text.as_deref().unwrap_or(""), DRAWING_FONT_SIZE_PX);
    PixelBox::new(anchor.x, anchor.y - DRAWING_FONT_SIZE_PX, width, DRAWING_FONT_SIZE_PX)
}

fn fibonacci_label(ratio: f64, price: f64) -> String {
    format!(
        "{ratio:.3} ({})",
        format_price_label(price, decimals_for_magnitude(price))
    )
}

/// Projects `object` into renderer primitives under `transform`.
#[must_use]
pub fn geometry(object: &DrawingObject, transform: &CoordinateTransform) -> DrawingGeometry {
    let mut out = DrawingGeometry::empty(object);
    let points = pixel_points(object, transform);
    out.handles = points.clone();
    let canvas = transform.canvas();
    let width = f64::from(canvas.width);
    let height = f64::from(canvas.height);

    match (object.tool, points.as_slice()) {
        (DrawingTool::TrendLine, [a, b]) => out.lines.push(styled_line(object, *a, *b)),
        (DrawingTool::Ray, [a, b]) => {
            let end = ray_end(*a, *b, transform);
            out.lines.push(styled_line(object, *a, end));
        }
        (DrawingTool::Arrow, [a, b]) => {
            out.lines.push(styled_line(object, *a, *b));
            let dx = b.x - a.x;
            let dy = b.y - a.y;
            if dx.hypot(dy) > f64::EPSILON {
                let back = (-dy).atan2(-dx);
                for side in [-1.0, 1.0] {
                    let angle = back + side * ARROW_HEAD_ANGLE_RAD;
                    let tip = PixelPoint::new(
                        b.x + ARROW_HEAD_LENGTH_PX * angle.cos(),
                        b.y + ARROW_HEAD_LENGTH_PX * angle.sin(),
                    );
                    out.lines
                        .push(styled_line(object, *b, tip).with_dash(LineDash::Solid));
                }
            }
        }
        (DrawingTool::HorizontalLine, [a]) => {
            out.lines.push(styled_line(
                object,
                PixelPoint::new(0.0, a.y),
                PixelPoint::new(width, a.y),
            ));
        }
        (DrawingTool::VerticalLine, [a]) => {
            out.lines.push(styled_line(
                object,
                PixelPoint::new(a.x, 0.0),
                PixelPoint::new(a.x, height),
            ));
        }
        (DrawingTool::Rectangle, [a, b]) => {
            let color = object.style.color;
            out.rects.push(
                RectPrimitive::from_corners(a.x, a.y, b.x, b.y)
                    .with_stroke(color, object.style.line_width)
                    .with_fill(Color::rgba(color.red, color.green, color.blue, RECT_FILL_ALPHA)),
            );
        }
        (DrawingTool::Text, [a]) => {
            if let Some(text) = object.text.as_deref().filter(|text| !text.is_empty()) {
                out.texts.push(TextPrimitive::new(
                    text,
                    a.x,
                    a.y,
                    DRAWING_FONT_SIZE_PX,
                    object.style.color,
                    TextHAlign::Left,
                ));
            }
        }
        (DrawingTool::Fibonacci, [a, b]) => {
            let left = a.x.min(b.x);
            let right = a.x.max(b.x);
            for (ratio, price) in object.fibonacci_levels() {
                let y = transform.price_to_pixel(price);
                out.lines.push(styled_line(
                    object,
                    PixelPoint::new(left, y),
                    PixelPoint::new(right, y),
                ));
                out.texts.push(TextPrimitive::new(
                    fibonacci_label(ratio, price),
                    left,
                    y - 2.0,
                    DRAWING_FONT_SIZE_PX * 0.9,
                    object.style.color,
                    TextHAlign::Left,
                ));
            }
            out.lines
                .push(styled_line(object, *a, *b).with_dash(LineDash::Dotted));
        }
        // In-progress or malformed objects without the full point set.
        _ => {}
    }
    out
}

fn distance_to_segment(point: PixelPoint, a: PixelPoint, b: PixelPoint) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx * dx + dy * dy;
    if length_sq <= f64::EPSILON {
        return point.distance_to(a);
    }
    let t = (((point.x - a.x) * dx + (point.y - a.y) * dy) / length_sq).clamp(0.0, 1.0);
    point.distance_to(PixelPoint::new(a.x + t * dx, a.y + t * dy))
}

fn distance_to_ray(point: PixelPoint, a: PixelPoint, b: PixelPoint) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx * dx + dy * dy;
    if length_sq <= f64::EPSILON {
        return point.distance_to(a);
    }
    let t = (((point.x - a.x) * dx + (point.y - a.y) * dy) / length_sq).max(0.0);
    point.distance_to(PixelPoint::new(a.x + t * dx, a.y + t * dy))
}

fn distance_to_box(point: PixelPoint, pixel_box: PixelBox) -> f64 {
    let dx = (pixel_box.x - point.x).max(point.x - pixel_box.right()).max(0.0);
    let dy = (pixel_box.y - point.y).max(point.y - pixel_box.bottom()).max(0.0);
    dx.hypot(dy)
}

/// Pixel distance from `point` to the visible shape of `object`.
///
/// Filled shapes (rectangles and text) report zero anywhere inside.
#[must_use]
pub fn hit_distance(
    object: &DrawingObject,
    transform: &CoordinateTransform,
    point: PixelPoint,
) -> Option<f64> {
    let points = pixel_points(object, transform);
    let distance = match (object.tool, points.as_slice()) {
        (DrawingTool::TrendLine | DrawingTool::Arrow, [a, b]) => distance_to_segment(point, *a, *b),
        (DrawingTool::Ray, [a, b]) => distance_to_ray(point, *a, *b),
        (DrawingTool::HorizontalLine, [a]) => (point.y - a.y).abs(),
        (DrawingTool::VerticalLine, [a]) => (point.x - a.x).abs(),
        (DrawingTool::Rectangle, [a, b]) => {
            let rect = RectPrimitive::from_corners(a.x, a.y, b.x, b.y);
            distance_to_box(point, PixelBox::new(rect.x, rect.y, rect.width, rect.height))
        }
        (DrawingTool::Text, [a]) => distance_to_box(point, text_box(object, *a)),
        (DrawingTool::Fibonacci, [a, b]) => {
            let left = a.x.min(b.x);
            let right = a.x.max(b.x);
            object
                .fibonacci_levels()
                .iter()
                .map(|&(_, price)| {
                    let y = transform.price_to_pixel(price);
                    distance_to_segment(point, PixelPoint::new(left, y), PixelPoint::new(right, y))
                })
                .fold(f64::INFINITY, f64::min)
        }
        _ => return None,
    };
    distance.is_finite().then_some(distance)
}

#[must_use]
pub fn hit_test(
    object: &DrawingObject,
    transform: &CoordinateTransform,
    point: PixelPoint,
    tolerance_px: f64,
) -> bool {
    hit_distance(object, transform, point).is_some_and(|distance| distance <= tolerance_px)
}

/// Index of the control point within `radius_px` of `point`, nearest first.
#[must_use]
pub fn handle_at(
    object: &DrawingObject,
    transform: &CoordinateTransform,
    point: PixelPoint,
    radius_px: f64,
) -> Option<usize> {
    pixel_points(object, transform)
        .iter()
        .enumerate()
        .map(|(index, handle)| (index, handle.distance_to(point)))
        .filter(|(_, distance)| *distance <= radius_px)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{geometry, handle_at, hit_distance, hit_test};
    use crate::core::{CanvasSize, CoordinateTransform, PixelPoint, WorldPoint};
    use crate::drawing::{DrawingId, DrawingObject, DrawingStyle, DrawingTool};

    // 1 bar = 10 px, 1 price unit = 5 px, price 100 at the bottom.
    fn transform() -> CoordinateTransform {
        CoordinateTransform::new((0.0, 100.0), (100.0, 200.0), CanvasSize::new(1000, 500))
            .expect("transform")
    }

    fn object(tool: DrawingTool, points: &[(f64, f64)]) -> DrawingObject {
        DrawingObject::new(
            DrawingId::new("d1"),
            tool,
            points.iter().map(|&(t, p)| WorldPoint::new(t, p)),
            DrawingStyle::default(),
            0,
        )
    }

    #[test]
    fn trend_line_hit_uses_segment_distance() {
        let line = object(DrawingTool::TrendLine, &[(10.0, 150.0), (20.0, 150.0)]);
        // Segment spans x 100..200 at y 250.
        assert!(hit_test(&line, &transform(), PixelPoint::new(150.0, 254.0), 5.0));
        assert!(!hit_test(&line, &transform(), PixelPoint::new(150.0, 260.0), 5.0));
        assert!(!hit_test(&line, &transform(), PixelPoint::new(215.0, 250.0), 5.0));
    }

    #[test]
    fn ray_hit_extends_past_second_point() {
        let ray = object(DrawingTool::Ray, &[(10.0, 150.0), (20.0, 150.0)]);
        assert!(hit_test(&ray, &transform(), PixelPoint::new(800.0, 251.0), 5.0));
        assert!(!hit_test(&ray, &transform(), PixelPoint::new(80.0, 250.0), 5.0));
    }

    #[test]
    fn horizontal_line_hit_ignores_x() {
        let line = object(DrawingTool::HorizontalLine, &[(10.0, 150.0)]);
        let distance = hit_distance(&line, &transform(), PixelPoint::new(990.0, 247.0))
            .expect("distance");
        assert_relative_eq!(distance, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn rectangle_hit_inside_and_near_border() {
        let rect = object(DrawingTool::Rectangle, &[(10.0, 160.0), (20.0, 140.0)]);
        assert!(hit_test(&rect, &transform(), PixelPoint::new(150.0, 250.0), 5.0));
        assert!(hit_test(&rect, &transform(), PixelPoint::new(204.0, 250.0), 5.0));
        assert!(!hit_test(&rect, &transform(), PixelPoint::new(210.0, 250.0), 5.0));
    }

    #[test]
    fn fibonacci_hit_on_any_level() {
        let fib = object(DrawingTool::Fibonacci, &[(10.0, 100.0), (30.0, 200.0)]);
        // 0.5 level at price 150 -> y 250.
        assert!(hit_test(&fib, &transform(), PixelPoint::new(200.0, 252.0), 5.0));
        assert!(!hit_test(&fib, &transform(), PixelPoint::new(200.0, 230.0), 5.0));
    }

    #[test]
    fn arrow_geometry_has_shaft_and_head() {
        let arrow = object(DrawingTool::Arrow, &[(10.0, 150.0), (20.0, 150.0)]);
        let geometry = geometry(&arrow, &transform());
        assert_eq!(geometry.lines.len(), 3);
        for head in &geometry.lines[1..] {
            assert_relative_eq!(head.x1, 200.0, epsilon = 1e-9);
            assert!(head.x2 < 200.0);
        }
    }

    #[test]
    fn horizontal_line_spans_canvas() {
        let line = object(DrawingTool::HorizontalLine, &[(10.0, 150.0)]);
        let geometry = geometry(&line, &transform());
        assert_eq!(geometry.lines.len(), 1);
        assert_relative_eq!(geometry.lines[0].x1, 0.0);
        assert_relative_eq!(geometry.lines[0].x2, 1000.0);
        assert_relative_eq!(geometry.lines[0].y1, 250.0, epsilon = 1e-9);
    }

    #[test]
    fn fibonacci_geometry_renders_every_level_with_label() {
        let fib = object(DrawingTool::Fibonacci, &[(10.0, 100.0), (30.0, 200.0)]);
        let geometry = geometry(&fib, &transform());
        assert_eq!(geometry.texts.len(), 7);
        assert_eq!(geometry.lines.len(), 8);
        assert!(geometry.texts[3].text.starts_with("0.500"));
    }

    #[test]
    fn handle_at_picks_nearest_point() {
        let line = object(DrawingTool::TrendLine, &[(10.0, 150.0), (11.0, 150.0)]);
        assert_eq!(handle_at(&line, &transform(), PixelPoint::new(108.0, 250.0), 6.0), Some(1));
        assert_eq!(handle_at(&line, &transform(), PixelPoint::new(150.0, 250.0), 6.0), None);
    }

    #[test]
    fn zero_length_line_still_renders() {
        let line = object(DrawingTool::TrendLine, &[(10.0, 150.0), (10.0, 150.0)]);
        let geometry = geometry(&line, &transform());
        assert_eq!(geometry.lines.len(), 1);
        assert!(hit_test(&line, &transform(), PixelPoint::new(101.0, 251.0), 5.0));
    }
}
