use serde::{Deserialize, Serialize};

use crate::core::{CanvasSize, LinearScale, PixelPoint, WorldPoint};
use crate::error::ChartResult;

/// World↔pixel mapping derived from one viewport state.
///
/// The transform is a value: it must be re-resolved from the viewport after
/// every zoom/pan instead of being cached by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateTransform {
    time: LinearScale,
    price: LinearScale,
    canvas: CanvasSize,
}

impl CoordinateTransform {
    pub fn new(
        visible_range: (f64, f64),
        price_range: (f64, f64),
        canvas: CanvasSize,
    ) -> ChartResult<Self> {
        let time = LinearScale::new(visible_range.0, visible_range.1, f64::from(canvas.width))?;
        let price = LinearScale::new(price_range.0, price_range.1, f64::from(canvas.height))?
            .with_inverted(true);
        Ok(Self {
            time,
            price,
            canvas,
        })
    }

    #[must_use]
    pub fn canvas(self) -> CanvasSize {
        self.canvas
    }

    #[must_use]
    pub fn visible_range(self) -> (f64, f64) {
        self.time.domain()
    }

    #[must_use]
    pub fn price_range(self) -> (f64, f64) {
        self.price.domain()
    }

    #[must_use]
    pub fn time_to_pixel(self, t: f64) -> f64 {
        self.time.domain_to_pixel(t)
    }

    #[must_use]
    pub fn pixel_to_time(self, x: f64) -> f64 {
        self.time.pixel_to_domain(x)
    }

    #[must_use]
    pub fn price_to_pixel(self, price: f64) -> f64 {
        self.price.domain_to_pixel(price)
    }

    #[must_use]
    pub fn pixel_to_price(self, y: f64) -> f64 {
        self.price.pixel_to_domain(y)
    }

    #[must_use]
    pub fn world_to_pixel(self, point: WorldPoint) -> PixelPoint {
        PixelPoint::new(self.time_to_pixel(point.t), self.price_to_pixel(point.p))
    }

    #[must_use]
    pub fn pixel_to_world(self, point: PixelPoint) -> WorldPoint {
        WorldPoint::new(self.pixel_to_time(point.x), self.pixel_to_price(point.y))
    }

    /// Bars per pixel on the time axis.
    #[must_use]
    pub fn bars_per_pixel(self) -> f64 {
        self.time.units_per_pixel()
    }
}

#[cfg(test)]
mod tests {
    use super::CoordinateTransform;
    use crate::core::{CanvasSize, PixelPoint, WorldPoint};

    #[test]
    fn world_pixel_round_trip() {
        let transform =
            CoordinateTransform::new((10.0, 110.0), (50.0, 150.0), CanvasSize::new(1000, 500))
                .expect("transform");
        let pixel = transform.world_to_pixel(WorldPoint::new(60.0, 100.0));
        assert!((pixel.x - 500.0).abs() < 1e-9);
        assert!((pixel.y - 250.0).abs() < 1e-9);

        let world = transform.pixel_to_world(PixelPoint::new(250.0, 0.0));
        assert!((world.t - 35.0).abs() < 1e-9);
        assert!((world.p - 150.0).abs() < 1e-9);
    }
}
