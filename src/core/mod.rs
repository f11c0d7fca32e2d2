pub mod bar;
pub mod primitives;
pub mod scale;
pub mod timeframe;
pub mod transform;
pub mod types;
pub mod windowing;

pub use bar::{Bar, validate_bar_sequence};
pub use scale::LinearScale;
pub use timeframe::{BarResolution, PresetSpan, Timeframe, TimeframePreset};
pub use transform::CoordinateTransform;
pub use types::{CanvasSize, PixelPoint, WorldPoint};
pub use windowing::{
    bars_in_index_window, index_at_or_after, median_bar_spacing_ms, timestamp_at_index,
    visible_index_range,
};
