//! Time and price axis tick generation.
//!
//! Everything here is a pure function of the visible window and the bars, so
//! callers may recompute per frame or memoize on the inputs.

pub mod config;
pub mod label_format;
pub mod price_axis;
mod ticks;
pub mod time_axis;
pub mod time_interval;

pub use config::{
    PriceAxisConfig, PriceAxisMode, TimeAxisConfig, TimeAxisSessionConfig, TimeAxisTimeZone,
};
pub use label_format::{TimeLabelFormat, format_price_label, format_time_label};
pub use price_axis::{
    PriceAxis, PriceAxisRequest, PriceAxisTick, calculate_price_axis, nice_step,
    price_tick_target_for_height,
};
pub use time_axis::{
    MAX_EXTRAPOLATED_BARS, PeriodSeparator, SeparatorKind, TickLevel, TimeAxis, TimeAxisTick, calculate_time_axis,
};
pub use time_interval::{TIME_INTERVAL_LADDER, TimeInterval};
