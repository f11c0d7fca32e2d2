//! chart-engine: interactive price-chart engine.
//!
//! Keeps a world coordinate system (fractional bar index, price), a pixel
//! coordinate system and a set of annotations consistent under zoom and pan,
//! and produces axis ticks, collision-free labels and key price levels for an
//! external renderer.

pub mod api;
pub mod axis;
pub mod core;
pub mod drawing;
pub mod error;
pub mod extensions;
pub mod interaction;
pub mod layout;
pub mod levels;
pub mod render;
pub mod telemetry;
pub mod viewport;

pub use api::{ChartEngine, ChartEngineConfig};
pub use error::{ChartError, ChartResult};
