//! Observer hooks for host-side extensions such as linked charts or analytics.

pub mod plugins;

pub use plugins::{ChartPlugin, PluginContext, PluginEvent};
