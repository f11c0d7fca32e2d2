use serde::{Deserialize, Serialize};

use crate::drawing::{ActiveTool, DrawingState};
use crate::interaction::InteractionMode;
use crate::viewport::ViewportSnapshot;

/// Read-only state snapshot passed to plugin hooks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PluginContext {
    pub viewport: ViewportSnapshot,
    pub bar_count: usize,
    pub data_generation: u64,
    pub drawing_count: usize,
    pub active_tool: ActiveTool,
    pub drawing_state: DrawingState,
    pub interaction_mode: InteractionMode,
}

/// Event stream exposed to plugins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PluginEvent {
    /// Visible world range moved; linked charts mirror it.
    VisibleRangeChanged { start: f64, end: f64 },
    /// The bar store was replaced wholesale.
    DataReplaced { bar_count: usize },
    /// Edge loading merged bars at either end of the store.
    DataExtended { prepended: usize, appended: usize },
    DrawingsChanged { revision: u64 },
    ToolChanged { tool: ActiveTool },
    Rendered,
}

/// Extension hook interface for bounded custom logic.
///
/// Plugins can observe events and read engine context without mutating core
/// internals directly.
pub trait ChartPlugin {
    fn id(&self) -> &str;
    fn on_event(&mut self, event: PluginEvent, context: PluginContext);
}
