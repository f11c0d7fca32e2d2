use tracing::trace;

use crate::extensions::{PluginContext, PluginEvent};
use crate::render::Renderer;

use super::ChartEngine;

impl<R: Renderer> ChartEngine<R> {
    pub(super) fn plugin_context(&self) -> PluginContext {
        PluginContext {
            viewport: self.core.viewport.state(),
            bar_count: self.core.viewport.bar_count(),
            data_generation: self.core.viewport.generation(),
            drawing_count: self.core.drawings.len(),
            active_tool: self.core.drawings.active_tool(),
            drawing_state: self.core.drawings.state(),
            interaction_mode: self.core.interaction.mode(),
        }
    }

    pub(super) fn emit_plugin_event(&mut self, event: PluginEvent) {
        if self.core.plugins.is_empty() {
            return;
        }
        let context = self.plugin_context();
        trace!(?event, plugins = self.core.plugins.len(), "dispatching plugin event");
        for plugin in &mut self.core.plugins {
            plugin.on_event(event, context);
        }
    }

    /// Forwards a pending range change from the viewport, if any.
    pub(super) fn emit_visible_range_changed(&mut self) {
        if let Some(change) = self.core.viewport.take_range_change() {
            self.invalidate(super::InvalidationTopic::Viewport);
            self.emit_plugin_event(PluginEvent::VisibleRangeChanged {
                start: change.start,
                end: change.end,
            });
        }
    }

    /// Raises invalidation and notifies plugins when the drawing store moved
    /// to a new revision.
    pub(super) fn after_drawings_changed(&mut self) {
        let revision = self.core.drawings.revision();
        if revision == self.core.last_drawing_revision {
            return;
        }
        self.core.last_drawing_revision = revision;
        self.invalidate(super::InvalidationTopic::Drawings);
        self.emit_plugin_event(PluginEvent::DrawingsChanged { revision });
    }
}
