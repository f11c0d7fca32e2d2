use tracing::trace;

use crate::core::PixelPoint;
use crate::drawing::{ActiveTool, DrawingId, DrawingStyle};
use crate::error::ChartResult;
use crate::extensions::PluginEvent;
use crate::interaction::{InteractionMode, KeyInput, PointerButton, WheelGesture, WheelInput};
use crate::render::Renderer;

use super::{ChartEngine, InvalidationTopic};

impl<R: Renderer> ChartEngine<R> {
    /// Routes a press to the drawing layer first, then to viewport panning.
    ///
    /// Returns `true` when either layer took the event.
    pub fn pointer_down(&mut self, x: f64, y: f64, button: PointerButton) -> bool {
        let point = PixelPoint::new(x, y);
        self.core.interaction.on_pointer_move(point);
        if button != PointerButton::Primary {
            return false;
        }
        let transform = self.core.viewport.transform();
        let tool_before = self.core.drawings.active_tool();
        if self.core.drawings.pointer_down(point, transform.as_ref()) {
            self.core.interaction.on_annotation_start();
            self.after_drawings_changed();
            self.emit_tool_change_since(tool_before);
            return true;
        }
        // A press on empty canvas may have cleared the selection.
        self.after_drawings_changed();

        self.core.viewport.start_pan(x);
        if self.core.viewport.is_panning() {
            self.core.interaction.on_pan_start();
            return true;
        }
        false
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        let point = PixelPoint::new(x, y);
        self.core.interaction.on_pointer_move(point);
        self.invalidate(InvalidationTopic::Cursor);

        let transform = self.core.viewport.transform();
        if self.core.drawings.pointer_move(point, transform.as_ref()) {
            self.after_drawings_changed();
            return true;
        }
        if self.core.interaction.mode() == InteractionMode::Panning {
            self.core.viewport.update_pan(x);
            self.after_viewport_mutation();
            return true;
        }
        false
    }

    pub fn pointer_up(&mut self, x: f64, y: f64, button: PointerButton) -> bool {
        let point = PixelPoint::new(x, y);
        if button != PointerButton::Primary {
            return false;
        }
        let transform = self.core.viewport.transform();
        let tool_before = self.core.drawings.active_tool();
        if self.core.drawings.pointer_up(point, transform.as_ref()) {
            self.core.interaction.on_release();
            self.after_drawings_changed();
            self.emit_tool_change_since(tool_before);
            return true;
        }
        if self.core.interaction.mode() == InteractionMode::Panning {
            self.core.viewport.end_pan();
            self.core.interaction.on_release();
            self.after_viewport_mutation();
            return true;
        }
        self.core.interaction.on_release();
        false
    }

    pub fn pointer_leave(&mut self) {
        self.core.interaction.on_pointer_leave();
        self.invalidate(InvalidationTopic::Cursor);
    }

    /// Trackpad and mouse wheel: pan or zoom depending on the dominant axis.
    pub fn wheel(&mut self, input: WheelInput) -> bool {
        let Some(gesture) = input.gesture() else {
            return false;
        };
        trace!(?gesture, "wheel gesture");
        match gesture {
            WheelGesture::Pan { delta_px } => self.core.viewport.pan_by_pixels(delta_px),
            WheelGesture::Zoom { anchor_x, delta } => {
                self.core.viewport.wheel_zoom(anchor_x, delta);
            }
        }
        self.after_viewport_mutation();
        true
    }

    pub fn key_down(&mut self, key: KeyInput) -> bool {
        let handled = match key {
            KeyInput::Delete | KeyInput::Backspace => self.core.drawings.delete_selected(),
            KeyInput::Escape => {
                let cancelled = self.core.drawings.cancel();
                if self.core.interaction.mode() == InteractionMode::Panning {
                    self.core.viewport.end_pan();
                    self.after_viewport_mutation();
                }
                self.core.interaction.on_release();
                cancelled
            }
            KeyInput::Undo => self.core.drawings.undo(),
            KeyInput::Redo => self.core.drawings.redo(),
        };
        if handled {
            self.after_drawings_changed();
        }
        handled
    }

    /// Commits reset the tool to select unless it is kept armed.
    fn emit_tool_change_since(&mut self, before: ActiveTool) {
        let tool = self.core.drawings.active_tool();
        if tool != before {
            self.emit_plugin_event(PluginEvent::ToolChanged { tool });
        }
    }

    pub fn set_active_tool(&mut self, tool: ActiveTool) {
        if self.core.drawings.set_active_tool(tool) {
            self.after_drawings_changed();
            self.emit_plugin_event(PluginEvent::ToolChanged { tool });
        }
    }

    pub fn select_drawing(&mut self, id: Option<DrawingId>) -> bool {
        let changed = self.core.drawings.select(id);
        self.after_drawings_changed();
        changed
    }

    pub fn undo(&mut self) -> bool {
        self.key_down(KeyInput::Undo)
    }

    pub fn redo(&mut self) -> bool {
        self.key_down(KeyInput::Redo)
    }

    pub fn set_drawing_text(&mut self, id: &DrawingId, text: impl Into<String>) -> bool {
        let changed = self.core.drawings.set_text(id, text);
        self.after_drawings_changed();
        changed
    }

    pub fn set_drawing_style(&mut self, id: &DrawingId, style: DrawingStyle) -> ChartResult<bool> {
        let changed = self.core.drawings.update_style(id, style)?;
        self.after_drawings_changed();
        Ok(changed)
    }
}
