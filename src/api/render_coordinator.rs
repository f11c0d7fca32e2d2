use tracing::{debug, warn};

use crate::error::ChartResult;
use crate::extensions::PluginEvent;
use crate::render::Renderer;

use super::{ChartEngine, InvalidationLevel, InvalidationMask};

impl<R: Renderer> ChartEngine<R> {
    /// Display-refresh hook: renders one frame if anything changed since the
    /// previous tick.
    ///
    /// Returns `true` when a frame reached the renderer. Renderer failures are
    /// logged and the invalidation is kept so the next tick retries.
    pub fn on_frame(&mut self) -> bool {
        if self.core.pending_invalidation.is_none() {
            return false;
        }
        match self.render() {
            Ok(rendered) => rendered,
            Err(err) => {
                warn!(error = %err, "render failed, frame will be retried");
                false
            }
        }
    }

    /// Builds and renders the current frame regardless of invalidation.
    ///
    /// A `Full` invalidation drops the cached axes and key levels; lower
    /// levels reuse them.
    ///
    /// Returns `Ok(false)` when the viewport has nothing to draw.
    pub fn render(&mut self) -> ChartResult<bool> {
        if self.core.pending_invalidation.level() == InvalidationLevel::Full {
            self.core.frame_cache.clear();
        }
        let Some(frame) = self.build_render_frame() else {
            debug!("no data to render");
            self.core.pending_invalidation = InvalidationMask::none();
            return Ok(false);
        };
        self.renderer.render(&frame)?;
        self.core.pending_invalidation = InvalidationMask::none();
        self.core.frames_rendered += 1;
        self.emit_plugin_event(PluginEvent::Rendered);
        Ok(true)
    }
}
