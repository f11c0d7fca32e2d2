use std::sync::Arc;

use crate::core::{Bar, CoordinateTransform, PixelPoint};
use crate::drawing::{ActiveTool, DrawingEngine, DrawingId, DrawingObject, DrawingState};
use crate::error::ChartResult;
use crate::extensions::ChartPlugin;
use crate::interaction::{InteractionMode, InteractionState};
use crate::render::Renderer;
use crate::viewport::{BarSupply, NoBarSupply, ViewportManager, ViewportSnapshot};

use super::render_frame_builder::FrameCache;
use super::{ChartEngineConfig, InvalidationMask};

/// Internal engine state used by the public facade.
pub(super) struct EngineCore {
    pub(super) config: ChartEngineConfig,
    pub(super) viewport: ViewportManager,
    pub(super) drawings: DrawingEngine,
    pub(super) interaction: InteractionState,
    pub(super) plugins: Vec<Box<dyn ChartPlugin>>,
    pub(super) supply: Box<dyn BarSupply>,
    pub(super) pending_invalidation: InvalidationMask,
    pub(super) frame_cache: FrameCache,
    /// Bumped whenever the bar store changes, keys cached frame parts.
    pub(super) data_revision: u64,
    pub(super) last_drawing_revision: u64,
    pub(super) frames_rendered: u64,
}

/// Main orchestration facade consumed by host applications.
///
/// `ChartEngine` owns one viewport, one drawing engine and the plugin list,
/// routes host input between them and renders at most one frame per
/// [`ChartEngine::on_frame`] tick.
pub struct ChartEngine<R: Renderer> {
    pub(super) renderer: R,
    pub(super) core: EngineCore,
}

impl<R: Renderer> ChartEngine<R> {
    pub fn new(renderer: R, config: ChartEngineConfig) -> ChartResult<Self> {
        let config = config.validate()?;
        let viewport = ViewportManager::new(config.viewport)?;
        let drawings = DrawingEngine::new(config.drawing.clone())?;
        let last_drawing_revision = drawings.revision();
        Ok(Self {
            renderer,
            core: EngineCore {
                config,
                viewport,
                drawings,
                interaction: InteractionState::default(),
                plugins: Vec::new(),
                supply: Box::new(NoBarSupply),
                pending_invalidation: InvalidationMask::none(),
                frame_cache: FrameCache::default(),
                data_revision: 0,
                last_drawing_revision,
                frames_rendered: 0,
            },
        })
    }

    /// Installs the collaborator that answers edge-loading requests.
    #[must_use]
    pub fn with_bar_supply(mut self, supply: impl BarSupply + 'static) -> Self {
        self.set_bar_supply(supply);
        self
    }

    pub fn set_bar_supply(&mut self, supply: impl BarSupply + 'static) {
        self.core.supply = Box::new(supply);
    }

    #[must_use]
    pub fn config(&self) -> &ChartEngineConfig {
        &self.core.config
    }

    #[must_use]
    pub fn viewport(&self) -> &ViewportManager {
        &self.core.viewport
    }

    #[must_use]
    pub fn viewport_state(&self) -> ViewportSnapshot {
        self.core.viewport.state()
    }

    #[must_use]
    pub fn transform(&self) -> Option<CoordinateTransform> {
        self.core.viewport.transform()
    }

    #[must_use]
    pub fn bars(&self) -> &Arc<[Bar]> {
        self.core.viewport.bars()
    }

    #[must_use]
    pub fn visible_range(&self) -> (f64, f64) {
        self.core.viewport.visible_range()
    }

    #[must_use]
    pub fn drawings(&self) -> &DrawingEngine {
        &self.core.drawings
    }

    /// Committed drawings in paint order.
    #[must_use]
    pub fn drawing_objects(&self) -> Vec<Arc<DrawingObject>> {
        self.core.drawings.snapshot()
    }

    #[must_use]
    pub fn active_tool(&self) -> ActiveTool {
        self.core.drawings.active_tool()
    }

    #[must_use]
    pub fn drawing_state(&self) -> DrawingState {
        self.core.drawings.state()
    }

    #[must_use]
    pub fn selected_drawing(&self) -> Option<&DrawingId> {
        self.core.drawings.selected()
    }

    #[must_use]
    pub fn interaction_mode(&self) -> InteractionMode {
        self.core.interaction.mode()
    }

    #[must_use]
    pub fn cursor(&self) -> Option<PixelPoint> {
        self.core.interaction.cursor()
    }

    #[must_use]
    pub fn frames_rendered(&self) -> u64 {
        self.core.frames_rendered
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }
}
