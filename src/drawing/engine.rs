use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::{CoordinateTransform, PixelPoint, WorldPoint};
use crate::drawing::geometry::{handle_at, hit_test};
use crate::drawing::history::{DrawingHistory, DrawingSet, shift_set};
use crate::drawing::persistence::{
    drawings_from_json_compat_str, drawings_to_json_contract_v1_pretty,
};
use crate::drawing::{ActiveTool, DrawingId, DrawingObject, DrawingStyle, DrawingTool};
use crate::error::{ChartError, ChartResult};

/// Pointer travel below which a press/release counts as a click.
const CLICK_SLOP_PX: f64 = 3.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawingConfig {
    pub hit_tolerance_px: f64,
    pub handle_radius_px: f64,
    /// Keep the drawing tool armed after a commit instead of returning to select.
    pub keep_tool_active: bool,
    /// Build two-point tools from two separate clicks when the first press
    /// does not drag.
    pub click_click_mode: bool,
    pub history_limit: usize,
    pub default_style: DrawingStyle,
    /// Text given to new text annotations.
    pub default_text: String,
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            hit_tolerance_px: 5.0,
            handle_radius_px: 6.0,
            keep_tool_active: false,
            click_click_mode: false,
            history_limit: super::history::DEFAULT_HISTORY_LIMIT,
            default_style: DrawingStyle::default(),
            default_text: "Text".to_owned(),
        }
    }
}

impl DrawingConfig {
    #[must_use]
    pub fn with_keep_tool_active(mut self, keep: bool) -> Self {
        self.keep_tool_active = keep;
        self
    }

    #[must_use]
    pub fn with_click_click_mode(mut self, enabled: bool) -> Self {
        self.click_click_mode = enabled;
        self
    }

    #[must_use]
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn validate(self) -> ChartResult<Self> {
        if !self.hit_tolerance_px.is_finite() || self.hit_tolerance_px < 0.0 {
            return Err(ChartError::InvalidConfig(
                "hit tolerance must be finite and >= 0".to_owned(),
            ));
        }
        if !self.handle_radius_px.is_finite() || self.handle_radius_px < 0.0 {
            return Err(ChartError::InvalidConfig(
                "handle radius must be finite and >= 0".to_owned(),
            ));
        }
        if self.history_limit == 0 {
            return Err(ChartError::InvalidConfig(
                "history limit must be > 0".to_owned(),
            ));
        }
        self.default_style
            .validate()
            .map_err(|e| ChartError::InvalidConfig(format!("default drawing style: {e}")))?;
        Ok(self)
    }
}

/// Coarse interaction state, for hosts deciding cursors and event routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawingState {
    Idle,
    Drawing,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Grab {
    Handle(usize),
    Body,
}

#[derive(Debug, Clone)]
enum Interaction {
    Idle,
    Drawing {
        draft: DrawingObject,
        origin: PixelPoint,
        moved: bool,
        /// First click landed; the next press/release places the second point.
        awaiting_second: bool,
    },
    Editing {
        id: DrawingId,
        original: Arc<DrawingObject>,
        grab: Grab,
        last_world: WorldPoint,
    },
}

/// Annotation store with pointer-driven create/edit state machine and
/// bounded undo/redo.
///
/// The engine never owns a coordinate transform: every pointer call receives
/// the one valid for the current viewport.
#[derive(Debug, Clone)]
pub struct DrawingEngine {
    config: DrawingConfig,
    objects: DrawingSet,
    history: DrawingHistory,
    active_tool: ActiveTool,
    interaction: Interaction,
    selected: Option<DrawingId>,
    next_id: u64,
    revision: u64,
}

impl DrawingEngine {
    pub fn new(config: DrawingConfig) -> ChartResult<Self> {
        let config = config.validate()?;
        Ok(Self {
            history: DrawingHistory::new(config.history_limit),
            config,
            objects: DrawingSet::new(),
            active_tool: ActiveTool::Select,
            interaction: Interaction::Idle,
            selected: None,
            next_id: 1,
            revision: 0,
        })
    }

    #[must_use]
    pub fn config(&self) -> &DrawingConfig {
        &self.config
    }

    #[must_use]
    pub fn active_tool(&self) -> ActiveTool {
        self.active_tool
    }

    #[must_use]
    pub fn state(&self) -> DrawingState {
        match self.interaction {
            Interaction::Idle => DrawingState::Idle,
            Interaction::Drawing { .. } => DrawingState::Drawing,
            Interaction::Editing { .. } => DrawingState::Editing,
        }
    }

    #[must_use]
    pub fn selected(&self) -> Option<&DrawingId> {
        self.selected.as_ref()
    }

    /// Bumped on every visible change; lets callers skip redundant redraws.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Committed objects in paint order.
    pub fn objects(&self) -> impl Iterator<Item = &Arc<DrawingObject>> {
        self.objects.values()
    }

    #[must_use]
    pub fn object(&self, id: &DrawingId) -> Option<&Arc<DrawingObject>> {
        self.objects.get(id)
    }

    /// Cheap copy of the committed store for a render frame.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<DrawingObject>> {
        self.objects.values().cloned().collect()
    }

    /// Object currently being drawn or dragged.
    #[must_use]
    pub fn in_progress(&self) -> Option<&DrawingObject> {
        match &self.interaction {
            Interaction::Idle => None,
            Interaction::Drawing { draft, .. } => Some(draft),
            Interaction::Editing { id, .. } => self.objects.get(id).map(AsRef::as_ref),
        }
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Arms a tool. Any unfinished draft is discarded.
    pub fn set_active_tool(&mut self, tool: ActiveTool) -> bool {
        if self.active_tool == tool {
            return false;
        }
        if matches!(self.interaction, Interaction::Drawing { .. }) {
            self.interaction = Interaction::Idle;
            self.bump();
        }
        debug!(from = ?self.active_tool, to = ?tool, "drawing tool changed");
        self.active_tool = tool;
        true
    }

    pub fn select(&mut self, id: Option<DrawingId>) -> bool {
        let id = id.filter(|id| self.objects.contains_key(id));
        if self.selected == id {
            return false;
        }
        self.selected = id;
        self.bump();
        true
    }

    /// Returns `true` when the event belongs to the drawing layer and must not
    /// reach the viewport.
    pub fn pointer_down(&mut self, point: PixelPoint, transform: Option<&CoordinateTransform>) -> bool {
        let Some(transform) = transform else {
            debug!(x = point.x, y = point.y, "pointer down ignored: no coordinate transform");
            return false;
        };
        let world = transform.pixel_to_world(point);

        match &mut self.interaction {
            Interaction::Drawing {
                draft,
                origin,
                moved,
                awaiting_second,
            } => {
                if *awaiting_second {
                    if let Some(last) = draft.points.last_mut() {
                        *last = world;
                    }
                    *origin = point;
                    *moved = true;
                    self.revision = self.revision.wrapping_add(1);
                }
                return true;
            }
            Interaction::Editing { .. } => return true,
            Interaction::Idle => {}
        }

        match self.active_tool {
            ActiveTool::Draw(tool) => {
                self.begin_draft(tool, world, point);
                true
            }
            ActiveTool::Select => self.begin_edit(point, world, transform),
        }
    }

    pub fn pointer_move(&mut self, point: PixelPoint, transform: Option<&CoordinateTransform>) -> bool {
        if matches!(self.interaction, Interaction::Idle) {
            return false;
        }
        let Some(transform) = transform else {
            debug!("pointer move ignored: no coordinate transform");
            return true;
        };
        let world = transform.pixel_to_world(point);

        match &mut self.interaction {
            Interaction::Idle => return false,
            Interaction::Drawing {
                draft,
                origin,
                moved,
                ..
            } => {
                if let Some(last) = draft.points.last_mut() {
                    *last = world;
                }
                if point.distance_to(*origin) > CLICK_SLOP_PX {
                    *moved = true;
                }
            }
            Interaction::Editing {
                id,
                grab,
                last_world,
                ..
            } => {
                let (dt, dp) = (world.t - last_world.t, world.p - last_world.p);
                *last_world = world;
                if let Some(entry) = self.objects.get_mut(id) {
                    let object = Arc::make_mut(entry);
                    match *grab {
                        Grab::Handle(index) => {
                            if let Some(target) = object.points.get_mut(index) {
                                *target = world;
                            }
                        }
                        Grab::Body => object.translate(dt, dp),
                    }
                }
            }
        }
        self.bump();
        true
    }

    pub fn pointer_up(&mut self, point: PixelPoint, transform: Option<&CoordinateTransform>) -> bool {
        match std::mem::replace(&mut self.interaction, Interaction::Idle) {
            Interaction::Idle => false,
            Interaction::Drawing {
                mut draft,
                origin,
                moved,
                awaiting_second,
            } => {
                let moved = moved || point.distance_to(origin) > CLICK_SLOP_PX;
                if self.config.click_click_mode && !moved && !awaiting_second {
                    self.interaction = Interaction::Drawing {
                        draft,
                        origin,
                        moved: false,
                        awaiting_second: true,
                    };
                    return true;
                }
                if let (Some(transform), Some(last)) = (transform, draft.points.last_mut()) {
                    *last = transform.pixel_to_world(point);
                }
                self.commit_draft(draft);
                true
            }
            Interaction::Editing { id, original, .. } => {
                let changed = self
                    .objects
                    .get(&id)
                    .is_some_and(|current| current.as_ref() != original.as_ref());
                if changed {
                    let mut before = self.objects.clone();
                    before.insert(id.clone(), original);
                    self.history.record(before);
                    debug!(id = %id, "drawing edited");
                    self.bump();
                }
                true
            }
        }
    }

    /// Escape: drops an unfinished draft or reverts an in-flight edit, then
    /// clears the selection.
    pub fn cancel(&mut self) -> bool {
        let mut changed = match std::mem::replace(&mut self.interaction, Interaction::Idle) {
            Interaction::Idle => false,
            Interaction::Drawing { .. } => true,
            Interaction::Editing { id, original, .. } => {
                self.objects.insert(id, original);
                true
            }
        };
        changed |= self.selected.take().is_some();
        if changed {
            trace!("drawing interaction cancelled");
            self.bump();
        }
        changed
    }

    pub fn delete_selected(&mut self) -> bool {
        if !matches!(self.interaction, Interaction::Idle) {
            return false;
        }
        let Some(id) = self.selected.take() else {
            return false;
        };
        let before = self.objects.clone();
        if self.objects.shift_remove(&id).is_none() {
            return false;
        }
        self.history.record(before);
        debug!(id = %id, "drawing deleted");
        self.bump();
        true
    }

    pub fn undo(&mut self) -> bool {
        self.cancel_interaction();
        let Some(previous) = self.history.undo(self.objects.clone()) else {
            trace!("undo ignored: history empty");
            return false;
        };
        self.restore(previous);
        true
    }

    pub fn redo(&mut self) -> bool {
        self.cancel_interaction();
        let Some(next) = self.history.redo(self.objects.clone()) else {
            trace!("redo ignored: nothing to redo");
            return false;
        };
        self.restore(next);
        true
    }

    /// Replaces the whole store. The previous store stays reachable via undo.
    pub fn replace_all(&mut self, objects: Vec<DrawingObject>) -> ChartResult<()> {
        let mut replacement = DrawingSet::with_capacity(objects.len());
        for object in objects {
            object.validate()?;
            let id = object.id.clone();
            if replacement.insert(id.clone(), Arc::new(object)).is_some() {
                return Err(ChartError::InvalidData(format!("duplicate drawing id `{id}`")));
            }
        }
        self.cancel_interaction();
        for id in replacement.keys() {
            if let Some(n) = id.as_str().strip_prefix('d').and_then(|n| n.parse::<u64>().ok()) {
                self.next_id = self.next_id.max(n.saturating_add(1));
            }
        }
        let before = std::mem::replace(&mut self.objects, replacement);
        self.history.record(before);
        if self
            .selected
            .as_ref()
            .is_some_and(|id| !self.objects.contains_key(id))
        {
            self.selected = None;
        }
        debug!(count = self.objects.len(), "drawings replaced");
        self.bump();
        Ok(())
    }

    pub fn export_json(&self) -> ChartResult<String> {
        drawings_to_json_contract_v1_pretty(
            self.objects.values().map(|object| object.as_ref().clone()).collect(),
        )
    }

    pub fn import_json(&mut self, input: &str) -> ChartResult<()> {
        let objects = drawings_from_json_compat_str(input)?;
        self.replace_all(objects)
    }

    pub fn set_text(&mut self, id: &DrawingId, text: impl Into<String>) -> bool {
        let text = text.into();
        self.edit_committed(id, |object| {
            if object.text.as_deref() == Some(text.as_str()) {
                return false;
            }
            object.text = Some(text);
            true
        })
    }

    pub fn update_style(&mut self, id: &DrawingId, style: DrawingStyle) -> ChartResult<bool> {
        let style = style.validate()?;
        Ok(self.edit_committed(id, |object| {
            if object.style == style {
                return false;
            }
            object.style = style;
            true
        }))
    }

    /// Rebases every stored point after bars were inserted before index 0.
    pub fn shift_time(&mut self, delta: f64) {
        if delta == 0.0 || !delta.is_finite() {
            return;
        }
        shift_set(&mut self.objects, delta);
        self.history.shift_time(delta);
        match &mut self.interaction {
            Interaction::Idle => {}
            Interaction::Drawing { draft, .. } => draft.translate(delta, 0.0),
            Interaction::Editing {
                original,
                last_world,
                ..
            } => {
                *original = Arc::new(super::history::shifted_object(original, delta));
                last_world.t += delta;
            }
        }
        trace!(delta, "drawings rebased");
        self.bump();
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn allocate_id(&mut self) -> DrawingId {
        loop {
            let id = DrawingId::new(format!("d{}", self.next_id));
            self.next_id += 1;
            if !self.objects.contains_key(&id) {
                return id;
            }
        }
    }

    fn begin_draft(&mut self, tool: DrawingTool, world: WorldPoint, origin: PixelPoint) {
        let id = self.allocate_id();
        let points = std::iter::repeat_n(world, tool.point_count());
        let mut draft = DrawingObject::new(
            id,
            tool,
            points,
            self.config.default_style,
            Utc::now().timestamp_millis(),
        );
        if tool == DrawingTool::Text {
            draft.text = Some(self.config.default_text.clone());
        }
        trace!(tool = ?tool, t = world.t, p = world.p, "drawing started");
        if tool.is_single_point() {
            self.commit_draft(draft);
        } else {
            self.interaction = Interaction::Drawing {
                draft,
                origin,
                moved: false,
                awaiting_second: false,
            };
            self.bump();
        }
    }

    fn begin_edit(&mut self, point: PixelPoint, world: WorldPoint, transform: &CoordinateTransform) -> bool {
        let hit = self.objects.values().rev().find_map(|object| {
            if let Some(index) = handle_at(object, transform, point, self.config.handle_radius_px)
            {
                return Some((Arc::clone(object), Grab::Handle(index)));
            }
            hit_test(object, transform, point, self.config.hit_tolerance_px)
                .then(|| (Arc::clone(object), Grab::Body))
        });
        let Some((original, grab)) = hit else {
            if self.selected.take().is_some() {
                self.bump();
            }
            return false;
        };
        let id = original.id.clone();
        trace!(id = %id, grab = ?grab, "drawing grabbed");
        self.selected = Some(id.clone());
        self.interaction = Interaction::Editing {
            id,
            original,
            grab,
            last_world: world,
        };
        self.bump();
        true
    }

    fn commit_draft(&mut self, draft: DrawingObject) {
        let id = draft.id.clone();
        let tool = draft.tool;
        let before = self.objects.clone();
        self.objects.insert(id.clone(), Arc::new(draft));
        self.history.record(before);
        self.selected = Some(id.clone());
        if !self.config.keep_tool_active {
            self.active_tool = ActiveTool::Select;
        }
        debug!(id = %id, tool = ?tool, "drawing committed");
        self.bump();
    }

    fn cancel_interaction(&mut self) {
        match std::mem::replace(&mut self.interaction, Interaction::Idle) {
            Interaction::Idle | Interaction::Drawing { .. } => {}
            Interaction::Editing { id, original, .. } => {
                self.objects.insert(id, original);
            }
        }
    }

    fn restore(&mut self, objects: DrawingSet) {
        self.objects = objects;
        if self
            .selected
            .as_ref()
            .is_some_and(|id| !self.objects.contains_key(id))
        {
            self.selected = None;
        }
        self.bump();
    }

    fn edit_committed(&mut self, id: &DrawingId, edit: impl FnOnce(&mut DrawingObject) -> bool) -> bool {
        let Some(current) = self.objects.get(id) else {
            warn!(id = %id, "edit ignored: unknown drawing");
            return false;
        };
        let mut updated = current.as_ref().clone();
        if !edit(&mut updated) {
            return false;
        }
        let before = self.objects.clone();
        self.objects.insert(id.clone(), Arc::new(updated));
        self.history.record(before);
        self.bump();
        true
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{DrawingConfig, DrawingEngine, DrawingState};
    use crate::core::{CanvasSize, CoordinateTransform, PixelPoint};
    use crate::drawing::{ActiveTool, DrawingId, DrawingTool};

    // 1 bar = 10 px, 1 price unit = 5 px, price 200 at the top.
    fn transform() -> CoordinateTransform {
        CoordinateTransform::new((0.0, 100.0), (100.0, 200.0), CanvasSize::new(1000, 500))
            .expect("transform")
    }

    fn engine() -> DrawingEngine {
        DrawingEngine::new(DrawingConfig::default()).expect("engine")
    }

    fn draw(engine: &mut DrawingEngine, tool: DrawingTool, from: (f64, f64), to: (f64, f64)) {
        let t = transform();
        engine.set_active_tool(ActiveTool::Draw(tool));
        assert!(engine.pointer_down(PixelPoint::new(from.0, from.1), Some(&t)));
        engine.pointer_move(PixelPoint::new(to.0, to.1), Some(&t));
        engine.pointer_up(PixelPoint::new(to.0, to.1), Some(&t));
    }

    #[test]
    fn two_point_tool_follows_pointer_and_commits() {
        let mut engine = engine();
        let t = transform();
        engine.set_active_tool(ActiveTool::Draw(DrawingTool::TrendLine));
        assert!(engine.pointer_down(PixelPoint::new(100.0, 250.0), Some(&t)));
        assert_eq!(engine.state(), DrawingState::Drawing);
        assert!(engine.pointer_move(PixelPoint::new(200.0, 200.0), Some(&t)));
        let draft = engine.in_progress().expect("draft");
        assert_relative_eq!(draft.points[1].t, 20.0, epsilon = 1e-9);
        assert!(engine.pointer_up(PixelPoint::new(200.0, 200.0), Some(&t)));

        assert_eq!(engine.state(), DrawingState::Idle);
        assert_eq!(engine.len(), 1);
        assert_eq!(engine.active_tool(), ActiveTool::Select);
        assert!(engine.can_undo());
    }

    #[test]
    fn single_point_tools_commit_on_press() {
        let mut engine = engine();
        let t = transform();
        engine.set_active_tool(ActiveTool::Draw(DrawingTool::Text));
        assert!(engine.pointer_down(PixelPoint::new(100.0, 250.0), Some(&t)));
        assert_eq!(engine.state(), DrawingState::Idle);
        let object = engine.objects().next().expect("object");
        assert_eq!(object.text.as_deref(), Some("Text"));
        assert!(!engine.pointer_up(PixelPoint::new(100.0, 250.0), Some(&t)));
    }

    #[test]
    fn missing_transform_is_a_no_op() {
        let mut engine = engine();
        engine.set_active_tool(ActiveTool::Draw(DrawingTool::TrendLine));
        assert!(!engine.pointer_down(PixelPoint::new(10.0, 10.0), None));
        assert_eq!(engine.state(), DrawingState::Idle);
        assert!(engine.is_empty());
    }

    #[test]
    fn keep_tool_active_leaves_tool_armed() {
        let mut engine =
            DrawingEngine::new(DrawingConfig::default().with_keep_tool_active(true)).expect("engine");
        draw(&mut engine, DrawingTool::Rectangle, (100.0, 100.0), (200.0, 200.0));
        assert_eq!(
            engine.active_tool(),
            ActiveTool::Draw(DrawingTool::Rectangle)
        );
    }

    #[test]
    fn click_click_mode_takes_second_point_from_second_click() {
        let mut engine =
            DrawingEngine::new(DrawingConfig::default().with_click_click_mode(true)).expect("engine");
        let t = transform();
        engine.set_active_tool(ActiveTool::Draw(DrawingTool::Ray));
        engine.pointer_down(PixelPoint::new(100.0, 250.0), Some(&t));
        assert!(engine.pointer_up(PixelPoint::new(100.0, 250.0), Some(&t)));
        assert_eq!(engine.state(), DrawingState::Drawing);

        engine.pointer_move(PixelPoint::new(300.0, 250.0), Some(&t));
        engine.pointer_down(PixelPoint::new(300.0, 250.0), Some(&t));
        engine.pointer_up(PixelPoint::new(300.0, 250.0), Some(&t));
        assert_eq!(engine.state(), DrawingState::Idle);
        let object = engine.objects().next().expect("object");
        assert_relative_eq!(object.points[1].t, 30.0, epsilon = 1e-9);
    }

    #[test]
    fn dragging_body_translates_and_records_history() {
        let mut engine = engine();
        draw(&mut engine, DrawingTool::TrendLine, (100.0, 250.0), (300.0, 250.0));
        let t = transform();
        let depth_before = engine.history.undo_depth();

        assert!(engine.pointer_down(PixelPoint::new(200.0, 252.0), Some(&t)));
        assert_eq!(engine.state(), DrawingState::Editing);
        engine.pointer_move(PixelPoint::new(250.0, 252.0), Some(&t));
        engine.pointer_up(PixelPoint::new(250.0, 252.0), Some(&t));

        let object = engine.objects().next().expect("object");
        assert_relative_eq!(object.points[0].t, 15.0, epsilon = 1e-9);
        assert_relative_eq!(object.points[1].t, 35.0, epsilon = 1e-9);
        assert_eq!(engine.history.undo_depth(), depth_before + 1);
    }

    #[test]
    fn handle_drag_moves_only_that_point() {
        let mut engine = engine();
        draw(&mut engine, DrawingTool::TrendLine, (100.0, 250.0), (300.0, 250.0));
        let t = transform();
        engine.pointer_down(PixelPoint::new(302.0, 250.0), Some(&t));
        engine.pointer_move(PixelPoint::new(400.0, 150.0), Some(&t));
        engine.pointer_up(PixelPoint::new(400.0, 150.0), Some(&t));

        let object = engine.objects().next().expect("object");
        assert_relative_eq!(object.points[0].t, 10.0, epsilon = 1e-9);
        assert_relative_eq!(object.points[1].t, 40.0, epsilon = 1e-9);
        assert_relative_eq!(object.points[1].p, 170.0, epsilon = 1e-9);
    }

    #[test]
    fn click_without_drag_selects_but_keeps_history() {
        let mut engine = engine();
        draw(&mut engine, DrawingTool::HorizontalLine, (100.0, 250.0), (100.0, 250.0));
        let t = transform();
        engine.select(None);
        let depth = engine.history.undo_depth();
        engine.pointer_down(PixelPoint::new(600.0, 251.0), Some(&t));
        engine.pointer_up(PixelPoint::new(600.0, 251.0), Some(&t));
        assert_eq!(engine.history.undo_depth(), depth);
        assert!(engine.selected().is_some());
    }

    #[test]
    fn press_on_empty_canvas_is_not_consumed() {
        let mut engine = engine();
        let t = transform();
        assert!(!engine.pointer_down(PixelPoint::new(500.0, 250.0), Some(&t)));
    }

    #[test]
    fn escape_restores_object_under_edit() {
        let mut engine = engine();
        draw(&mut engine, DrawingTool::TrendLine, (100.0, 250.0), (300.0, 250.0));
        let original = engine.objects().next().expect("object").as_ref().clone();
        let t = transform();
        engine.pointer_down(PixelPoint::new(200.0, 250.0), Some(&t));
        engine.pointer_move(PixelPoint::new(260.0, 300.0), Some(&t));
        assert!(engine.cancel());
        assert_eq!(engine.objects().next().expect("object").as_ref(), &original);
        assert!(engine.selected().is_none());
    }

    #[test]
    fn delete_selected_is_undoable() {
        let mut engine = engine();
        draw(&mut engine, DrawingTool::Arrow, (100.0, 250.0), (300.0, 250.0));
        assert!(engine.delete_selected());
        assert!(engine.is_empty());
        assert!(engine.undo());
        assert_eq!(engine.len(), 1);
        assert!(engine.redo());
        assert!(engine.is_empty());
        assert!(!engine.redo());
    }

    #[test]
    fn replace_all_rejects_duplicate_ids() {
        let mut engine = engine();
        draw(&mut engine, DrawingTool::TrendLine, (100.0, 250.0), (300.0, 250.0));
        let object = engine.objects().next().expect("object").as_ref().clone();
        assert!(engine.replace_all(vec![object.clone(), object]).is_err());
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn import_advances_id_counter() {
        let mut engine = engine();
        draw(&mut engine, DrawingTool::TrendLine, (100.0, 250.0), (300.0, 250.0));
        let mut object = engine.objects().next().expect("object").as_ref().clone();
        object.id = DrawingId::new("d41");
        engine.replace_all(vec![object]).expect("replace");

        draw(&mut engine, DrawingTool::TrendLine, (100.0, 100.0), (300.0, 100.0));
        assert!(engine.object(&DrawingId::new("d42")).is_some());
    }

    #[test]
    fn export_import_preserves_objects() {
        let mut engine = engine();
        draw(&mut engine, DrawingTool::Fibonacci, (100.0, 400.0), (300.0, 100.0));
        engine.set_active_tool(ActiveTool::Draw(DrawingTool::VerticalLine));
        engine.pointer_down(PixelPoint::new(500.0, 100.0), Some(&transform()));
        let json = engine.export_json().expect("export");

        let mut restored = DrawingEngine::new(DrawingConfig::default()).expect("engine");
        restored.import_json(&json).expect("import");
        let ids = |engine: &DrawingEngine| {
            engine
                .objects()
                .map(|object| (object.id.clone(), object.tool))
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(&restored), ids(&engine));
        let fib = restored.object(&DrawingId::new("d1")).expect("fibonacci");
        assert_relative_eq!(fib.points[1].p, 180.0, epsilon = 1e-9);
    }

    #[test]
    fn shift_time_rebases_objects_and_history() {
        let mut engine = engine();
        draw(&mut engine, DrawingTool::TrendLine, (100.0, 250.0), (300.0, 250.0));
        engine.shift_time(500.0);
        let object = engine.objects().next().expect("object");
        assert_relative_eq!(object.points[0].t, 510.0, epsilon = 1e-9);
        assert!(engine.undo());
        assert!(engine.is_empty());
        assert!(engine.redo());
        let object = engine.objects().next().expect("object");
        assert_relative_eq!(object.points[1].t, 530.0, epsilon = 1e-9);
    }

    #[test]
    fn set_text_records_history_only_on_change() {
        let mut engine = engine();
        engine.set_active_tool(ActiveTool::Draw(DrawingTool::Text));
        engine.pointer_down(PixelPoint::new(100.0, 100.0), Some(&transform()));
        let id = engine.selected().cloned().expect("selected");
        assert!(engine.set_text(&id, "Breakout"));
        assert!(!engine.set_text(&id, "Breakout"));
        assert_eq!(
            engine.object(&id).and_then(|o| o.text.clone()).as_deref(),
            Some("Breakout")
        );
    }
}
