//! Selection and editing state machine.
//!
//! Drags follow start → move* → end. Moves update live geometry (or the
//! ghost for wall endpoints) without touching history. On release the live
//! state is rolled back to the pre-drag copies, one snapshot is pushed and the
//! final geometry is committed, so undo returns to the pre-drag plan.

use crate::camera::Camera;
use crate::config::EditorConfig;
use crate::document::FloorPlan;
use crate::error::EditError;
use crate::history::History;
use crate::input::Modifiers;
use crate::objects::{DrawableObject, ObjectId, rect_contains_inclusive};
use crate::selection::{
    EndpointDragState, GhostWall, GroupMoveState, Handle, MoveState, Selection, SelectionOverlay,
    SelectionRect,
};
use crate::snap::{SnapRequest, SnapTargets, Snapper};
use kurbo::{Point, Vec2};

/// Movement below this (world units) is treated as a click, not a drag.
const CLICK_EPSILON: f64 = 1e-9;

/// Borrowed view of the editor components an operation needs.
pub struct EditContext<'a> {
    pub plan: &'a mut FloorPlan,
    pub history: &'a mut History,
    pub snapper: &'a Snapper,
    pub camera: &'a Camera,
    pub config: &'a EditorConfig,
}

impl EditContext<'_> {
    /// Screen pixels to world units at the current (clamped) zoom.
    pub fn px(&self, px: f64) -> f64 {
        self.config.px_to_world(px, self.camera.zoom)
    }
}

/// What an operation changed, so the caller knows what to redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Outcome {
    #[default]
    Unchanged,
    /// Only the selection UI changed.
    Overlay,
    /// Plan content changed.
    Content,
}

/// In-flight drag.
#[derive(Debug, Clone)]
pub enum DragState {
    MoveObject(MoveState),
    GroupMove(GroupMoveState),
    WallEndpoint(EndpointDragState),
    BoxSelect(SelectionRect),
}

/// Owns the selection, the drag in progress, the overlay and the clipboard.
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    selection: Selection,
    drag: Option<DragState>,
    overlay: SelectionOverlay,
    clipboard: Vec<DrawableObject>,
    notice: Option<EditError>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn overlay(&self) -> &SelectionOverlay {
        &self.overlay
    }

    pub fn drag(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn clipboard_len(&self) -> usize {
        self.clipboard.len()
    }

    /// Rejection noted by an operation that otherwise went ahead.
    pub fn take_notice(&mut self) -> Option<EditError> {
        self.notice.take()
    }

    /// Tear down all selection UI and rebuild it for the current selection.
    fn rebuild_overlay(&mut self, plan: &FloorPlan) {
        self.overlay = SelectionOverlay::build(plan, &self.selection);
    }

    fn set_selection(&mut self, plan: &FloorPlan, selection: Selection) {
        self.selection = selection;
        self.rebuild_overlay(plan);
    }

    // --- Selection ---

    /// Select a single object, replacing the current selection.
    pub fn select(&mut self, plan: &FloorPlan, id: ObjectId) -> Result<Outcome, EditError> {
        if !plan.contains(id) {
            return Err(EditError::ObjectNotFound);
        }
        if !plan.is_object_editable(id) {
            return Err(EditError::ObjectNotEditable);
        }
        self.set_selection(plan, Selection::Single(id));
        Ok(Outcome::Overlay)
    }

    /// Select several objects; non-editable or missing ids are dropped.
    pub fn select_ids(&mut self, plan: &FloorPlan, ids: &[ObjectId]) -> Outcome {
        let selection = Selection::from_ids(
            ids.iter()
                .copied()
                .filter(|&id| plan.is_object_editable(id)),
        );
        self.set_selection(plan, selection);
        Outcome::Overlay
    }

    pub fn select_all(&mut self, plan: &FloorPlan) -> Outcome {
        let ids: Vec<ObjectId> = plan.objects().iter().map(DrawableObject::id).collect();
        self.select_ids(plan, &ids)
    }

    pub fn deselect(&mut self, plan: &FloorPlan) -> Outcome {
        if self.selection.is_empty() && self.overlay.is_empty() {
            return Outcome::Unchanged;
        }
        self.set_selection(plan, Selection::None);
        Outcome::Overlay
    }

    /// Add or remove one object from the selection.
    pub fn toggle(&mut self, plan: &FloorPlan, id: ObjectId) -> Result<Outcome, EditError> {
        if !self.selection.contains(id) && !plan.is_object_editable(id) {
            return Err(if plan.contains(id) {
                EditError::ObjectNotEditable
            } else {
                EditError::ObjectNotFound
            });
        }
        let selection = self.selection.toggled(id);
        self.set_selection(plan, selection);
        Ok(Outcome::Overlay)
    }

    /// Drop selected ids that vanished or became non-editable.
    /// A drag whose objects vanished is abandoned.
    pub fn prune(&mut self, plan: &FloorPlan) -> Outcome {
        let before = self.selection.clone();
        self.selection = before.retained(|id| plan.is_object_editable(id));

        let drag_lost = match &self.drag {
            Some(DragState::MoveObject(state)) => !plan.contains(state.object_id),
            Some(DragState::GroupMove(state)) => {
                state.object_ids().iter().any(|&id| !plan.contains(id))
            }
            Some(DragState::WallEndpoint(state)) => !plan.contains(state.wall_id),
            Some(DragState::BoxSelect(_)) | None => false,
        };
        if drag_lost {
            self.drag = None;
        }
        if self.drag.is_none() {
            self.rebuild_overlay(plan);
        }
        if before == self.selection && !drag_lost {
            Outcome::Unchanged
        } else {
            Outcome::Overlay
        }
    }

    // --- Pointer handling (select tool, world coordinates) ---

    /// Press: start a handle drag, a move, a group move or a box selection.
    ///
    /// Locked objects do not take presses. A press that only lands on locked
    /// objects starts a box selection, keeps the selection and leaves a notice.
    pub fn pointer_down(
        &mut self,
        ctx: &mut EditContext<'_>,
        world: Point,
        modifiers: Modifiers,
    ) -> Result<Outcome, EditError> {
        self.notice = None;
        if self.drag.is_some() {
            // Missed release; roll back the stale drag first.
            self.cancel(ctx.plan);
        }

        let handle_tolerance = ctx.px(ctx.config.handle_radius_px);
        if let Some(handle) = self.overlay.hit_handle(world, handle_tolerance) {
            return Ok(self.begin_endpoint_drag(ctx.plan, handle));
        }

        let tolerance = ctx.px(ctx.config.hit_tolerance_px);
        let hits = ctx.plan.objects_at_point(world, tolerance);
        let editable_hit = hits
            .iter()
            .copied()
            .find(|&id| ctx.plan.is_object_editable(id));
        if let Some(hit) = editable_hit {
            if modifiers.toggle_selection() {
                return self.toggle(ctx.plan, hit);
            }
            if self.selection.is_multi() && self.selection.contains(hit) {
                return Ok(self.begin_group_move(ctx.plan, world));
            }
            self.select(ctx.plan, hit)?;
            return Ok(self.begin_move(ctx.plan, hit, world));
        }

        let in_group_box = self
            .overlay
            .group_box
            .is_some_and(|rect| rect_contains_inclusive(rect, world));
        if self.selection.is_multi() && in_group_box {
            return Ok(self.begin_group_move(ctx.plan, world));
        }

        let mut rect = SelectionRect::new(world);
        if hits.is_empty() {
            if !modifiers.toggle_selection() {
                self.set_selection(ctx.plan, Selection::None);
            }
        } else {
            rect.keeps_selection = true;
            self.notice = Some(EditError::ObjectNotEditable);
        }
        self.overlay.rubber_band = Some(rect.to_rect());
        self.drag = Some(DragState::BoxSelect(rect));
        Ok(Outcome::Overlay)
    }

    fn begin_move(&mut self, plan: &FloorPlan, id: ObjectId, world: Point) -> Outcome {
        if let Some(original) = plan.object(id).cloned() {
            self.drag = Some(DragState::MoveObject(MoveState {
                object_id: id,
                start_point: world,
                original,
            }));
        }
        Outcome::Overlay
    }

    fn begin_group_move(&mut self, plan: &FloorPlan, world: Point) -> Outcome {
        let originals: Vec<DrawableObject> = plan
            .objects()
            .iter()
            .filter(|o| self.selection.contains(o.id()) && plan.is_object_editable(o.id()))
            .cloned()
            .collect();
        if !originals.is_empty() {
            self.drag = Some(DragState::GroupMove(GroupMoveState {
                start_point: world,
                originals,
            }));
        }
        Outcome::Overlay
    }

    fn begin_endpoint_drag(&mut self, plan: &FloorPlan, handle: Handle) -> Outcome {
        if !plan.is_object_editable(handle.object_id) {
            return Outcome::Unchanged;
        }
        let Some(wall) = plan.object(handle.object_id).and_then(DrawableObject::as_wall) else {
            return Outcome::Unchanged;
        };
        let state = EndpointDragState::new(wall.clone(), handle.kind);
        self.overlay.ghost = Some(GhostWall::new(state.ghost.clone()));
        self.drag = Some(DragState::WallEndpoint(state));
        Outcome::Overlay
    }

    /// Pointer motion: update live geometry, ghost or rubber band.
    pub fn pointer_move(
        &mut self,
        ctx: &mut EditContext<'_>,
        world: Point,
        modifiers: Modifiers,
    ) -> Outcome {
        let request = SnapRequest::new(ctx.camera.zoom).with_coarse(modifiers.coarse_grid());
        match &mut self.drag {
            None => Outcome::Unchanged,
            Some(DragState::BoxSelect(rect)) => {
                rect.current = world;
                self.overlay.rubber_band = Some(rect.to_rect());
                Outcome::Overlay
            }
            Some(DragState::MoveObject(state)) => {
                if !ctx.plan.contains(state.object_id) {
                    return Outcome::Unchanged;
                }
                let targets = SnapTargets::from_plan(ctx.plan, &[state.object_id]);
                let reference = state.original.reference_point();
                let raw = reference + (world - state.start_point);
                let snapped = ctx.snapper.snap(raw, &request, &targets);
                let delta = snapped.point - reference;

                let mut moved = state.original.clone();
                moved.translate(delta);
                if let Some(live) = ctx.plan.object_mut(state.object_id) {
                    *live = moved;
                }
                let guides = snapped.guides;
                self.rebuild_overlay(ctx.plan);
                self.overlay.guides = guides;
                Outcome::Content
            }
            Some(DragState::GroupMove(state)) => {
                let ids = state.object_ids();
                if ids.iter().any(|&id| !ctx.plan.contains(id)) {
                    return Outcome::Unchanged;
                }
                let Some(first) = state.originals.first() else {
                    return Outcome::Unchanged;
                };
                let targets = SnapTargets::from_plan(ctx.plan, &ids);
                let reference = first.reference_point();
                let raw = reference + (world - state.start_point);
                let snapped = ctx.snapper.snap(raw, &request, &targets);
                let delta = snapped.point - reference;

                for original in &state.originals {
                    let mut moved = original.clone();
                    moved.translate(delta);
                    if let Some(live) = ctx.plan.object_mut(original.id()) {
                        *live = moved;
                    }
                }
                let guides = snapped.guides;
                self.rebuild_overlay(ctx.plan);
                self.overlay.guides = guides;
                Outcome::Content
            }
            Some(DragState::WallEndpoint(state)) => {
                if !ctx.plan.contains(state.wall_id) {
                    return Outcome::Unchanged;
                }
                let request = if modifiers.axis_lock() {
                    request.with_axis_lock(Some(state.anchor()))
                } else {
                    request
                };
                let targets = SnapTargets::from_plan(ctx.plan, &[state.wall_id]);
                let snapped = ctx.snapper.snap(world, &request, &targets);
                state.move_endpoint(snapped.point);
                self.overlay.ghost = Some(GhostWall::new(state.ghost.clone()));
                self.overlay.guides = snapped.guides;
                Outcome::Overlay
            }
        }
    }

    /// Release: commit the drag with exactly one snapshot, or resolve the box.
    pub fn pointer_up(
        &mut self,
        ctx: &mut EditContext<'_>,
        world: Point,
        modifiers: Modifiers,
    ) -> Outcome {
        self.pointer_move(ctx, world, modifiers);
        let Some(drag) = self.drag.take() else {
            return Outcome::Unchanged;
        };

        let outcome = match drag {
            DragState::BoxSelect(rect) => {
                let area = rect.to_rect();
                let is_click = area.width() <= CLICK_EPSILON && area.height() <= CLICK_EPSILON;
                let selection = if is_click {
                    // A click on empty canvas only deselects.
                    if modifiers.toggle_selection() || rect.keeps_selection {
                        self.selection.clone()
                    } else {
                        Selection::None
                    }
                } else {
                    let hits = ctx.plan.objects_in_box(area);
                    if modifiers.toggle_selection() {
                        Selection::from_ids(self.selection.ids().into_iter().chain(hits))
                    } else {
                        Selection::from_ids(hits)
                    }
                };
                self.selection = selection;
                Outcome::Overlay
            }
            DragState::MoveObject(state) => {
                commit_moves(ctx, std::slice::from_ref(&state.original))
            }
            DragState::GroupMove(state) => commit_moves(ctx, &state.originals),
            DragState::WallEndpoint(state) => commit_endpoint(ctx, &state),
        };
        self.rebuild_overlay(ctx.plan);
        outcome
    }

    /// Abort the drag in progress, restoring the pre-drag geometry.
    pub fn cancel(&mut self, plan: &mut FloorPlan) -> Outcome {
        let Some(drag) = self.drag.take() else {
            return Outcome::Unchanged;
        };
        let outcome = match drag {
            DragState::MoveObject(state) => {
                restore(plan, std::slice::from_ref(&state.original));
                Outcome::Content
            }
            DragState::GroupMove(state) => {
                restore(plan, &state.originals);
                Outcome::Content
            }
            DragState::WallEndpoint(_) | DragState::BoxSelect(_) => Outcome::Overlay,
        };
        self.rebuild_overlay(plan);
        log::debug!("Drag cancelled");
        outcome
    }

    // --- Editing ---

    /// Remove every editable selected object.
    pub fn delete_selection(&mut self, ctx: &mut EditContext<'_>) -> Result<Outcome, EditError> {
        self.cancel(ctx.plan);
        let ids: Vec<ObjectId> = self
            .selection
            .ids()
            .into_iter()
            .filter(|&id| ctx.plan.is_object_editable(id))
            .collect();
        if ids.is_empty() {
            return Err(EditError::NothingSelected);
        }
        ctx.history.snapshot(ctx.plan);
        ctx.plan.retain_objects(|o| !ids.contains(&o.id()));
        log::info!("Deleted {} objects", ids.len());
        self.set_selection(ctx.plan, Selection::None);
        Ok(Outcome::Content)
    }

    /// Deep-copy the selection into the clipboard. Returns the number copied.
    pub fn copy(&mut self, plan: &FloorPlan) -> Result<usize, EditError> {
        let copied: Vec<DrawableObject> = self
            .selection
            .ids()
            .iter()
            .filter_map(|&id| plan.object(id).cloned())
            .collect();
        if copied.is_empty() {
            return Err(EditError::NothingSelected);
        }
        self.clipboard = copied;
        log::debug!("Copied {} objects", self.clipboard.len());
        Ok(self.clipboard.len())
    }

    /// Paste clipboard copies onto the active layer, offset from the originals,
    /// and select them.
    pub fn paste(&mut self, ctx: &mut EditContext<'_>) -> Result<Vec<ObjectId>, EditError> {
        self.cancel(ctx.plan);
        if self.clipboard.is_empty() {
            return Err(EditError::EmptyClipboard);
        }
        let layer = ctx.plan.active_layer();
        if !layer.is_editable() {
            return Err(EditError::ActiveLayerNotEditable);
        }
        let layer_id = layer.id;
        let offset = ctx.px(ctx.config.paste_offset_px);

        ctx.history.snapshot(ctx.plan);
        let mut pasted = Vec::with_capacity(self.clipboard.len());
        for source in &self.clipboard {
            let mut copy = source.with_fresh_id();
            copy.set_layer_id(layer_id);
            copy.translate(Vec2::new(offset, offset));
            pasted.push(ctx.plan.add_object(copy));
        }
        log::info!("Pasted {} objects", pasted.len());
        self.set_selection(ctx.plan, Selection::from_ids(pasted.iter().copied()));
        Ok(pasted)
    }

    /// Set a wall's length, keeping its start point and direction.
    pub fn set_wall_length(
        &mut self,
        ctx: &mut EditContext<'_>,
        id: ObjectId,
        length: f64,
    ) -> Result<Outcome, EditError> {
        let rolled_back = self.cancel(ctx.plan);
        if !(length.is_finite() && length > 0.0) {
            return Err(EditError::InvalidDimension(format!("wall length {length}")));
        }
        let wall = editable(ctx.plan, id)?
            .as_wall()
            .ok_or_else(|| EditError::InvalidDimension("not a wall".to_string()))?;
        if (wall.length() - length).abs() < f64::EPSILON {
            return Ok(rolled_back);
        }

        ctx.history.snapshot(ctx.plan);
        if let Some(wall) = ctx.plan.object_mut(id).and_then(DrawableObject::as_wall_mut) {
            wall.set_length(length);
        }
        self.rebuild_overlay(ctx.plan);
        Ok(Outcome::Content)
    }

    /// Set a rectangle's width and height, keeping its top-left corner.
    pub fn set_rectangle_size(
        &mut self,
        ctx: &mut EditContext<'_>,
        id: ObjectId,
        width: f64,
        height: f64,
    ) -> Result<Outcome, EditError> {
        self.cancel(ctx.plan);
        for (name, value) in [("width", width), ("height", height)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(EditError::InvalidDimension(format!("rectangle {name} {value}")));
            }
        }
        match editable(ctx.plan, id)? {
            DrawableObject::Rectangle(_) => {}
            _ => return Err(EditError::InvalidDimension("not a rectangle".to_string())),
        }

        ctx.history.snapshot(ctx.plan);
        if let Some(DrawableObject::Rectangle(rect)) = ctx.plan.object_mut(id) {
            rect.set_size(width, height);
        }
        self.rebuild_overlay(ctx.plan);
        Ok(Outcome::Content)
    }

    /// Replace a label's text.
    pub fn set_label_text(
        &mut self,
        ctx: &mut EditContext<'_>,
        id: ObjectId,
        text: &str,
    ) -> Result<Outcome, EditError> {
        let rolled_back = self.cancel(ctx.plan);
        match editable(ctx.plan, id)? {
            DrawableObject::Label(label) if label.content == text => return Ok(rolled_back),
            DrawableObject::Label(_) => {}
            _ => return Err(EditError::InvalidDimension("not a label".to_string())),
        }

        ctx.history.snapshot(ctx.plan);
        if let Some(DrawableObject::Label(label)) = ctx.plan.object_mut(id) {
            label.content = text.to_string();
        }
        self.rebuild_overlay(ctx.plan);
        Ok(Outcome::Content)
    }
}

/// Resolve an object that may be edited.
fn editable(plan: &FloorPlan, id: ObjectId) -> Result<&DrawableObject, EditError> {
    let obj = plan.object(id).ok_or(EditError::ObjectNotFound)?;
    if !plan.is_layer_editable(obj.layer_id()) {
        return Err(EditError::ObjectNotEditable);
    }
    Ok(obj)
}

/// Put the pre-drag copies back in place (missing objects are skipped).
fn restore(plan: &mut FloorPlan, originals: &[DrawableObject]) {
    for original in originals {
        if let Some(live) = plan.object_mut(original.id()) {
            *live = original.clone();
        }
    }
}

/// Roll back live moves, snapshot once, then apply the final geometry.
fn commit_moves(ctx: &mut EditContext<'_>, originals: &[DrawableObject]) -> Outcome {
    let finals: Vec<DrawableObject> = originals
        .iter()
        .filter_map(|o| ctx.plan.object(o.id()).cloned())
        .collect();
    if finals.len() != originals.len() {
        // Something vanished mid-drag.
        restore(ctx.plan, originals);
        return Outcome::Overlay;
    }
    if finals.iter().zip(originals).all(|(f, o)| f == o) {
        return Outcome::Overlay;
    }

    restore(ctx.plan, originals);
    ctx.history.snapshot(ctx.plan);
    for moved in finals {
        if let Some(live) = ctx.plan.object_mut(moved.id()) {
            *live = moved;
        }
    }
    log::debug!("Moved {} objects", originals.len());
    Outcome::Content
}

fn commit_endpoint(ctx: &mut EditContext<'_>, state: &EndpointDragState) -> Outcome {
    let Some(live) = ctx.plan.object(state.wall_id).and_then(DrawableObject::as_wall) else {
        return Outcome::Overlay;
    };
    if state.ghost == *live || state.ghost.is_degenerate() {
        return Outcome::Overlay;
    }

    ctx.history.snapshot(ctx.plan);
    if let Some(wall) = ctx.plan.object_mut(state.wall_id).and_then(DrawableObject::as_wall_mut) {
        wall.set_start(state.ghost.start());
        wall.set_end(state.ghost.end());
    }
    log::debug!("Moved endpoint of wall {}", state.wall_id);
    Outcome::Content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{Label, Rectangle, RgbaColor, Wall};
    use crate::selection::HandleKind;

    struct Fixture {
        plan: FloorPlan,
        history: History,
        snapper: Snapper,
        camera: Camera,
        config: EditorConfig,
        controller: SelectionController,
    }

    impl Fixture {
        fn new() -> Self {
            let config = EditorConfig::default();
            Self {
                plan: FloorPlan::new(),
                history: History::default(),
                snapper: Snapper::new(&config),
                camera: Camera::from_config(&config),
                config,
                controller: SelectionController::new(),
            }
        }

        fn wall(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> ObjectId {
            self.plan
                .add_object(Wall::new(Point::new(x1, y1), Point::new(x2, y2)).into())
        }

        fn ctx(&mut self) -> (&mut SelectionController, EditContext<'_>) {
            (
                &mut self.controller,
                EditContext {
                    plan: &mut self.plan,
                    history: &mut self.history,
                    snapper: &self.snapper,
                    camera: &self.camera,
                    config: &self.config,
                },
            )
        }

        fn down(&mut self, x: f64, y: f64, modifiers: Modifiers) -> Result<Outcome, EditError> {
            let (controller, mut ctx) = self.ctx();
            controller.pointer_down(&mut ctx, Point::new(x, y), modifiers)
        }

        fn drag_to(&mut self, x: f64, y: f64) -> Outcome {
            let (controller, mut ctx) = self.ctx();
            controller.pointer_move(&mut ctx, Point::new(x, y), Modifiers::NONE)
        }

        fn up(&mut self, x: f64, y: f64) -> Outcome {
            let (controller, mut ctx) = self.ctx();
            controller.pointer_up(&mut ctx, Point::new(x, y), Modifiers::NONE)
        }
    }

    #[test]
    fn test_click_selects_and_draws_handles() {
        let mut fx = Fixture::new();
        let id = fx.wall(0.0, 0.0, 100.0, 0.0);
        fx.down(50.0, 1.0, Modifiers::NONE).unwrap();
        fx.up(50.0, 1.0);
        assert_eq!(fx.controller.selection(), &Selection::Single(id));
        assert_eq!(fx.controller.overlay().handles.len(), 2);
        assert!(!fx.history.can_undo());
    }

    #[test]
    fn test_selecting_other_object_tears_down_previous_ui() {
        let mut fx = Fixture::new();
        let a = fx.wall(0.0, 0.0, 100.0, 0.0);
        let b = fx
            .plan
            .add_object(Rectangle::new(Point::new(0.0, 50.0), 40.0, 40.0).into());
        fx.down(50.0, 0.0, Modifiers::NONE).unwrap();
        fx.up(50.0, 0.0);
        fx.down(0.0, 70.0, Modifiers::NONE).unwrap();
        fx.up(0.0, 70.0);

        let overlay = fx.controller.overlay();
        assert_eq!(fx.controller.selection(), &Selection::Single(b));
        assert!(overlay.handles.is_empty());
        assert!(overlay.highlights.iter().all(|h| h.object_id != a));
    }

    #[test]
    fn test_click_empty_canvas_deselects() {
        let mut fx = Fixture::new();
        let id = fx.wall(0.0, 0.0, 100.0, 0.0);
        fx.controller.select(&fx.plan, id).unwrap();
        fx.down(500.0, 500.0, Modifiers::NONE).unwrap();
        fx.up(500.0, 500.0);
        assert!(fx.controller.selection().is_empty());
        assert!(fx.controller.overlay().is_empty());
    }

    #[test]
    fn test_locked_object_click_keeps_selection() {
        let mut fx = Fixture::new();
        let a = fx.wall(0.0, 0.0, 100.0, 0.0);
        let locked = fx.plan.add_layer("Locked");
        fx.wall(0.0, 200.0, 100.0, 200.0);
        fx.plan.set_layer_locked(locked, true).unwrap();
        fx.controller.select(&fx.plan, a).unwrap();

        assert_eq!(fx.down(50.0, 200.0, Modifiers::NONE), Ok(Outcome::Overlay));
        assert_eq!(fx.controller.take_notice(), Some(EditError::ObjectNotEditable));
        assert_eq!(fx.controller.take_notice(), None);
        fx.up(50.0, 200.0);
        assert_eq!(fx.controller.selection(), &Selection::Single(a));
        assert!(!fx.controller.is_dragging());
        assert!(!fx.history.can_undo());
    }

    #[test]
    fn test_box_select_starts_over_locked_underlay() {
        let mut fx = Fixture::new();
        let base = fx.plan.active_layer_id();
        let underlay = fx.plan.add_layer("Underlay");
        fx.plan.move_layer_down(underlay).unwrap();
        fx.plan.set_active_layer(underlay).unwrap();
        let mut slab = Rectangle::new(Point::ZERO, 500.0, 500.0);
        slab.fill = Some(RgbaColor::white());
        fx.plan.add_object(slab.into());
        fx.plan.set_layer_locked(underlay, true).unwrap();
        fx.plan.set_active_layer(base).unwrap();
        let wall = fx.wall(100.0, 100.0, 150.0, 100.0);

        assert_eq!(fx.down(50.0, 50.0, Modifiers::NONE), Ok(Outcome::Overlay));
        assert!(matches!(fx.controller.drag(), Some(DragState::BoxSelect(_))));
        fx.drag_to(200.0, 200.0);
        fx.up(200.0, 200.0);
        assert_eq!(fx.controller.selection(), &Selection::Single(wall));
    }

    #[test]
    fn test_press_prefers_editable_object_under_locked_one() {
        let mut fx = Fixture::new();
        let wall = fx.wall(0.0, 0.0, 100.0, 0.0);
        let top = fx.plan.add_layer("Top");
        fx.wall(0.0, 0.0, 100.0, 0.0);
        fx.plan.set_layer_locked(top, true).unwrap();

        fx.down(50.0, 0.0, Modifiers::NONE).unwrap();
        assert_eq!(fx.controller.selection(), &Selection::Single(wall));
        assert_eq!(fx.controller.take_notice(), None);
        assert!(matches!(fx.controller.drag(), Some(DragState::MoveObject(_))));
    }

    #[test]
    fn test_move_commits_one_snapshot() {
        let mut fx = Fixture::new();
        let id = fx.wall(0.0, 0.0, 100.0, 0.0);
        fx.down(50.0, 0.0, Modifiers::NONE).unwrap();
        assert_eq!(fx.drag_to(60.0, 5.0), Outcome::Content);
        assert_eq!(fx.drag_to(73.0, 18.0), Outcome::Content);
        assert_eq!(fx.up(73.0, 18.0), Outcome::Content);

        let wall = fx.plan.object(id).and_then(|o| o.as_wall()).cloned().unwrap();
        assert_eq!(wall.start(), Point::new(20.0, 20.0));
        assert_eq!(fx.history.undo_len(), 1);

        fx.history.undo(&mut fx.plan);
        let wall = fx.plan.object(id).and_then(|o| o.as_wall()).cloned().unwrap();
        assert_eq!(wall.start(), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_drag_back_to_origin_pushes_nothing() {
        let mut fx = Fixture::new();
        let id = fx.wall(0.0, 0.0, 100.0, 0.0);
        let before = fx.plan.clone();
        fx.down(50.0, 0.0, Modifiers::NONE).unwrap();
        fx.drag_to(80.0, 30.0);
        assert_eq!(fx.up(51.0, 1.0), Outcome::Overlay);
        assert!(!fx.history.can_undo());
        assert_eq!(fx.plan, before);
        assert_eq!(fx.controller.selection(), &Selection::Single(id));
    }

    #[test]
    fn test_cancel_restores_geometry() {
        let mut fx = Fixture::new();
        fx.wall(0.0, 0.0, 100.0, 0.0);
        let before = fx.plan.clone();
        fx.down(50.0, 0.0, Modifiers::NONE).unwrap();
        fx.drag_to(90.0, 40.0);
        assert_ne!(fx.plan, before);
        assert_eq!(fx.controller.cancel(&mut fx.plan), Outcome::Content);
        assert_eq!(fx.plan, before);
        assert!(!fx.history.can_undo());
    }

    #[test]
    fn test_endpoint_drag_uses_ghost_until_release() {
        let mut fx = Fixture::new();
        let id = fx.wall(0.0, 0.0, 100.0, 0.0);
        fx.controller.select(&fx.plan, id).unwrap();

        fx.down(100.0, 2.0, Modifiers::NONE).unwrap();
        assert!(matches!(
            fx.controller.drag(),
            Some(DragState::WallEndpoint(state)) if state.handle == HandleKind::WallEnd
        ));
        fx.drag_to(121.0, 38.0);
        let ghost = fx.controller.overlay().ghost.clone().unwrap();
        assert_eq!(ghost.wall.end(), Point::new(120.0, 40.0));
        // Live wall untouched during the drag
        let live = fx.plan.object(id).and_then(|o| o.as_wall()).cloned().unwrap();
        assert_eq!(live.end(), Point::new(100.0, 0.0));

        assert_eq!(fx.up(121.0, 38.0), Outcome::Content);
        let live = fx.plan.object(id).and_then(|o| o.as_wall()).cloned().unwrap();
        assert_eq!(live.end(), Point::new(120.0, 40.0));
        assert!(fx.controller.overlay().ghost.is_none());
        assert_eq!(fx.controller.overlay().handles[1].position, Point::new(120.0, 40.0));
        assert_eq!(fx.history.undo_len(), 1);
    }

    #[test]
    fn test_endpoint_drag_axis_lock_pins_to_fixed_end() {
        let mut fx = Fixture::new();
        let id = fx.wall(0.0, 0.0, 100.0, 0.0);
        fx.controller.select(&fx.plan, id).unwrap();
        fx.down(100.0, 0.0, Modifiers::NONE).unwrap();

        let (controller, mut ctx) = fx.ctx();
        controller.pointer_up(&mut ctx, Point::new(153.0, 7.0), Modifiers::SHIFT);
        let live = fx.plan.object(id).and_then(|o| o.as_wall()).cloned().unwrap();
        assert_eq!(live.start(), Point::new(0.0, 0.0));
        assert_eq!(live.end(), Point::new(153.0, 0.0));
    }

    #[test]
    fn test_endpoint_snaps_to_other_wall_vertex() {
        let mut fx = Fixture::new();
        let id = fx.wall(0.0, 0.0, 100.0, 0.0);
        fx.wall(133.0, 47.0, 200.0, 47.0);
        fx.controller.select(&fx.plan, id).unwrap();
        fx.down(100.0, 0.0, Modifiers::NONE).unwrap();
        fx.up(130.0, 44.0);
        let live = fx.plan.object(id).and_then(|o| o.as_wall()).cloned().unwrap();
        assert_eq!(live.end(), Point::new(133.0, 47.0));
    }

    #[test]
    fn test_object_deleted_mid_drag_is_noop() {
        let mut fx = Fixture::new();
        let id = fx.wall(0.0, 0.0, 100.0, 0.0);
        fx.down(50.0, 0.0, Modifiers::NONE).unwrap();
        fx.plan.remove_object(id);
        assert_eq!(fx.drag_to(70.0, 20.0), Outcome::Unchanged);
        assert_eq!(fx.up(70.0, 20.0), Outcome::Overlay);
        assert!(!fx.history.can_undo());
        assert!(fx.controller.overlay().is_empty());
    }

    #[test]
    fn test_box_select_skips_locked_layer() {
        let mut fx = Fixture::new();
        let a = fx.wall(10.0, 10.0, 20.0, 10.0);
        let b = fx
            .plan
            .add_object(Label::new(Point::new(30.0, 30.0), "Hall").into());
        let locked = fx.plan.add_layer("Locked");
        fx.plan
            .add_object(Rectangle::new(Point::new(40.0, 40.0), 5.0, 5.0).into());
        fx.plan.set_layer_locked(locked, true).unwrap();

        fx.down(-100.0, -100.0, Modifiers::NONE).unwrap();
        assert!(fx.controller.overlay().rubber_band.is_some());
        fx.drag_to(60.0, 60.0);
        fx.up(60.0, 60.0);

        assert_eq!(fx.controller.selection(), &Selection::Multi(vec![a, b]));
        assert!(fx.controller.overlay().rubber_band.is_none());
        assert!(fx.controller.overlay().group_box.is_some());
    }

    #[test]
    fn test_group_move_translates_every_member() {
        let mut fx = Fixture::new();
        let a = fx.wall(0.0, 0.0, 100.0, 0.0);
        let b = fx.wall(0.0, 50.0, 100.0, 50.0);
        fx.controller.select_ids(&fx.plan, &[a, b]);

        fx.down(50.0, 50.0, Modifiers::NONE).unwrap();
        assert!(matches!(fx.controller.drag(), Some(DragState::GroupMove(_))));
        fx.up(80.0, 60.0);

        let wa = fx.plan.object(a).and_then(|o| o.as_wall()).cloned().unwrap();
        let wb = fx.plan.object(b).and_then(|o| o.as_wall()).cloned().unwrap();
        assert_eq!(wa.start(), Point::new(30.0, 10.0));
        assert_eq!(wb.start(), Point::new(30.0, 60.0));
        assert_eq!(fx.history.undo_len(), 1);
        assert!(fx.controller.selection().is_multi());
    }

    #[test]
    fn test_shift_click_toggles_membership() {
        let mut fx = Fixture::new();
        let a = fx.wall(0.0, 0.0, 100.0, 0.0);
        let b = fx.wall(0.0, 50.0, 100.0, 50.0);
        fx.controller.select(&fx.plan, a).unwrap();
        fx.down(50.0, 50.0, Modifiers::SHIFT).unwrap();
        assert_eq!(fx.controller.selection(), &Selection::Multi(vec![a, b]));
        fx.down(50.0, 0.0, Modifiers::SHIFT).unwrap();
        assert_eq!(fx.controller.selection(), &Selection::Single(b));
    }

    #[test]
    fn test_delete_selection() {
        let mut fx = Fixture::new();
        let a = fx.wall(0.0, 0.0, 100.0, 0.0);
        fx.wall(0.0, 50.0, 100.0, 50.0);
        fx.controller.select(&fx.plan, a).unwrap();
        let (controller, mut ctx) = fx.ctx();
        assert_eq!(controller.delete_selection(&mut ctx), Ok(Outcome::Content));
        assert_eq!(controller.delete_selection(&mut ctx), Err(EditError::NothingSelected));
        assert_eq!(fx.plan.len(), 1);
        assert!(!fx.plan.contains(a));
        assert_eq!(fx.history.undo_len(), 1);
    }

    #[test]
    fn test_delete_during_move_undoes_to_pre_drag_plan() {
        let mut fx = Fixture::new();
        let id = fx.wall(0.0, 0.0, 100.0, 0.0);
        let before = fx.plan.clone();
        fx.down(50.0, 0.0, Modifiers::NONE).unwrap();
        fx.drag_to(80.0, 40.0);

        let (controller, mut ctx) = fx.ctx();
        assert_eq!(controller.delete_selection(&mut ctx), Ok(Outcome::Content));
        assert!(!controller.is_dragging());
        assert_eq!(fx.up(80.0, 40.0), Outcome::Unchanged);
        assert!(!fx.plan.contains(id));

        assert!(fx.history.undo(&mut fx.plan));
        assert_eq!(fx.plan, before);
        assert!(!fx.history.can_undo());
    }

    #[test]
    fn test_paste_during_move_restores_dragged_object() {
        let mut fx = Fixture::new();
        let id = fx.wall(0.0, 0.0, 100.0, 0.0);
        fx.controller.select(&fx.plan, id).unwrap();
        fx.controller.copy(&fx.plan).unwrap();
        let before = fx.plan.clone();
        fx.down(50.0, 0.0, Modifiers::NONE).unwrap();
        fx.drag_to(80.0, 40.0);

        let (controller, mut ctx) = fx.ctx();
        let pasted = controller.paste(&mut ctx).unwrap();
        assert_eq!(pasted.len(), 1);
        fx.up(80.0, 40.0);
        let wall = fx.plan.object(id).and_then(|o| o.as_wall()).cloned().unwrap();
        assert_eq!(wall.start(), Point::new(0.0, 0.0));

        assert!(fx.history.undo(&mut fx.plan));
        assert_eq!(fx.plan, before);
        assert!(!fx.history.can_undo());
    }

    #[test]
    fn test_dimension_input_during_move_rolls_back_drag() {
        let mut fx = Fixture::new();
        let id = fx.wall(0.0, 0.0, 100.0, 0.0);
        let before = fx.plan.clone();
        fx.down(50.0, 0.0, Modifiers::NONE).unwrap();
        fx.drag_to(80.0, 40.0);

        let (controller, mut ctx) = fx.ctx();
        assert_eq!(controller.set_wall_length(&mut ctx, id, 60.0), Ok(Outcome::Content));
        let wall = fx.plan.object(id).and_then(|o| o.as_wall()).cloned().unwrap();
        assert_eq!(wall.start(), Point::new(0.0, 0.0));
        assert_eq!(wall.end(), Point::new(60.0, 0.0));

        assert!(fx.history.undo(&mut fx.plan));
        assert_eq!(fx.plan, before);
    }

    #[test]
    fn test_paste_twice_uses_same_offset() {
        let mut fx = Fixture::new();
        fx.camera.zoom = 2.0;
        let original = fx.wall(0.0, 0.0, 100.0, 0.0);
        fx.controller.select(&fx.plan, original).unwrap();
        fx.controller.copy(&fx.plan).unwrap();
        let target_layer = fx.plan.add_layer("Paste here");

        let (controller, mut ctx) = fx.ctx();
        let first = controller.paste(&mut ctx).unwrap();
        let second = controller.paste(&mut ctx).unwrap();
        assert_eq!(fx.controller.selection(), &Selection::Single(second[0]));

        assert_ne!(first[0], second[0]);
        for id in [first[0], second[0]] {
            let obj = fx.plan.object(id).unwrap();
            assert_eq!(obj.layer_id(), target_layer);
            assert_eq!(obj.reference_point(), Point::new(10.0, 10.0));
        }
        assert_eq!(fx.plan.len(), 3);
        assert_eq!(fx.history.undo_len(), 2);
    }

    #[test]
    fn test_paste_rejected_on_locked_layer() {
        let mut fx = Fixture::new();
        let id = fx.wall(0.0, 0.0, 10.0, 0.0);
        fx.controller.select(&fx.plan, id).unwrap();
        fx.controller.copy(&fx.plan).unwrap();
        let layer = fx.plan.active_layer_id();
        fx.plan.set_layer_locked(layer, true).unwrap();
        let (controller, mut ctx) = fx.ctx();
        assert_eq!(controller.paste(&mut ctx), Err(EditError::ActiveLayerNotEditable));
        assert!(!fx.history.can_undo());
    }

    #[test]
    fn test_paste_empty_clipboard() {
        let mut fx = Fixture::new();
        let (controller, mut ctx) = fx.ctx();
        assert_eq!(controller.paste(&mut ctx), Err(EditError::EmptyClipboard));
    }

    #[test]
    fn test_dimension_inputs() {
        let mut fx = Fixture::new();
        let wall = fx.wall(0.0, 0.0, 0.0, 30.0);
        let rect = fx
            .plan
            .add_object(Rectangle::new(Point::new(5.0, 5.0), 10.0, 10.0).into());
        let label = fx.plan.add_object(Label::new(Point::ZERO, "Den").into());

        let (controller, mut ctx) = fx.ctx();
        controller.set_wall_length(&mut ctx, wall, 50.0).unwrap();
        controller.set_rectangle_size(&mut ctx, rect, 20.0, 40.0).unwrap();
        controller.set_label_text(&mut ctx, label, "Study").unwrap();
        assert!(matches!(
            controller.set_wall_length(&mut ctx, wall, -1.0),
            Err(EditError::InvalidDimension(_))
        ));
        assert!(matches!(
            controller.set_wall_length(&mut ctx, rect, 10.0),
            Err(EditError::InvalidDimension(_))
        ));

        let w = fx.plan.object(wall).and_then(|o| o.as_wall()).cloned().unwrap();
        assert_eq!(w.end(), Point::new(0.0, 50.0));
        assert_eq!(
            fx.plan.object(rect).map(|o| o.bounds()),
            Some(kurbo::Rect::new(5.0, 5.0, 25.0, 45.0))
        );
        assert!(matches!(
            fx.plan.object(label),
            Some(DrawableObject::Label(l)) if l.content == "Study"
        ));
        assert_eq!(fx.history.undo_len(), 3);
    }

    #[test]
    fn test_prune_after_layer_hidden() {
        let mut fx = Fixture::new();
        let a = fx.wall(0.0, 0.0, 100.0, 0.0);
        let b = fx.wall(0.0, 50.0, 100.0, 50.0);
        fx.controller.select_ids(&fx.plan, &[a, b]);
        fx.plan.remove_object(b);
        assert_eq!(fx.controller.prune(&fx.plan), Outcome::Overlay);
        assert_eq!(fx.controller.selection(), &Selection::Single(a));

        let layer = fx.plan.active_layer_id();
        fx.plan.set_layer_visible(layer, false).unwrap();
        fx.controller.prune(&fx.plan);
        assert!(fx.controller.selection().is_empty());
    }
}
