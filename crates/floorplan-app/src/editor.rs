//! The editor aggregate: owns one instance of every component and routes
//! host events through them.

use floorplan_core::{
    Camera, ConfigError, EditContext, EditError, EditorConfig, FloorPlan, History, LayerId,
    LayoutDocument, LayoutError, Modifiers, ObjectId, Outcome, PointerEvent, Selection,
    SelectionController, SelectionOverlay, Snapper, ToolKind, ToolManager,
};
use floorplan_render::{RenderContext, Renderer, SceneGraph};
use kurbo::{Point, Size, Vec2};

/// Zoom step for one wheel notch.
const WHEEL_ZOOM_FACTOR: f64 = 1.1;

/// Screen padding around the plan for zoom-to-fit.
const FIT_PADDING: f64 = 40.0;

/// Editor state for one floor plan.
///
/// Failed operations never propagate: the message is kept as the current
/// status (see [`Editor::status`]) and logged.
pub struct Editor<S: SceneGraph> {
    plan: FloorPlan,
    history: History,
    snapper: Snapper,
    controller: SelectionController,
    tools: ToolManager,
    camera: Camera,
    config: EditorConfig,
    renderer: Renderer<S>,
    viewport: Size,
    status: Option<String>,
}

impl<S: SceneGraph> Editor<S> {
    /// Create an editor with an empty plan and draw it once.
    pub fn new(scene: S, config: EditorConfig, viewport: Size) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut editor = Self {
            plan: FloorPlan::new(),
            history: History::new(config.max_history),
            snapper: Snapper::new(&config),
            controller: SelectionController::new(),
            tools: ToolManager::new(),
            camera: Camera::from_config(&config),
            config,
            renderer: Renderer::new(scene),
            viewport,
            status: None,
        };
        editor.refresh(Outcome::Content);
        Ok(editor)
    }

    // --- Accessors ---

    pub fn plan(&self) -> &FloorPlan {
        &self.plan
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn selection(&self) -> &Selection {
        self.controller.selection()
    }

    pub fn overlay(&self) -> &SelectionOverlay {
        self.controller.overlay()
    }

    pub fn tools(&self) -> &ToolManager {
        &self.tools
    }

    /// Mutable tool settings (style, pending label text).
    pub fn tools_mut(&mut self) -> &mut ToolManager {
        &mut self.tools
    }

    pub fn scene(&self) -> &S {
        self.renderer.scene()
    }

    /// Last error message, cleared by the next command.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    // --- Plumbing ---

    fn split(&mut self) -> (EditContext<'_>, &mut SelectionController, &mut ToolManager) {
        (
            EditContext {
                plan: &mut self.plan,
                history: &mut self.history,
                snapper: &self.snapper,
                camera: &self.camera,
                config: &self.config,
            },
            &mut self.controller,
            &mut self.tools,
        )
    }

    fn report(&mut self, err: EditError) {
        log::warn!("{err}");
        self.status = Some(err.to_string());
    }

    fn refresh(&mut self, outcome: Outcome) {
        if outcome == Outcome::Unchanged {
            return;
        }
        let ctx = RenderContext::new(&self.plan, &self.camera, &self.config, self.viewport);
        if outcome == Outcome::Content {
            if let Err(err) = self.renderer.render_all(&ctx) {
                log::error!("Failed to render plan: {err}");
            }
        }
        let preview = self.tools.preview();
        if let Err(err) = self
            .renderer
            .render_overlay(&ctx, self.controller.overlay(), preview.as_ref())
        {
            log::error!("Failed to render overlay: {err}");
        }
    }

    /// Redraw everything.
    pub fn render(&mut self) {
        self.refresh(Outcome::Content);
    }

    /// Roll back a half-finished drag before a command snapshots the plan.
    fn settle_drag(&mut self) {
        let outcome = self.controller.cancel(&mut self.plan);
        self.refresh(outcome);
    }

    fn finish(&mut self, result: Result<Outcome, EditError>) -> bool {
        match result {
            Ok(outcome) => {
                self.refresh(outcome);
                true
            }
            Err(err) => {
                self.report(err);
                false
            }
        }
    }

    // --- Pointer input ---

    /// Dispatch a host pointer event (screen coordinates).
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down {
                position,
                modifiers,
            } => self.pointer_down(position, modifiers),
            PointerEvent::Move {
                position,
                modifiers,
            } => self.pointer_move(position, modifiers),
            PointerEvent::Up {
                position,
                modifiers,
            } => self.pointer_up(position, modifiers),
            PointerEvent::Scroll { position, delta } => self.scroll(position, delta),
        }
    }

    pub fn pointer_down(&mut self, screen: Point, modifiers: Modifiers) {
        self.status = None;
        let world = self.camera.screen_to_world(screen);
        let (mut ctx, controller, tools) = self.split();
        let result = if tools.current_tool.is_drawing() {
            tools.click(&mut ctx, world, modifiers).map(|committed| match committed {
                Some(_) => Outcome::Content,
                None => Outcome::Overlay,
            })
        } else {
            controller.pointer_down(&mut ctx, world, modifiers)
        };
        self.finish(result);
        if let Some(notice) = self.controller.take_notice() {
            self.report(notice);
        }
    }

    pub fn pointer_move(&mut self, screen: Point, modifiers: Modifiers) {
        let world = self.camera.screen_to_world(screen);
        let (mut ctx, controller, tools) = self.split();
        let outcome = if tools.current_tool.is_drawing() {
            tools.pointer_move(&ctx, world, modifiers)
        } else {
            controller.pointer_move(&mut ctx, world, modifiers)
        };
        self.refresh(outcome);
    }

    pub fn pointer_up(&mut self, screen: Point, modifiers: Modifiers) {
        if self.tools.current_tool.is_drawing() {
            return;
        }
        let world = self.camera.screen_to_world(screen);
        let (mut ctx, controller, _) = self.split();
        let outcome = controller.pointer_up(&mut ctx, world, modifiers);
        self.refresh(outcome);
    }

    /// Wheel zoom around the pointer; positive `delta.y` zooms out.
    pub fn scroll(&mut self, screen: Point, delta: Vec2) {
        if delta.y.abs() < f64::EPSILON {
            return;
        }
        let factor = if delta.y > 0.0 {
            1.0 / WHEEL_ZOOM_FACTOR
        } else {
            WHEEL_ZOOM_FACTOR
        };
        self.zoom_at(screen, factor);
    }

    /// Escape: drop a pending draw or abort the current drag.
    pub fn cancel(&mut self) {
        let mut outcome = Outcome::Unchanged;
        if self.tools.cancel() {
            outcome = Outcome::Overlay;
        }
        outcome = outcome.max(self.controller.cancel(&mut self.plan));
        self.refresh(outcome);
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.tools.current_tool == tool {
            return;
        }
        let outcome = self.controller.cancel(&mut self.plan);
        self.tools.set_tool(tool);
        log::debug!("Tool changed to {tool:?}");
        self.refresh(outcome.max(Outcome::Overlay));
    }

    // --- Selection & clipboard ---

    pub fn select(&mut self, id: ObjectId) -> bool {
        self.status = None;
        let result = self.controller.select(&self.plan, id);
        self.finish(result)
    }

    pub fn deselect(&mut self) {
        let outcome = self.controller.deselect(&self.plan);
        self.refresh(outcome);
    }

    pub fn select_all(&mut self) {
        let outcome = self.controller.select_all(&self.plan);
        self.refresh(outcome);
    }

    pub fn delete_selection(&mut self) -> bool {
        self.status = None;
        self.settle_drag();
        let (mut ctx, controller, _) = self.split();
        let result = controller.delete_selection(&mut ctx);
        self.finish(result)
    }

    pub fn copy(&mut self) -> usize {
        self.status = None;
        match self.controller.copy(&self.plan) {
            Ok(count) => count,
            Err(err) => {
                self.report(err);
                0
            }
        }
    }

    /// Paste the clipboard; returns the new ids (empty on failure).
    pub fn paste(&mut self) -> Vec<ObjectId> {
        self.status = None;
        self.settle_drag();
        let (mut ctx, controller, _) = self.split();
        match controller.paste(&mut ctx) {
            Ok(ids) => {
                self.refresh(Outcome::Content);
                ids
            }
            Err(err) => {
                self.report(err);
                Vec::new()
            }
        }
    }

    // --- History ---

    pub fn undo(&mut self) -> bool {
        self.status = None;
        self.tools.cancel();
        self.controller.cancel(&mut self.plan);
        if !self.history.undo(&mut self.plan) {
            self.report(EditError::NothingToUndo);
            return false;
        }
        log::debug!("Undo ({} left)", self.history.undo_len());
        self.controller.prune(&self.plan);
        self.refresh(Outcome::Content);
        true
    }

    pub fn redo(&mut self) -> bool {
        self.status = None;
        self.tools.cancel();
        self.controller.cancel(&mut self.plan);
        if !self.history.redo(&mut self.plan) {
            self.report(EditError::NothingToRedo);
            return false;
        }
        log::debug!("Redo ({} left)", self.history.redo_len());
        self.controller.prune(&self.plan);
        self.refresh(Outcome::Content);
        true
    }

    // --- Layers ---

    /// Run a layer operation as one undoable step.
    fn edit_layers<T>(
        &mut self,
        op: impl FnOnce(&mut FloorPlan) -> Result<T, EditError>,
    ) -> Option<T> {
        self.status = None;
        self.controller.cancel(&mut self.plan);
        let before = self.plan.clone();
        match op(&mut self.plan) {
            Ok(value) => {
                if self.plan != before {
                    self.history.snapshot(&before);
                }
                self.controller.prune(&self.plan);
                self.refresh(Outcome::Content);
                Some(value)
            }
            Err(err) => {
                self.report(err);
                None
            }
        }
    }

    /// Add a layer on top and make it active.
    pub fn add_layer(&mut self, name: Option<&str>) -> Option<LayerId> {
        self.edit_layers(|plan| {
            let name = name.map_or_else(|| plan.next_layer_name(), str::to_string);
            Ok(plan.add_layer(name))
        })
    }

    /// Delete a layer; its objects move to a neighbouring layer.
    pub fn remove_layer(&mut self, id: LayerId) -> bool {
        self.edit_layers(|plan| plan.remove_layer(id)).is_some()
    }

    pub fn rename_layer(&mut self, id: LayerId, name: &str) -> bool {
        self.edit_layers(|plan| plan.rename_layer(id, name)).is_some()
    }

    /// Returns the new visibility.
    pub fn toggle_layer_visible(&mut self, id: LayerId) -> Option<bool> {
        self.edit_layers(|plan| plan.toggle_layer_visible(id))
    }

    /// Returns the new lock state.
    pub fn toggle_layer_locked(&mut self, id: LayerId) -> Option<bool> {
        self.edit_layers(|plan| plan.toggle_layer_locked(id))
    }

    pub fn move_layer_up(&mut self, id: LayerId) -> bool {
        self.edit_layers(|plan| plan.move_layer_up(id)).unwrap_or(false)
    }

    pub fn move_layer_down(&mut self, id: LayerId) -> bool {
        self.edit_layers(|plan| plan.move_layer_down(id)).unwrap_or(false)
    }

    /// Choose the layer new objects go to. Not recorded in history.
    pub fn set_active_layer(&mut self, id: LayerId) -> bool {
        self.status = None;
        match self.plan.set_active_layer(id) {
            Ok(()) => true,
            Err(err) => {
                self.report(err);
                false
            }
        }
    }

    // --- Dimension inputs ---

    pub fn set_wall_length(&mut self, id: ObjectId, length: f64) -> bool {
        self.status = None;
        self.settle_drag();
        let (mut ctx, controller, _) = self.split();
        let result = controller.set_wall_length(&mut ctx, id, length);
        self.finish(result)
    }

    pub fn set_rectangle_size(&mut self, id: ObjectId, width: f64, height: f64) -> bool {
        self.status = None;
        self.settle_drag();
        let (mut ctx, controller, _) = self.split();
        let result = controller.set_rectangle_size(&mut ctx, id, width, height);
        self.finish(result)
    }

    pub fn set_label_text(&mut self, id: ObjectId, text: &str) -> bool {
        self.status = None;
        self.settle_drag();
        let (mut ctx, controller, _) = self.split();
        let result = controller.set_label_text(&mut ctx, id, text);
        self.finish(result)
    }

    // --- View ---

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
        self.render();
    }

    pub fn zoom_at(&mut self, screen: Point, factor: f64) {
        self.camera.zoom_at(screen, factor);
        self.render();
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.camera.pan(delta);
        self.render();
    }

    pub fn reset_view(&mut self) {
        self.camera.reset();
        self.render();
    }

    pub fn zoom_to_fit(&mut self) {
        if let Some(bounds) = self.plan.bounds() {
            self.camera.fit_to_bounds(bounds, self.viewport, FIT_PADDING);
        } else {
            self.camera.reset();
        }
        self.render();
    }

    // --- Persistence ---

    pub fn to_layout_json(&self) -> Result<String, LayoutError> {
        self.plan.to_layout().to_json()
    }

    /// Replace the plan with a parsed layout. History, selection and any
    /// pending draw are discarded.
    pub fn load_layout_json(&mut self, json: &str) -> Result<(), LayoutError> {
        let doc = match LayoutDocument::from_json(json) {
            Ok(doc) => doc,
            Err(err) => {
                log::warn!("Failed to load layout: {err}");
                self.status = Some(err.to_string());
                return Err(err);
            }
        };
        self.plan = FloorPlan::from_layout(doc);
        self.history.clear();
        self.controller = SelectionController::new();
        self.tools.cancel();
        self.status = None;
        self.render();
        Ok(())
    }
}
