//! Drawing tools for walls, rectangles and labels.
//!
//! Walls and rectangles are two-click draws: the first click records the
//! snapped start, pointer moves update a preview, the second click commits.
//! Labels are placed with a single click.

use crate::controller::{EditContext, Outcome};
use crate::error::EditError;
use crate::input::Modifiers;
use crate::objects::{DrawableObject, FontStyle, Label, ObjectId, Rectangle, RgbaColor, Wall};
use crate::snap::{GuideLine, SnapRequest, SnapTargets};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Select,
    Wall,
    Rectangle,
    Label,
}

impl ToolKind {
    /// Tools that place objects rather than select them.
    pub fn is_drawing(self) -> bool {
        !matches!(self, ToolKind::Select)
    }
}

/// State of a tool interaction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ToolState {
    /// Waiting for the first click.
    #[default]
    Idle,
    /// First click placed; waiting for the second.
    Drawing { start: Point, current: Point },
}

/// Style applied to newly drawn objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolStyle {
    pub stroke: RgbaColor,
    pub stroke_width: f64,
    pub fill: Option<RgbaColor>,
    pub font_size: f64,
    pub label_color: RgbaColor,
    pub font_style: FontStyle,
}

impl Default for ToolStyle {
    fn default() -> Self {
        Self {
            stroke: RgbaColor::charcoal(),
            stroke_width: Rectangle::DEFAULT_STROKE_WIDTH,
            fill: None,
            font_size: Label::DEFAULT_FONT_SIZE,
            label_color: RgbaColor::charcoal(),
            font_style: FontStyle::Normal,
        }
    }
}

/// Uncommitted object following the pointer, plus the guides that fired.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolPreview {
    pub object: DrawableObject,
    pub guides: Vec<GuideLine>,
}

/// Manages the current tool and its state.
#[derive(Debug, Clone)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Current state of the tool.
    pub state: ToolState,
    pub style: ToolStyle,
    /// Text for the next label.
    pub label_text: String,
    last_guides: Vec<GuideLine>,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self {
            current_tool: ToolKind::default(),
            state: ToolState::default(),
            style: ToolStyle::default(),
            label_text: "Label".to_string(),
            last_guides: Vec::new(),
        }
    }
}

impl ToolManager {
    /// Create a new tool manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current tool, dropping any pending draw.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
        self.cancel();
    }

    /// Check if a two-click draw is pending.
    pub fn is_active(&self) -> bool {
        matches!(self.state, ToolState::Drawing { .. })
    }

    /// Start point of the pending draw.
    pub fn draw_start(&self) -> Option<Point> {
        match self.state {
            ToolState::Drawing { start, .. } => Some(start),
            ToolState::Idle => None,
        }
    }

    /// Drop a pending draw. Returns true if one was pending.
    pub fn cancel(&mut self) -> bool {
        let was_active = self.is_active();
        self.state = ToolState::Idle;
        self.last_guides.clear();
        was_active
    }

    /// Object that would be committed at the current pointer position.
    pub fn preview(&self) -> Option<ToolPreview> {
        let ToolState::Drawing { start, current } = self.state else {
            return None;
        };
        self.build(start, current).map(|object| ToolPreview {
            object,
            guides: self.last_guides.clone(),
        })
    }

    fn build(&self, start: Point, end: Point) -> Option<DrawableObject> {
        match self.current_tool {
            ToolKind::Wall => Some(Wall::new(start, end).into()),
            ToolKind::Rectangle => {
                let mut rect = Rectangle::from_corners(start, end);
                rect.stroke = self.style.stroke;
                rect.stroke_width = self.style.stroke_width;
                rect.fill = self.style.fill;
                Some(rect.into())
            }
            ToolKind::Select | ToolKind::Label => None,
        }
    }

    fn build_label(&self, at: Point) -> DrawableObject {
        let mut label = Label::new(at, self.label_text.clone());
        label.font_size = self.style.font_size;
        label.color = self.style.label_color;
        label.font_style = self.style.font_style;
        label.into()
    }

    fn snap(
        &self,
        ctx: &EditContext<'_>,
        raw: Point,
        modifiers: Modifiers,
    ) -> (Point, Vec<GuideLine>) {
        let lock = if self.current_tool == ToolKind::Wall && modifiers.axis_lock() {
            self.draw_start()
        } else {
            None
        };
        let request = SnapRequest::new(ctx.camera.zoom)
            .with_axis_lock(lock)
            .with_coarse(modifiers.coarse_grid());
        let targets = SnapTargets::from_plan(ctx.plan, &[]);
        let result = ctx.snapper.snap(raw, &request, &targets);
        (result.point, result.guides)
    }

    /// Handle a click with a drawing tool. Returns the id of a committed object.
    pub fn click(
        &mut self,
        ctx: &mut EditContext<'_>,
        world: Point,
        modifiers: Modifiers,
    ) -> Result<Option<ObjectId>, EditError> {
        if !self.current_tool.is_drawing() {
            return Ok(None);
        }
        if !ctx.plan.active_layer().is_editable() {
            self.cancel();
            return Err(EditError::ActiveLayerNotEditable);
        }

        let (point, guides) = self.snap(ctx, world, modifiers);

        if self.current_tool == ToolKind::Label {
            let label = self.build_label(point);
            ctx.history.snapshot(ctx.plan);
            let id = ctx.plan.add_object(label);
            log::debug!("Placed label {id}");
            return Ok(Some(id));
        }

        match self.state {
            ToolState::Idle => {
                self.state = ToolState::Drawing {
                    start: point,
                    current: point,
                };
                self.last_guides = guides;
                Ok(None)
            }
            ToolState::Drawing { start, .. } => {
                self.cancel();
                let Some(object) = self.build(start, point) else {
                    return Ok(None);
                };
                if is_degenerate(&object) {
                    log::debug!("Discarded degenerate {}", object.kind_name());
                    return Ok(None);
                }
                ctx.history.snapshot(ctx.plan);
                let kind = object.kind_name();
                let id = ctx.plan.add_object(object);
                log::debug!("Drew {kind} {id}");
                Ok(Some(id))
            }
        }
    }

    /// Track the pointer during a pending draw.
    pub fn pointer_move(
        &mut self,
        ctx: &EditContext<'_>,
        world: Point,
        modifiers: Modifiers,
    ) -> Outcome {
        if !self.is_active() {
            return Outcome::Unchanged;
        }
        let (point, guides) = self.snap(ctx, world, modifiers);
        if let ToolState::Drawing { current, .. } = &mut self.state {
            *current = point;
        }
        self.last_guides = guides;
        Outcome::Overlay
    }
}

fn is_degenerate(object: &DrawableObject) -> bool {
    match object {
        DrawableObject::Wall(wall) => wall.is_degenerate(),
        DrawableObject::Rectangle(rect) => rect.is_degenerate(),
        DrawableObject::Label(_) => false,
    }
}
