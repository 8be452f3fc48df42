//! Scene-graph boundary.
//!
//! The renderer never paints; it emits primitives into a retained scene
//! through [`SceneGraph`]. Hosts wrap their painting library behind this
//! trait. [`RecordingScene`] keeps everything in memory.

use floorplan_core::ObjectId;
use kurbo::{Circle, Line, Point, Rect};
use peniko::Color;
use thiserror::Error;

/// Scene backend errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Scene backend failed: {0}")]
    Backend(String),
}

/// Result type for scene operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Independently cleared layers of the retained scene, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneLayer {
    /// Walls, rectangles.
    Content,
    /// Text labels and dimension labels, always above content.
    Labels,
    /// Selection UI, ghosts, tool previews and guides.
    Overlay,
}

impl SceneLayer {
    pub const ALL: [SceneLayer; 3] = [SceneLayer::Content, SceneLayer::Labels, SceneLayer::Overlay];

    fn index(self) -> usize {
        match self {
            SceneLayer::Content => 0,
            SceneLayer::Labels => 1,
            SceneLayer::Overlay => 2,
        }
    }
}

/// Horizontal text alignment relative to the text position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    /// Position is the top-left corner.
    #[default]
    Start,
    /// Position is the centre of the text box.
    Center,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub position: Point,
    pub content: String,
    /// World units.
    pub font_size: f64,
    pub bold: bool,
    pub italic: bool,
    pub align: TextAlign,
}

/// Geometry of a primitive, in world coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveKind {
    Line(Line),
    Rect(Rect),
    Circle(Circle),
    Text(TextRun),
}

/// Paint attributes. Text is painted with `fill`.
#[derive(Debug, Clone, Copy)]
pub struct Style {
    pub stroke: Option<Color>,
    pub stroke_width: f64,
    pub fill: Option<Color>,
    /// Dash and gap length, world units.
    pub dash: Option<f64>,
    /// Extra pick radius around thin strokes, world units.
    pub hit_margin: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            stroke: None,
            stroke_width: 1.0,
            fill: None,
            dash: None,
            hit_margin: 0.0,
        }
    }
}

/// A drawable scene primitive.
#[derive(Debug, Clone)]
pub struct Primitive {
    pub kind: PrimitiveKind,
    pub style: Style,
}

impl Primitive {
    fn new(kind: PrimitiveKind) -> Self {
        Self {
            kind,
            style: Style::default(),
        }
    }

    pub fn line(line: Line) -> Self {
        Self::new(PrimitiveKind::Line(line))
    }

    pub fn rect(rect: Rect) -> Self {
        Self::new(PrimitiveKind::Rect(rect))
    }

    pub fn circle(center: Point, radius: f64) -> Self {
        Self::new(PrimitiveKind::Circle(Circle::new(center, radius)))
    }

    pub fn text(run: TextRun) -> Self {
        Self::new(PrimitiveKind::Text(run))
    }

    pub fn with_stroke(mut self, color: Color, width: f64) -> Self {
        self.style.stroke = Some(color);
        self.style.stroke_width = width;
        self
    }

    pub fn with_fill(mut self, color: Option<Color>) -> Self {
        self.style.fill = color;
        self
    }

    pub fn with_dash(mut self, length: f64) -> Self {
        self.style.dash = Some(length);
        self
    }

    pub fn with_hit_margin(mut self, margin: f64) -> Self {
        self.style.hit_margin = margin;
        self
    }

    /// Text content, for text primitives.
    pub fn text_content(&self) -> Option<&str> {
        match &self.kind {
            PrimitiveKind::Text(run) => Some(&run.content),
            _ => None,
        }
    }
}

/// Interaction attributes of a scene node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeAttrs {
    /// Plan object this node draws, if any.
    pub object_id: Option<ObjectId>,
    pub draggable: bool,
    /// Whether the node receives pointer events.
    pub listening: bool,
}

impl NodeAttrs {
    /// Node for a plan object; editability gates dragging and picking.
    pub fn for_object(object_id: ObjectId, editable: bool) -> Self {
        Self {
            object_id: Some(object_id),
            draggable: editable,
            listening: editable,
        }
    }

    /// Decoration that never takes pointer events.
    pub fn inert() -> Self {
        Self::default()
    }
}

/// Opaque handle to a node in a retained scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(pub u64);

/// Retained scene the renderer draws into.
pub trait SceneGraph {
    /// Remove every node from a layer.
    fn clear(&mut self, layer: SceneLayer);

    /// Append a node on top of a layer.
    fn add(&mut self, layer: SceneLayer, primitive: Primitive, attrs: NodeAttrs) -> NodeHandle;

    /// Flush pending changes to the screen.
    fn batch_draw(&mut self) -> RenderResult<()>;
}

/// A node stored by [`RecordingScene`].
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub handle: NodeHandle,
    pub primitive: Primitive,
    pub attrs: NodeAttrs,
}

/// In-memory retained scene for tests and headless hosts.
#[derive(Debug, Clone, Default)]
pub struct RecordingScene {
    layers: [Vec<SceneNode>; 3],
    next_handle: u64,
    draw_count: usize,
}

impl RecordingScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes of a layer in paint order.
    pub fn nodes(&self, layer: SceneLayer) -> &[SceneNode] {
        &self.layers[layer.index()]
    }

    /// Nodes drawing the given object, across all layers.
    pub fn nodes_for(&self, object_id: ObjectId) -> Vec<&SceneNode> {
        SceneLayer::ALL
            .iter()
            .flat_map(|&layer| self.nodes(layer))
            .filter(|n| n.attrs.object_id == Some(object_id))
            .collect()
    }

    /// Object ids in paint order across content then labels.
    pub fn painted_objects(&self) -> Vec<ObjectId> {
        [SceneLayer::Content, SceneLayer::Labels]
            .iter()
            .flat_map(|&layer| self.nodes(layer))
            .filter_map(|n| n.attrs.object_id)
            .collect()
    }

    /// Text of every text node on a layer.
    pub fn texts(&self, layer: SceneLayer) -> Vec<&str> {
        self.nodes(layer)
            .iter()
            .filter_map(|n| n.primitive.text_content())
            .collect()
    }

    pub fn draw_count(&self) -> usize {
        self.draw_count
    }
}

impl SceneGraph for RecordingScene {
    fn clear(&mut self, layer: SceneLayer) {
        self.layers[layer.index()].clear();
    }

    fn add(&mut self, layer: SceneLayer, primitive: Primitive, attrs: NodeAttrs) -> NodeHandle {
        let handle = NodeHandle(self.next_handle);
        self.next_handle += 1;
        self.layers[layer.index()].push(SceneNode {
            handle,
            primitive,
            attrs,
        });
        handle
    }

    fn batch_draw(&mut self) -> RenderResult<()> {
        self.draw_count += 1;
        Ok(())
    }
}
