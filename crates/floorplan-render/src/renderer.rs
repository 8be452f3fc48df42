//! Render orchestration: rebuilds scene layers from the plan and overlay.

use crate::dimensions::{dimension_anchor, format_length};
use crate::scene::{NodeAttrs, Primitive, RenderResult, SceneGraph, SceneLayer, TextAlign, TextRun};
use floorplan_core::objects::{Label, Rectangle};
use floorplan_core::selection::{GhostWall, Outline};
use floorplan_core::snap::{Axis, GuideLine};
use floorplan_core::{
    Camera, DrawableObject, EditorConfig, FloorPlan, SelectionOverlay, ToolPreview, WALL_THICKNESS,
    Wall,
};
use kurbo::{Line, Point, Rect, Size};
use peniko::Color;

/// Colors used for plan content and selection UI.
#[derive(Debug, Clone, Copy)]
pub struct RenderStyle {
    pub wall_color: Color,
    pub dimension_color: Color,
    pub selection_color: Color,
    pub handle_fill: Color,
    pub rubber_band_fill: Color,
    pub ghost_color: Color,
    pub guide_color: Color,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            wall_color: Color::from_rgba8(40, 40, 40, 255),
            dimension_color: Color::from_rgba8(90, 90, 90, 255),
            selection_color: Color::from_rgba8(59, 130, 246, 255), // Blue
            handle_fill: Color::WHITE,
            rubber_band_fill: Color::from_rgba8(59, 130, 246, 25),
            ghost_color: Color::from_rgba8(59, 130, 246, 160),
            guide_color: Color::from_rgba8(236, 72, 153, 180), // Pink
        }
    }
}

/// Context for a single render pass.
pub struct RenderContext<'a> {
    pub plan: &'a FloorPlan,
    pub camera: &'a Camera,
    pub config: &'a EditorConfig,
    /// Viewport size in screen pixels.
    pub viewport_size: Size,
    pub style: RenderStyle,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        plan: &'a FloorPlan,
        camera: &'a Camera,
        config: &'a EditorConfig,
        viewport_size: Size,
    ) -> Self {
        Self {
            plan,
            camera,
            config,
            viewport_size,
            style: RenderStyle::default(),
        }
    }

    /// Screen pixels to world units, so UI keeps its screen size at any zoom.
    fn px(&self, px: f64) -> f64 {
        self.config.px_to_world(px, self.camera.zoom)
    }

    fn visible_rect(&self) -> Rect {
        self.camera.visible_world_rect(self.viewport_size)
    }
}

/// Draws the plan into a [`SceneGraph`]. Every call rebuilds its layers from
/// scratch.
#[derive(Debug, Default)]
pub struct Renderer<S: SceneGraph> {
    scene: S,
}

impl<S: SceneGraph> Renderer<S> {
    pub fn new(scene: S) -> Self {
        Self { scene }
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    /// Rebuild the content and label layers.
    ///
    /// Only visible layers are drawn, bottom layer first, labels after every
    /// other object. Nodes on locked layers are neither draggable nor
    /// listening.
    pub fn render_all(&mut self, ctx: &RenderContext<'_>) -> RenderResult<()> {
        self.scene.clear(SceneLayer::Content);
        self.scene.clear(SceneLayer::Labels);

        let visible = ctx.plan.visible_objects();
        for obj in &visible {
            let editable = ctx.plan.is_layer_editable(obj.layer_id());
            let attrs = NodeAttrs::for_object(obj.id(), editable);
            let (layer, primitive) = object_primitive(ctx, obj);
            self.scene.add(layer, primitive, attrs);
        }

        for obj in &visible {
            match obj {
                DrawableObject::Wall(wall) => {
                    self.dimension_label(ctx, wall.start(), wall.end(), wall.length());
                }
                DrawableObject::Rectangle(rect) => {
                    let r = rect.as_rect();
                    let corner = Point::new(r.x0, r.y0);
                    self.dimension_label(ctx, corner, Point::new(r.x1, r.y0), r.width());
                    self.dimension_label(ctx, corner, Point::new(r.x0, r.y1), r.height());
                }
                DrawableObject::Label(_) => {}
            }
        }

        log::trace!("Rendered {} objects", visible.len());
        self.scene.batch_draw()
    }

    fn dimension_label(&mut self, ctx: &RenderContext<'_>, a: Point, b: Point, length: f64) {
        let margin = ctx.px(ctx.config.dimension_endpoint_margin_px);
        let Some(anchor) = dimension_anchor(a, b, ctx.visible_rect(), margin) else {
            return;
        };
        let run = TextRun {
            position: anchor,
            content: format_length(length, ctx.plan.scale),
            font_size: ctx.px(ctx.config.dimension_font_px),
            bold: false,
            italic: false,
            align: TextAlign::Center,
        };
        let primitive = Primitive::text(run).with_fill(Some(ctx.style.dimension_color));
        self.scene.add(SceneLayer::Labels, primitive, NodeAttrs::inert());
    }

    /// Rebuild the overlay layer: highlights, group box, handles, rubber band,
    /// endpoint ghost, tool preview and alignment guides.
    pub fn render_overlay(
        &mut self,
        ctx: &RenderContext<'_>,
        overlay: &SelectionOverlay,
        preview: Option<&ToolPreview>,
    ) -> RenderResult<()> {
        self.scene.clear(SceneLayer::Overlay);
        let color = ctx.style.selection_color;
        let thin = ctx.px(1.0);
        let dash = ctx.px(4.0);

        for highlight in &overlay.highlights {
            let primitive = match highlight.outline {
                Outline::Segment(line) => Primitive::line(line).with_stroke(color, ctx.px(2.0)),
                Outline::Box(rect) => Primitive::rect(rect).with_stroke(color, ctx.px(1.5)),
            };
            self.overlay_node(primitive);
        }

        if let Some(group) = overlay.group_box {
            self.overlay_node(Primitive::rect(group).with_stroke(color, thin).with_dash(dash));
        }

        if let Some(ghost) = &overlay.ghost {
            self.ghost(ctx, ghost);
        }

        // Handles last so they sit on top of highlights and ghosts.
        let radius = ctx.px(ctx.config.handle_radius_px);
        for handle in &overlay.handles {
            let primitive = Primitive::circle(handle.position, radius)
                .with_fill(Some(ctx.style.handle_fill))
                .with_stroke(color, ctx.px(2.0));
            self.scene.add(
                SceneLayer::Overlay,
                primitive,
                NodeAttrs::for_object(handle.object_id, true),
            );
        }

        if let Some(band) = overlay.rubber_band {
            let primitive = Primitive::rect(band)
                .with_fill(Some(ctx.style.rubber_band_fill))
                .with_stroke(color, thin)
                .with_dash(dash);
            self.overlay_node(primitive);
        }

        if let Some(preview) = preview {
            let (_, primitive) = object_primitive(ctx, &preview.object);
            self.overlay_node(primitive);
            if let DrawableObject::Wall(wall) = &preview.object {
                self.length_tag(ctx, wall, ctx.style.dimension_color);
            }
            self.guides(ctx, &preview.guides);
        }
        self.guides(ctx, &overlay.guides);

        self.scene.batch_draw()
    }

    fn overlay_node(&mut self, primitive: Primitive) {
        self.scene.add(SceneLayer::Overlay, primitive, NodeAttrs::inert());
    }

    fn ghost(&mut self, ctx: &RenderContext<'_>, ghost: &GhostWall) {
        let primitive = Primitive::line(ghost.wall.as_line())
            .with_stroke(ctx.style.ghost_color, WALL_THICKNESS)
            .with_dash(ctx.px(6.0));
        self.overlay_node(primitive);
        self.length_tag(ctx, &ghost.wall, ctx.style.ghost_color);
    }

    /// Live length readout at the midpoint of a wall being drawn or dragged.
    fn length_tag(&mut self, ctx: &RenderContext<'_>, wall: &Wall, color: Color) {
        let run = TextRun {
            position: wall.start().midpoint(wall.end()),
            content: format_length(wall.length(), ctx.plan.scale),
            font_size: ctx.px(ctx.config.dimension_font_px),
            bold: true,
            italic: false,
            align: TextAlign::Center,
        };
        self.overlay_node(Primitive::text(run).with_fill(Some(color)));
    }

    fn guides(&mut self, ctx: &RenderContext<'_>, guides: &[GuideLine]) {
        let view = ctx.visible_rect();
        for guide in guides {
            let line = match guide.axis {
                Axis::X => Line::new((guide.value, view.y0), (guide.value, view.y1)),
                Axis::Y => Line::new((view.x0, guide.value), (view.x1, guide.value)),
            };
            let width = ctx.px(1.0);
            self.overlay_node(Primitive::line(line).with_stroke(ctx.style.guide_color, width));
        }
    }
}

/// Scene layer and primitive for a plan object.
fn object_primitive(ctx: &RenderContext<'_>, obj: &DrawableObject) -> (SceneLayer, Primitive) {
    match obj {
        DrawableObject::Wall(wall) => (
            SceneLayer::Content,
            Primitive::line(wall.as_line())
                .with_stroke(ctx.style.wall_color, WALL_THICKNESS)
                .with_hit_margin(ctx.px(ctx.config.wall_hit_margin_px)),
        ),
        DrawableObject::Rectangle(rect) => (SceneLayer::Content, rectangle_primitive(ctx, rect)),
        DrawableObject::Label(label) => (SceneLayer::Labels, label_primitive(label)),
    }
}

fn rectangle_primitive(ctx: &RenderContext<'_>, rect: &Rectangle) -> Primitive {
    Primitive::rect(rect.as_rect())
        .with_stroke(rect.stroke.into(), rect.stroke_width)
        .with_fill(rect.fill.map(Color::from))
        .with_hit_margin(ctx.px(ctx.config.hit_tolerance_px))
}

fn label_primitive(label: &Label) -> Primitive {
    let run = TextRun {
        position: label.anchor(),
        content: label.content.clone(),
        font_size: label.font_size,
        bold: label.font_style.is_bold(),
        italic: label.font_style.is_italic(),
        align: TextAlign::Start,
    };
    Primitive::text(run).with_fill(Some(label.color.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{PrimitiveKind, RecordingScene};
    use floorplan_core::{ObjectId, Selection};

    const VIEWPORT: Size = Size::new(800.0, 600.0);

    struct Fixture {
        plan: FloorPlan,
        camera: Camera,
        config: EditorConfig,
        renderer: Renderer<RecordingScene>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                plan: FloorPlan::new(),
                camera: Camera::new(),
                config: EditorConfig::default(),
                renderer: Renderer::new(RecordingScene::new()),
            }
        }

        fn add(&mut self, obj: impl Into<DrawableObject>) -> ObjectId {
            self.plan.add_object(obj.into())
        }

        fn render(&mut self) {
            let ctx = RenderContext::new(&self.plan, &self.camera, &self.config, VIEWPORT);
            self.renderer.render_all(&ctx).unwrap();
        }

        fn scene(&self) -> &RecordingScene {
            self.renderer.scene()
        }
    }

    fn wall(x1: f64, y1: f64, x2: f64, y2: f64) -> Wall {
        Wall::new(Point::new(x1, y1), Point::new(x2, y2))
    }

    #[test]
    fn test_empty_plan_draws_once() {
        let mut fx = Fixture::new();
        fx.render();
        assert!(fx.scene().nodes(SceneLayer::Content).is_empty());
        assert_eq!(fx.scene().draw_count(), 1);
    }

    #[test]
    fn test_labels_paint_after_other_objects() {
        let mut fx = Fixture::new();
        let label = fx.add(Label::new(Point::new(10.0, 10.0), "Kitchen"));
        let w = fx.add(wall(0.0, 0.0, 100.0, 0.0));
        let r = fx.add(Rectangle::new(Point::new(20.0, 20.0), 30.0, 30.0));
        fx.render();
        assert_eq!(fx.scene().painted_objects(), vec![w, r, label]);
    }

    #[test]
    fn test_layer_order_and_visibility() {
        let mut fx = Fixture::new();
        let bottom = fx.plan.active_layer_id();
        let top = fx.plan.add_layer("Top");
        let upper = fx.add(wall(0.0, 0.0, 10.0, 0.0));
        fx.plan.set_active_layer(bottom).unwrap();
        let lower = fx.add(wall(0.0, 10.0, 10.0, 10.0));

        fx.render();
        assert_eq!(fx.scene().painted_objects(), vec![lower, upper]);

        fx.plan.set_layer_visible(top, false).unwrap();
        fx.render();
        assert_eq!(fx.scene().painted_objects(), vec![lower]);
    }

    #[test]
    fn test_locked_layer_nodes_are_inert() {
        let mut fx = Fixture::new();
        let id = fx.add(wall(0.0, 0.0, 10.0, 0.0));
        let layer = fx.plan.active_layer_id();
        fx.plan.set_layer_locked(layer, true).unwrap();
        fx.render();
        let nodes = fx.scene().nodes_for(id);
        assert_eq!(nodes.len(), 1);
        assert!(!nodes[0].attrs.draggable);
        assert!(!nodes[0].attrs.listening);
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut fx = Fixture::new();
        fx.add(wall(0.0, 0.0, 100.0, 0.0));
        fx.add(Rectangle::new(Point::new(20.0, 20.0), 30.0, 30.0));
        fx.render();
        let content = fx.scene().nodes(SceneLayer::Content).len();
        let labels = fx.scene().nodes(SceneLayer::Labels).len();
        fx.render();
        assert_eq!(fx.scene().nodes(SceneLayer::Content).len(), content);
        assert_eq!(fx.scene().nodes(SceneLayer::Labels).len(), labels);
        assert_eq!(fx.scene().draw_count(), 2);
    }

    #[test]
    fn test_dimension_labels_scale_with_zoom() {
        let mut fx = Fixture::new();
        fx.add(wall(0.0, 100.0, 300.0, 100.0));
        fx.add(Rectangle::new(Point::new(50.0, 150.0), 200.0, 50.0));
        fx.camera.zoom = 2.0;
        fx.render();

        assert_eq!(fx.scene().texts(SceneLayer::Labels), vec!["3.00 m", "2.00 m", "0.50 m"]);
        let font_size = fx
            .scene()
            .nodes(SceneLayer::Labels)
            .iter()
            .find_map(|n| match &n.primitive.kind {
                PrimitiveKind::Text(run) => Some(run.font_size),
                _ => None,
            });
        assert_eq!(font_size, Some(6.0));
    }

    #[test]
    fn test_offscreen_wall_gets_no_dimension() {
        let mut fx = Fixture::new();
        fx.add(wall(-500.0, -100.0, -200.0, -100.0));
        fx.render();
        assert_eq!(fx.scene().nodes(SceneLayer::Content).len(), 1);
        assert!(fx.scene().texts(SceneLayer::Labels).is_empty());
    }

    #[test]
    fn test_overlay_handles_keep_screen_size() {
        let mut fx = Fixture::new();
        let id = fx.add(wall(0.0, 0.0, 100.0, 0.0));
        fx.camera.zoom = 2.0;
        let overlay = SelectionOverlay::build(&fx.plan, &Selection::Single(id));
        let ctx = RenderContext::new(&fx.plan, &fx.camera, &fx.config, VIEWPORT);
        fx.renderer.render_overlay(&ctx, &overlay, None).unwrap();

        let radii: Vec<f64> = fx
            .scene()
            .nodes(SceneLayer::Overlay)
            .iter()
            .filter_map(|n| match n.primitive.kind {
                PrimitiveKind::Circle(c) => Some(c.radius),
                _ => None,
            })
            .collect();
        assert_eq!(radii, vec![3.0, 3.0]);
    }

    #[test]
    fn test_overlay_cleared_on_deselect() {
        let mut fx = Fixture::new();
        let id = fx.add(wall(0.0, 0.0, 100.0, 0.0));
        let selected = SelectionOverlay::build(&fx.plan, &Selection::Single(id));
        let ctx = RenderContext::new(&fx.plan, &fx.camera, &fx.config, VIEWPORT);
        fx.renderer.render_overlay(&ctx, &selected, None).unwrap();
        assert!(!fx.renderer.scene().nodes(SceneLayer::Overlay).is_empty());

        fx.renderer
            .render_overlay(&ctx, &SelectionOverlay::default(), None)
            .unwrap();
        assert!(fx.renderer.scene().nodes(SceneLayer::Overlay).is_empty());
    }
}
