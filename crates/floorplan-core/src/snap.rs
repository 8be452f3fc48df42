//! Snapping pointer positions to wall vertices, axis locks, guides and the grid.
//!
//! Priority, first match wins:
//! 1. vertex snap (nearest wall endpoint within a zoom-adjusted radius),
//! 2. axis lock relative to a draw start,
//! 3. alignment guides per axis (when enabled), each axis falling back to
//! 4. the fine or coarse grid.

use crate::config::EditorConfig;
use crate::document::FloorPlan;
use crate::objects::{DrawableObject, ObjectId};
use kurbo::Point;

/// What an axis was snapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapKind {
    /// Left at the raw value.
    #[default]
    None,
    Vertex,
    AxisLock,
    Guide,
    Grid,
}

/// Coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Which part of an object a guide line comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideSource {
    /// Rectangle edge.
    Edge,
    /// Rectangle midline.
    Center,
    /// Wall endpoint coordinate.
    Endpoint,
}

/// An infinite alignment line: `x = value` for [`Axis::X`], `y = value` for [`Axis::Y`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideLine {
    pub axis: Axis,
    pub value: f64,
    pub source: GuideSource,
}

/// Result of a snap operation.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapResult {
    /// The snapped point.
    pub point: Point,
    /// Whether the X coordinate was snapped.
    pub snapped_x: bool,
    /// Whether the Y coordinate was snapped.
    pub snapped_y: bool,
    pub kind_x: SnapKind,
    pub kind_y: SnapKind,
    /// Guides that fired, for display.
    pub guides: Vec<GuideLine>,
}

impl SnapResult {
    /// Create a result with no snapping.
    pub fn none(point: Point) -> Self {
        Self {
            point,
            snapped_x: false,
            snapped_y: false,
            kind_x: SnapKind::None,
            kind_y: SnapKind::None,
            guides: Vec::new(),
        }
    }

    fn uniform(point: Point, kind: SnapKind) -> Self {
        Self {
            point,
            snapped_x: true,
            snapped_y: true,
            kind_x: kind,
            kind_y: kind,
            guides: Vec::new(),
        }
    }

    /// Snapped exactly onto an existing wall endpoint.
    pub fn is_vertex(&self) -> bool {
        self.kind_x == SnapKind::Vertex && self.kind_y == SnapKind::Vertex
    }
}

/// Per-call snapping inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapRequest {
    pub zoom: f64,
    /// Draw start to lock against (two-click draws with the lock modifier held).
    pub axis_lock: Option<Point>,
    /// Use the coarse grid instead of the fine one.
    pub coarse: bool,
}

impl SnapRequest {
    pub fn new(zoom: f64) -> Self {
        Self {
            zoom,
            axis_lock: None,
            coarse: false,
        }
    }

    pub fn with_axis_lock(mut self, origin: Option<Point>) -> Self {
        self.axis_lock = origin;
        self
    }

    pub fn with_coarse(mut self, coarse: bool) -> Self {
        self.coarse = coarse;
        self
    }
}

/// Geometry that can be snapped to, gathered once per event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapTargets {
    pub vertices: Vec<Point>,
    pub guides: Vec<GuideLine>,
}

impl SnapTargets {
    /// Collect targets from visible objects, skipping the ones being edited.
    pub fn from_plan(plan: &FloorPlan, exclude: &[ObjectId]) -> Self {
        let objects = plan
            .visible_objects()
            .into_iter()
            .filter(|o| !exclude.contains(&o.id()));
        Self {
            vertices: plan.wall_endpoints(exclude),
            guides: collect_guides(objects),
        }
    }
}

/// Snap a point to the nearest grid intersection.
/// Halves round away from zero.
pub fn snap_to_grid(point: Point, grid_size: f64) -> SnapResult {
    if grid_size <= 0.0 {
        return SnapResult::none(point);
    }
    let snapped = Point::new(
        snap_value(point.x, grid_size),
        snap_value(point.y, grid_size),
    );
    SnapResult::uniform(snapped, SnapKind::Grid)
}

fn snap_value(value: f64, grid_size: f64) -> f64 {
    (value / grid_size).round() * grid_size
}

/// Nearest vertex within `threshold` (inclusive), if any.
pub fn snap_to_vertex(point: Point, vertices: &[Point], threshold: f64) -> Option<Point> {
    let mut best: Option<Point> = None;
    let mut best_dist_sq = threshold * threshold;
    for &vertex in vertices {
        let dist_sq = (point - vertex).hypot2();
        if dist_sq <= best_dist_sq {
            best_dist_sq = dist_sq;
            best = Some(vertex);
        }
    }
    best
}

/// Lock `point` horizontally or vertically to `origin`, whichever needs the
/// smaller correction. Returns the locked point and the axis that was pinned.
pub fn apply_axis_lock(point: Point, origin: Point) -> (Point, Axis) {
    let dx = (point.x - origin.x).abs();
    let dy = (point.y - origin.y).abs();
    if dy <= dx {
        // Horizontal: y is pinned.
        (Point::new(point.x, origin.y), Axis::Y)
    } else {
        (Point::new(origin.x, point.y), Axis::X)
    }
}

/// Alignment lines from rectangle edges and midlines and wall endpoints.
pub fn collect_guides<'a>(objects: impl IntoIterator<Item = &'a DrawableObject>) -> Vec<GuideLine> {
    let mut guides = Vec::new();
    let mut push = |axis, value, source| guides.push(GuideLine { axis, value, source });
    for obj in objects {
        match obj {
            DrawableObject::Rectangle(rect) => {
                let r = rect.as_rect();
                push(Axis::X, r.x0, GuideSource::Edge);
                push(Axis::X, r.x1, GuideSource::Edge);
                push(Axis::X, r.center().x, GuideSource::Center);
                push(Axis::Y, r.y0, GuideSource::Edge);
                push(Axis::Y, r.y1, GuideSource::Edge);
                push(Axis::Y, r.center().y, GuideSource::Center);
            }
            DrawableObject::Wall(wall) => {
                for p in [wall.start(), wall.end()] {
                    push(Axis::X, p.x, GuideSource::Endpoint);
                    push(Axis::Y, p.y, GuideSource::Endpoint);
                }
            }
            DrawableObject::Label(_) => {}
        }
    }
    guides
}

/// Nearest guide on `axis` within `threshold` of `value`.
pub fn nearest_guide(
    value: f64,
    axis: Axis,
    guides: &[GuideLine],
    threshold: f64,
) -> Option<GuideLine> {
    guides
        .iter()
        .filter(|g| g.axis == axis && (g.value - value).abs() <= threshold)
        .min_by(|a, b| (a.value - value).abs().total_cmp(&(b.value - value).abs()))
        .copied()
}

/// Zoom-aware snapping engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapper {
    pub fine_grid: f64,
    pub coarse_grid: f64,
    pub vertex_threshold_px: f64,
    pub guide_threshold_px: f64,
    pub guides_enabled: bool,
    min_zoom: f64,
    max_zoom: f64,
}

impl Default for Snapper {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl Snapper {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            fine_grid: config.fine_grid,
            coarse_grid: config.coarse_grid,
            vertex_threshold_px: config.vertex_threshold_px,
            guide_threshold_px: config.guide_threshold_px,
            guides_enabled: config.guides_enabled,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
        }
    }

    /// Grid size in world units for the current modifier state.
    pub fn grid_size(&self, coarse: bool) -> f64 {
        if coarse { self.coarse_grid } else { self.fine_grid }
    }

    /// World-space vertex radius at `zoom`.
    pub fn vertex_threshold(&self, zoom: f64) -> f64 {
        self.vertex_threshold_px / self.clamp_zoom(zoom)
    }

    /// World-space guide distance at `zoom`.
    pub fn guide_threshold(&self, zoom: f64) -> f64 {
        self.guide_threshold_px / self.clamp_zoom(zoom)
    }

    fn clamp_zoom(&self, zoom: f64) -> f64 {
        if zoom.is_nan() {
            return 1.0_f64.clamp(self.min_zoom, self.max_zoom);
        }
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    /// Snap a raw world-space point.
    pub fn snap(&self, raw: Point, request: &SnapRequest, targets: &SnapTargets) -> SnapResult {
        let threshold = self.vertex_threshold(request.zoom);
        let vertex = snap_to_vertex(raw, &targets.vertices, threshold);

        if let Some(origin) = request.axis_lock {
            return self.snap_locked(raw, origin, vertex, threshold);
        }
        if let Some(vertex) = vertex {
            return SnapResult::uniform(vertex, SnapKind::Vertex);
        }
        if self.guides_enabled && !targets.guides.is_empty() {
            return self.snap_with_guides(raw, request, &targets.guides);
        }
        snap_to_grid(raw, self.grid_size(request.coarse))
    }

    fn snap_locked(
        &self,
        raw: Point,
        origin: Point,
        vertex: Option<Point>,
        threshold: f64,
    ) -> SnapResult {
        let (locked, pinned) = apply_axis_lock(raw, origin);
        let mut result = SnapResult::uniform(locked, SnapKind::AxisLock);
        let Some(vertex) = vertex else {
            // The free axis follows the cursor.
            match pinned {
                Axis::X => {
                    result.snapped_y = false;
                    result.kind_y = SnapKind::None;
                }
                Axis::Y => {
                    result.snapped_x = false;
                    result.kind_x = SnapKind::None;
                }
            }
            return result;
        };

        match pinned {
            Axis::Y => {
                result.point.x = vertex.x;
                result.kind_x = SnapKind::Vertex;
                if (vertex.y - origin.y).abs() <= threshold {
                    result.point.y = vertex.y;
                    result.kind_y = SnapKind::Vertex;
                }
            }
            Axis::X => {
                result.point.y = vertex.y;
                result.kind_y = SnapKind::Vertex;
                if (vertex.x - origin.x).abs() <= threshold {
                    result.point.x = vertex.x;
                    result.kind_x = SnapKind::Vertex;
                }
            }
        }
        result
    }

    fn snap_with_guides(
        &self,
        raw: Point,
        request: &SnapRequest,
        guides: &[GuideLine],
    ) -> SnapResult {
        let threshold = self.guide_threshold(request.zoom);
        let grid = snap_to_grid(raw, self.grid_size(request.coarse));
        let mut result = grid.clone();

        if let Some(guide) = nearest_guide(raw.x, Axis::X, guides, threshold) {
            result.point.x = guide.value;
            result.kind_x = SnapKind::Guide;
            result.guides.push(guide);
        }
        if let Some(guide) = nearest_guide(raw.y, Axis::Y, guides, threshold) {
            result.point.y = guide.value;
            result.kind_y = SnapKind::Guide;
            result.guides.push(guide);
        }
        result
    }
}
