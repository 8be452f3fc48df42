//! Wall segment.

use super::{ObjectId, ObjectTrait, point_to_segment_dist, rect_contains_inclusive};
use crate::layers::LayerId;
use kurbo::{Line, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Drawn thickness of every wall in world units.
pub const WALL_THICKNESS: f64 = 6.0;

/// A straight wall between two endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wall {
    pub(crate) id: ObjectId,
    #[serde(default)]
    pub(crate) layer_id: LayerId,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Wall {
    /// Create a new wall on the nil layer; the document assigns the active layer.
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            layer_id: LayerId::nil(),
            x1: start.x,
            y1: start.y,
            x2: end.x,
            y2: end.y,
        }
    }

    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    pub fn set_start(&mut self, point: Point) {
        self.x1 = point.x;
        self.y1 = point.y;
    }

    pub fn set_end(&mut self, point: Point) {
        self.x2 = point.x;
        self.y2 = point.y;
    }

    pub fn as_line(&self) -> Line {
        Line::new(self.start(), self.end())
    }

    /// Straight-line length in world units.
    pub fn length(&self) -> f64 {
        self.start().distance(self.end())
    }

    /// Whether both endpoints coincide.
    pub fn is_degenerate(&self) -> bool {
        self.length() < f64::EPSILON
    }

    /// Move the end point so the wall has `length`, keeping the start and direction.
    /// Zero-length walls extend along +x.
    pub fn set_length(&mut self, length: f64) {
        let dir = self.end() - self.start();
        let len = dir.hypot();
        let unit = if len < f64::EPSILON {
            Vec2::new(1.0, 0.0)
        } else {
            dir / len
        };
        self.set_end(self.start() + unit * length);
    }
}

impl ObjectTrait for Wall {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn layer_id(&self) -> LayerId {
        self.layer_id
    }

    fn set_layer_id(&mut self, layer_id: LayerId) {
        self.layer_id = layer_id;
    }

    fn bounds(&self) -> Rect {
        let half = WALL_THICKNESS / 2.0;
        Rect::from_points(self.start(), self.end()).inflate(half, half)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        point_to_segment_dist(point, self.start(), self.end()) <= tolerance + WALL_THICKNESS / 2.0
    }

    fn translate(&mut self, delta: Vec2) {
        self.set_start(self.start() + delta);
        self.set_end(self.end() + delta);
    }

    fn reference_point(&self) -> Point {
        self.start()
    }

    fn intersects_box(&self, rect: Rect) -> bool {
        rect_contains_inclusive(rect, self.start()) || rect_contains_inclusive(rect, self.end())
    }
}
