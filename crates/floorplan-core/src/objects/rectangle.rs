//! Axis-aligned rectangle.

use super::{ObjectId, ObjectTrait, RgbaColor, rect_contains_inclusive, rects_overlap};
use crate::layers::LayerId;
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn default_stroke_width() -> f64 {
    Rectangle::DEFAULT_STROKE_WIDTH
}

/// An axis-aligned box (rooms, furniture footprints).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rectangle {
    pub(crate) id: ObjectId,
    #[serde(default)]
    pub(crate) layer_id: LayerId,
    /// Top-left corner.
    pub x: f64,
    pub y: f64,
    /// Always non-negative.
    pub width: f64,
    pub height: f64,
    #[serde(default = "RgbaColor::charcoal")]
    pub stroke: RgbaColor,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
    /// `None` draws the outline only.
    #[serde(default)]
    pub fill: Option<RgbaColor>,
}

impl Rectangle {
    pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;

    /// Create a new rectangle. Negative extents move the origin instead.
    pub fn new(position: Point, width: f64, height: f64) -> Self {
        let mut rect = Self {
            id: Uuid::new_v4(),
            layer_id: LayerId::nil(),
            x: position.x,
            y: position.y,
            width,
            height,
            stroke: RgbaColor::charcoal(),
            stroke_width: Self::DEFAULT_STROKE_WIDTH,
            fill: None,
        };
        rect.normalize();
        rect
    }

    /// Create a rectangle from two opposite corners.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        let rect = Rect::from_points(p1, p2);
        Self::new(rect.origin(), rect.width(), rect.height())
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn as_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Zero width or height.
    pub fn is_degenerate(&self) -> bool {
        self.width < f64::EPSILON || self.height < f64::EPSILON
    }

    /// Set the size, keeping the top-left corner.
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.normalize();
    }

    fn normalize(&mut self) {
        if self.width < 0.0 {
            self.x += self.width;
            self.width = -self.width;
        }
        if self.height < 0.0 {
            self.y += self.height;
            self.height = -self.height;
        }
    }
}

impl ObjectTrait for Rectangle {
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
        self.as_rect()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let rect = self.as_rect();
        let band = tolerance + self.stroke_width / 2.0;
        if self.fill.is_some() {
            // Filled: hit anywhere inside
            let outer = rect.inflate(band, band);
            rect_contains_inclusive(outer, point)
        } else {
            // Outline only: hit on the border
            let outer = rect.inflate(band, band);
            let inner = rect.inflate(-band, -band);
            let inside_inner = inner.width() > 0.0
                && inner.height() > 0.0
                && inner.contains(point);
            rect_contains_inclusive(outer, point) && !inside_inner
        }
    }

    fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    fn reference_point(&self) -> Point {
        self.origin()
    }

    fn intersects_box(&self, rect: Rect) -> bool {
        rects_overlap(self.as_rect(), rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_from_corners() {
        let rect = Rectangle::from_corners(Point::new(100.0, 80.0), Point::new(20.0, 10.0));
        assert_eq!(rect.origin(), Point::new(20.0, 10.0));
        assert!((rect.width - 80.0).abs() < f64::EPSILON);
        assert!((rect.height - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_negative_extents_normalized() {
        let rect = Rectangle::new(Point::new(50.0, 50.0), -20.0, -10.0);
        assert_eq!(rect.origin(), Point::new(30.0, 40.0));
        assert!((rect.width - 20.0).abs() < f64::EPSILON);
        assert!((rect.height - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_outline_hit_test() {
        let rect = Rectangle::new(Point::new(0.0, 0.0), 100.0, 100.0);
        assert!(rect.hit_test(Point::new(0.0, 50.0), 2.0));
        assert!(!rect.hit_test(Point::new(50.0, 50.0), 2.0));
        assert!(!rect.hit_test(Point::new(150.0, 50.0), 2.0));
    }

    #[test]
    fn test_filled_hit_test() {
        let mut rect = Rectangle::new(Point::new(0.0, 0.0), 100.0, 100.0);
        rect.fill = Some(RgbaColor::white());
        assert!(rect.hit_test(Point::new(50.0, 50.0), 0.0));
    }

    #[test]
    fn test_box_overlap() {
        let rect = Rectangle::new(Point::new(0.0, 0.0), 10.0, 10.0);
        assert!(rect.intersects_box(Rect::new(5.0, 5.0, 50.0, 50.0)));
        assert!(rect.intersects_box(Rect::new(10.0, 0.0, 20.0, 5.0)));
        assert!(!rect.intersects_box(Rect::new(11.0, 0.0, 20.0, 5.0)));
    }

    #[test]
    fn test_degenerate() {
        assert!(Rectangle::new(Point::ZERO, 0.0, 10.0).is_degenerate());
        assert!(!Rectangle::new(Point::ZERO, 1.0, 1.0).is_degenerate());
    }

    #[test]
    fn test_missing_style_fields_default() {
        let json = r#"{"id":"00000000-0000-0000-0000-000000000001","x":1,"y":2,"width":3,"height":4}"#;
        let rect: Rectangle = serde_json::from_str(json).unwrap();
        assert_eq!(rect.stroke, RgbaColor::charcoal());
        assert!(rect.fill.is_none());
        assert!(rect.layer_id().is_nil());
    }
}
