//! Text label.

use super::{ObjectId, ObjectTrait, RgbaColor, rect_contains_inclusive};
use crate::layers::LayerId;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Font style options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontStyle {
    #[default]
    Normal,
    Bold,
    Italic,
    BoldItalic,
}

impl FontStyle {
    pub fn is_bold(&self) -> bool {
        matches!(self, FontStyle::Bold | FontStyle::BoldItalic)
    }

    pub fn is_italic(&self) -> bool {
        matches!(self, FontStyle::Italic | FontStyle::BoldItalic)
    }
}

fn default_font_size() -> f64 {
    Label::DEFAULT_FONT_SIZE
}

/// A text anchor on the plan (room names, notes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub(crate) id: ObjectId,
    #[serde(default)]
    pub(crate) layer_id: LayerId,
    /// Top-left of the text box.
    pub x: f64,
    pub y: f64,
    pub content: String,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "RgbaColor::charcoal")]
    pub color: RgbaColor,
    #[serde(default)]
    pub font_style: FontStyle,
}

impl Label {
    pub const DEFAULT_FONT_SIZE: f64 = 16.0;

    /// Average glyph advance as a fraction of the font size.
    const CHAR_WIDTH_RATIO: f64 = 0.6;
    const LINE_HEIGHT_RATIO: f64 = 1.2;

    pub fn new(position: Point, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            layer_id: LayerId::nil(),
            x: position.x,
            y: position.y,
            content: content.into(),
            font_size: Self::DEFAULT_FONT_SIZE,
            color: RgbaColor::charcoal(),
            font_style: FontStyle::Normal,
        }
    }

    pub fn anchor(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Approximate text extent; the real metrics live in the painting backend.
    pub fn approximate_size(&self) -> (f64, f64) {
        let mut ratio = Self::CHAR_WIDTH_RATIO;
        if self.font_style.is_bold() {
            ratio *= 1.1;
        }
        let widest = self
            .content
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0)
            .max(1);
        let lines = self.content.lines().count().max(1);
        (
            widest as f64 * self.font_size * ratio,
            lines as f64 * self.font_size * Self::LINE_HEIGHT_RATIO,
        )
    }
}

impl ObjectTrait for Label {
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
        let (width, height) = self.approximate_size();
        Rect::new(self.x, self.y, self.x + width, self.y + height)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        rect_contains_inclusive(self.bounds().inflate(tolerance, tolerance), point)
    }

    fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    fn reference_point(&self) -> Point {
        self.anchor()
    }

    fn intersects_box(&self, rect: Rect) -> bool {
        rect_contains_inclusive(rect, self.anchor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_bounds_grow_with_lines() {
        let single = Label::new(Point::ZERO, "Hall");
        let double = Label::new(Point::ZERO, "Hall\nWay");
        assert!(double.bounds().height() > single.bounds().height());
        assert!((single.bounds().x0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_label_still_hittable() {
        let label = Label::new(Point::new(10.0, 10.0), "");
        assert!(label.hit_test(Point::new(12.0, 12.0), 0.0));
    }

    #[test]
    fn test_label_box_rule_uses_anchor() {
        let label = Label::new(Point::new(10.0, 10.0), "A very long room name");
        assert!(label.intersects_box(Rect::new(0.0, 0.0, 10.0, 10.0)));
        assert!(!label.intersects_box(Rect::new(50.0, 0.0, 300.0, 100.0)));
    }

    #[test]
    fn test_font_style_serde() {
        let json = serde_json::to_string(&FontStyle::BoldItalic).unwrap();
        assert_eq!(json, "\"bold-italic\"");
        assert!(FontStyle::BoldItalic.is_bold());
        assert!(FontStyle::BoldItalic.is_italic());
        assert!(!FontStyle::Italic.is_bold());
    }
}
