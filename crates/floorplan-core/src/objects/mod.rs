//! Drawable object definitions for the floor plan.

mod label;
mod rectangle;
mod wall;

pub use label::{FontStyle, Label};
pub use rectangle::Rectangle;
pub use wall::{WALL_THICKNESS, Wall};

use crate::layers::LayerId;
use kurbo::{Point, Rect, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for drawable objects.
pub type ObjectId = Uuid;

/// RGBA8 color stored as a `#rrggbb` / `#rrggbbaa` string in layout files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RgbaColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl RgbaColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    /// Dark grey used for new rectangle strokes and labels.
    pub const fn charcoal() -> Self {
        Self::new(51, 51, 51, 255)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn parse_hex(text: &str) -> Option<Self> {
        let hex = text.trim().strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        match hex.len() {
            3 => {
                // Each nibble expands to a full byte (#abc -> #aabbcc).
                let r = channel(0..1)? * 17;
                let g = channel(1..2)? * 17;
                let b = channel(2..3)? * 17;
                Some(Self::new(r, g, b, 255))
            }
            6 => Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?, 255)),
            8 => Some(Self::new(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => None,
        }
    }
}

impl fmt::Display for RgbaColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl TryFrom<String> for RgbaColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_hex(&value).ok_or_else(|| format!("invalid color: {value}"))
    }
}

impl From<RgbaColor> for String {
    fn from(color: RgbaColor) -> Self {
        color.to_string()
    }
}

impl From<Color> for RgbaColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl From<RgbaColor> for Color {
    fn from(color: RgbaColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    point.distance(closest_point_on_segment(point, a, b))
}

/// Closest point to `point` on the segment a→b.
pub fn closest_point_on_segment(point: Point, a: Point, b: Point) -> Point {
    let seg = b - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return a;
    }
    let t = ((point - a).dot(seg) / len_sq).clamp(0.0, 1.0);
    a + seg * t
}

/// Inclusive point-in-rect test (kurbo's `contains` excludes the far edges).
pub fn rect_contains_inclusive(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// Inclusive overlap test between two rectangles (touching edges count).
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && a.x1 >= b.x0 && a.y0 <= b.y1 && a.y1 >= b.y0
}

/// Common behaviour of every drawable variant.
pub trait ObjectTrait {
    /// Get the unique identifier.
    fn id(&self) -> ObjectId;

    /// Get the owning layer.
    fn layer_id(&self) -> LayerId;

    /// Move the object to another layer.
    fn set_layer_id(&mut self, layer_id: LayerId);

    /// Get the bounding box in world coordinates.
    fn bounds(&self) -> Rect;

    /// Check if a point (in world coordinates) hits this object.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool;

    /// Translate the object by a world-space delta.
    fn translate(&mut self, delta: Vec2);

    /// The point that is snapped while the whole object is dragged.
    fn reference_point(&self) -> Point;

    /// Box-selection rule for this variant.
    fn intersects_box(&self, rect: Rect) -> bool;
}

/// Closed union over everything that can be drawn on the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DrawableObject {
    Wall(Wall),
    Rectangle(Rectangle),
    Label(Label),
}

impl DrawableObject {
    pub fn id(&self) -> ObjectId {
        match self {
            DrawableObject::Wall(o) => o.id(),
            DrawableObject::Rectangle(o) => o.id(),
            DrawableObject::Label(o) => o.id(),
        }
    }

    pub fn layer_id(&self) -> LayerId {
        match self {
            DrawableObject::Wall(o) => o.layer_id(),
            DrawableObject::Rectangle(o) => o.layer_id(),
            DrawableObject::Label(o) => o.layer_id(),
        }
    }

    pub fn set_layer_id(&mut self, layer_id: LayerId) {
        match self {
            DrawableObject::Wall(o) => o.set_layer_id(layer_id),
            DrawableObject::Rectangle(o) => o.set_layer_id(layer_id),
            DrawableObject::Label(o) => o.set_layer_id(layer_id),
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            DrawableObject::Wall(o) => o.bounds(),
            DrawableObject::Rectangle(o) => o.bounds(),
            DrawableObject::Label(o) => o.bounds(),
        }
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        match self {
            DrawableObject::Wall(o) => o.hit_test(point, tolerance),
            DrawableObject::Rectangle(o) => o.hit_test(point, tolerance),
            DrawableObject::Label(o) => o.hit_test(point, tolerance),
        }
    }

    pub fn translate(&mut self, delta: Vec2) {
        match self {
            DrawableObject::Wall(o) => o.translate(delta),
            DrawableObject::Rectangle(o) => o.translate(delta),
            DrawableObject::Label(o) => o.translate(delta),
        }
    }

    pub fn reference_point(&self) -> Point {
        match self {
            DrawableObject::Wall(o) => o.reference_point(),
            DrawableObject::Rectangle(o) => o.reference_point(),
            DrawableObject::Label(o) => o.reference_point(),
        }
    }

    pub fn intersects_box(&self, rect: Rect) -> bool {
        match self {
            DrawableObject::Wall(o) => o.intersects_box(rect),
            DrawableObject::Rectangle(o) => o.intersects_box(rect),
            DrawableObject::Label(o) => o.intersects_box(rect),
        }
    }

    /// Wall endpoints usable as vertex snap targets (empty for other variants).
    pub fn vertices(&self) -> Vec<Point> {
        match self {
            DrawableObject::Wall(w) => vec![w.start(), w.end()],
            DrawableObject::Rectangle(_) | DrawableObject::Label(_) => Vec::new(),
        }
    }

    /// Whether this object paints in the label pass.
    pub fn is_label(&self) -> bool {
        matches!(self, DrawableObject::Label(_))
    }

    pub fn as_wall(&self) -> Option<&Wall> {
        match self {
            DrawableObject::Wall(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_wall_mut(&mut self) -> Option<&mut Wall> {
        match self {
            DrawableObject::Wall(w) => Some(w),
            _ => None,
        }
    }

    /// Short human-readable kind, used in status messages and logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            DrawableObject::Wall(_) => "wall",
            DrawableObject::Rectangle(_) => "rectangle",
            DrawableObject::Label(_) => "label",
        }
    }

    /// Replace the id with a new unique identifier.
    /// Used when pasting so copies never collide with their originals.
    pub fn regenerate_id(&mut self) {
        let new_id = Uuid::new_v4();
        match self {
            DrawableObject::Wall(o) => o.id = new_id,
            DrawableObject::Rectangle(o) => o.id = new_id,
            DrawableObject::Label(o) => o.id = new_id,
        }
    }

    /// Deep clone with a new id.
    pub fn with_fresh_id(&self) -> Self {
        let mut copy = self.clone();
        copy.regenerate_id();
        copy
    }
}

impl From<Wall> for DrawableObject {
    fn from(wall: Wall) -> Self {
        DrawableObject::Wall(wall)
    }
}

impl From<Rectangle> for DrawableObject {
    fn from(rect: Rectangle) -> Self {
        DrawableObject::Rectangle(rect)
    }
}

impl From<Label> for DrawableObject {
    fn from(label: Label) -> Self {
        DrawableObject::Label(label)
    }
}
