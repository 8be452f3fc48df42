//! Selection state, endpoint handles and the selection overlay model.

use crate::document::FloorPlan;
use crate::objects::{DrawableObject, ObjectId, ObjectTrait, Wall};
use crate::snap::GuideLine;
use kurbo::{Line, Point, Rect};

/// What is currently selected. Single and multi selection are exclusive by
/// construction; `Multi` always holds at least two distinct ids.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Single(ObjectId),
    Multi(Vec<ObjectId>),
}

impl Selection {
    /// Normalize a list of ids (duplicates dropped, order kept).
    pub fn from_ids(ids: impl IntoIterator<Item = ObjectId>) -> Self {
        let mut unique: Vec<ObjectId> = Vec::new();
        for id in ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        match unique.len() {
            0 => Selection::None,
            1 => Selection::Single(unique[0]),
            _ => Selection::Multi(unique),
        }
    }

    pub fn ids(&self) -> Vec<ObjectId> {
        match self {
            Selection::None => Vec::new(),
            Selection::Single(id) => vec![*id],
            Selection::Multi(ids) => ids.clone(),
        }
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        match self {
            Selection::None => false,
            Selection::Single(selected) => *selected == id,
            Selection::Multi(ids) => ids.contains(&id),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Selection::None => 0,
            Selection::Single(_) => 1,
            Selection::Multi(ids) => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::None)
    }

    pub fn single(&self) -> Option<ObjectId> {
        match self {
            Selection::Single(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, Selection::Multi(_))
    }

    /// Add or remove `id`, promoting or demoting between single and multi.
    pub fn toggled(&self, id: ObjectId) -> Self {
        let mut ids = self.ids();
        if let Some(pos) = ids.iter().position(|&s| s == id) {
            ids.remove(pos);
        } else {
            ids.push(id);
        }
        Self::from_ids(ids)
    }

    /// Keep only ids matching the predicate.
    pub fn retained(&self, mut keep: impl FnMut(ObjectId) -> bool) -> Self {
        Self::from_ids(self.ids().into_iter().filter(|&id| keep(id)))
    }
}

/// Draggable endpoint handle of a selected wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    WallStart,
    WallEnd,
}

/// A selection handle with its position and type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub object_id: ObjectId,
    /// Position in world coordinates.
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    /// Check if a point (in world coordinates) hits this handle.
    /// `tolerance` should be adjusted for camera zoom.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        (point - self.position).hypot2() <= tolerance * tolerance
    }
}

/// Both endpoint handles of a wall.
pub fn wall_handles(wall: &Wall) -> [Handle; 2] {
    let object_id = wall.id();
    [
        Handle {
            object_id,
            position: wall.start(),
            kind: HandleKind::WallStart,
        },
        Handle {
            object_id,
            position: wall.end(),
            kind: HandleKind::WallEnd,
        },
    ]
}

/// Shape of a selection highlight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outline {
    /// Walls are outlined along their centre line.
    Segment(Line),
    Box(Rect),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Highlight {
    pub object_id: ObjectId,
    pub outline: Outline,
}

impl Highlight {
    pub fn for_object(obj: &DrawableObject) -> Self {
        let outline = match obj {
            DrawableObject::Wall(wall) => Outline::Segment(wall.as_line()),
            DrawableObject::Rectangle(_) | DrawableObject::Label(_) => Outline::Box(obj.bounds()),
        };
        Self {
            object_id: obj.id(),
            outline,
        }
    }
}

/// Preview of a wall whose endpoint is being dragged.
#[derive(Debug, Clone, PartialEq)]
pub struct GhostWall {
    pub wall: Wall,
    pub length: f64,
}

impl GhostWall {
    pub fn new(wall: Wall) -> Self {
        let length = wall.length();
        Self { wall, length }
    }
}

/// Everything the selection UI draws on top of the plan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionOverlay {
    pub highlights: Vec<Highlight>,
    pub handles: Vec<Handle>,
    /// Dashed union box of a multi selection.
    pub group_box: Option<Rect>,
    pub rubber_band: Option<Rect>,
    pub ghost: Option<GhostWall>,
    /// Alignment guides that fired during the current drag.
    pub guides: Vec<GuideLine>,
}

impl SelectionOverlay {
    /// Build highlights, handles and group box for the current geometry.
    /// Ids that no longer resolve are skipped.
    pub fn build(plan: &FloorPlan, selection: &Selection) -> Self {
        let mut overlay = Self::default();
        let ids = selection.ids();
        for &id in &ids {
            if let Some(obj) = plan.object(id) {
                overlay.highlights.push(Highlight::for_object(obj));
            }
        }
        match selection {
            Selection::Single(id) => {
                if let Some(DrawableObject::Wall(wall)) = plan.object(*id) {
                    overlay.handles.extend(wall_handles(wall));
                }
            }
            Selection::Multi(_) => overlay.group_box = plan.bounds_of(&ids),
            Selection::None => {}
        }
        overlay
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Handle under the point, if any.
    pub fn hit_handle(&self, point: Point, tolerance: f64) -> Option<Handle> {
        self.handles
            .iter()
            .find(|h| h.hit_test(point, tolerance))
            .copied()
    }
}

/// Drag of one whole object.
#[derive(Debug, Clone)]
pub struct MoveState {
    pub object_id: ObjectId,
    pub start_point: Point,
    pub original: DrawableObject,
}

/// Drag of every member of a multi selection by one delta.
#[derive(Debug, Clone)]
pub struct GroupMoveState {
    pub start_point: Point,
    /// Pre-drag copies in master order.
    pub originals: Vec<DrawableObject>,
}

impl GroupMoveState {
    pub fn object_ids(&self) -> Vec<ObjectId> {
        self.originals.iter().map(DrawableObject::id).collect()
    }
}

/// Drag of one wall endpoint; only the ghost changes until release.
#[derive(Debug, Clone)]
pub struct EndpointDragState {
    pub wall_id: ObjectId,
    pub handle: HandleKind,
    pub original: Wall,
    pub ghost: Wall,
}

impl EndpointDragState {
    pub fn new(original: Wall, handle: HandleKind) -> Self {
        Self {
            wall_id: original.id(),
            handle,
            ghost: original.clone(),
            original,
        }
    }

    /// The endpoint that stays put.
    pub fn anchor(&self) -> Point {
        match self.handle {
            HandleKind::WallStart => self.original.end(),
            HandleKind::WallEnd => self.original.start(),
        }
    }

    pub fn move_endpoint(&mut self, point: Point) {
        self.ghost = self.original.clone();
        match self.handle {
            HandleKind::WallStart => self.ghost.set_start(point),
            HandleKind::WallEnd => self.ghost.set_end(point),
        }
    }
}

/// Rubber-band box selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRect {
    pub start: Point,
    pub current: Point,
    /// Started over a locked object; a plain click keeps the
    /// current selection.
    pub keeps_selection: bool,
}

impl SelectionRect {
    pub fn new(start: Point) -> Self {
        Self {
            start,
            current: start,
            keeps_selection: false,
        }
    }

    pub fn to_rect(&self) -> Rect {
        Rect::from_points(self.start, self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::Rectangle;
    use uuid::Uuid;

    #[test]
    fn test_from_ids_shapes() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(Selection::from_ids([]), Selection::None);
        assert_eq!(Selection::from_ids([a, a]), Selection::Single(a));
        assert_eq!(Selection::from_ids([a, b]), Selection::Multi(vec![a, b]));
    }

    #[test]
    fn test_toggle_promotes_and_demotes() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let single = Selection::Single(a);
        let multi = single.toggled(b);
        assert!(multi.is_multi());
        assert_eq!(multi.len(), 2);

        let back = multi.toggled(a);
        assert_eq!(back, Selection::Single(b));
        assert_eq!(back.toggled(b), Selection::None);
    }

    #[test]
    fn test_single_and_multi_never_coexist() {
        let ids: Vec<ObjectId> = (0..4).map(|_| Uuid::new_v4()).collect();
        let mut selection = Selection::None;
        for &id in ids.iter().chain(ids.iter()) {
            selection = selection.toggled(id);
            match &selection {
                Selection::None => {}
                Selection::Single(_) => assert_eq!(selection.len(), 1),
                Selection::Multi(members) => assert!(members.len() >= 2),
            }
        }
        assert!(selection.is_empty());
    }

    #[test]
    fn test_overlay_for_single_wall_has_handles() {
        let mut plan = FloorPlan::new();
        let id = plan.add_object(Wall::new(Point::new(0.0, 0.0), Point::new(50.0, 0.0)).into());
        let overlay = SelectionOverlay::build(&plan, &Selection::Single(id));
        assert_eq!(overlay.highlights.len(), 1);
        assert_eq!(overlay.handles.len(), 2);
        assert!(overlay.group_box.is_none());
        assert!(matches!(overlay.highlights[0].outline, Outline::Segment(_)));
    }

    #[test]
    fn test_overlay_for_multi_has_group_box() {
        let mut plan = FloorPlan::new();
        let a = plan.add_object(Rectangle::new(Point::new(0.0, 0.0), 10.0, 10.0).into());
        let b = plan.add_object(Rectangle::new(Point::new(20.0, 20.0), 10.0, 10.0).into());
        let overlay = SelectionOverlay::build(&plan, &Selection::from_ids([a, b]));
        assert!(overlay.handles.is_empty());
        assert_eq!(overlay.group_box, Some(Rect::new(0.0, 0.0, 30.0, 30.0)));
    }

    #[test]
    fn test_overlay_skips_missing_objects() {
        let plan = FloorPlan::new();
        let overlay = SelectionOverlay::build(&plan, &Selection::Single(Uuid::new_v4()));
        assert!(overlay.is_empty());
    }

    #[test]
    fn test_endpoint_drag_moves_ghost_only() {
        let wall = Wall::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        let mut drag = EndpointDragState::new(wall.clone(), HandleKind::WallEnd);
        drag.move_endpoint(Point::new(30.0, 40.0));
        assert_eq!(drag.ghost.end(), Point::new(30.0, 40.0));
        assert_eq!(drag.original, wall);
        assert_eq!(drag.anchor(), Point::new(0.0, 0.0));
    }
}
