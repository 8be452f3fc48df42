//! Undo/redo with full snapshots of the plan.
//!
//! A snapshot holds the object list, the layer list and the active layer, so
//! layer edits undo the same way geometry edits do. Call
//! [`History::snapshot`] before every mutation.

use crate::document::FloorPlan;
use crate::layers::{Layer, LayerId};
use crate::objects::DrawableObject;
use std::collections::VecDeque;

/// Default number of undo states to keep.
pub const MAX_UNDO_HISTORY: usize = 50;

/// Deep copy of the undoable part of a plan.
#[derive(Debug, Clone, PartialEq)]
struct PlanSnapshot {
    objects: Vec<DrawableObject>,
    layers: Vec<Layer>,
    active_layer_id: LayerId,
}

impl PlanSnapshot {
    fn capture(plan: &FloorPlan) -> Self {
        Self {
            objects: plan.objects.clone(),
            layers: plan.layers.clone(),
            active_layer_id: plan.active_layer_id,
        }
    }

    fn restore(self, plan: &mut FloorPlan) {
        plan.objects = self.objects;
        plan.layers = self.layers;
        plan.active_layer_id = self.active_layer_id;
    }
}

/// Bounded undo stack plus redo stack.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: VecDeque<PlanSnapshot>,
    redo_stack: Vec<PlanSnapshot>,
    max_history: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(MAX_UNDO_HISTORY)
    }
}

impl History {
    pub fn new(max_history: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_history: max_history.max(1),
        }
    }

    /// Push the current (pre-mutation) state and clear redo.
    pub fn snapshot(&mut self, plan: &FloorPlan) {
        self.undo_stack.push_back(PlanSnapshot::capture(plan));
        self.redo_stack.clear();

        while self.undo_stack.len() > self.max_history {
            self.undo_stack.pop_front();
        }
        log::trace!("Snapshot pushed ({} undo states)", self.undo_stack.len());
    }

    /// Undo the last change.
    /// Returns true if undo was performed, false if nothing to undo.
    pub fn undo(&mut self, plan: &mut FloorPlan) -> bool {
        let Some(previous) = self.undo_stack.pop_back() else {
            return false;
        };
        self.redo_stack.push(PlanSnapshot::capture(plan));
        previous.restore(plan);
        true
    }

    /// Redo the last undone change.
    /// Returns true if redo was performed, false if nothing to redo.
    pub fn redo(&mut self, plan: &mut FloorPlan) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        self.undo_stack.push_back(PlanSnapshot::capture(plan));
        next.restore(plan);
        true
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Drop all history, e.g. after loading another plan.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::Wall;
    use kurbo::{Point, Vec2};

    fn plan_with_wall() -> (FloorPlan, crate::objects::ObjectId) {
        let mut plan = FloorPlan::new();
        let id = plan.add_object(Wall::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0)).into());
        (plan, id)
    }

    #[test]
    fn test_undo_redo_roundtrip() {
        let (mut plan, id) = plan_with_wall();
        let mut history = History::default();

        history.snapshot(&plan);
        if let Some(obj) = plan.object_mut(id) {
            obj.translate(Vec2::new(5.0, 5.0));
        }
        let mutated = plan.clone();

        assert!(history.undo(&mut plan));
        assert_ne!(plan, mutated);
        assert!(history.redo(&mut plan));
        assert_eq!(plan, mutated);
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let (mut plan, _) = plan_with_wall();
        let before = plan.clone();
        let mut history = History::default();
        assert!(!history.undo(&mut plan));
        assert!(!history.redo(&mut plan));
        assert_eq!(plan, before);
    }

    #[test]
    fn test_snapshot_clears_redo() {
        let (mut plan, _) = plan_with_wall();
        let mut history = History::default();
        history.snapshot(&plan);
        plan.add_layer("Two");
        assert!(history.undo(&mut plan));
        assert!(history.can_redo());

        history.snapshot(&plan);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_oldest_evicted() {
        let (mut plan, id) = plan_with_wall();
        let mut history = History::new(3);
        for _ in 0..5 {
            history.snapshot(&plan);
            if let Some(w) = plan.object_mut(id).and_then(|o| o.as_wall_mut()) {
                w.x2 += 1.0;
            }
        }
        assert_eq!(history.undo_len(), 3);
        while history.undo(&mut plan) {}
        // Two oldest states are gone: x2 went 10 -> 15, we can only get back to 12.
        assert_eq!(plan.object(id).and_then(|o| o.as_wall()).map(|w| w.x2), Some(12.0));
    }

    #[test]
    fn test_layer_changes_are_undoable() {
        let mut plan = FloorPlan::new();
        let mut history = History::default();
        let original = plan.clone();

        history.snapshot(&plan);
        let layer = plan.add_layer("Furniture");
        history.snapshot(&plan);
        plan.toggle_layer_locked(layer).unwrap();

        assert!(history.undo(&mut plan));
        assert_eq!(plan.layer_by_id(layer).map(|l| l.locked), Some(false));
        assert!(history.undo(&mut plan));
        assert_eq!(plan, original);
    }
}
