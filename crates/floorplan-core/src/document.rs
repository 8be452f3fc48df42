//! The floor plan document: objects, layers and the active layer.

use crate::error::EditError;
use crate::layers::{Layer, LayerId, sort_by_order};
use crate::objects::{DrawableObject, ObjectId};
use kurbo::{Point, Rect};

/// Default world units per metre for new documents.
pub const DEFAULT_SCALE: f64 = 100.0;

/// Owned aggregate of everything that gets drawn and persisted.
///
/// Invariants (restored by [`FloorPlan::normalize`]):
/// * at least one layer exists,
/// * `active_layer_id` names an existing layer,
/// * every object's layer id names an existing layer.
#[derive(Debug, Clone, PartialEq)]
pub struct FloorPlan {
    /// Master list; also the z-order tiebreaker within a layer.
    pub(crate) objects: Vec<DrawableObject>,
    pub(crate) layers: Vec<Layer>,
    pub(crate) active_layer_id: LayerId,
    /// World units per metre.
    pub scale: f64,
}

impl Default for FloorPlan {
    fn default() -> Self {
        Self::new()
    }
}

impl FloorPlan {
    /// Create an empty plan with a single default layer.
    pub fn new() -> Self {
        let layer = Layer::default();
        Self {
            objects: Vec::new(),
            active_layer_id: layer.id,
            layers: vec![layer],
            scale: DEFAULT_SCALE,
        }
    }

    /// Build a plan from raw parts and repair any broken invariant.
    pub fn from_parts(
        objects: Vec<DrawableObject>,
        layers: Vec<Layer>,
        active_layer_id: Option<LayerId>,
        scale: f64,
    ) -> Self {
        let mut plan = Self {
            objects,
            layers,
            active_layer_id: active_layer_id.unwrap_or_else(LayerId::nil),
            scale,
        };
        plan.normalize();
        plan
    }

    // --- Layers ---

    /// Layers in list order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Layers sorted bottom to top.
    pub fn layers_ordered(&self) -> Vec<&Layer> {
        let mut layers: Vec<&Layer> = self.layers.iter().collect();
        layers.sort_by(|a, b| a.order.total_cmp(&b.order));
        layers
    }

    pub fn layer_by_id(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    fn layer_by_id_mut(&mut self, id: LayerId) -> Result<&mut Layer, EditError> {
        self.layers
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(EditError::LayerNotFound)
    }

    pub fn active_layer_id(&self) -> LayerId {
        self.active_layer_id
    }

    pub fn active_layer(&self) -> &Layer {
        // At least one layer always exists.
        self.layer_by_id(self.active_layer_id)
            .unwrap_or_else(|| &self.layers[0])
    }

    pub fn is_layer_editable(&self, id: LayerId) -> bool {
        self.layer_by_id(id).is_some_and(Layer::is_editable)
    }

    pub fn is_layer_visible(&self, id: LayerId) -> bool {
        self.layer_by_id(id).is_some_and(|l| l.visible)
    }

    /// The lowest layer by order; orphaned objects are moved here.
    fn bottom_layer_id(&self) -> Option<LayerId> {
        self.layers
            .iter()
            .min_by(|a, b| a.order.total_cmp(&b.order))
            .map(|l| l.id)
    }

    /// Add a layer above all others and make it active.
    pub fn add_layer(&mut self, name: impl Into<String>) -> LayerId {
        let order = self
            .layers
            .iter()
            .map(|l| l.order)
            .fold(f64::NEG_INFINITY, f64::max);
        let order = if order.is_finite() { order + 1.0 } else { 0.0 };
        let layer = Layer::new(name, order);
        let id = layer.id;
        self.layers.push(layer);
        self.active_layer_id = id;
        log::debug!("Added layer {id}");
        id
    }

    /// Next free default layer name ("Layer N").
    pub fn next_layer_name(&self) -> String {
        let mut n = self.layers.len() + 1;
        loop {
            let name = format!("Layer {n}");
            if !self.layers.iter().any(|l| l.name == name) {
                return name;
            }
            n += 1;
        }
    }

    /// Remove a layer, moving its objects to the neighbouring layer (below, else above).
    /// Returns the layer that received them.
    pub fn remove_layer(&mut self, id: LayerId) -> Result<LayerId, EditError> {
        if self.layer_by_id(id).is_none() {
            return Err(EditError::LayerNotFound);
        }
        if self.layers.len() <= 1 {
            return Err(EditError::LastLayer);
        }

        let ordered: Vec<LayerId> = self.layers_ordered().iter().map(|l| l.id).collect();
        let pos = ordered.iter().position(|&l| l == id).unwrap_or(0);
        let target = if pos > 0 {
            ordered[pos - 1]
        } else {
            ordered[pos + 1]
        };

        let mut moved = 0;
        for obj in self.objects.iter_mut().filter(|o| o.layer_id() == id) {
            obj.set_layer_id(target);
            moved += 1;
        }
        self.layers.retain(|l| l.id != id);
        if self.active_layer_id == id {
            self.active_layer_id = target;
        }
        log::debug!("Removed layer {id}, reassigned {moved} objects to {target}");
        Ok(target)
    }

    pub fn rename_layer(&mut self, id: LayerId, name: impl Into<String>) -> Result<(), EditError> {
        self.layer_by_id_mut(id)?.name = name.into();
        Ok(())
    }

    pub fn set_layer_visible(&mut self, id: LayerId, visible: bool) -> Result<(), EditError> {
        self.layer_by_id_mut(id)?.visible = visible;
        Ok(())
    }

    /// Returns the new visibility.
    pub fn toggle_layer_visible(&mut self, id: LayerId) -> Result<bool, EditError> {
        let layer = self.layer_by_id_mut(id)?;
        layer.visible = !layer.visible;
        Ok(layer.visible)
    }

    pub fn set_layer_locked(&mut self, id: LayerId, locked: bool) -> Result<(), EditError> {
        self.layer_by_id_mut(id)?.locked = locked;
        Ok(())
    }

    /// Returns the new lock state.
    pub fn toggle_layer_locked(&mut self, id: LayerId) -> Result<bool, EditError> {
        let layer = self.layer_by_id_mut(id)?;
        layer.locked = !layer.locked;
        Ok(layer.locked)
    }

    /// Swap order with the layer directly above. Returns false if already on top.
    pub fn move_layer_up(&mut self, id: LayerId) -> Result<bool, EditError> {
        self.shift_layer(id, true)
    }

    /// Swap order with the layer directly below. Returns false if already at the bottom.
    pub fn move_layer_down(&mut self, id: LayerId) -> Result<bool, EditError> {
        self.shift_layer(id, false)
    }

    fn shift_layer(&mut self, id: LayerId, up: bool) -> Result<bool, EditError> {
        if self.layer_by_id(id).is_none() {
            return Err(EditError::LayerNotFound);
        }
        // Equal orders cannot be swapped meaningfully; renumber first.
        self.renumber_layers();
        let ordered: Vec<LayerId> = self.layers_ordered().iter().map(|l| l.id).collect();
        let Some(pos) = ordered.iter().position(|&l| l == id) else {
            return Err(EditError::LayerNotFound);
        };
        let neighbour = if up {
            ordered.get(pos + 1).copied()
        } else {
            pos.checked_sub(1).map(|p| ordered[p])
        };
        let Some(neighbour) = neighbour else {
            return Ok(false);
        };

        let a = self.layer_by_id(id).map(|l| l.order).unwrap_or_default();
        let b = self.layer_by_id(neighbour).map(|l| l.order).unwrap_or_default();
        self.layer_by_id_mut(id)?.order = b;
        self.layer_by_id_mut(neighbour)?.order = a;
        Ok(true)
    }

    /// Rewrite orders to 0..n keeping the current relative ordering.
    fn renumber_layers(&mut self) {
        sort_by_order(&mut self.layers);
        for (i, layer) in self.layers.iter_mut().enumerate() {
            layer.order = i as f64;
        }
    }

    pub fn set_active_layer(&mut self, id: LayerId) -> Result<(), EditError> {
        if self.layer_by_id(id).is_none() {
            return Err(EditError::LayerNotFound);
        }
        self.active_layer_id = id;
        Ok(())
    }

    // --- Objects ---

    /// Objects in master-list order.
    pub fn objects(&self) -> &[DrawableObject] {
        &self.objects
    }

    pub fn object(&self, id: ObjectId) -> Option<&DrawableObject> {
        self.objects.iter().find(|o| o.id() == id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut DrawableObject> {
        self.objects.iter_mut().find(|o| o.id() == id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.object(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// False if the object is missing or its layer is hidden or locked.
    pub fn is_object_editable(&self, id: ObjectId) -> bool {
        self.object(id)
            .is_some_and(|o| self.is_layer_editable(o.layer_id()))
    }

    /// Append an object. Objects without a known layer join the active layer.
    pub fn add_object(&mut self, mut object: DrawableObject) -> ObjectId {
        if self.layer_by_id(object.layer_id()).is_none() {
            object.set_layer_id(self.active_layer().id);
        }
        let id = object.id();
        self.objects.push(object);
        id
    }

    pub fn remove_object(&mut self, id: ObjectId) -> Option<DrawableObject> {
        let pos = self.objects.iter().position(|o| o.id() == id)?;
        Some(self.objects.remove(pos))
    }

    pub fn retain_objects(&mut self, keep: impl FnMut(&DrawableObject) -> bool) {
        self.objects.retain(keep);
    }

    /// Objects on visible layers in paint order: layers bottom to top with
    /// master order inside a layer, all labels after everything else.
    pub fn visible_objects(&self) -> Vec<&DrawableObject> {
        let mut visible: Vec<&DrawableObject> = self
            .objects
            .iter()
            .filter(|o| self.is_layer_visible(o.layer_id()))
            .collect();
        let order = |obj: &DrawableObject| {
            self.layer_by_id(obj.layer_id())
                .map(|l| l.order)
                .unwrap_or_default()
        };
        // Stable sort keeps master order for equal keys.
        visible.sort_by(|a, b| {
            a.is_label()
                .cmp(&b.is_label())
                .then_with(|| order(a).total_cmp(&order(b)))
        });
        visible
    }

    /// Visible objects under a point, front-most first.
    pub fn objects_at_point(&self, point: Point, tolerance: f64) -> Vec<ObjectId> {
        self.visible_objects()
            .into_iter()
            .rev()
            .filter(|o| o.hit_test(point, tolerance))
            .map(|o| o.id())
            .collect()
    }

    /// Editable objects matching the box-selection rule, in master order.
    pub fn objects_in_box(&self, rect: Rect) -> Vec<ObjectId> {
        self.objects
            .iter()
            .filter(|o| self.is_layer_editable(o.layer_id()) && o.intersects_box(rect))
            .map(|o| o.id())
            .collect()
    }

    /// Endpoints of walls on visible layers, skipping the excluded objects.
    pub fn wall_endpoints(&self, exclude: &[ObjectId]) -> Vec<Point> {
        self.objects
            .iter()
            .filter(|o| !exclude.contains(&o.id()) && self.is_layer_visible(o.layer_id()))
            .flat_map(|o| o.vertices())
            .collect()
    }

    /// Union bounds of all objects.
    pub fn bounds(&self) -> Option<Rect> {
        self.objects
            .iter()
            .map(DrawableObject::bounds)
            .reduce(|acc, b| acc.union(b))
    }

    /// Union bounds of the given objects (missing ids are skipped).
    pub fn bounds_of(&self, ids: &[ObjectId]) -> Option<Rect> {
        ids.iter()
            .filter_map(|&id| self.object(id))
            .map(DrawableObject::bounds)
            .reduce(|acc, b| acc.union(b))
    }

    /// Restore every invariant: a layer exists, the active layer exists and
    /// every object sits on an existing layer.
    pub fn normalize(&mut self) {
        if self.layers.is_empty() {
            log::info!("Plan has no layers, adding a default layer");
            self.layers.push(Layer::default());
        }
        let Some(fallback) = self.bottom_layer_id() else {
            return;
        };
        if self.layer_by_id(self.active_layer_id).is_none() {
            self.active_layer_id = fallback;
        }

        let mut repaired = 0;
        for i in 0..self.objects.len() {
            let layer = self.objects[i].layer_id();
            if self.layer_by_id(layer).is_none() {
                self.objects[i].set_layer_id(fallback);
                repaired += 1;
            }
        }
        if repaired > 0 {
            log::info!("Moved {repaired} orphaned objects to layer {fallback}");
        }
    }

    /// Check the layer invariants without modifying anything.
    pub fn is_consistent(&self) -> bool {
        !self.layers.is_empty()
            && self.layer_by_id(self.active_layer_id).is_some()
            && self
                .objects
                .iter()
                .all(|o| self.layer_by_id(o.layer_id()).is_some())
    }
}
