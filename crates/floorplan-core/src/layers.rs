//! Layers group objects for visibility, locking and paint order.
//!
//! Layers with a higher `order` paint above lower ones; objects inside a
//! layer keep the document's master-list order.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Layer identifier.
pub type LayerId = Uuid;

/// A named, orderable group of objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    /// Only the relative ordering matters; values need not be contiguous.
    #[serde(default)]
    pub order: f64,
}

fn default_true() -> bool {
    true
}

impl Layer {
    pub const DEFAULT_NAME: &'static str = "Layer 1";

    pub fn new(name: impl Into<String>, order: f64) -> Self {
        Self::with_id(Uuid::new_v4(), name, order)
    }

    pub fn with_id(id: LayerId, name: impl Into<String>, order: f64) -> Self {
        Self {
            id,
            name: name.into(),
            visible: true,
            locked: false,
            order,
        }
    }

    /// Objects on this layer can be selected and modified.
    pub fn is_editable(&self) -> bool {
        self.visible && !self.locked
    }
}

impl Default for Layer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_NAME, 0.0)
    }
}

/// Sort layers bottom to top; ties keep their list position.
pub fn sort_by_order(layers: &mut [Layer]) {
    layers.sort_by(|a, b| a.order.total_cmp(&b.order));
}
