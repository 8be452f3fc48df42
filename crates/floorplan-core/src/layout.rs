//! Persisted layout format.

use crate::document::{DEFAULT_SCALE, FloorPlan};
use crate::error::LayoutError;
use crate::layers::{Layer, LayerId};
use crate::objects::DrawableObject;
use serde::{Deserialize, Serialize};

/// Newest layout version this build reads and the one it writes.
pub const LAYOUT_VERSION: u32 = 1;

fn default_version() -> u32 {
    LAYOUT_VERSION
}

fn default_scale() -> f64 {
    DEFAULT_SCALE
}

/// Serialized form of a [`FloorPlan`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDocument {
    #[serde(default = "default_version")]
    pub version: u32,
    /// World units per metre.
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub layers: Vec<Layer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_layer_id: Option<LayerId>,
    #[serde(default)]
    pub objects: Vec<DrawableObject>,
}

impl LayoutDocument {
    /// Parse a layout, rejecting versions newer than [`LAYOUT_VERSION`].
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        let doc: Self = serde_json::from_str(json)?;
        if doc.version > LAYOUT_VERSION {
            return Err(LayoutError::UnsupportedVersion {
                found: doc.version,
                supported: LAYOUT_VERSION,
            });
        }
        Ok(doc)
    }

    pub fn to_json(&self) -> Result<String, LayoutError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl FloorPlan {
    /// Build a plan from a loaded layout. Missing layers get a default layer
    /// and objects without a valid layer join it.
    pub fn from_layout(doc: LayoutDocument) -> Self {
        let scale = if doc.scale.is_finite() && doc.scale > 0.0 {
            doc.scale
        } else {
            log::warn!("Layout scale {} is invalid, using {DEFAULT_SCALE}", doc.scale);
            DEFAULT_SCALE
        };
        let plan = Self::from_parts(doc.objects, doc.layers, doc.active_layer_id, scale);
        log::info!(
            "Loaded layout with {} objects on {} layers",
            plan.len(),
            plan.layers().len()
        );
        plan
    }

    pub fn to_layout(&self) -> LayoutDocument {
        LayoutDocument {
            version: LAYOUT_VERSION,
            scale: self.scale,
            layers: self.layers.clone(),
            active_layer_id: Some(self.active_layer_id),
            objects: self.objects.clone(),
        }
    }
}
