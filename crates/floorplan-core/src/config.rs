//! Editor tuning knobs.
//!
//! Pixel values are screen pixels and get divided by the (clamped) zoom to
//! obtain world units. Grid sizes are world units.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub fine_grid: f64,
    /// Used while the secondary modifier is held.
    pub coarse_grid: f64,
    pub vertex_threshold_px: f64,
    pub guide_threshold_px: f64,
    pub guides_enabled: bool,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub max_history: usize,
    pub paste_offset_px: f64,
    pub dimension_font_px: f64,
    pub dimension_endpoint_margin_px: f64,
    pub handle_radius_px: f64,
    pub hit_tolerance_px: f64,
    /// Oversized hit area for thin wall lines in the scene graph.
    pub wall_hit_margin_px: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            fine_grid: 10.0,
            coarse_grid: 50.0,
            vertex_threshold_px: 10.0,
            guide_threshold_px: 6.0,
            guides_enabled: false,
            min_zoom: 0.1,
            max_zoom: 10.0,
            max_history: 50,
            paste_offset_px: 20.0,
            dimension_font_px: 12.0,
            dimension_endpoint_margin_px: 16.0,
            handle_radius_px: 6.0,
            hit_tolerance_px: 5.0,
            wall_hit_margin_px: 8.0,
        }
    }
}

impl EditorConfig {
    /// Parse a (possibly partial) JSON config and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("fineGrid", self.fine_grid),
            ("coarseGrid", self.coarse_grid),
            ("minZoom", self.min_zoom),
            ("maxZoom", self.max_zoom),
            ("dimensionFontPx", self.dimension_font_px),
            ("handleRadiusPx", self.handle_radius_px),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a positive number, got {value}"),
                });
            }
        }

        let non_negative = [
            ("vertexThresholdPx", self.vertex_threshold_px),
            ("guideThresholdPx", self.guide_threshold_px),
            ("pasteOffsetPx", self.paste_offset_px),
            ("dimensionEndpointMarginPx", self.dimension_endpoint_margin_px),
            ("hitTolerancePx", self.hit_tolerance_px),
            ("wallHitMarginPx", self.wall_hit_margin_px),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be zero or positive, got {value}"),
                });
            }
        }

        if self.min_zoom > self.max_zoom {
            return Err(ConfigError::Invalid {
                field: "minZoom",
                reason: format!("{} exceeds maxZoom {}", self.min_zoom, self.max_zoom),
            });
        }
        if self.max_history == 0 {
            return Err(ConfigError::Invalid {
                field: "maxHistory",
                reason: "must keep at least one entry".to_string(),
            });
        }
        Ok(())
    }

    /// Clamp a zoom factor into the configured range.
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    /// Convert a screen-pixel length to world units at the given zoom.
    pub fn px_to_world(&self, px: f64, zoom: f64) -> f64 {
        px / self.clamp_zoom(zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EditorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_history, 50);
        assert!((config.fine_grid - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EditorConfig::from_json(r#"{"fineGrid": 5, "guidesEnabled": true}"#).unwrap();
        assert!((config.fine_grid - 5.0).abs() < f64::EPSILON);
        assert!(config.guides_enabled);
        assert!((config.coarse_grid - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = EditorConfig::from_json(r#"{"fineGrid": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "fineGrid", .. }));

        let err = EditorConfig::from_json(r#"{"minZoom": 5, "maxZoom": 2}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "minZoom", .. }));

        assert!(matches!(
            EditorConfig::from_json("not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_px_to_world_clamps_zoom() {
        let config = EditorConfig::default();
        assert!((config.px_to_world(10.0, 2.0) - 5.0).abs() < f64::EPSILON);
        // A zoom of zero would blow up without clamping
        assert!((config.px_to_world(10.0, 0.0) - 100.0).abs() < 1e-9);
        assert!((config.px_to_world(10.0, 1000.0) - 1.0).abs() < f64::EPSILON);
    }
}
