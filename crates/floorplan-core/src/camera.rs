//! Camera module for pan/zoom transforms.

use crate::config::EditorConfig;
use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Camera manages the view transform for the plan.
///
/// Screen = world * zoom + offset. Pixel-sized UI (handles, labels, snap
/// radii) divides by `zoom` to get world units.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Current translation offset (pan), in screen pixels.
    pub offset: Vec2,
    /// Current zoom level (1.0 = one world unit per pixel).
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: 0.1,
            max_zoom: 10.0,
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Camera using the zoom limits from the config.
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            ..Self::default()
        }
    }

    /// World-to-screen transform for rendering.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Screen-to-world transform for input handling.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Length of `px` screen pixels in world units.
    pub fn screen_to_world_distance(&self, px: f64) -> f64 {
        px / self.zoom
    }

    /// The part of the world visible in a viewport of the given size.
    pub fn visible_world_rect(&self, viewport: Size) -> Rect {
        let top_left = self.screen_to_world(Point::ZERO);
        let bottom_right = self.screen_to_world(Point::new(viewport.width, viewport.height));
        Rect::from_points(top_left, bottom_right)
    }

    /// Pan the camera by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Zoom the camera, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let world_point = self.screen_to_world(screen_point);
        self.zoom = new_zoom;

        // Adjust offset so world_point stays at screen_point
        let new_screen = self.world_to_screen(world_point);
        self.offset += screen_point - new_screen;
    }

    /// Reset camera to default position and zoom.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom = 1.0_f64.clamp(self.min_zoom, self.max_zoom);
    }

    /// Fit the camera to show the given bounding box.
    pub fn fit_to_bounds(&mut self, bounds: Rect, viewport: Size, padding: f64) {
        if bounds.width() <= 0.0 && bounds.height() <= 0.0 {
            self.reset();
            self.offset = Vec2::new(viewport.width / 2.0, viewport.height / 2.0)
                - bounds.center().to_vec2() * self.zoom;
            return;
        }

        let padded = Size::new(
            (viewport.width - padding * 2.0).max(1.0),
            (viewport.height - padding * 2.0).max(1.0),
        );
        // A zero extent on one axis leaves the other to decide.
        let scale_x = if bounds.width() > 0.0 {
            padded.width / bounds.width()
        } else {
            f64::INFINITY
        };
        let scale_y = if bounds.height() > 0.0 {
            padded.height / bounds.height()
        } else {
            f64::INFINITY
        };
        self.zoom = scale_x.min(scale_y).clamp(self.min_zoom, self.max_zoom);

        let viewport_center = Point::new(viewport.width / 2.0, viewport.height / 2.0);
        self.offset = viewport_center.to_vec2() - bounds.center().to_vec2() * self.zoom;
    }
}
