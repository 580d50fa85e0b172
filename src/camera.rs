#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use crate::coords::Corners;
use crate::matrix::Matrix;
use crate::point::Point;

/// Camera state for pan/zoom over the scene.
///
/// `pan_x` / `pan_y` are in viewport pixels.
/// `zoom` is a scale factor (1.0 = no zoom).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

impl Camera {
    /// Matrix from the scene plane to the viewport.
    #[must_use]
    pub fn viewport_matrix(&self) -> Matrix {
        Matrix::new(self.zoom, 0.0, 0.0, self.zoom, self.pan_x, self.pan_y)
    }

    /// Convert a viewport point to scene coordinates.
    #[must_use]
    pub fn screen_to_scene(&self, screen: Point) -> Point {
        Point::new((screen.x - self.pan_x) / self.zoom, (screen.y - self.pan_y) / self.zoom)
    }

    /// Convert a scene point to viewport coordinates.
    #[must_use]
    pub fn scene_to_screen(&self, scene: Point) -> Point {
        Point::new(scene.x * self.zoom + self.pan_x, scene.y * self.zoom + self.pan_y)
    }

    /// Convert a viewport distance (pixels) to a scene distance.
    #[must_use]
    pub fn screen_dist_to_scene(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }

    /// Set the zoom while keeping the scene point under `screen` in place.
    /// Non-positive or non-finite zoom values are ignored.
    pub fn zoom_to_point(&mut self, screen: Point, zoom: f64) {
        if !zoom.is_finite() || zoom <= 0.0 {
            return;
        }
        let anchor = self.screen_to_scene(screen);
        self.zoom = zoom;
        self.pan_x = screen.x - anchor.x * zoom;
        self.pan_y = screen.y - anchor.y * zoom;
    }

    /// Shift the view by `offset` viewport pixels.
    pub fn relative_pan(&mut self, offset: Point) {
        self.pan_x += offset.x;
        self.pan_y += offset.y;
    }

    /// Scene-plane corners of a `width` × `height` viewport.
    #[must_use]
    pub fn viewport_corners(&self, width: f64, height: f64) -> Corners {
        Corners {
            tl: self.screen_to_scene(Point::zero()),
            tr: self.screen_to_scene(Point::new(width, 0.0)),
            br: self.screen_to_scene(Point::new(width, height)),
            bl: self.screen_to_scene(Point::new(0.0, height)),
        }
    }
}
