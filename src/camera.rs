/*
 * Camera Module
 *
 * An orbiting follow camera. It eases toward the flock center published by
 * each tick and projects world points onto the window with a simple
 * orthographic view rotated by yaw and pitch.
 */

use glam::{Quat, Vec3};
use nannou::prelude::{pt2, Point2, Rect};

pub struct Camera {
    pub target: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    // Larger values catch up with the flock faster (per second)
    pub follow_rate: f32,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            target: Vec3::ZERO,
            yaw: 0.6,
            pitch: -0.35,
            zoom: 8.0,
            min_zoom: 0.5,
            max_zoom: 60.0,
            follow_rate: 2.5,
        }
    }

    fn orientation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch)
    }

    // Ease toward the flock center; exact convergence is never forced
    pub fn follow(&mut self, center: Vec3, dt: f32) {
        let t = 1.0 - (-self.follow_rate * dt.max(0.0)).exp();
        self.target = self.target.lerp(center, t);
    }

    // Screen position plus view-space depth (larger is farther away)
    pub fn world_to_screen(&self, point: Vec3, window_rect: Rect) -> (Point2, f32) {
        let local = self.orientation().inverse() * (point - self.target);
        let screen = pt2(
            local.x * self.zoom + window_rect.x(),
            local.y * self.zoom + window_rect.y(),
        );
        (screen, -local.z)
    }

    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        self.pitch = (self.pitch + delta_pitch).clamp(-1.5, 1.5);
    }

    // Handle mouse wheel events for zooming
    pub fn zoom_by(&mut self, scroll: f32) {
        let zoom_factor = 1.0 + scroll * 0.1;
        self.zoom = (self.zoom * zoom_factor).clamp(self.min_zoom, self.max_zoom);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
