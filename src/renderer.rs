/*
 * Renderer Module
 *
 * This module draws the committed flock buffer. Each agent is drawn as a
 * short heading stroke projected through the follow camera; agents closer
 * to the camera are drawn brighter.
 */

use glam::Vec3;
use nannou::prelude::*;

use crate::app::Model;
use crate::camera::Camera;
use crate::ui;

// World-space length of the heading stroke
const AGENT_LENGTH: f32 = 1.2;
// Brightness lost per world unit of depth
const DEPTH_FADE: f32 = 0.01;

// Render the model
pub fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    draw.background().color(BLACK);

    let window_rect = app.window_rect();
    let camera = &model.camera;

    if let Ok(transforms) = model.sim.transforms() {
        for transform in transforms {
            let tail = transform.position;
            let head = tail + transform.forward() * AGENT_LENGTH;
            let (tail_screen, depth) = camera.world_to_screen(tail, window_rect);
            let (head_screen, _) = camera.world_to_screen(head, window_rect);

            let shade = (0.85 - depth * DEPTH_FADE).clamp(0.25, 1.0);
            draw.line()
                .start(tail_screen)
                .end(head_screen)
                .weight(2.0)
                .color(rgba(shade, shade, shade * 1.1, 1.0));
            draw.ellipse()
                .xy(head_screen)
                .radius(1.5)
                .color(rgba(shade, shade * 0.9, 0.6, 1.0));
        }
    }

    draw_marker(&draw, camera, model.center, window_rect, rgba(0.2, 0.8, 1.0, 0.8));
    if let Some(goal) = model.sim.goal() {
        draw_marker(&draw, camera, goal, window_rect, rgba(1.0, 0.4, 0.2, 0.8));
    }

    if model.panel.show_stats {
        ui::draw_overlay(
            &draw,
            window_rect,
            model.sim.agent_count(),
            model.center,
            model.sim.last_stats(),
        );
    }

    draw.to_frame(app, &frame).unwrap();

    // Draw the egui UI
    model.egui.draw_to_frame(&frame).unwrap();
}

// Hollow ring at a world position
fn draw_marker(draw: &Draw, camera: &Camera, point: Vec3, window_rect: Rect, color: Rgba) {
    let (screen, _) = camera.world_to_screen(point, window_rect);
    draw.ellipse()
        .xy(screen)
        .radius(6.0)
        .no_fill()
        .stroke(color)
        .stroke_weight(1.5);
}
