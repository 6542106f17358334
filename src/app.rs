/*
 * Application Module
 *
 * The interactive host for the flock. Every frame it:
 * - Runs the control panel and pushes any edits into the simulation
 * - Ticks the simulation with the frame's delta time
 * - Eases the follow camera toward the published flock center
 */

use glam::Vec3;
use log::{error, info};
use nannou::prelude::*;
use nannou::winit::event::{MouseScrollDelta, TouchPhase};
use nannou_egui::Egui;

use crate::camera::Camera;
use crate::params::SimulationConfig;
use crate::renderer;
use crate::simulation::Simulation;
use crate::ui::{self, ControlPanel};

// Long frames (window drags, breakpoints) are clamped to keep the flock stable
const MAX_FRAME_STEP: f32 = 1.0 / 15.0;

// Main model for the application
pub struct Model {
    pub sim: Simulation,
    pub panel: ControlPanel,
    pub egui: Egui,
    pub camera: Camera,
    pub center: Vec3,
    pub fps: f32,
}

// Initialize the model
pub fn model(app: &App) -> Model {
    let window_id = app
        .new_window()
        .title("Boid Flock")
        .size(1280, 800)
        .view(renderer::view)
        .mouse_wheel(mouse_wheel)
        .raw_event(raw_window_event)
        .build()
        .unwrap();

    let window = app.window(window_id).unwrap();
    let egui = Egui::from_window(&window);

    let config = SimulationConfig {
        agent_count: 1024,
        spawn_radius: 40.0,
        goal: Some(Vec3::new(0.0, 0.0, 60.0)),
        ..SimulationConfig::default()
    };
    let sim = Simulation::with_config(config.clone()).expect("default flock configuration is valid");
    let center = sim.flock_center().unwrap_or(Vec3::ZERO);

    let mut camera = Camera::new();
    camera.target = center;

    Model {
        sim,
        panel: ControlPanel::new(config),
        egui,
        camera,
        center,
        fps: 0.0,
    }
}

// Update the model
pub fn update(app: &App, model: &mut Model, update: Update) {
    model.fps = app.fps();

    let actions = ui::update_ui(&mut model.egui, &mut model.panel, model.sim.last_stats(), model.fps);

    if actions.reset || actions.changes.needs_reset {
        respawn(model);
    } else if actions.changes.any {
        apply_tuning(model);
    }

    let dt = update.since_last.as_secs_f32().min(MAX_FRAME_STEP);
    if !model.panel.paused {
        match model.sim.step(dt) {
            Ok(result) => model.center = result.flock_center,
            Err(e) => error!("tick failed: {}", e),
        }
    }

    model.camera.follow(model.center, dt);
}

// Replace the flock with a freshly spawned one
fn respawn(model: &mut Model) {
    model.sim.shutdown();
    match Simulation::with_config(model.panel.config.clone()) {
        Ok(sim) => {
            info!("respawned {} agents", sim.agent_count());
            model.center = sim.flock_center().unwrap_or(model.center);
            model.sim = sim;
        }
        Err(e) => error!("could not respawn flock: {}", e),
    }
}

// Push panel edits that don't need a new population
fn apply_tuning(model: &mut Model) {
    let config = &model.panel.config;
    *model.sim.weights_mut() = config.weights;
    model.sim.set_mode(config.mode);
    model.sim.set_pipeline(config.pipeline);

    let results = [
        model.sim.set_separation_distance(config.separation_distance),
        model.sim.set_max_speed(config.max_speed),
        model.sim.set_goal(config.goal),
        model.sim.set_wind(config.wind),
    ];
    for result in results {
        if let Err(e) = result {
            error!("rejected tuning change: {}", e);
        }
    }
}

// Mouse wheel zooms; horizontal scroll orbits
pub fn mouse_wheel(_app: &App, model: &mut Model, delta: MouseScrollDelta, _phase: TouchPhase) {
    if model.egui.ctx().is_pointer_over_area() {
        return;
    }
    match delta {
        MouseScrollDelta::LineDelta(x, y) => {
            model.camera.zoom_by(y);
            model.camera.orbit(x * 0.1, 0.0);
        }
        MouseScrollDelta::PixelDelta(pos) => {
            model.camera.zoom_by(pos.y as f32 * 0.01);
            model.camera.orbit(pos.x as f32 * 0.001, 0.0);
        }
    }
}

// Handle raw window events for egui
pub fn raw_window_event(_app: &App, model: &mut Model, event: &nannou::winit::event::WindowEvent) {
    model.egui.handle_raw_event(event);
}
