/*
 * UI Module
 *
 * This module contains the control panel built with nannou_egui. The panel
 * edits a copy of the simulation configuration; the app applies the edits to
 * the running flock between ticks, and re-creates the flock when the
 * population size changes.
 */

use glam::Vec3;
use nannou_egui::{egui, Egui};

use crate::debug::TickStats;
use crate::params::{ExecutionMode, ParamChanges, ParamSnapshot, Pipeline, SimulationConfig};

pub struct ControlPanel {
    pub config: SimulationConfig,
    pub goal_enabled: bool,
    pub goal: [f32; 3],
    pub wind: [f32; 3],
    pub paused: bool,
    pub show_stats: bool,
    snapshot: ParamSnapshot,
}

impl ControlPanel {
    pub fn new(config: SimulationConfig) -> Self {
        let goal = config.goal.unwrap_or(Vec3::new(0.0, 0.0, 60.0));
        Self {
            goal_enabled: config.goal.is_some(),
            goal: goal.to_array(),
            wind: config.wind.to_array(),
            paused: false,
            show_stats: true,
            snapshot: config.snapshot(),
            config,
        }
    }

    // Push the goal and wind widgets into the config before change detection
    fn sync_vectors(&mut self) {
        self.config.goal = self.goal_enabled.then(|| Vec3::from_array(self.goal));
        self.config.wind = Vec3::from_array(self.wind);
    }
}

/// What the user asked for this frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct UiActions {
    pub reset: bool,
    pub changes: ParamChanges,
}

pub fn update_ui(egui: &mut Egui, panel: &mut ControlPanel, stats: Option<&TickStats>, fps: f32) -> UiActions {
    let mut reset = false;
    let ctx = egui.begin_frame();

    egui::Window::new("Flock Controls")
        .default_pos([10.0, 10.0])
        .show(&ctx, |ui| {
            ui.collapsing("Population", |ui| {
                ui.add(egui::Slider::new(&mut panel.config.agent_count, SimulationConfig::agent_count_range()).text("Agents"));
                ui.add(egui::Slider::new(&mut panel.config.spawn_radius, 1.0..=200.0).text("Spawn Radius"));
                if ui.button("Respawn").clicked() {
                    reset = true;
                }
            });

            ui.collapsing("Weights", |ui| {
                let w = &mut panel.config.weights;
                ui.add(egui::Slider::new(&mut w.separation, SimulationConfig::weight_range()).text("Separation"));
                ui.add(egui::Slider::new(&mut w.alignment, SimulationConfig::weight_range()).text("Alignment"));
                ui.add(egui::Slider::new(&mut w.cohesion, SimulationConfig::weight_range()).text("Cohesion"));
                ui.add(egui::Slider::new(&mut w.tendency, SimulationConfig::weight_range()).text("Goal Tendency"));
                ui.add(egui::Slider::new(&mut w.wind, SimulationConfig::weight_range()).text("Wind"));
                ui.add(egui::Slider::new(&mut w.noise, SimulationConfig::weight_range()).text("Speed Noise"));
                ui.add(egui::Slider::new(&mut w.rotation_speed, SimulationConfig::rotation_speed_range()).text("Rotation Speed"));
            });

            ui.collapsing("Motion", |ui| {
                ui.add(egui::Slider::new(&mut panel.config.separation_distance, SimulationConfig::separation_distance_range()).text("Separation Distance"));
                ui.add(egui::Slider::new(&mut panel.config.max_speed, SimulationConfig::max_speed_range()).text("Max Speed"));
                ui.checkbox(&mut panel.goal_enabled, "Seek Goal");
                if panel.goal_enabled {
                    ui.add(egui::Slider::new(&mut panel.goal[0], -200.0..=200.0).text("Goal X"));
                    ui.add(egui::Slider::new(&mut panel.goal[1], -200.0..=200.0).text("Goal Y"));
                    ui.add(egui::Slider::new(&mut panel.goal[2], -200.0..=200.0).text("Goal Z"));
                }
                ui.add(egui::Slider::new(&mut panel.wind[0], SimulationConfig::wind_range()).text("Wind X"));
                ui.add(egui::Slider::new(&mut panel.wind[1], SimulationConfig::wind_range()).text("Wind Y"));
                ui.add(egui::Slider::new(&mut panel.wind[2], SimulationConfig::wind_range()).text("Wind Z"));
            });

            ui.collapsing("Performance Tuning", |ui| {
                ui.horizontal(|ui| {
                    ui.radio_value(&mut panel.config.mode, ExecutionMode::Auto, "Auto");
                    ui.radio_value(&mut panel.config.mode, ExecutionMode::Parallel, "Parallel");
                    ui.radio_value(&mut panel.config.mode, ExecutionMode::Sequential, "Sequential");
                });
                ui.horizontal(|ui| {
                    ui.radio_value(&mut panel.config.pipeline, Pipeline::Fused, "Fused");
                    ui.radio_value(&mut panel.config.pipeline, Pipeline::Staged, "Staged");
                });

                ui.separator();

                ui.label(format!("FPS: {:.1}", fps));
                if let Some(stats) = stats {
                    ui.label(format!("Tick: {}", stats.tick));
                    ui.label(format!("Tick time: {:.2} ms", stats.elapsed.as_secs_f64() * 1000.0));
                    ui.label(format!("Mode: {:?} / {:?}", stats.mode, stats.pipeline));
                    if let Some(chunk) = stats.chunk_size {
                        ui.label(format!("Chunk size: {}", chunk));
                    }
                    ui.label(format!("Interactions/s: {:.2e}", stats.interactions_per_second()));
                }
            });

            ui.checkbox(&mut panel.show_stats, "Show Overlay");
            ui.checkbox(&mut panel.paused, "Pause Simulation");
        });

    panel.sync_vectors();
    let changes = panel.config.detect_changes(&panel.snapshot);
    panel.snapshot = panel.config.snapshot();

    UiActions { reset, changes }
}

// Draw a small text overlay in the top-right corner
pub fn draw_overlay(draw: &nannou::Draw, window_rect: nannou::geom::Rect, agent_count: usize, center: Vec3, stats: Option<&TickStats>) {
    let margin = 20.0;
    let line_height = 20.0;
    let text_x = window_rect.right() - 120.0;
    let text_y = window_rect.top() - margin;

    let mut lines = vec![
        format!("Agents: {}", agent_count),
        format!("Center: ({:.1}, {:.1}, {:.1})", center.x, center.y, center.z),
    ];
    if let Some(stats) = stats {
        lines.push(format!("Tick: {:.2} ms", stats.elapsed.as_secs_f64() * 1000.0));
    }

    for (i, text) in lines.iter().enumerate() {
        let y = text_y - (i as f32 * line_height);
        draw.text(text)
            .x_y(text_x, y)
            .color(nannou::color::WHITE)
            .font_size(14);
    }
}
