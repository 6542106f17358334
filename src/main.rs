/*
 * Boid Flock Viewer
 *
 * Interactive front end for the flocking core. Agents steer by separation,
 * alignment, cohesion and an optional goal tendency; the control panel tunes
 * the weights and execution settings while the flock runs.
 *
 * Set RUST_LOG=debug (or trace) for lifecycle and per-tick logging.
 */

use boid_flock::app;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    nannou::app(app::model)
        .update(app::update)
        .run();
}
