/*
 * Boid Flocking Simulation - Module Definitions
 *
 * This file defines the module structure for the flocking core and, behind
 * the `viewer` feature, the interactive front end that consumes it.
 */

// Re-export key components for easier access
pub use boid::Transform;
pub use buffer::{AgentBuffer, BufferId, DoubleBuffer, NoisePhases};
pub use debug::TickStats;
pub use error::{FlockError, Result};
pub use params::{ExecutionMode, Pipeline, SimulationConfig, Weights};
pub use physics::{KernelParams, Steering};
pub use simulation::{Simulation, SimulationState, TickResult};

// Define modules
pub mod boid;
pub mod buffer;
pub mod center;
pub mod debug;
pub mod error;
pub mod math;
pub mod params;
pub mod physics;
pub mod simulation;

#[cfg(feature = "viewer")]
pub mod app;
#[cfg(feature = "viewer")]
pub mod camera;
#[cfg(feature = "viewer")]
pub mod renderer;
#[cfg(feature = "viewer")]
pub mod ui;
