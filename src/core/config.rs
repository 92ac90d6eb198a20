use std::time::Duration;

use crate::math::Vector2;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Configuration parameters for the physics world
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct SimulationConfig {
    /// The fixed time step integrated by every step, in seconds
    pub time_step: f32,

    /// Initial uniform gravity
    pub gravity: Vector2,

    /// The number of iterations to run for solving velocity constraints
    pub velocity_iterations: u32,

    /// The number of iterations to run for solving position constraints
    pub position_iterations: u32,

    /// Global damping factor for linear velocity
    pub linear_damping: f32,

    /// Global damping factor for angular velocity
    pub angular_damping: f32,

    /// Fraction of penetration corrected per position iteration
    pub baumgarte: f32,

    /// Penetration allowed before position correction kicks in
    pub linear_slop: f32,

    /// The collision restitution velocity threshold
    pub restitution_threshold: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            time_step: 1.0 / 60.0,
            gravity: Vector2::new(0.0, -10.0),
            velocity_iterations: 8,
            position_iterations: 3,
            linear_damping: 0.0,
            angular_damping: 0.0,
            baumgarte: 0.2,
            linear_slop: 0.005,
            restitution_threshold: 1.0,
        }
    }
}

/// Configuration of the stepping thread
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct ControllerConfig {
    /// Wall-clock interval between steps while active
    pub step_interval: Duration,

    /// How long `create_body` waits for the stepping thread
    pub handoff_timeout: Duration,

    /// Name given to the stepping thread
    pub thread_name: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            step_interval: Duration::from_micros(16_667),
            handoff_timeout: Duration::from_secs(2),
            thread_name: "physics-step".to_string(),
        }
    }
}
