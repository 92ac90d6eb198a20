pub mod math;
pub mod core;
pub mod bodies;
pub mod shapes;
pub mod collision;
pub mod scene;

/// Re-export common types for easier usage
pub use crate::core::{
    BodyHandle, BodyTransform, ControllerConfig, PendingBody, PhysicsController, PhysicsWorld, RunState,
    SimulationConfig, StepListener, WorldSnapshot,
};
pub use crate::bodies::{BodyDef, Material, RigidBody, RigidBodyType};
pub use crate::shapes::{ChainLoop, Circle, Shape};
pub use crate::math::Vector2;

/// Error types for the physics controller and scene
pub mod error {
    use std::time::Duration;
    use thiserror::Error;

    #[derive(Error, Debug, Clone, PartialEq)]
    pub enum PhysicsError {
        #[error("Invalid parameter: {0}")]
        InvalidParameter(String),

        #[error("Resource not found: {0}")]
        ResourceNotFound(String),

        #[error("Simulation stability error: {0}")]
        SimulationError(String),

        /// The controller was used after it had been destroyed
        #[error("Invalid state: {0}")]
        InvalidState(String),

        /// A hand-off to the stepping thread did not complete in time
        #[error("Hand-off to the stepping thread timed out after {0:?}")]
        ConcurrencyTimeout(Duration),

        #[error("Configuration error: {0}")]
        Configuration(String),

        #[error("Statistics unavailable: {0}")]
        Storage(String),

        #[error("Internal error: {0}")]
        InternalError(String),
    }
}

/// Result type for physics operations
pub type Result<T> = std::result::Result<T, error::PhysicsError>;

/// Crate version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
