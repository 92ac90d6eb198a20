pub mod world;
pub mod config;
pub mod storage;
pub mod snapshot;
pub mod listener;
mod gravity;
mod controller;

pub use self::world::PhysicsWorld;
pub use self::config::{ControllerConfig, SimulationConfig};
pub use self::storage::BodyStorage;
pub use self::snapshot::{BodyTransform, WorldSnapshot};
pub use self::listener::{RepaintSignal, StepListener};
pub use self::gravity::SharedGravity;
pub use self::controller::{PendingBody, PhysicsController, RunState};

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// A unique identifier for a body in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct BodyHandle(pub(crate) u32);

impl BodyHandle {
    /// The raw handle value; never zero for a handle issued by a world
    pub fn id(&self) -> u32 {
        self.0
    }
}
