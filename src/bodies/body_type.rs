#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Type of rigid body, determining how it behaves in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum RigidBodyType {
    /// Static bodies never move and have infinite mass (boundaries)
    #[default]
    Static,

    /// Dynamic bodies are integrated and respond to gravity and contacts
    Dynamic,
}
