use crate::bodies::{Material, RigidBodyType};
use crate::math::Vector2;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Template describing a body to be created.
///
/// A definition is plain data: it can be built on any thread and sent to the
/// stepping thread, and the same definition can be reused for several bodies.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct BodyDef {
    pub body_type: RigidBodyType,

    /// Initial position in simulation space
    pub position: Vector2,

    /// Initial rotation in radians
    pub angle: f32,

    pub linear_velocity: Vector2,

    pub angular_velocity: f32,

    /// Per-body damping added on top of the world damping
    pub linear_damping: f32,

    pub angular_damping: f32,

    /// Prevents the body from rotating
    pub fixed_rotation: bool,

    /// Whether world gravity applies to the body
    pub affected_by_gravity: bool,

    pub material: Material,
}

impl BodyDef {
    /// A dynamic body definition at the given position
    pub fn dynamic(position: Vector2) -> Self {
        Self {
            body_type: RigidBodyType::Dynamic,
            position,
            ..Self::default()
        }
    }

    /// A static body definition at the origin
    pub fn fixed() -> Self {
        Self::default()
    }

    pub fn with_position(mut self, position: Vector2) -> Self {
        self.position = position;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }
}

impl Default for BodyDef {
    fn default() -> Self {
        Self {
            body_type: RigidBodyType::Static,
            position: Vector2::ZERO,
            angle: 0.0,
            linear_velocity: Vector2::ZERO,
            angular_velocity: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            fixed_rotation: false,
            affected_by_gravity: true,
            material: Material::default(),
        }
    }
}
