use crate::bodies::{RigidBody, RigidBodyType};
use crate::core::BodyHandle;
use crate::math::Vector2;

/// The state of one body as seen by the render side
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyTransform {
    pub position: Vector2,

    /// Rotation in radians, counter-clockwise
    pub angle: f32,

    pub linear_velocity: Vector2,

    pub angular_velocity: f32,

    /// Radius for circle bodies
    pub radius: Option<f32>,

    pub body_type: RigidBodyType,
}

impl BodyTransform {
    pub fn of(body: &RigidBody) -> Self {
        Self {
            position: body.get_position(),
            angle: body.get_angle(),
            linear_velocity: body.get_linear_velocity(),
            angular_velocity: body.get_angular_velocity(),
            radius: body.get_shape().radius(),
            body_type: body.get_body_type(),
        }
    }
}

/// An immutable copy of every body transform, taken after a step or after a
/// structural change. Readers on other threads hold it behind an `Arc`, so it
/// never changes underneath them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldSnapshot {
    step: u64,

    time: f32,

    /// Sorted by handle, which is insertion order
    bodies: Vec<(BodyHandle, BodyTransform)>,
}

impl WorldSnapshot {
    pub fn new(step: u64, time: f32, bodies: Vec<(BodyHandle, BodyTransform)>) -> Self {
        debug_assert!(bodies.windows(2).all(|w| w[0].0 < w[1].0));
        Self { step, time, bodies }
    }

    /// Number of completed steps when the snapshot was taken
    pub fn step(&self) -> u64 {
        self.step
    }

    /// Simulated seconds when the snapshot was taken
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn get(&self, handle: BodyHandle) -> Option<&BodyTransform> {
        self.bodies
            .binary_search_by_key(&handle, |(h, _)| *h)
            .ok()
            .map(|index| &self.bodies[index].1)
    }

    /// Iterates over bodies in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &BodyTransform)> + '_ {
        self.bodies.iter().map(|(h, t)| (*h, t))
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}
