use crate::math::{Aabb, Transform2, Vector2};

/// A circular collision shape centered on the body origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    /// The radius of the circle
    radius: f32,
}

impl Circle {
    /// Creates a new circle; negative radii are clamped to zero
    pub fn new(radius: f32) -> Self {
        Self {
            radius: radius.max(0.0),
        }
    }

    pub fn get_radius(&self) -> f32 {
        self.radius
    }

    /// Area of the disc, π·r²
    pub fn get_area(&self) -> f32 {
        std::f32::consts::PI * self.radius * self.radius
    }

    /// Rotational inertia of a solid disc about its center, ½·m·r²
    pub fn get_inertia(&self, mass: f32) -> f32 {
        0.5 * mass * self.radius * self.radius
    }

    pub fn get_world_bounds(&self, transform: &Transform2) -> Aabb {
        Aabb::from_center_half_extents(transform.position, Vector2::new(self.radius, self.radius))
    }
}
