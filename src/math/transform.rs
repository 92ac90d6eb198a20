use crate::math::Vector2;
use nalgebra as na;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// A rigid 2D transformation: translation followed by a counter-clockwise rotation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Transform2 {
    /// Position in simulation space
    pub position: Vector2,

    /// Rotation angle in radians
    pub angle: f32,
}

impl Transform2 {
    #[inline]
    pub fn new(position: Vector2, angle: f32) -> Self {
        Self { position, angle }
    }

    #[inline]
    pub fn identity() -> Self {
        Self::default()
    }

    #[inline]
    pub fn from_position(position: Vector2) -> Self {
        Self { position, angle: 0.0 }
    }

    /// Converts to a nalgebra isometry
    pub fn to_isometry(&self) -> na::Isometry2<f32> {
        na::Isometry2::new(self.position.to_nalgebra(), self.angle)
    }

    /// Maps a point from local space to world space
    pub fn transform_point(&self, point: Vector2) -> Vector2 {
        let p = self.to_isometry() * na::Point2::new(point.x, point.y);
        Vector2::new(p.x, p.y)
    }

    /// Rotates a direction from local space to world space
    pub fn rotate_vector(&self, v: Vector2) -> Vector2 {
        v.rotated(self.angle)
    }
}
