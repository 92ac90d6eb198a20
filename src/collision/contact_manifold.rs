use crate::collision::CollisionPair;
use crate::math::Vector2;

/// What produced a contact, kept so the position solver can re-measure the
/// separation after bodies have moved
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContactGeometry {
    /// Two circles; radii of body A and body B
    CircleCircle { radius_a: f32, radius_b: f32 },

    /// A circle (body B) against one world-space segment of a chain (body A)
    CircleSegment { start: Vector2, end: Vector2, radius: f32 },
}

/// A contact between two bodies.
///
/// `normal` always points from body A towards body B.
#[derive(Debug, Clone)]
pub struct ContactManifold {
    /// The collision pair this manifold belongs to
    pub pair: CollisionPair,

    pub geometry: ContactGeometry,

    /// Contact point in world space
    pub point: Vector2,

    pub normal: Vector2,

    /// Overlap depth, positive when penetrating
    pub penetration: f32,

    /// Mixed restitution of both bodies
    pub restitution: f32,

    /// Mixed friction of both bodies
    pub friction: f32,

    /// Target separating velocity from restitution, fixed at prepare time
    pub velocity_bias: f32,

    /// Accumulated normal impulse over the velocity iterations
    pub normal_impulse: f32,

    /// Accumulated tangent impulse over the velocity iterations
    pub tangent_impulse: f32,
}

impl ContactManifold {
    pub fn new(
        pair: CollisionPair,
        geometry: ContactGeometry,
        point: Vector2,
        normal: Vector2,
        penetration: f32,
    ) -> Self {
        Self {
            pair,
            geometry,
            point,
            normal,
            penetration,
            restitution: 0.0,
            friction: 0.0,
            velocity_bias: 0.0,
            normal_impulse: 0.0,
            tangent_impulse: 0.0,
        }
    }

    /// The tangent direction used for friction
    #[inline]
    pub fn tangent(&self) -> Vector2 {
        Vector2::new(self.normal.y, -self.normal.x)
    }
}
