use crate::bodies::RigidBody;
use crate::collision::contact_manifold::{ContactGeometry, ContactManifold};
use crate::collision::CollisionPair;
use crate::core::{BodyHandle, BodyStorage};
use crate::math::Vector2;
use crate::shapes::{closest_point_on_segment, Shape};

/// Trait for narrow-phase collision detection algorithms
pub trait NarrowPhase {
    /// Computes contacts for the candidate pairs produced by the broad phase
    fn detect_collisions(&self, pairs: &[CollisionPair], bodies: &BodyStorage<RigidBody>) -> Vec<ContactManifold>;
}

/// Exact circle/circle and circle/chain-segment tests
#[derive(Debug, Default)]
pub struct CircleNarrowPhase;

impl CircleNarrowPhase {
    pub fn new() -> Self {
        Self
    }

    fn collide(
        &self,
        handle_a: BodyHandle,
        body_a: &RigidBody,
        handle_b: BodyHandle,
        body_b: &RigidBody,
        out: &mut Vec<ContactManifold>,
    ) {
        match (body_a.get_shape(), body_b.get_shape()) {
            (Shape::Circle(a), Shape::Circle(b)) => {
                let geometry = ContactGeometry::CircleCircle {
                    radius_a: a.get_radius(),
                    radius_b: b.get_radius(),
                };
                if let Some(contact) = measure(&geometry, body_a.get_position(), body_b.get_position()) {
                    out.push(ContactManifold::new(
                        CollisionPair { body_a: handle_a, body_b: handle_b },
                        geometry,
                        contact.point,
                        contact.normal,
                        contact.penetration,
                    ));
                }
            }
            (Shape::ChainLoop(chain), Shape::Circle(circle)) => {
                let transform = body_a.get_transform();
                for (start, end) in chain.segments() {
                    let geometry = ContactGeometry::CircleSegment {
                        start: transform.transform_point(start),
                        end: transform.transform_point(end),
                        radius: circle.get_radius(),
                    };
                    if let Some(contact) = measure(&geometry, transform.position, body_b.get_position()) {
                        out.push(ContactManifold::new(
                            CollisionPair { body_a: handle_a, body_b: handle_b },
                            geometry,
                            contact.point,
                            contact.normal,
                            contact.penetration,
                        ));
                    }
                }
            }
            (Shape::Circle(_), Shape::ChainLoop(_)) => {
                // Chain is always body A
                self.collide(handle_b, body_b, handle_a, body_a, out);
            }
            (Shape::ChainLoop(_), Shape::ChainLoop(_)) => {}
        }
    }
}

impl NarrowPhase for CircleNarrowPhase {
    fn detect_collisions(&self, pairs: &[CollisionPair], bodies: &BodyStorage<RigidBody>) -> Vec<ContactManifold> {
        let mut manifolds = Vec::new();

        for pair in pairs {
            let (Some(body_a), Some(body_b)) = (bodies.get(pair.body_a), bodies.get(pair.body_b)) else {
                continue;
            };
            self.collide(pair.body_a, body_a, pair.body_b, body_b, &mut manifolds);
        }

        manifolds
    }
}

/// Result of measuring a contact geometry at given body positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactMeasure {
    pub point: Vector2,
    pub normal: Vector2,
    pub penetration: f32,
}

/// Measures the contact described by `geometry` with body A at `position_a` and
/// body B at `position_b`. Returns `None` when the shapes are apart.
///
/// For segment contacts the segment is already in world space, so `position_a`
/// is unused.
pub fn measure(geometry: &ContactGeometry, position_a: Vector2, position_b: Vector2) -> Option<ContactMeasure> {
    match *geometry {
        ContactGeometry::CircleCircle { radius_a, radius_b } => {
            let d = position_b - position_a;
            let distance_sq = d.length_squared();
            let radii = radius_a + radius_b;
            if distance_sq >= radii * radii {
                return None;
            }

            let distance = distance_sq.sqrt();
            // Coincident centers: separate along +y
            let normal = if distance > crate::math::EPSILON {
                d / distance
            } else {
                Vector2::new(0.0, 1.0)
            };
            let penetration = radii - distance;

            Some(ContactMeasure {
                point: position_a + normal * (radius_a - 0.5 * penetration),
                normal,
                penetration,
            })
        }
        ContactGeometry::CircleSegment { start, end, radius } => {
            let closest = closest_point_on_segment(start, end, position_b);
            let d = position_b - closest;
            let distance_sq = d.length_squared();
            if distance_sq >= radius * radius {
                return None;
            }

            let distance = distance_sq.sqrt();
            let normal = if distance > crate::math::EPSILON {
                d / distance
            } else {
                // Center on the segment: push towards the loop's left side, which is
                // the inside for counter-clockwise loops
                (end - start).perpendicular().normalize()
            };

            Some(ContactMeasure {
                point: closest,
                normal,
                penetration: radius - distance,
            })
        }
    }
}
