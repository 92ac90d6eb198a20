use crate::bodies::RigidBody;
use crate::collision::CollisionPair;
use crate::core::BodyHandle;
use crate::math::Aabb;

/// Trait for broad-phase collision detection algorithms
pub trait BroadPhase {
    /// Updates the broad-phase with the current body states
    fn update(&mut self, bodies: &[(BodyHandle, &RigidBody)]);

    /// Gets all potential collision pairs
    fn get_collision_pairs(&self) -> Vec<CollisionPair>;
}

/// Tests every pair of bodies' bounding boxes. The scenes driven here hold a few
/// dozen bodies at most.
#[derive(Debug, Default)]
pub struct BruteForceBroadPhase {
    bodies: Vec<(BodyHandle, Aabb, bool)>,
}

impl BruteForceBroadPhase {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BroadPhase for BruteForceBroadPhase {
    fn update(&mut self, bodies: &[(BodyHandle, &RigidBody)]) {
        self.bodies.clear();
        self.bodies.extend(
            bodies
                .iter()
                .map(|(handle, body)| (*handle, body.get_world_bounds(), body.is_dynamic())),
        );
    }

    fn get_collision_pairs(&self) -> Vec<CollisionPair> {
        let mut pairs = Vec::new();

        for (i, (handle_a, aabb_a, dynamic_a)) in self.bodies.iter().enumerate() {
            for (handle_b, aabb_b, dynamic_b) in &self.bodies[i + 1..] {
                // Static bodies never collide with each other
                if !dynamic_a && !dynamic_b {
                    continue;
                }
                if aabb_a.intersects(aabb_b) {
                    pairs.push(CollisionPair::new(*handle_a, *handle_b));
                }
            }
        }

        pairs
    }
}
