mod collision_pair;
mod broad_phase;
mod narrow_phase;
mod contact_manifold;
mod contact_solver;

pub use self::collision_pair::CollisionPair;
pub use self::broad_phase::{BroadPhase, BruteForceBroadPhase};
pub use self::narrow_phase::{measure, CircleNarrowPhase, ContactMeasure, NarrowPhase};
pub use self::contact_manifold::{ContactGeometry, ContactManifold};
pub use self::contact_solver::{ContactSolver, SequentialImpulseSolver};
