use std::panic::{self, AssertUnwindSafe};

use log::trace;

use crate::bodies::{BodyDef, RigidBody};
use crate::collision::{
    BroadPhase, BruteForceBroadPhase, CircleNarrowPhase, ContactSolver, NarrowPhase, SequentialImpulseSolver,
};
use crate::core::{BodyHandle, BodyStorage, BodyTransform, SimulationConfig, WorldSnapshot};
use crate::error::PhysicsError;
use crate::math::{Transform2, Vector2};
use crate::shapes::Shape;
use crate::Result;

/// The 2D physics world: bodies, gravity and the fixed-step integrator.
///
/// The world is a plain single-threaded value. [`PhysicsController`] moves it onto
/// a dedicated thread; tests and tools can also drive it directly.
///
/// [`PhysicsController`]: crate::core::PhysicsController
pub struct PhysicsWorld {
    /// All rigid bodies in the world
    bodies: BodyStorage<RigidBody>,

    config: SimulationConfig,

    broad_phase: BruteForceBroadPhase,

    narrow_phase: CircleNarrowPhase,

    solver: SequentialImpulseSolver,

    /// The total elapsed simulation time
    time: f32,

    step_count: u64,
}

impl PhysicsWorld {
    /// Creates a new physics world with default settings
    pub fn new() -> Self {
        Self::with_config(SimulationConfig::default())
    }

    /// Creates a new physics world with the given configuration
    pub fn with_config(config: SimulationConfig) -> Self {
        let solver = SequentialImpulseSolver::new(config.baumgarte, config.linear_slop, config.restitution_threshold);

        Self {
            bodies: BodyStorage::new(),
            config,
            broad_phase: BruteForceBroadPhase::new(),
            narrow_phase: CircleNarrowPhase::new(),
            solver,
            time: 0.0,
            step_count: 0,
        }
    }

    pub fn get_time(&self) -> f32 {
        self.time
    }

    /// Number of steps completed so far
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn set_gravity(&mut self, gravity: Vector2) {
        self.config.gravity = gravity;
    }

    pub fn get_gravity(&self) -> Vector2 {
        self.config.gravity
    }

    pub fn get_config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Builds a body from its definition and inserts it
    pub fn create_body(&mut self, def: &BodyDef, shape: Shape, density: f32) -> Result<BodyHandle> {
        let body = RigidBody::new(def, shape, density)?;
        Ok(self.add_body(body))
    }

    /// Adds a rigid body to the world and returns its handle
    pub fn add_body(&mut self, body: RigidBody) -> BodyHandle {
        let handle = self.bodies.add(body);
        trace!("body {:?} added, {} bodies in world", handle, self.bodies.len());
        handle
    }

    pub fn remove_body(&mut self, handle: BodyHandle) -> Result<RigidBody> {
        self.bodies
            .remove(handle)
            .ok_or_else(|| PhysicsError::ResourceNotFound(format!("Body with handle {:?} not found", handle)))
    }

    pub fn get_body(&self, handle: BodyHandle) -> Result<&RigidBody> {
        self.bodies.get_body(handle)
    }

    pub fn get_body_mut(&mut self, handle: BodyHandle) -> Result<&mut RigidBody> {
        self.bodies.get_body_mut(handle)
    }

    pub fn get_transform(&self, handle: BodyHandle) -> Result<Transform2> {
        Ok(self.bodies.get_body(handle)?.get_transform())
    }

    /// Adds `delta` to a body's linear velocity
    pub fn add_linear_velocity(&mut self, handle: BodyHandle, delta: Vector2) -> Result<()> {
        if !delta.is_finite() {
            return Err(PhysicsError::InvalidParameter(format!("velocity change {} is not finite", delta)));
        }
        self.bodies.get_body_mut(handle)?.add_linear_velocity(delta);
        Ok(())
    }

    /// Advances the simulation by one fixed time step.
    ///
    /// On error the world is left exactly as it was before the call, including when
    /// the step panics part way through.
    pub fn step(&mut self) -> Result<()> {
        let dt = self.config.time_step;
        let gravity = self.config.gravity;

        if !dt.is_finite() || dt <= 0.0 {
            return Err(PhysicsError::SimulationError(format!("invalid time step {}", dt)));
        }
        if !gravity.is_finite() {
            return Err(PhysicsError::SimulationError(format!("gravity {} is not finite", gravity)));
        }

        let backup = self.bodies.clone();
        let completed = panic::catch_unwind(AssertUnwindSafe(|| self.step_simulation(dt, gravity)));
        if completed.is_err() {
            self.bodies = backup;
            return Err(PhysicsError::SimulationError(format!(
                "step {} panicked, bodies restored",
                self.step_count + 1
            )));
        }

        let diverged = self
            .bodies
            .iter()
            .find(|(_, body)| !body.is_finite())
            .map(|(handle, _)| handle);
        if let Some(handle) = diverged {
            self.bodies = backup;
            return Err(PhysicsError::SimulationError(format!(
                "body {:?} diverged during step {}",
                handle,
                self.step_count + 1
            )));
        }

        self.time += dt;
        self.step_count += 1;
        Ok(())
    }

    fn step_simulation(&mut self, dt: f32, gravity: Vector2) {
        let linear_damping = self.config.linear_damping;
        let angular_damping = self.config.angular_damping;

        for (_, body) in self.bodies.iter_mut() {
            body.integrate_forces(gravity, linear_damping, angular_damping, dt);
        }

        let pairs = {
            let views: Vec<(BodyHandle, &RigidBody)> = self.bodies.iter().collect();
            self.broad_phase.update(&views);
            self.broad_phase.get_collision_pairs()
        };
        let mut contacts = self.narrow_phase.detect_collisions(&pairs, &self.bodies);

        self.solver.prepare(&mut contacts, &self.bodies);
        for _ in 0..self.config.velocity_iterations {
            self.solver.solve_velocity(&mut contacts, &mut self.bodies);
        }

        for (_, body) in self.bodies.iter_mut() {
            body.integrate_velocity(dt);
        }

        for _ in 0..self.config.position_iterations {
            let max_penetration = self.solver.solve_position(&mut contacts, &mut self.bodies);
            if max_penetration <= 3.0 * self.config.linear_slop {
                break;
            }
        }
    }

    /// Copies every body transform into an immutable snapshot
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::new(
            self.step_count,
            self.time,
            self.bodies.iter().map(|(handle, body)| (handle, BodyTransform::of(body))).collect(),
        )
    }

    /// Iterates over all bodies in insertion order
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &RigidBody)> + '_ {
        self.bodies.iter()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}
