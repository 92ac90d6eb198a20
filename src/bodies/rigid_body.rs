use crate::bodies::{body_flags::BodyFlags, BodyDef, Material, RigidBodyType};
use crate::error::PhysicsError;
use crate::math::{Aabb, Transform2, Vector2};
use crate::shapes::Shape;
use crate::Result;

/// A rigid body for physics simulation
#[derive(Debug, Clone)]
pub struct RigidBody {
    /// The body's transform in world space
    transform: Transform2,

    linear_velocity: Vector2,

    /// Angular velocity around z in radians per second
    angular_velocity: f32,

    material: Material,

    /// The body's collision shape
    shape: Shape,

    body_type: RigidBodyType,

    density: f32,

    mass: f32,

    /// Inverse of the body's mass, zero for static bodies
    inv_mass: f32,

    inertia: f32,

    inv_inertia: f32,

    linear_damping: f32,

    angular_damping: f32,

    flags: BodyFlags,
}

impl RigidBody {
    /// Creates a body from a definition, a shape and a density.
    ///
    /// Fails if the density is negative or not finite, or if a dynamic body would
    /// carry a shape without area.
    pub fn new(def: &BodyDef, shape: Shape, density: f32) -> Result<Self> {
        if !density.is_finite() || density < 0.0 {
            return Err(PhysicsError::InvalidParameter(format!(
                "density must be a non-negative number, got {}",
                density
            )));
        }
        if !def.position.is_finite() || !def.angle.is_finite() {
            return Err(PhysicsError::InvalidParameter(format!(
                "body position {} / angle {} is not finite",
                def.position, def.angle
            )));
        }
        if def.body_type == RigidBodyType::Dynamic && matches!(shape, Shape::ChainLoop(_)) {
            return Err(PhysicsError::InvalidParameter(
                "chain loops can only be attached to static bodies".to_string(),
            ));
        }

        let mut flags = BodyFlags::empty();
        flags.set(BodyFlags::AFFECTED_BY_GRAVITY, def.affected_by_gravity);
        flags.set(BodyFlags::FIXED_ROTATION, def.fixed_rotation);

        let is_dynamic = def.body_type == RigidBodyType::Dynamic;
        let mut body = Self {
            transform: Transform2::new(def.position, def.angle),
            linear_velocity: if is_dynamic { def.linear_velocity } else { Vector2::ZERO },
            angular_velocity: if is_dynamic { def.angular_velocity } else { 0.0 },
            material: def.material,
            shape,
            body_type: def.body_type,
            density,
            mass: 0.0,
            inv_mass: 0.0,
            inertia: 0.0,
            inv_inertia: 0.0,
            linear_damping: def.linear_damping.max(0.0),
            angular_damping: def.angular_damping.max(0.0),
            flags,
        };

        body.update_mass_properties();

        Ok(body)
    }

    pub fn get_transform(&self) -> Transform2 {
        self.transform
    }

    pub fn get_position(&self) -> Vector2 {
        self.transform.position
    }

    pub fn set_position(&mut self, position: Vector2) {
        self.transform.position = position;
    }

    /// Returns the rotation angle in radians
    pub fn get_angle(&self) -> f32 {
        self.transform.angle
    }

    pub fn get_linear_velocity(&self) -> Vector2 {
        self.linear_velocity
    }

    /// Sets the linear velocity; ignored for static bodies
    pub fn set_linear_velocity(&mut self, velocity: Vector2) {
        if self.is_dynamic() {
            self.linear_velocity = velocity;
        }
    }

    /// Adds `delta` to the current linear velocity
    pub fn add_linear_velocity(&mut self, delta: Vector2) {
        if self.is_dynamic() {
            self.linear_velocity += delta;
        }
    }

    pub fn get_angular_velocity(&self) -> f32 {
        self.angular_velocity
    }

    pub fn set_angular_velocity(&mut self, velocity: f32) {
        if self.is_dynamic() && !self.has_fixed_rotation() {
            self.angular_velocity = velocity;
        }
    }

    pub fn get_material(&self) -> &Material {
        &self.material
    }

    pub fn get_shape(&self) -> &Shape {
        &self.shape
    }

    pub fn get_density(&self) -> f32 {
        self.density
    }

    pub fn get_mass(&self) -> f32 {
        self.mass
    }

    pub fn get_inverse_mass(&self) -> f32 {
        self.inv_mass
    }

    pub fn get_inertia(&self) -> f32 {
        self.inertia
    }

    pub fn get_inverse_inertia(&self) -> f32 {
        self.inv_inertia
    }

    pub fn get_body_type(&self) -> RigidBodyType {
        self.body_type
    }

    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.body_type == RigidBodyType::Dynamic
    }

    pub fn is_affected_by_gravity(&self) -> bool {
        self.flags.contains(BodyFlags::AFFECTED_BY_GRAVITY)
    }

    pub fn has_fixed_rotation(&self) -> bool {
        self.flags.contains(BodyFlags::FIXED_ROTATION)
    }

    pub fn get_flags(&self) -> BodyFlags {
        self.flags
    }

    pub fn get_world_bounds(&self) -> Aabb {
        self.shape.get_world_bounds(&self.transform)
    }

    /// Returns true if position, angle and velocities are all finite
    pub fn is_finite(&self) -> bool {
        self.transform.position.is_finite()
            && self.transform.angle.is_finite()
            && self.linear_velocity.is_finite()
            && self.angular_velocity.is_finite()
    }

    /// Recomputes mass and inertia from the shape and density
    fn update_mass_properties(&mut self) {
        self.mass = 0.0;
        self.inv_mass = 0.0;
        self.inertia = 0.0;
        self.inv_inertia = 0.0;

        if !self.is_dynamic() {
            return;
        }

        self.mass = self.shape.get_area() * self.density;
        if self.mass > 0.0 {
            self.inv_mass = 1.0 / self.mass;
        } else {
            // Massless dynamic bodies fall back to unit mass
            self.mass = 1.0;
            self.inv_mass = 1.0;
        }

        if !self.has_fixed_rotation() {
            self.inertia = self.shape.get_inertia(self.mass);
            if self.inertia > 0.0 {
                self.inv_inertia = 1.0 / self.inertia;
            }
        }
    }

    /// Integrates gravity and damping into the velocities
    pub fn integrate_forces(&mut self, gravity: Vector2, world_linear_damping: f32, world_angular_damping: f32, dt: f32) {
        if !self.is_dynamic() {
            return;
        }

        if self.is_affected_by_gravity() {
            self.linear_velocity += gravity * dt;
        }

        // Same damping form as Box2D: v *= 1 / (1 + dt * c)
        let linear = self.linear_damping + world_linear_damping;
        let angular = self.angular_damping + world_angular_damping;
        self.linear_velocity *= 1.0 / (1.0 + dt * linear);
        self.angular_velocity *= 1.0 / (1.0 + dt * angular);
    }

    /// Integrates velocities to update the transform
    pub fn integrate_velocity(&mut self, dt: f32) {
        if !self.is_dynamic() {
            return;
        }

        self.transform.position += self.linear_velocity * dt;
        if !self.has_fixed_rotation() {
            self.transform.angle += self.angular_velocity * dt;
        }
    }
}
