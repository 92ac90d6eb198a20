use crate::bodies::RigidBody;
use crate::collision::contact_manifold::ContactManifold;
use crate::collision::narrow_phase::measure;
use crate::core::BodyStorage;
use crate::math::Vector2;

/// Trait for contact constraint solvers
pub trait ContactSolver {
    /// Prepares the solver for the given contacts
    fn prepare(&mut self, contacts: &mut [ContactManifold], bodies: &BodyStorage<RigidBody>);

    /// Runs one velocity iteration
    fn solve_velocity(&mut self, contacts: &mut [ContactManifold], bodies: &mut BodyStorage<RigidBody>);

    /// Runs one position iteration, returning the largest remaining penetration
    fn solve_position(&mut self, contacts: &mut [ContactManifold], bodies: &mut BodyStorage<RigidBody>) -> f32;
}

/// Velocity state of one side of a contact, copied out of storage so both
/// bodies can be read before either is written
#[derive(Debug, Clone, Copy)]
struct ContactBody {
    position: Vector2,
    linear_velocity: Vector2,
    angular_velocity: f32,
    inv_mass: f32,
    inv_inertia: f32,
}

impl ContactBody {
    fn read(body: &RigidBody) -> Self {
        Self {
            position: body.get_position(),
            linear_velocity: body.get_linear_velocity(),
            angular_velocity: body.get_angular_velocity(),
            inv_mass: body.get_inverse_mass(),
            inv_inertia: body.get_inverse_inertia(),
        }
    }

    /// Velocity of the material point at offset `r` from the center
    fn point_velocity(&self, r: Vector2) -> Vector2 {
        self.linear_velocity + Vector2::cross_scalar(self.angular_velocity, &r)
    }
}

/// Sequential impulse contact solver with accumulated impulses, Coulomb
/// friction and Baumgarte-style positional correction
#[derive(Debug, Clone)]
pub struct SequentialImpulseSolver {
    /// Fraction of the penetration corrected per position iteration
    baumgarte: f32,

    /// Penetration tolerated without correction
    linear_slop: f32,

    /// Approach speed below which contacts do not bounce
    restitution_threshold: f32,

    /// Largest positional correction per iteration
    max_correction: f32,
}

impl SequentialImpulseSolver {
    pub fn new(baumgarte: f32, linear_slop: f32, restitution_threshold: f32) -> Self {
        Self {
            baumgarte,
            linear_slop,
            restitution_threshold,
            max_correction: 0.2,
        }
    }

    fn load(contact: &ContactManifold, bodies: &BodyStorage<RigidBody>) -> Option<(ContactBody, ContactBody)> {
        let a = bodies.get(contact.pair.body_a)?;
        let b = bodies.get(contact.pair.body_b)?;
        Some((ContactBody::read(a), ContactBody::read(b)))
    }
}

impl ContactSolver for SequentialImpulseSolver {
    fn prepare(&mut self, contacts: &mut [ContactManifold], bodies: &BodyStorage<RigidBody>) {
        for contact in contacts.iter_mut() {
            let (Some(body_a), Some(body_b)) = (bodies.get(contact.pair.body_a), bodies.get(contact.pair.body_b)) else {
                continue;
            };

            contact.restitution = body_a.get_material().restitution.max(body_b.get_material().restitution);
            contact.friction = (body_a.get_material().friction * body_b.get_material().friction).sqrt();

            let a = ContactBody::read(body_a);
            let b = ContactBody::read(body_b);
            let r_a = contact.point - a.position;
            let r_b = contact.point - b.position;
            let normal_velocity = (b.point_velocity(r_b) - a.point_velocity(r_a)).dot(&contact.normal);

            contact.velocity_bias = if normal_velocity < -self.restitution_threshold {
                -contact.restitution * normal_velocity
            } else {
                0.0
            };
            contact.normal_impulse = 0.0;
            contact.tangent_impulse = 0.0;
        }
    }

    fn solve_velocity(&mut self, contacts: &mut [ContactManifold], bodies: &mut BodyStorage<RigidBody>) {
        for contact in contacts.iter_mut() {
            let Some((a, b)) = Self::load(contact, bodies) else {
                continue;
            };
            if a.inv_mass == 0.0 && b.inv_mass == 0.0 {
                continue;
            }

            let normal = contact.normal;
            let tangent = contact.tangent();
            let r_a = contact.point - a.position;
            let r_b = contact.point - b.position;

            // Normal impulse, clamped so the accumulated total never pulls
            let rel_vel = b.point_velocity(r_b) - a.point_velocity(r_a);
            let vn = rel_vel.dot(&normal);
            let rn_a = r_a.cross(&normal);
            let rn_b = r_b.cross(&normal);
            let normal_mass = a.inv_mass + b.inv_mass + a.inv_inertia * rn_a * rn_a + b.inv_inertia * rn_b * rn_b;
            if normal_mass <= 0.0 {
                continue;
            }
            let lambda = -(vn - contact.velocity_bias) / normal_mass;
            let new_impulse = (contact.normal_impulse + lambda).max(0.0);
            let normal_delta = new_impulse - contact.normal_impulse;
            contact.normal_impulse = new_impulse;

            // Friction impulse, bounded by the friction cone of the normal impulse
            let mut a_after = a;
            let mut b_after = b;
            apply(&mut a_after, &mut b_after, normal * normal_delta, r_a, r_b);

            let rel_vel = b_after.point_velocity(r_b) - a_after.point_velocity(r_a);
            let vt = rel_vel.dot(&tangent);
            let rt_a = r_a.cross(&tangent);
            let rt_b = r_b.cross(&tangent);
            let tangent_mass = a.inv_mass + b.inv_mass + a.inv_inertia * rt_a * rt_a + b.inv_inertia * rt_b * rt_b;
            if tangent_mass > 0.0 {
                let max_friction = contact.friction * contact.normal_impulse;
                let lambda = -vt / tangent_mass;
                let new_impulse = (contact.tangent_impulse + lambda).clamp(-max_friction, max_friction);
                let tangent_delta = new_impulse - contact.tangent_impulse;
                contact.tangent_impulse = new_impulse;
                apply(&mut a_after, &mut b_after, tangent * tangent_delta, r_a, r_b);
            }

            store(bodies, contact, &a_after, &b_after);
        }
    }

    fn solve_position(&mut self, contacts: &mut [ContactManifold], bodies: &mut BodyStorage<RigidBody>) -> f32 {
        let mut max_penetration = 0.0f32;

        for contact in contacts.iter_mut() {
            let Some((mut a, mut b)) = Self::load(contact, bodies) else {
                continue;
            };
            let inv_mass_sum = a.inv_mass + b.inv_mass;
            if inv_mass_sum <= 0.0 {
                continue;
            }

            let Some(current) = measure(&contact.geometry, a.position, b.position) else {
                continue;
            };
            max_penetration = max_penetration.max(current.penetration);

            let correction = (self.baumgarte * (current.penetration - self.linear_slop)).clamp(0.0, self.max_correction);
            if correction <= 0.0 {
                continue;
            }

            let push = current.normal * (correction / inv_mass_sum);
            a.position -= push * a.inv_mass;
            b.position += push * b.inv_mass;

            if let Some(body) = bodies.get_mut(contact.pair.body_a) {
                if body.is_dynamic() {
                    body.set_position(a.position);
                }
            }
            if let Some(body) = bodies.get_mut(contact.pair.body_b) {
                if body.is_dynamic() {
                    body.set_position(b.position);
                }
            }
        }

        max_penetration
    }
}

fn apply(a: &mut ContactBody, b: &mut ContactBody, impulse: Vector2, r_a: Vector2, r_b: Vector2) {
    a.linear_velocity -= impulse * a.inv_mass;
    a.angular_velocity -= a.inv_inertia * r_a.cross(&impulse);
    b.linear_velocity += impulse * b.inv_mass;
    b.angular_velocity += b.inv_inertia * r_b.cross(&impulse);
}

fn store(bodies: &mut BodyStorage<RigidBody>, contact: &ContactManifold, a: &ContactBody, b: &ContactBody) {
    if let Some(body) = bodies.get_mut(contact.pair.body_a) {
        body.set_linear_velocity(a.linear_velocity);
        body.set_angular_velocity(a.angular_velocity);
    }
    if let Some(body) = bodies.get_mut(contact.pair.body_b) {
        body.set_linear_velocity(b.linear_velocity);
        body.set_angular_velocity(b.angular_velocity);
    }
}
