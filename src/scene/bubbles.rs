//! Sizing and placement of quest bubbles.
//!
//! A bubble's volume grows linearly with the number of quests solved; its
//! displayed radius is the radius of a ball with that volume. The visible range
//! is therefore compressed: eight times the quests gives twice the radius.

use log::warn;
use rand::Rng;

use crate::error::PhysicsError;
use crate::math::{Aabb, Vector2};
use crate::scene::SceneConfig;
use crate::Result;

/// Radius of a ball whose volume is `solved_count * quest_volume`:
/// `cbrt(3 · k · count / 4π)`
pub fn bubble_radius(solved_count: u32, quest_volume: f32) -> f32 {
    let volume = quest_volume.max(0.0) as f64 * solved_count as f64;
    (3.0 * volume / (4.0 * std::f64::consts::PI)).cbrt() as f32
}

/// Density of a bubble body: the volume of the ball divided by the area of the
/// disc of the same radius, `(4/3) · r`.
///
/// The 2D disc then has the mass of the 3D ball it represents, so big bubbles
/// shove small ones around like heavy balls would.
pub fn bubble_density(radius: f32) -> f32 {
    4.0 / 3.0 * radius
}

/// Area of the simulation in m², such that the bubbles fill `fill_factor` of it.
///
/// An empty scene (or any non-positive result) gets `min_area`, so the layout
/// stays well defined.
pub fn simulation_area(total_solved: u64, config: &SceneConfig) -> f32 {
    let area = config.quest_volume * total_solved as f32 / config.fill_factor;
    if area.is_finite() && area > 0.0 {
        area
    } else {
        config.min_area.max(f32::MIN_POSITIVE)
    }
}

/// How the simulation area maps onto the view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneLayout {
    pub width_px: f32,

    pub height_px: f32,

    pub pixels_per_meter: f32,

    /// Simulation-space rectangle, with its minimum corner at the origin
    pub bounds: Aabb,
}

impl SceneLayout {
    /// Scales a `width_px × height_px` view so that it shows `area_m2` of simulation.
    ///
    /// Non-positive sizes are clamped to one pixel and a non-positive area to the
    /// smallest positive value; non-finite inputs are rejected.
    pub fn new(width_px: f32, height_px: f32, area_m2: f32) -> Result<Self> {
        if !width_px.is_finite() || !height_px.is_finite() || !area_m2.is_finite() {
            return Err(PhysicsError::Configuration(format!(
                "scene size {}x{} px for {} m² is not finite",
                width_px, height_px, area_m2
            )));
        }

        let width_px = clamp_positive("width", width_px, 1.0);
        let height_px = clamp_positive("height", height_px, 1.0);
        let area_m2 = clamp_positive("area", area_m2, f32::MIN_POSITIVE);

        let pixels_per_meter = (width_px * height_px / area_m2).sqrt();
        let bounds = Aabb::new(
            Vector2::ZERO,
            Vector2::new(width_px / pixels_per_meter, height_px / pixels_per_meter),
        );

        Ok(Self {
            width_px,
            height_px,
            pixels_per_meter,
            bounds,
        })
    }

    pub fn width_m(&self) -> f32 {
        self.bounds.width()
    }

    pub fn height_m(&self) -> f32 {
        self.bounds.height()
    }
}

fn clamp_positive(what: &str, value: f32, min: f32) -> f32 {
    if value > 0.0 {
        value
    } else {
        warn!("scene {} {} is not positive, using {}", what, value, min);
        min
    }
}

/// A uniformly random position where a bubble of `radius` fits inside `bounds`.
///
/// Along an axis too short for the bubble the coordinate is the axis center.
pub fn spawn_position<R: Rng + ?Sized>(rng: &mut R, radius: f32, bounds: &Aabb) -> Vector2 {
    let mut axis = |min: f32, extent: f32| {
        let free = extent - 2.0 * radius;
        if free > 0.0 {
            min + radius + rng.gen::<f32>() * free
        } else {
            min + 0.5 * extent
        }
    };

    let x = axis(bounds.min.x, bounds.width());
    let y = axis(bounds.min.y, bounds.height());
    Vector2::new(x, y)
}

/// Converts a fling on a rotated view into a simulation velocity change.
///
/// `screen_velocity` is in pixels per second (y up) in the view's own frame.
/// `θ` is the body's counter-clockwise angle in degrees, the opposite of the
/// clockwise rotation the view is drawn with. The velocity is rotated by `θ`,
/// `(cosθ·vx − sinθ·vy, cosθ·vy + sinθ·vx)`, then scaled by
/// `speed_factor / pixels_per_meter`.
pub fn fling_velocity(
    screen_velocity: Vector2,
    body_angle_degrees: f32,
    pixels_per_meter: f32,
    speed_factor: f32,
) -> Vector2 {
    let rotated = screen_velocity.rotated(crate::math::to_radians(body_angle_degrees));
    rotated * (speed_factor / pixels_per_meter)
}
