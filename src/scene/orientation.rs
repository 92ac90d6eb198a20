//! Points simulation gravity at the real floor.
//!
//! Accelerometer readings are in the device's natural frame; the simulation is
//! drawn in the frame of the current display rotation. The reading is rotated
//! into the display frame and negated, since an accelerometer at rest reports
//! the reaction to gravity.

use std::sync::Arc;

use log::trace;
use parking_lot::Mutex;

use crate::core::PhysicsController;
use crate::math::Vector2;

/// Trust level reported with a sensor reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SensorAccuracy {
    Unreliable,
    Low,
    Medium,
    High,
}

/// Rotation of the display relative to the device's natural orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayRotation {
    #[default]
    Rotation0,
    Rotation90,
    Rotation180,
    Rotation270,
}

impl DisplayRotation {
    /// The rotation for a multiple of 90 degrees, if it is one
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Self::Rotation0),
            90 => Some(Self::Rotation90),
            180 => Some(Self::Rotation180),
            270 => Some(Self::Rotation270),
            _ => None,
        }
    }
}

/// An accelerometer sample in m/s², device frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    pub x: f32,

    pub y: f32,

    pub z: f32,

    pub accuracy: SensorAccuracy,
}

impl SensorReading {
    pub fn new(x: f32, y: f32, z: f32, accuracy: SensorAccuracy) -> Self {
        Self { x, y, z, accuracy }
    }
}

/// Simulation gravity for a reading, or `None` if the reading is too unreliable
/// or not finite
pub fn gravity_from_sensor(reading: &SensorReading, rotation: DisplayRotation) -> Option<Vector2> {
    if reading.accuracy < SensorAccuracy::Low || !reading.x.is_finite() || !reading.y.is_finite() {
        return None;
    }

    let (x, y) = (reading.x, reading.y);
    let gravity = match rotation {
        DisplayRotation::Rotation0 => Vector2::new(-x, -y),
        DisplayRotation::Rotation90 => Vector2::new(y, -x),
        DisplayRotation::Rotation180 => Vector2::new(x, y),
        DisplayRotation::Rotation270 => Vector2::new(-y, x),
    };
    Some(gravity)
}

/// Feeds accelerometer readings into a controller's gravity
pub struct OrientationAdapter {
    controller: Arc<PhysicsController>,

    rotation: Mutex<DisplayRotation>,
}

impl OrientationAdapter {
    pub fn new(controller: Arc<PhysicsController>, rotation: DisplayRotation) -> Self {
        Self {
            controller,
            rotation: Mutex::new(rotation),
        }
    }

    pub fn set_display_rotation(&self, rotation: DisplayRotation) {
        *self.rotation.lock() = rotation;
    }

    pub fn display_rotation(&self) -> DisplayRotation {
        *self.rotation.lock()
    }

    /// Applies a reading; returns whether gravity was updated
    pub fn on_sensor_changed(&self, reading: &SensorReading) -> bool {
        match gravity_from_sensor(reading, self.display_rotation()) {
            Some(gravity) => {
                self.controller.set_gravity(gravity);
                true
            }
            None => {
                trace!("ignoring {:?} accelerometer reading", reading.accuracy);
                false
            }
        }
    }
}
