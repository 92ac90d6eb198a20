use std::sync::atomic::{AtomicU64, Ordering};

use crate::math::Vector2;

/// A gravity vector shared between the caller and the stepping thread.
///
/// Both components live in a single atomic word, so a reader always sees a pair
/// that was written together. Last write wins.
#[derive(Debug)]
pub struct SharedGravity {
    bits: AtomicU64,
}

impl SharedGravity {
    pub fn new(gravity: Vector2) -> Self {
        Self {
            bits: AtomicU64::new(gravity.to_bits()),
        }
    }

    pub fn store(&self, gravity: Vector2) {
        self.bits.store(gravity.to_bits(), Ordering::Release);
    }

    pub fn load(&self) -> Vector2 {
        Vector2::from_bits(self.bits.load(Ordering::Acquire))
    }
}
