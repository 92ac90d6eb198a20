use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::core::WorldSnapshot;

/// Callback invoked on the stepping thread after every completed step.
///
/// Treat it as an "invalidate" signal: the render side may coalesce or drop
/// notifications and read the latest snapshot whenever it draws.
pub trait StepListener: Send {
    fn on_world_step(&mut self, snapshot: &WorldSnapshot);
}

impl<F> StepListener for F
where
    F: FnMut(&WorldSnapshot) + Send,
{
    fn on_world_step(&mut self, snapshot: &WorldSnapshot) {
        self(snapshot)
    }
}

/// A step listener that raises a dirty flag, drained once per frame by the
/// render loop. Any number of steps between two frames collapse into one repaint.
#[derive(Debug, Clone, Default)]
pub struct RepaintSignal {
    dirty: Arc<AtomicBool>,
}

impl RepaintSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the surface as needing a repaint
    pub fn invalidate(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    /// Returns true if a repaint was requested since the last call, and clears it
    pub fn take(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }
}

impl StepListener for RepaintSignal {
    fn on_world_step(&mut self, _snapshot: &WorldSnapshot) {
        self.invalidate();
    }
}
