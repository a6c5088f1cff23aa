//! Physics capability consumed by the animation runtime.
//!
//! Simulation itself lives behind [`PhysicsBackend`]; the stage only initialises it once at load
//! time and asks it to reset when a looping clip wraps around.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use futures::future::BoxFuture;

use crate::errors::PhysicsError;

pub trait PhysicsBackend: Send {
    /// Prepares the simulation. Called once, concurrently with asset loading.
    fn initialize(&mut self) -> BoxFuture<'_, Result<(), PhysicsError>>;

    /// Re-initialises the state of every simulated body, dropping accumulated velocity.
    fn reset_all(&mut self);

    fn step(&mut self, _dt: f32) {}

    fn name(&self) -> &str;
}

/// Observable counters of a [`KinematicPhysics`] backend.
#[derive(Debug, Clone, Default)]
pub struct PhysicsStats {
    initialized: Arc<AtomicU32>,
    resets: Arc<AtomicU32>,
}

impl PhysicsStats {
    #[must_use]
    pub fn initialize_count(&self) -> u32 {
        self.initialized.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn reset_count(&self) -> u32 {
        self.resets.load(Ordering::Acquire)
    }
}

/// Backend without dynamics: bones follow the animation exactly.
#[derive(Debug, Default)]
pub struct KinematicPhysics {
    stats: PhysicsStats,
}

impl KinematicPhysics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to this backend's counters; stays valid after the backend moves into a runtime.
    #[must_use]
    pub fn stats(&self) -> PhysicsStats {
        self.stats.clone()
    }
}

impl PhysicsBackend for KinematicPhysics {
    fn initialize(&mut self) -> BoxFuture<'_, Result<(), PhysicsError>> {
        Box::pin(async move {
            self.stats.initialized.fetch_add(1, Ordering::AcqRel);
            Ok(())
        })
    }

    fn reset_all(&mut self) {
        self.stats.resets.fetch_add(1, Ordering::AcqRel);
    }

    fn name(&self) -> &str {
        "kinematic"
    }
}
