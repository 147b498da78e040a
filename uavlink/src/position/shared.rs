//! Synchronized holder for the mover's current position.

use std::sync::{Arc, RwLock};

use super::sample::PositionSample;

/// The mover's current position, shared between the motion loop and any
/// reader (status logging, tests).
///
/// The whole sample is swapped under the lock, so readers never observe a
/// half-updated position.
#[derive(Debug, Clone, Default)]
pub struct SharedPosition {
    inner: Arc<RwLock<PositionSample>>,
}

impl SharedPosition {
    /// Create a holder starting at `initial`.
    pub fn new(initial: PositionSample) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    /// Current position.
    pub fn get(&self) -> PositionSample {
        *self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace the current position.
    pub fn set(&self, sample: PositionSample) {
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = sample;
    }
}
