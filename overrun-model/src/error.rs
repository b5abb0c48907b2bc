//! Error types for the stability model.

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced when a simulation is configured incorrectly.
///
/// Degenerate *workloads* are not errors: a non-positive operation rate
/// falls back to flush-timer-only batching, and a non-positive per-batch
/// workload makes the critical cost infinite (unconditionally stable).
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("simulation requires at least one client")]
    NoClients,

    #[error("time step must be positive, got {dt:?}")]
    InvalidTimeStep { dt: Duration },

    #[error("duration {duration:?} is shorter than one time step {dt:?}")]
    DurationTooShort { duration: Duration, dt: Duration },
}
