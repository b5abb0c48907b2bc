//! Simulation traces.
//!
//! A [`Trace`] is the append-only, per-step record of a single
//! simulation run, consumed downstream for summarization and rendering.
//! The format is intentionally minimal and serde-friendly so external
//! tooling can persist and plot it without touching the simulator.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::params::{BatchingRule, Workload};

/// Inputs that produced a trace, carried alongside it so a stored trace
/// is self-describing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceMeta {
    pub workload: Workload,
    /// Assumed true per-operation processing cost (ms).
    pub cost_ms: f64,
    pub duration: Duration,
    pub dt: Duration,
    pub rule: BatchingRule,
}

/// One sample per simulation time step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TracePoint {
    /// Simulation time in seconds.
    pub t: f64,
    /// Fractional batches awaiting service after this step.
    pub queue_depth: f64,
    /// Conflict count of the batch most recently taken into service.
    pub conflicts: f64,
    /// Effective age (seconds) of that batch.
    pub age: f64,
}

/// Ordered per-step samples of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub meta: TraceMeta,
    points: Vec<TracePoint>,
}

impl Trace {
    pub fn new(meta: TraceMeta) -> Self {
        Self {
            meta,
            points: Vec::new(),
        }
    }

    pub(crate) fn with_capacity(meta: TraceMeta, steps: usize) -> Self {
        Self {
            meta,
            points: Vec::with_capacity(steps),
        }
    }

    /// Append one step's sample. Traces are append-only; recorded
    /// points are never revised.
    pub fn record(&mut self, point: TracePoint) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[TracePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points at or after time `t` (seconds).
    pub fn points_from(&self, t: f64) -> &[TracePoint] {
        let start = self.points.partition_point(|p| p.t < t);
        &self.points[start..]
    }

    /// Largest queue depth seen across the run.
    pub fn max_queue_depth(&self) -> f64 {
        self.points
            .iter()
            .fold(0.0_f64, |acc, p| acc.max(p.queue_depth))
    }

    /// Largest conflict count seen across the run.
    pub fn max_conflicts(&self) -> f64 {
        self.points
            .iter()
            .fold(0.0_f64, |acc, p| acc.max(p.conflicts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::BatchingRule;

    fn meta() -> TraceMeta {
        TraceMeta {
            workload: Workload::new(2, 5.0),
            cost_ms: 10.0,
            duration: Duration::from_secs(1),
            dt: Duration::from_millis(10),
            rule: BatchingRule::AtLeastTimer,
        }
    }

    #[test]
    fn points_from_splits_on_time() {
        let mut trace = Trace::new(meta());
        for i in 0..10 {
            trace.record(TracePoint {
                t: i as f64 * 0.1,
                queue_depth: i as f64,
                conflicts: 0.0,
                age: 0.0,
            });
        }
        assert_eq!(trace.points_from(0.45).len(), 5);
        assert_eq!(trace.points_from(0.0).len(), 10);
        assert!(trace.points_from(10.0).is_empty());
        assert_eq!(trace.max_queue_depth(), 9.0);
    }
}
