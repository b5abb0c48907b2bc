//! Discrete-time simulator for the queue/age/conflict feedback loop.
//!
//! The closed-form solver in [`crate::solver`] predicts *whether* a
//! workload point is past its threshold; this module reproduces *how*
//! instability unfolds. One server drains batches arriving from N
//! clients, modeled as a continuous arrival approximation on a fixed
//! time step. Batches that sit behind a backlog are staler when they
//! finally reach the server, which widens their conflict window, which
//! inflates their processing time, which deepens the backlog — the
//! positive feedback loop this crate exists to expose.
//!
//! The run is a closed dynamical system: no I/O, no randomness,
//! identical inputs produce an identical [`Trace`] bit for bit.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, trace, warn};

use crate::error::ModelError;
use crate::params::{BatchingRule, ProtocolParams, Workload};
use crate::solver::{batch_interval, effective_batch};
use crate::trace::{Trace, TraceMeta, TracePoint};

/// Inputs for one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub workload: Workload,
    /// Assumed true per-operation processing cost (ms).
    pub cost_ms: f64,
    /// Total simulated duration.
    pub duration: Duration,
    /// Fixed time step.
    pub dt: Duration,
    pub rule: BatchingRule,
}

impl SimConfig {
    fn validate(&self) -> Result<(), ModelError> {
        if self.workload.clients == 0 {
            return Err(ModelError::NoClients);
        }
        if self.dt.is_zero() {
            return Err(ModelError::InvalidTimeStep { dt: self.dt });
        }
        if self.duration < self.dt {
            return Err(ModelError::DurationTooShort {
                duration: self.duration,
                dt: self.dt,
            });
        }
        Ok(())
    }
}

/// Per-run constants derived once from the parameter set and workload.
#[derive(Debug, Clone, Copy)]
struct Derived {
    /// Seconds between one client's flushes.
    batch_interval: f64,
    /// Batches arriving per second across all clients.
    arrival_rate: f64,
    /// Base operations per batch.
    base_ops: f64,
    /// Total operations per second across all clients.
    op_rate: f64,
    round_trip: f64,
    ceiling: f64,
    cost_ms: f64,
}

impl Derived {
    fn new(params: &ProtocolParams, config: &SimConfig) -> Self {
        let interval = batch_interval(params, config.rule, config.workload.ops_per_client);
        let clients = f64::from(config.workload.clients);
        // Guard the degenerate interval; queue growth is simply zero then.
        let arrival_rate = if interval > 0.0 { clients / interval } else { 0.0 };
        Self {
            batch_interval: interval,
            arrival_rate,
            base_ops: effective_batch(params, config.workload.ops_per_client),
            op_rate: clients * config.workload.ops_per_client,
            round_trip: params.round_trip_secs(),
            ceiling: params.reshuffle_ceiling,
            cost_ms: config.cost_ms,
        }
    }
}

/// Mutable state threaded through the run, one [`step`](SimState::step)
/// per time slice. Owned exclusively by its run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimState {
    /// Fractional batches awaiting service.
    queue: f64,
    /// Milliseconds left on the batch currently in service; the server
    /// is idle when this is non-positive.
    processing_remaining: f64,
    current_conflicts: f64,
    current_age: f64,
    failed: bool,
    fail_time: Option<f64>,
}

impl SimState {
    fn new() -> Self {
        Self {
            queue: 0.0,
            processing_remaining: 0.0,
            current_conflicts: 0.0,
            current_age: 0.0,
            failed: false,
            fail_time: None,
        }
    }

    pub fn queue_depth(&self) -> f64 {
        self.queue
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Seconds into the run at which the failure latch first tripped.
    pub fn fail_time_secs(&self) -> Option<f64> {
        self.fail_time
    }

    /// Advance the state by one time slice of `dt` seconds ending the
    /// step that began at `now`.
    fn step(&mut self, now: f64, dt: f64, d: &Derived) {
        // Continuous arrival approximation: N clients collectively
        // submit N / T_batch batches per second.
        self.queue += d.arrival_rate * dt;

        // Idle server takes the next whole batch once one is queued.
        if self.processing_remaining <= 0.0 && self.queue >= 1.0 {
            self.queue -= 1.0;

            // Batches behind a backlog are staler by the time they are
            // serviced, enlarging their conflict window. The wait implied
            // by the current depth is its drain time at the going
            // per-batch service estimate.
            let est_service_s = d.cost_ms * (d.base_ops + self.current_conflicts) / 1000.0;
            let queue_wait = self.queue * est_service_s;
            self.current_age = d.batch_interval + queue_wait + d.round_trip;
            self.current_conflicts = d.op_rate * self.current_age;

            if self.current_conflicts > d.ceiling {
                self.failed = true;
                if self.fail_time.is_none() {
                    self.fail_time = Some(now);
                    warn!(
                        time_s = now,
                        conflicts = self.current_conflicts,
                        ceiling = d.ceiling,
                        "conflict count exceeded the reshuffle ceiling"
                    );
                }
            }

            // Processing cost scales with base ops plus conflict-driven
            // extra work.
            self.processing_remaining = d.cost_ms * (d.base_ops + self.current_conflicts);
            trace!(
                time_s = now,
                age_s = self.current_age,
                conflicts = self.current_conflicts,
                service_ms = self.processing_remaining,
                "took batch into service"
            );
        }

        if self.processing_remaining > 0.0 {
            self.processing_remaining -= dt * 1000.0;
        }
    }

    fn sample(&self, t: f64) -> TracePoint {
        TracePoint {
            t,
            queue_depth: self.queue,
            conflicts: self.current_conflicts,
            age: self.current_age,
        }
    }
}

/// Outcome of one simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub trace: Trace,
    /// Latched failure flag: true once any serviced batch exceeded the
    /// reshuffle ceiling.
    pub failed: bool,
    /// Time of the first excursion, if any.
    pub fail_time: Option<Duration>,
}

/// Run the discrete-time simulation for one workload point.
///
/// The run completes synchronously in `duration / dt` steps. Errors are
/// configuration mistakes only; degenerate workloads (`M <= 0`) fall
/// back to flush-timer-only batching and simulate normally.
#[instrument(skip(params, config), fields(
    clients = config.workload.clients,
    ops_per_client = config.workload.ops_per_client,
    cost_ms = config.cost_ms,
))]
pub fn simulate(params: &ProtocolParams, config: &SimConfig) -> Result<RunOutcome, ModelError> {
    config.validate()?;

    let d = Derived::new(params, config);
    let dt = config.dt.as_secs_f64();
    let steps = (config.duration.as_secs_f64() / dt) as usize;

    debug!(
        steps,
        batch_interval_s = d.batch_interval,
        arrival_rate = d.arrival_rate,
        "starting simulation run"
    );

    let mut trace = Trace::with_capacity(
        TraceMeta {
            workload: config.workload,
            cost_ms: config.cost_ms,
            duration: config.duration,
            dt: config.dt,
            rule: config.rule,
        },
        steps,
    );

    let mut state = SimState::new();
    for i in 0..steps {
        let now = i as f64 * dt;
        state.step(now, dt, &d);
        trace.record(state.sample(now));
    }

    debug!(
        failed = state.failed,
        final_queue = state.queue,
        "simulation run complete"
    );

    Ok(RunOutcome {
        trace,
        failed: state.failed,
        fail_time: state.fail_time.map(Duration::from_secs_f64),
    })
}
