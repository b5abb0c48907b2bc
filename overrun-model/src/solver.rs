//! Closed-form stability solver.
//!
//! In steady state (no queue buildup), each of N clients sends a batch
//! every `T_batch` seconds, so the server must work through all N
//! batches within one `T_batch` window. Each batch carries its base
//! operations plus every operation, from any client, that arrived while
//! the batch was aging in the buffer and on the wire — those are the
//! conflicts the server resolves on apply. The system is stable only
//! while the true per-operation cost stays below the ratio of the
//! server's per-batch time budget to that total workload.
//!
//! Every function here is pure: no state, no side effects, bit-identical
//! results for identical inputs.

use crate::params::{BatchingRule, ProtocolParams, Workload};

/// Seconds between a single client's successive batch flushes.
///
/// For `ops_per_client > 0` this combines the time to naturally fill a
/// batch (`B / M`) with the flush timer under the given rule. A client
/// that issues no operations flushes purely on the timer.
pub fn batch_interval(params: &ProtocolParams, rule: BatchingRule, ops_per_client: f64) -> f64 {
    if ops_per_client > 0.0 {
        let time_to_fill = f64::from(params.batch_size) / ops_per_client;
        rule.combine(time_to_fill, params.flush_secs())
    } else {
        params.flush_secs()
    }
}

/// Number of operations actually carried in one flushed batch.
///
/// A slow client never fills the buffer within one flush window, so the
/// batch holds whatever accumulated: `min(B, M * T_flush)`.
pub fn effective_batch(params: &ProtocolParams, ops_per_client: f64) -> f64 {
    if ops_per_client > 0.0 {
        f64::from(params.batch_size).min(ops_per_client * params.flush_secs())
    } else {
        0.0
    }
}

/// Critical mean per-operation processing time (ms) for a workload.
///
/// Below this threshold the server keeps up; above it the
/// queue/age/conflict feedback loop diverges. Returns `f64::INFINITY`
/// when the per-batch workload is non-positive — with nothing to
/// process, the workload is unconditionally stable.
pub fn critical_cost(params: &ProtocolParams, rule: BatchingRule, workload: Workload) -> f64 {
    let interval = batch_interval(params, rule, workload.ops_per_client);
    let base_ops = effective_batch(params, workload.ops_per_client);

    // Time from enqueue to server-side service, assuming no backlog.
    let age = interval + params.round_trip_secs();
    let conflict_ops = f64::from(workload.clients) * workload.ops_per_client * age;

    let total_ops = base_ops + conflict_ops;
    if total_ops <= 0.0 {
        return f64::INFINITY;
    }

    let available_ms = interval * 1000.0 / f64::from(workload.clients);
    available_ms / total_ops
}

/// Ratio of an assumed per-operation cost to the critical cost.
///
/// Greater than one means the workload is predicted unstable at that
/// cost. Zero when the critical cost is infinite.
pub fn stability_ratio(
    params: &ProtocolParams,
    rule: BatchingRule,
    workload: Workload,
    cost_ms: f64,
) -> f64 {
    cost_ms / critical_cost(params, rule, workload)
}

/// One row of the analytical summary: the derived quantities for a
/// single workload point, judged against a caller-supplied reference
/// cost.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StabilityRow {
    pub workload: Workload,
    /// Seconds between a client's batch flushes.
    pub batch_interval_s: f64,
    /// Operations carried per flushed batch.
    pub effective_batch: f64,
    /// Steady-state batch age in seconds.
    pub age_s: f64,
    /// Conflicting operations per batch at steady state.
    pub conflict_ops: f64,
    /// Critical per-operation cost in ms; `None` means unconditionally
    /// stable (infinite threshold).
    pub critical_cost_ms: Option<f64>,
    /// Whether the workload is stable at the reference cost.
    pub stable_at_reference: bool,
}

/// Analytical summary over a workload grid.
///
/// `reference_cost_ms` is the assumed true per-operation cost the rows
/// are judged against; it is always caller-supplied because the real
/// figure is an empirical estimate, not a derived constant.
pub fn stability_table(
    params: &ProtocolParams,
    rule: BatchingRule,
    client_counts: &[u32],
    op_rates: &[f64],
    reference_cost_ms: f64,
) -> Vec<StabilityRow> {
    let mut rows = Vec::with_capacity(client_counts.len() * op_rates.len());
    for &clients in client_counts {
        for &ops in op_rates {
            let workload = Workload::new(clients, ops);
            let interval = batch_interval(params, rule, ops);
            let age = interval + params.round_trip_secs();
            let critical = critical_cost(params, rule, workload);
            rows.push(StabilityRow {
                workload,
                batch_interval_s: interval,
                effective_batch: effective_batch(params, ops),
                age_s: age,
                conflict_ops: f64::from(clients) * ops * age,
                critical_cost_ms: critical.is_finite().then_some(critical),
                stable_at_reference: reference_cost_ms < critical,
            });
        }
    }
    rows
}
