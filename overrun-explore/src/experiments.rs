//! Experimental run records and prediction overlay.
//!
//! Real test runs are parsed out of client/server logs by external
//! tooling and handed over as structured records, one per run. This
//! module holds them unmodified for comparison against the model's
//! predictions; nothing here feeds back into the solver or simulator.

use serde::{Deserialize, Serialize};

use overrun_model::{critical_cost, BatchingRule, ProtocolParams, Workload};

/// One observed reshuffle: the retry attempt that reported it and its
/// offset from run start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReshuffleEvent {
    pub attempt: u32,
    pub elapsed_ms: u64,
}

/// One real test run, as extracted from its logs.
///
/// Optional fields are genuinely absent on stable runs (a run that
/// never failed has no time-to-first-failure); they are never encoded
/// as sentinel numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentRecord {
    /// Identifier of the run this record was extracted from.
    pub source: String,

    pub clients: u32,

    /// Approximated per-client operation rate (ops/s).
    pub m_approx: f64,

    /// Flush interval the run was configured with.
    pub flush_interval_ms: u64,

    pub duration_ms: u64,

    /// Observed verdict: did the run stay stable for its full duration.
    pub stable: bool,

    /// Observed reshuffle events, in log order.
    #[serde(default)]
    pub reshuffles: Vec<ReshuffleEvent>,

    #[serde(default)]
    pub dead_letter_count: u64,

    #[serde(default)]
    pub first_reshuffle_ms: Option<u64>,

    #[serde(default)]
    pub first_dead_letter_ms: Option<u64>,

    /// Highest reshuffle attempt number seen, if any reshuffle occurred.
    #[serde(default)]
    pub max_reshuffle_attempt: Option<u32>,
}

impl ExperimentRecord {
    /// The workload point this run exercised.
    pub fn workload(&self) -> Workload {
        Workload::new(self.clients, self.m_approx)
    }

    /// Elapsed ms to the first instability signal: the first reshuffle,
    /// falling back to the first dead letter.
    pub fn first_failure_ms(&self) -> Option<u64> {
        self.first_reshuffle_ms.or(self.first_dead_letter_ms)
    }
}

/// An immutable collection of experiment records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExperimentSet {
    records: Vec<ExperimentRecord>,
}

impl ExperimentSet {
    pub fn new(records: Vec<ExperimentRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ExperimentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Pair every record with the model's prediction for its workload
    /// point, judged at the caller-supplied per-operation cost.
    ///
    /// This is display-side data; the records are not modified and the
    /// observations never flow back into the model.
    pub fn overlay<'a>(
        &'a self,
        params: &ProtocolParams,
        rule: BatchingRule,
        cost_ms: f64,
    ) -> Vec<OverlayPoint<'a>> {
        self.records
            .iter()
            .map(|record| {
                let critical = critical_cost(params, rule, record.workload());
                let predicted_stable = cost_ms < critical;
                OverlayPoint {
                    record,
                    predicted_critical_ms: critical.is_finite().then_some(critical),
                    predicted_stable,
                    agrees: predicted_stable == record.stable,
                }
            })
            .collect()
    }
}

/// One record joined with the model's prediction for its workload.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayPoint<'a> {
    pub record: &'a ExperimentRecord,
    /// `None` means the model predicts unconditional stability.
    pub predicted_critical_ms: Option<f64>,
    pub predicted_stable: bool,
    /// Whether prediction and observation agree.
    pub agrees: bool,
}
