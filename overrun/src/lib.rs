//! # Overrun — batched-sync stability model
//!
//! Overrun predicts when a batched client-server sync protocol tips
//! into a reshuffle cascade: the point where per-operation processing
//! cost, batching delay, and conflict-resolution overhead form a
//! positive feedback loop and the server's backlog grows without bound.
//!
//! - [`model`] holds the core: the closed-form critical-cost solver and
//!   the deterministic discrete-time simulator.
//! - [`explore`] layers sweeps, trace summarization, and comparison
//!   against real experiment data on top.

pub use overrun_explore as explore;
pub use overrun_model as model;

/// Commonly used types and functions.
pub mod prelude {
    pub use overrun_model::{
        batch_interval, critical_cost, effective_batch, simulate, stability_ratio,
        stability_table, BatchingRule, ModelError, ProtocolParams, RunOutcome, SimConfig, Trace,
        TraceMeta, TracePoint, Workload,
    };

    pub use overrun_explore::prelude::*;
}
