//! Stability model for batched client-server sync protocols.
//!
//! A fleet of clients buffers operations into batches and flushes them
//! to one server. Every batch ages between enqueue and service, and
//! every operation that arrived anywhere in the system during that age
//! can conflict with it, inflating the work the server must do to apply
//! it. Past a critical per-operation cost this becomes a positive
//! feedback loop: backlog makes batches older, older batches carry more
//! conflicts, more conflicts make service slower, slower service grows
//! the backlog. This crate predicts where that loop tips over:
//!
//! - [`solver`] gives the closed-form critical processing time
//!   [`critical_cost`] for a workload point, plus the derived batching
//!   quantities it is built from.
//! - [`sim`] replays the loop step by step with [`simulate`], producing
//!   a per-step [`Trace`] and a latched failure verdict.
//!
//! Both take an immutable [`ProtocolParams`] describing the protocol's
//! fixed timing constants and a [`BatchingRule`] choosing how the batch
//! interval combines buffer fill with the flush timer. Everything is
//! deterministic: identical inputs give bit-identical outputs.
//!
//! # Example
//!
//! ```
//! use overrun_model::{
//!     critical_cost, simulate, BatchingRule, ProtocolParams, SimConfig, Workload,
//! };
//! use std::time::Duration;
//!
//! let params = ProtocolParams::default();
//! let workload = Workload::new(5, 10.0);
//!
//! let threshold = critical_cost(&params, BatchingRule::AtLeastTimer, workload);
//! assert!(threshold < 4.0); // ~3.77 ms/op for this point
//!
//! let outcome = simulate(
//!     &params,
//!     &SimConfig {
//!         workload,
//!         cost_ms: 25.0,
//!         duration: Duration::from_secs(20),
//!         dt: Duration::from_millis(5),
//!         rule: BatchingRule::AtLeastTimer,
//!     },
//! )
//! .unwrap();
//! assert!(outcome.failed);
//! ```

pub mod error;
pub mod logging;
pub mod params;
pub mod sim;
pub mod solver;
pub mod trace;

pub use error::ModelError;
pub use logging::{init_model_logging, init_model_logging_with_level};
pub use params::{BatchingRule, ProtocolParams, Workload};
pub use sim::{simulate, RunOutcome, SimConfig, SimState};
pub use solver::{
    batch_interval, critical_cost, effective_batch, stability_ratio, stability_table, StabilityRow,
};
pub use trace::{Trace, TraceMeta, TracePoint};
