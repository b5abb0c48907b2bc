//! Workload grid sweeps.
//!
//! Evaluates the stability model over a grid of (clients, op-rate)
//! points — the data behind a stability heatmap. The closed-form grid
//! is cheap and computed inline; the simulating variant runs one full
//! simulation per cell and fans the cells out across scoped threads.
//! Cells are independent runs, so the only synchronization is
//! collecting results; cell order in the output is row-major and
//! identical no matter how many workers ran.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use overrun_model::{
    critical_cost, simulate, BatchingRule, ModelError, ProtocolParams, SimConfig, Workload,
};

/// Grid axes plus the assumed per-operation cost the cells are judged
/// against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Client-count axis (rows).
    pub client_counts: Vec<u32>,
    /// Per-client op-rate axis (columns).
    pub op_rates: Vec<f64>,
    /// Assumed true per-operation cost (ms); caller-supplied, the model
    /// has no built-in estimate.
    pub cost_ms: f64,
    pub rule: BatchingRule,
}

/// One grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepCell {
    pub workload: Workload,
    /// Critical cost for this cell; `None` means unconditionally stable.
    pub critical_cost_ms: Option<f64>,
    /// `cost_ms / critical_cost`; above one is predicted unstable.
    pub ratio: f64,
    /// Simulated verdict, when the sweep ran simulations.
    pub failed: Option<bool>,
    /// Simulated time of first excursion, when one occurred.
    pub fail_time: Option<Duration>,
}

/// Sweep output: the axes echoed back plus cells in row-major order
/// (client counts outer, op rates inner).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepGrid {
    pub client_counts: Vec<u32>,
    pub op_rates: Vec<f64>,
    pub cost_ms: f64,
    pub rule: BatchingRule,
    pub cells: Vec<SweepCell>,
}

impl SweepGrid {
    /// Cell at the given axis indices.
    pub fn cell(&self, client_idx: usize, rate_idx: usize) -> &SweepCell {
        &self.cells[client_idx * self.op_rates.len() + rate_idx]
    }
}

fn closed_form_cell(params: &ProtocolParams, config: &SweepConfig, workload: Workload) -> SweepCell {
    let critical = critical_cost(params, config.rule, workload);
    SweepCell {
        workload,
        critical_cost_ms: critical.is_finite().then_some(critical),
        ratio: config.cost_ms / critical,
        failed: None,
        fail_time: None,
    }
}

/// Closed-form sweep: critical cost and ratio per cell, no simulation.
pub fn ratio_grid(params: &ProtocolParams, config: &SweepConfig) -> SweepGrid {
    let cells = grid_workloads(config)
        .map(|w| closed_form_cell(params, config, w))
        .collect();
    SweepGrid {
        client_counts: config.client_counts.clone(),
        op_rates: config.op_rates.clone(),
        cost_ms: config.cost_ms,
        rule: config.rule,
        cells,
    }
}

/// Simulating sweep: every cell additionally runs a full simulation of
/// `duration` at step `dt` and records its verdict.
///
/// Each cell is a self-contained deterministic run, so cells are
/// dispatched across scoped threads; nothing is parallelized *within* a
/// run's time-step loop.
pub fn simulate_grid(
    params: &ProtocolParams,
    config: &SweepConfig,
    duration: Duration,
    dt: Duration,
) -> Result<SweepGrid, ModelError> {
    let workloads: Vec<Workload> = grid_workloads(config).collect();
    if workloads.is_empty() {
        return Ok(ratio_grid(params, config));
    }

    let workers = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(workloads.len().max(1));
    let chunk_size = workloads.len().div_ceil(workers);

    debug!(
        cells = workloads.len(),
        workers, "dispatching simulating sweep"
    );

    let cells = std::thread::scope(|scope| {
        let handles: Vec<_> = workloads
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|&workload| {
                            let outcome = simulate(
                                params,
                                &SimConfig {
                                    workload,
                                    cost_ms: config.cost_ms,
                                    duration,
                                    dt,
                                    rule: config.rule,
                                },
                            )?;
                            Ok(SweepCell {
                                failed: Some(outcome.failed),
                                fail_time: outcome.fail_time,
                                ..closed_form_cell(params, config, workload)
                            })
                        })
                        .collect::<Result<Vec<_>, ModelError>>()
                })
            })
            .collect();

        // Joining in spawn order keeps the row-major cell order
        // independent of scheduling.
        let mut cells = Vec::with_capacity(workloads.len());
        for handle in handles {
            cells.extend(handle.join().expect("sweep worker panicked")?);
        }
        Ok::<_, ModelError>(cells)
    })?;

    Ok(SweepGrid {
        client_counts: config.client_counts.clone(),
        op_rates: config.op_rates.clone(),
        cost_ms: config.cost_ms,
        rule: config.rule,
        cells,
    })
}

fn grid_workloads(config: &SweepConfig) -> impl Iterator<Item = Workload> + '_ {
    config.client_counts.iter().flat_map(move |&clients| {
        config
            .op_rates
            .iter()
            .map(move |&ops| Workload::new(clients, ops))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SweepConfig {
        SweepConfig {
            client_counts: vec![1, 5, 10],
            op_rates: vec![0.0, 2.0, 10.0],
            cost_ms: 25.0,
            rule: BatchingRule::AtLeastTimer,
        }
    }

    #[test]
    fn grid_is_row_major_and_matches_solver() {
        let params = ProtocolParams::default();
        let cfg = config();
        let grid = ratio_grid(&params, &cfg);

        assert_eq!(grid.cells.len(), 9);
        for (i, &clients) in cfg.client_counts.iter().enumerate() {
            for (j, &ops) in cfg.op_rates.iter().enumerate() {
                let cell = grid.cell(i, j);
                assert_eq!(cell.workload, Workload::new(clients, ops));
                let xc = critical_cost(&params, cfg.rule, cell.workload);
                match cell.critical_cost_ms {
                    Some(got) => assert_eq!(got.to_bits(), xc.to_bits()),
                    None => assert!(xc.is_infinite()),
                }
            }
        }
    }

    #[test]
    fn idle_column_is_unconditionally_stable() {
        let grid = ratio_grid(&ProtocolParams::default(), &config());
        for i in 0..3 {
            let cell = grid.cell(i, 0);
            assert_eq!(cell.critical_cost_ms, None);
            assert_eq!(cell.ratio, 0.0);
        }
    }
}
