//! Queue/age/conflict feedback loop at the stress-test workload.
//!
//! Prints the analytical summary for a small workload grid, then runs
//! the simulator at a per-operation cost well above the critical
//! threshold and reports how the loop tips over. Pick the batching rule
//! with `--fill-or-timer` (default is the timer-floor rule).

use std::io::Write;
use std::time::Duration;

use overrun_model::{
    critical_cost, init_model_logging, simulate, stability_table, BatchingRule, ProtocolParams,
    SimConfig, Workload,
};

const COST_MS: f64 = 25.0;
const DURATION: Duration = Duration::from_secs(20);
const DT: Duration = Duration::from_millis(5);

fn main() {
    init_model_logging();

    let rule = if std::env::args().any(|a| a == "--fill-or-timer") {
        BatchingRule::FillOrTimer
    } else {
        BatchingRule::AtLeastTimer
    };

    let params = ProtocolParams::default();
    let mut out = std::io::stdout().lock();

    let _ = writeln!(out, "== Analytical summary ({rule:?}, X = {COST_MS} ms/op) ==");
    let _ = writeln!(
        out,
        "{:>3} {:>6} {:>9} {:>6} {:>7} {:>10} {:>9} {:>9}",
        "N", "M", "T_batch", "B_eff", "age", "conflicts", "X_crit", "verdict"
    );
    let rows = stability_table(&params, rule, &[1, 2, 5, 10, 20], &[2.0, 5.0, 10.0, 20.0], COST_MS);
    for r in &rows {
        let xc = r
            .critical_cost_ms
            .map_or("inf".to_string(), |x| format!("{x:.3}"));
        let _ = writeln!(
            out,
            "{:>3} {:>6} {:>8.2}s {:>6.1} {:>6.2}s {:>10.1} {:>9} {:>9}",
            r.workload.clients,
            r.workload.ops_per_client,
            r.batch_interval_s,
            r.effective_batch,
            r.age_s,
            r.conflict_ops,
            xc,
            if r.stable_at_reference { "STABLE" } else { "UNSTABLE" },
        );
    }

    let workload = Workload::new(5, 10.0);
    let xc = critical_cost(&params, rule, workload);
    let _ = writeln!(out, "\n== Simulating N=5, M=10 at X = {COST_MS} ms/op ==");
    let _ = writeln!(
        out,
        "X_crit = {xc:.3} ms/op -> {:.1}x over budget",
        COST_MS / xc
    );

    let outcome = simulate(
        &params,
        &SimConfig {
            workload,
            cost_ms: COST_MS,
            duration: DURATION,
            dt: DT,
            rule,
        },
    )
    .expect("valid config");

    match outcome.fail_time {
        Some(t) => {
            let _ = writeln!(
                out,
                "FAILED at t={:.2}s (first batch past the {} conflict ceiling)",
                t.as_secs_f64(),
                params.reshuffle_ceiling
            );
        }
        None => {
            let _ = writeln!(out, "survived the full {DURATION:?}");
        }
    }
    let _ = writeln!(
        out,
        "final queue depth = {:.1} batches, peak conflicts = {:.0}",
        outcome
            .trace
            .points()
            .last()
            .map_or(0.0, |p| p.queue_depth),
        outcome.trace.max_conflicts()
    );
}
