//! End-to-end stability scenarios: the analytical threshold and the
//! simulator must agree about which side of the boundary a workload
//! sits on, and the simulator must reproduce the runaway feedback loop
//! above it.

use overrun_model::{
    batch_interval, critical_cost, effective_batch, simulate, BatchingRule, ProtocolParams,
    SimConfig, Workload,
};
use std::time::Duration;

const STRESS: Workload = Workload {
    clients: 5,
    ops_per_client: 10.0,
};

fn stress_config(cost_ms: f64) -> SimConfig {
    SimConfig {
        workload: STRESS,
        cost_ms,
        duration: Duration::from_secs(20),
        dt: Duration::from_millis(5),
        rule: BatchingRule::AtLeastTimer,
    }
}

#[test]
fn stress_point_analytics() {
    // B=25, T_flush=0.5s, RTT=0.05s, timer-floor batching, N=5, M=10.
    let params = ProtocolParams::default();
    let rule = BatchingRule::AtLeastTimer;

    assert_eq!(batch_interval(&params, rule, 10.0), 2.5);
    assert_eq!(effective_batch(&params, 10.0), 5.0);

    let xc = critical_cost(&params, rule, STRESS);
    // age 2.55s, conflicts 127.5, budget 500ms, total 132.5 ops.
    assert!((xc - 500.0 / 132.5).abs() < 1e-12);
}

#[test]
fn overloaded_run_fails_and_queue_diverges() {
    let params = ProtocolParams::default();
    let xc = critical_cost(&params, BatchingRule::AtLeastTimer, STRESS);
    let cost_ms = 25.0;
    assert!(cost_ms > xc, "scenario must sit above the threshold");

    let outcome = simulate(&params, &stress_config(cost_ms)).unwrap();
    assert!(outcome.failed);

    let fail_time = outcome.fail_time.expect("failed runs record a fail time");
    assert!(fail_time < Duration::from_secs(20));

    // Long-run trend after the failure: windowed queue means must be
    // non-decreasing once the loop has tipped over.
    let suffix = outcome.trace.points_from(fail_time.as_secs_f64());
    let window = suffix.len() / 8;
    assert!(window > 0);
    let mut prev = f64::MIN;
    for chunk in suffix.chunks(window).take(8) {
        let mean: f64 =
            chunk.iter().map(|p| p.queue_depth).sum::<f64>() / chunk.len() as f64;
        assert!(
            mean >= prev,
            "queue trend reversed after failure: {prev} -> {mean}"
        );
        prev = mean;
    }
}

#[test]
fn underloaded_run_stays_stable_and_bounded() {
    let params = ProtocolParams::default();
    let xc = critical_cost(&params, BatchingRule::AtLeastTimer, STRESS);
    let cost_ms = 1.0;
    assert!(cost_ms < xc, "scenario must sit below the threshold");

    let outcome = simulate(&params, &stress_config(cost_ms)).unwrap();
    assert!(!outcome.failed);
    assert_eq!(outcome.fail_time, None);

    // The queue cycles below ~one batch; nowhere near divergence.
    assert!(outcome.trace.max_queue_depth() < 2.0);
}

#[test]
fn latch_is_monotonic_across_the_whole_trace() {
    let params = ProtocolParams::default();
    let outcome = simulate(&params, &stress_config(25.0)).unwrap();
    let fail_t = outcome.fail_time.unwrap().as_secs_f64();

    // Conflict excursions may recur after the latch; what must never
    // happen is a serviced batch *before* fail_time exceeding the
    // ceiling.
    for p in outcome.trace.points() {
        if p.t < fail_t {
            assert!(
                p.conflicts <= params.reshuffle_ceiling,
                "excursion at t={} before recorded fail_time {fail_t}",
                p.t
            );
        }
    }
}

#[test]
fn both_batching_rules_are_exercised_end_to_end() {
    // The two rules disagree materially at this workload: the timer
    // floor stretches the interval to 2.5s while fill-or-timer flushes
    // every 0.5s, so their thresholds differ.
    let params = ProtocolParams::default();
    let xc_floor = critical_cost(&params, BatchingRule::AtLeastTimer, STRESS);
    let xc_fill = critical_cost(&params, BatchingRule::FillOrTimer, STRESS);
    assert!(xc_floor != xc_fill);

    // Both still fail well above their own thresholds.
    for rule in [BatchingRule::FillOrTimer, BatchingRule::AtLeastTimer] {
        let outcome = simulate(
            &params,
            &SimConfig {
                rule,
                ..stress_config(25.0)
            },
        )
        .unwrap();
        assert!(outcome.failed, "{rule:?} should fail at 25 ms/op");
    }
}
