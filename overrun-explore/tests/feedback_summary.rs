//! Summarization of real simulator output on both sides of the
//! stability boundary.

use std::time::Duration;

use overrun_explore::summary::{queue_growth_slope, summarize, SummaryConfig};
use overrun_model::{simulate, BatchingRule, ProtocolParams, RunOutcome, SimConfig, Workload};

fn stress_run(cost_ms: f64) -> RunOutcome {
    simulate(
        &ProtocolParams::default(),
        &SimConfig {
            workload: Workload::new(5, 10.0),
            cost_ms,
            duration: Duration::from_secs(20),
            dt: Duration::from_millis(5),
            rule: BatchingRule::AtLeastTimer,
        },
    )
    .unwrap()
}

#[test]
fn diverging_run_summarizes_as_growing() {
    let outcome = stress_run(25.0);
    assert!(outcome.failed);
    let fail_t = outcome.fail_time.unwrap().as_secs_f64();

    let slope = queue_growth_slope(&outcome.trace, fail_t).unwrap();
    assert!(slope > 0.5, "post-failure queue slope too flat: {slope}");

    let windows = summarize(&outcome.trace, &SummaryConfig::default());
    assert_eq!(windows.len(), 20);

    // Window means keep climbing after the failure.
    let post_fail: Vec<_> = windows
        .iter()
        .filter(|w| w.window_start >= fail_t)
        .collect();
    assert!(post_fail.len() >= 2);
    for pair in post_fail.windows(2) {
        assert!(pair[1].queue_mean >= pair[0].queue_mean);
    }

    // The excursion itself is visible in the windowed maxima.
    let ceiling = ProtocolParams::default().reshuffle_ceiling;
    assert!(windows.iter().any(|w| w.conflicts_max > ceiling));
}

#[test]
fn stable_run_summarizes_as_flat_and_bounded() {
    let outcome = stress_run(1.0);
    assert!(!outcome.failed);

    // Skip the fill-up transient, then the trend is flat.
    let slope = queue_growth_slope(&outcome.trace, 5.0).unwrap();
    assert!(slope.abs() < 0.05, "stable queue drifting: {slope}");

    let windows = summarize(&outcome.trace, &SummaryConfig::default());
    for w in &windows {
        assert!(w.queue_max < 2.0);
        assert!(w.conflicts_max < ProtocolParams::default().reshuffle_ceiling);
    }
}
