//! Windowed trace summarization and trend classification.
//!
//! A raw [`Trace`] has one point per time step — thousands of samples
//! for a short run. Presentation and regression checks usually want the
//! windowed view: mean/max queue depth per window, conflict quantiles,
//! and whether the queue's long-run trend is bounded or diverging.

use hdrhistogram::Histogram;
use overrun_model::Trace;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SummaryConfig {
    /// Window length for aggregation.
    pub window: Duration,

    /// If true, compute conflict p95/p99 using a bounded histogram.
    pub track_conflict_quantiles: bool,

    /// Histogram upper bound for conflict counts.
    pub conflict_histogram_max: u64,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(1),
            track_conflict_quantiles: true,
            conflict_histogram_max: 1_000_000,
        }
    }
}

/// One window of the summarized trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSummary {
    /// Window bounds in seconds.
    pub window_start: f64,
    pub window_end: f64,

    pub queue_mean: f64,
    pub queue_max: f64,

    pub age_mean: f64,

    pub conflicts_max: f64,
    pub conflicts_p95: Option<f64>,
    pub conflicts_p99: Option<f64>,
}

/// Summarize a trace into fixed windows.
///
/// Samples are uniformly spaced (one per `dt`), so the plain mean of a
/// window is already its time-weighted mean.
pub fn summarize(trace: &Trace, cfg: &SummaryConfig) -> Vec<WindowSummary> {
    let window_s = cfg.window.as_secs_f64();
    if trace.is_empty() || window_s <= 0.0 {
        return Vec::new();
    }

    let mut hist = cfg.track_conflict_quantiles.then(|| {
        Histogram::<u64>::new_with_bounds(1, cfg.conflict_histogram_max.max(2), 3)
            .expect("valid histogram bounds")
    });

    let mut out = Vec::new();
    let mut window_idx = 0usize;
    let mut queue_sum = 0.0;
    let mut queue_max = 0.0_f64;
    let mut age_sum = 0.0;
    let mut conflicts_max = 0.0_f64;
    let mut count = 0usize;

    let flush = |idx: usize,
                     count: usize,
                     queue_sum: f64,
                     queue_max: f64,
                     age_sum: f64,
                     conflicts_max: f64,
                     hist: &mut Option<Histogram<u64>>| {
        if count == 0 {
            return None;
        }
        let (p95, p99) = match hist {
            Some(h) if h.len() > 0 => (
                Some(h.value_at_quantile(0.95) as f64),
                Some(h.value_at_quantile(0.99) as f64),
            ),
            _ => (None, None),
        };
        if let Some(h) = hist {
            h.reset();
        }
        Some(WindowSummary {
            window_start: idx as f64 * window_s,
            window_end: (idx + 1) as f64 * window_s,
            queue_mean: queue_sum / count as f64,
            queue_max,
            age_mean: age_sum / count as f64,
            conflicts_max,
            conflicts_p95: p95,
            conflicts_p99: p99,
        })
    };

    for p in trace.points() {
        let idx = (p.t / window_s) as usize;
        if idx != window_idx {
            if let Some(w) = flush(
                window_idx,
                count,
                queue_sum,
                queue_max,
                age_sum,
                conflicts_max,
                &mut hist,
            ) {
                out.push(w);
            }
            window_idx = idx;
            queue_sum = 0.0;
            queue_max = 0.0;
            age_sum = 0.0;
            conflicts_max = 0.0;
            count = 0;
        }

        queue_sum += p.queue_depth;
        queue_max = queue_max.max(p.queue_depth);
        age_sum += p.age;
        conflicts_max = conflicts_max.max(p.conflicts);
        if let Some(h) = &mut hist {
            let v = p
                .conflicts
                .ceil()
                .clamp(1.0, cfg.conflict_histogram_max as f64) as u64;
            let _ = h.record(v);
        }
        count += 1;
    }

    if let Some(w) = flush(
        window_idx,
        count,
        queue_sum,
        queue_max,
        age_sum,
        conflicts_max,
        &mut hist,
    ) {
        out.push(w);
    }

    out
}

/// Least-squares slope (batches per second) of the queue depth over the
/// trace suffix starting at `from_t` seconds. `None` when fewer than
/// two points remain.
pub fn queue_growth_slope(trace: &Trace, from_t: f64) -> Option<f64> {
    let points = trace.points_from(from_t);
    if points.len() < 2 {
        return None;
    }

    let n = points.len() as f64;
    let mean_t = points.iter().map(|p| p.t).sum::<f64>() / n;
    let mean_q = points.iter().map(|p| p.queue_depth).sum::<f64>() / n;

    let mut num = 0.0;
    let mut den = 0.0;
    for p in points {
        let dt = p.t - mean_t;
        num += dt * (p.queue_depth - mean_q);
        den += dt * dt;
    }
    if den == 0.0 {
        return None;
    }
    Some(num / den)
}
