//! Opt-in structured logging setup.
//!
//! The model itself only emits `tracing` events; nothing here is
//! installed automatically. Binaries and tests that want output call
//! one of these initializers, or configure their own subscriber.
//!
//! `RUST_LOG` overrides the defaults as usual, e.g.
//! `RUST_LOG=overrun_model::sim=trace` to watch every batch taken into
//! service.

use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging at `info` level.
pub fn init_model_logging() {
    init_model_logging_with_level("info");
}

/// Initialize logging at a specific level ("trace", "debug", "info",
/// "warn" or "error"), unless `RUST_LOG` is set.
pub fn init_model_logging_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("{}={level}", env!("CARGO_PKG_NAME").replace('-', "_")).into());

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_level(true))
        .with(filter)
        .init();
}
