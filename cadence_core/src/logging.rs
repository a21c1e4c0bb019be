//! Tracing subscriber setup shared by the `cadence` binary and tests.
//!
//! Log lines go to stderr. Stdout is reserved for command output, which
//! `--json` consumers parse.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber at `info`, or whatever `RUST_LOG` says
pub fn init() {
    init_with_level("info")
}

/// Install the global subscriber with `default_level` as the fallback filter
///
/// `RUST_LOG` wins when set, e.g. `RUST_LOG=cadence_core::state=debug` to
/// trace backup and recovery decisions.
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

/// Debug-level logging routed through the test harness capture
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
