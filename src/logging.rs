//! Logging setup.
//!
//! Compact tracing output with a configurable default level. The `RUST_LOG`
//! environment variable takes precedence over the config setting:
//!
//! ```bash
//! RUST_LOG=debug doc-weaver annotate Sources/Greeter.swift
//! ```

use crate::config::LoggingConfig;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Initialize logging once per process; later calls are no-ops.
pub fn init(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.default.clone()));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    });
}
