//! Logging and tracing utilities

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber
///
/// Filtering follows `RUST_LOG` (default `info`). Output goes to stderr:
/// stdout belongs to sample output and to the MCP stdio transport.
pub fn init_tracing() {
    init_tracing_with_default("info");
}

/// Initialize tracing with a custom default filter
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_tracing_with_default(default_filter: &str) {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
