use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber for structured logging.
///
/// - Debug builds: pretty-printed human-readable output
/// - Release builds: JSON-formatted output for log aggregation
///
/// The log level is controlled by the `RUST_LOG` environment variable,
/// defaulting to `info`. Calling this when a global subscriber is already
/// installed leaves the existing one in place.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let result = if cfg!(debug_assertions) {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
