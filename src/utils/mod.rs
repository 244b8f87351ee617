// ============================================================================
// Utilities Module
// Helper functions for hosting binaries, demos and benchmarks
// ============================================================================

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "shipping_allocation=info";

/// Install a `tracing` subscriber writing to stderr, filtered by `RUST_LOG`.
///
/// Returns `false` if a global subscriber was already installed, which is
/// harmless; the existing one keeps receiving events.
#[cfg(feature = "logging")]
pub fn init_logging() -> bool {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
