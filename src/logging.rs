use tracing_subscriber::{fmt, EnvFilter};

/// Initialize diagnostics on stderr.
///
/// Use the `RUST_LOG` environment variable to override the default filter,
/// e.g. `RUST_LOG=bf_trace=trace` to log every executed instruction.
/// The default only lets warnings through so frames stay readable.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
