use tracing_subscriber::EnvFilter;

/// Diagnostics go to stderr; stdout carries the wire trace or the
/// interactive summaries.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
