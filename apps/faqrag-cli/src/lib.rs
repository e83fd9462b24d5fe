use tracing_subscriber::EnvFilter;

/// Log to stderr so stdout stays clean for answers. `RUST_LOG` wins over
/// `verbose` when set.
pub fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
