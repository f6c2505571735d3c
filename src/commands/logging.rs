use tracing_subscriber::EnvFilter;

/// Installs the log subscriber, writing to stderr so command output stays parseable.
/// `RUST_LOG` takes precedence over `enable_logging`.
pub fn init_logging(enable_logging: bool) {
    let default_filter = if enable_logging {
        "warn,scroogecoin_lib=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}
