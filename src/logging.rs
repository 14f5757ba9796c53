use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber. `level` takes any `EnvFilter` directive;
/// when blank, `RUST_LOG` applies, then `info`.
///
/// Records emitted through the `log` facade (actix-web's access log) are
/// forwarded to the same subscriber.
pub fn init_logging(level: &str) {
    let filter = match level.trim() {
        "" => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        directive => EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info")),
    };
    // A second call (tests, benches) keeps the first subscriber.
    let _ = fmt().with_env_filter(filter).try_init();
}
