use tracing_subscriber::EnvFilter;

/// Default filter for a `-v` count. `RUST_LOG` overrides it.
fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug,tungstenite=info,tokio_tungstenite=info",
        _ => "trace",
    }
}

/// Installs the global subscriber. Logs go to stderr so stdout stays
/// free for piping.
pub fn init_logging(verbosity: u8) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .init();
}
