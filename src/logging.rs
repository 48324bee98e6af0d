// Tracing initialization for the command-line tool.
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a stderr subscriber. `RUST_LOG` wins over `level`.
/// Calling this more than once is a no-op.
pub fn init_tracing(level: &str) {
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|_| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

/// Log level for the CLI flags.
pub fn level_for(verbose: bool, quiet: bool, watching: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "debug"
    } else if watching {
        "info"
    } else {
        "warn"
    }
}
