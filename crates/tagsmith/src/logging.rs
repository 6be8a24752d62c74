//! Logging setup.
//!
//! Logs always go to stderr so stdout stays free for command output such as
//! `tagsmith tags list --json`.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `level` when it is set.
pub fn init(level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Initialize logging from the `[logging]` section plus CLI overrides.
pub fn init_from_config(config: &tagsmith_core::Config, verbose: bool, json_logs: bool) {
    let json_format = json_logs || config.logging.format == "json";
    init(&effective_level(&config.logging.level, verbose), json_format);
}

/// `--verbose` raises the level to debug but never lowers `trace`.
fn effective_level(configured: &str, verbose: bool) -> String {
    match configured {
        "trace" => "trace".to_string(),
        _ if verbose => "debug".to_string(),
        "" => "info".to_string(),
        other => other.to_string(),
    }
}
