//! Shared tracing/logging initialization.
//!
//! Logs always go to stderr so that command output on stdout stays
//! machine-readable.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialise the global tracing subscriber.
///
/// * `default_filter` -- default `RUST_LOG` value when the env-var is not set
///   (e.g. `"absinthe=warn"`).
/// * `log_json` -- when `true`, emit structured JSON log lines instead of the
///   human-readable format.
pub fn init_tracing(default_filter: &str, log_json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
    );
    if log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Build the default filter directive for the console crates at `level`.
pub fn default_filter(level: &str) -> String {
    format!("absinthe={level},absinthe_cli={level},absinthe_client={level},absinthe_core={level}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_covers_every_crate() {
        let filter = default_filter("debug");
        assert!(filter.contains("absinthe_client=debug"));
        assert!(filter.contains("absinthe_core=debug"));
        assert!(filter.contains("absinthe_cli=debug"));
    }
}
