//! Logging setup for the `tipcalc` binary.

use std::io::IsTerminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding the log filter, e.g. `TIPCALC_LOG=debug`.
pub const LOG_ENV: &str = "TIPCALC_LOG";

/// Initialize tracing with the `TIPCALC_LOG` environment variable.
///
/// Defaults to "warn". Logs go to stderr so stdout only carries command output.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal()),
        )
        .init();
}
