//! Tracing subscriber wiring.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// Verbosity maps 0 -> warn, 1 -> info, 2 -> debug, 3+ -> trace; the
/// `NAVSYNC_LOG` env filter overrides. Safe to call more than once - a
/// subscriber that is already installed wins.
pub fn init(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_env("NAVSYNC_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
