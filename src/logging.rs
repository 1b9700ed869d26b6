//! Logging setup for the command-line front-end.
//!
//! Library code only emits `tracing` events; nothing is printed unless a
//! binary installs a subscriber through [`init`].

use tracing_subscriber::{
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter, Layer,
};

/// Filter applied when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "warn";

/// Installs a compact fmt subscriber on stderr, filtered by `RUST_LOG`.
///
/// Stdout is left to command output. Setting `LOG_LINE_NUM=1` adds source
/// locations to each event.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init() -> Result<(), TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let log_line_num = std::env::var("LOG_LINE_NUM").is_ok_and(|v| v == "1");

    let stderr_sub = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_file(log_line_num)
        .with_line_number(log_line_num)
        .with_filter(filter);

    tracing_subscriber::registry().with(stderr_sub).try_init()
}
