//! Logging setup.
//!
//! Diagnostics go to stderr through `tracing-subscriber`. `RUST_LOG` wins when
//! set; otherwise the filter follows the `-q`/`-v` flags.

use crate::config::Verbosity;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber.
///
/// Safe to call more than once; later calls are ignored.
pub fn init(verbosity: Verbosity, use_color: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(use_color)
                .with_target(verbosity == Verbosity::Debug)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init();
}
