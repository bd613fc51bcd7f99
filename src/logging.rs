//! Tracing subscriber setup for the binary.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_ENV: &str = "ATRIUM_LOG";

/// Filter used when `ATRIUM_LOG` is unset or unparsable.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose { "atrium=debug" } else { "warn" }
}

/// Install a stderr fmt subscriber filtered by `ATRIUM_LOG`.
///
/// `--verbose` only raises the default; an explicit `ATRIUM_LOG` wins.
/// Calling this twice is harmless: only the first call takes effect.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init();
}
