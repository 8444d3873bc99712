//! Logging setup
//!
//! The facades only emit `tracing` events; hosts call [`init_tracing`] once
//! to get formatted output filtered by `RUST_LOG`.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "single_database=info";

/// Installs a global fmt subscriber with an env filter.
///
/// Defaults to [`DEFAULT_FILTER`], can be overridden with the `RUST_LOG` env var.
/// Returns false if a global subscriber was already installed.
pub fn init_tracing() -> bool {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
