//! Diagnostic logging setup.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber for registry diagnostics.
///
/// Does nothing unless `RUST_LOG` is set; safe to call more than once.
/// Registration is logged at `debug`, absorbed duplicates and failed casts
/// at `trace`.
///
/// ```bash
/// RUST_LOG=mirror_rt=trace cargo test -p mirror_rt
/// ```
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            let installed = tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .try_init();
            if installed.is_err() {
                tracing::debug!("global subscriber already installed");
            }
        }
    });
}
