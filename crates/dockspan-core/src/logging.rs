#![forbid(unsafe_code)]

//! Logging helpers.
//!
//! Library code emits `tracing` events under the `dockspan.*` targets and
//! never installs a subscriber itself. Binaries and tests that want output
//! can call [`init_logging`] when the `tracing-subscriber` feature is on.

/// Event target for layout tree mutations.
pub const TARGET_LAYOUT: &str = "dockspan.layout";

/// Event target for layout persistence.
pub const TARGET_CODEC: &str = "dockspan.codec";

/// Event target for workspace-level dock/undock operations.
pub const TARGET_WORKSPACE: &str = "dockspan.workspace";

/// Default filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "dockspan=info";

/// Install a global fmt subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter`. Returns `false` when a
/// global subscriber was already installed.
#[cfg(feature = "tracing-subscriber")]
pub fn init_logging(default_filter: &str) -> bool {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
