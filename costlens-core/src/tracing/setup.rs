//! `tracing-subscriber` initialisation driven by `COSTLENS_LOG`.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directive.
pub const LOG_ENV_VAR: &str = "COSTLENS_LOG";

/// Install a global fmt subscriber. Reads `COSTLENS_LOG`, defaulting to `info`.
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));
    install(filter);
}

/// Install a global fmt subscriber with an explicit filter directive,
/// e.g. `"costlens_analysis=debug"`.
pub fn init_tracing_with_filter(directive: &str) {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"));
    install(filter);
}

fn install(filter: EnvFilter) {
    // try_init fails if a global subscriber already exists; that is fine.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
