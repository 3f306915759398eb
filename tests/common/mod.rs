//! Shared test-environment setup.

use std::sync::Once;

static INIT: Once = Once::new();

/// Install a `tracing-subscriber` once per test binary so `tracing::trace!`/
/// `debug!` output from the matcher is visible under `RUST_LOG` while
/// running tests, rather than silently discarded.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
