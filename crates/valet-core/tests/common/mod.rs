//! Shared test setup.

use std::sync::Once;

static INIT: Once = Once::new();

/// Install a test-writer tracing subscriber once per test binary.
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init()
            .ok();
    });
}
