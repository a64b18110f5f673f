pub mod builders;
pub mod fake_bidder;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
///
/// Directives come from `AUCTIONEER_LOG` (as for the binary), then
/// `RUST_LOG`, then `warn`. Captured output is shown for failing tests, or
/// for all of them with `-- --nocapture`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("AUCTIONEER_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        // Another harness may have installed a global subscriber already.
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(false)
            .try_init();
    });
}

/// Upper bound on any single awaited step of an auction test.
pub const TEST_DEADLINE: Duration = Duration::from_secs(10);

/// Await `fut`, failing the test if it takes longer than [`TEST_DEADLINE`].
pub async fn with_timeout<F: Future>(fut: F) -> F::Output {
    match tokio::time::timeout(TEST_DEADLINE, fut).await {
        Ok(output) => output,
        Err(_) => panic!("auction test step exceeded {TEST_DEADLINE:?}"),
    }
}
