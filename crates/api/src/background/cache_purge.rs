//! Periodic removal of expired aggregated results.
//!
//! Expired entries already read as misses; this only reclaims their space.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::state::Engine;

/// How often expired entries are purged.
pub const PURGE_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Run the purge loop until `cancel` is triggered.
pub async fn run(engine: Arc<Engine>, interval: Duration, cancel: CancellationToken) {
    let cache = engine.cache();
    tracing::info!(
        backend = cache.kind().as_str(),
        interval_secs = interval.as_secs(),
        "Result cache purge job started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Result cache purge job stopping");
                break;
            }
            _ = ticker.tick() => {
                match cache.purge_expired().await {
                    Ok(0) => tracing::debug!("Result cache purge: nothing expired"),
                    Ok(purged) => tracing::info!(purged, "Result cache purge: dropped expired entries"),
                    Err(e) => tracing::error!(error = %e, "Result cache purge failed"),
                }
            }
        }
    }
}
