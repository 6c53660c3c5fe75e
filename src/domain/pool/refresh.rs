//! Background refresh scheduling

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use super::PoolCache;

/// Refresh `cache` every `every`, starting immediately, until `shutdown` turns true
/// or its sender is dropped. A failed cycle never stops the loop.
pub fn spawn_refresh_task(
    cache: Arc<PoolCache>,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("⏰ Pool refresh scheduled every {:?}", every);
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = cache.refresh_all().await;
                    if !report.failed_providers.is_empty() {
                        warn!("Refresh finished with failed providers: {:?}", report.failed_providers);
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("🛑 Pool refresh task stopping");
                        break;
                    }
                }
            }
        }
    })
}
