//! Pool cache: publishes liquidity snapshots built from every exchange provider

use arc_swap::{ArcSwap, ArcSwapOption};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::{Pool, PoolSnapshot};
use crate::domain::dex::DexType;
use crate::exchanges::PoolProvider;
use crate::shared::errors::CacheError;
use crate::shared::types::CoinId;

/// Cache tuning
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// Age after which the health status reports `stale`
    pub stale_after: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            stale_after: Duration::from_secs(60),
        }
    }
}

/// Per-provider result of one refresh cycle
#[derive(Debug, Clone, Serialize)]
pub struct ProviderOutcome {
    pub provider: String,
    pub dex_type: DexType,
    pub pool_count: usize,
}

/// Summary of one refresh cycle
#[derive(Debug, Clone, Serialize)]
pub struct RefreshReport {
    pub succeeded: Vec<ProviderOutcome>,
    pub failed_providers: Vec<String>,
    /// Pools in the snapshot that is active after this cycle
    pub pool_count: usize,
    /// False when every provider failed and the previous snapshot was kept
    pub published: bool,
    pub duration_ms: u64,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Stale,
    Uninitialized,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: HealthState,
    pub pool_count: usize,
    pub last_updated: Option<DateTime<Utc>>,
    pub seconds_since_update: Option<i64>,
    pub stale_after_secs: u64,
    pub failed_providers: Vec<String>,
}

/// Holds the active [`PoolSnapshot`] and rebuilds it from the providers.
///
/// Reads never block: they load the current `Arc<PoolSnapshot>`. Refreshes
/// are serialized by `refresh_guard` and publish with a single pointer swap.
pub struct PoolCache {
    providers: Vec<Arc<dyn PoolProvider>>,
    snapshot: ArcSwap<PoolSnapshot>,
    last_report: ArcSwapOption<RefreshReport>,
    refresh_guard: Mutex<()>,
    settings: CacheSettings,
}

impl PoolCache {
    pub fn new(providers: Vec<Arc<dyn PoolProvider>>, settings: CacheSettings) -> Self {
        Self {
            providers,
            snapshot: ArcSwap::from_pointee(PoolSnapshot::empty()),
            last_report: ArcSwapOption::empty(),
            refresh_guard: Mutex::new(()),
            settings,
        }
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Fetch every provider concurrently and publish the union of what succeeded.
    ///
    /// A failing provider only loses its own pools for this cycle. If every
    /// provider fails the previous snapshot stays active.
    pub async fn refresh_all(&self) -> RefreshReport {
        let _guard = self.refresh_guard.lock().await;
        let started = Instant::now();

        info!("🔄 Refreshing pools from {} providers...", self.providers.len());

        let fetches = self.providers.iter().map(|provider| async move {
            let result = provider.fetch_pools().await;
            (provider, result)
        });
        let results = join_all(fetches).await;

        let mut pools: Vec<Pool> = Vec::new();
        let mut succeeded = Vec::new();
        let mut failed_providers = Vec::new();

        for (provider, result) in results {
            match result {
                Ok(batch) => {
                    info!("✅ {} returned {} pools", provider.name(), batch.len());
                    succeeded.push(ProviderOutcome {
                        provider: provider.name().to_string(),
                        dex_type: provider.dex_type(),
                        pool_count: batch.len(),
                    });
                    pools.extend(batch);
                }
                Err(e) => {
                    warn!("⚠️  Provider {} failed, skipping this cycle: {}", provider.name(), e);
                    failed_providers.push(provider.name().to_string());
                }
            }
        }

        let published = !succeeded.is_empty() || self.providers.is_empty();
        if published {
            let snapshot = PoolSnapshot::build(pools, Utc::now());
            self.snapshot.store(Arc::new(snapshot));
        } else {
            warn!("❌ Every provider failed, keeping previous snapshot");
        }

        let report = RefreshReport {
            succeeded,
            failed_providers,
            pool_count: self.snapshot.load().len(),
            published,
            duration_ms: started.elapsed().as_millis() as u64,
            finished_at: Utc::now(),
        };
        info!(
            "📦 Snapshot holds {} pools ({} providers failed, {} ms)",
            report.pool_count,
            report.failed_providers.len(),
            report.duration_ms
        );
        self.last_report.store(Some(Arc::new(report.clone())));
        report
    }

    /// The active snapshot; hold on to it for the duration of one request
    pub fn snapshot(&self) -> Arc<PoolSnapshot> {
        self.snapshot.load_full()
    }

    pub fn last_report(&self) -> Option<Arc<RefreshReport>> {
        self.last_report.load_full()
    }

    pub fn all_pools(&self) -> Vec<Arc<Pool>> {
        self.snapshot().all_pools().to_vec()
    }

    pub fn pools_for_pair(&self, a: &CoinId, b: &CoinId) -> Vec<Arc<Pool>> {
        self.snapshot().pools_for_pair(a, b).to_vec()
    }

    pub fn pool(&self, address: &str) -> Result<Arc<Pool>, CacheError> {
        self.snapshot().pool(address)
    }

    pub fn best_pool_for_pair(&self, coin_in: &CoinId, coin_out: &CoinId, amount_in: u128) -> Option<Arc<Pool>> {
        self.snapshot().best_pool_for_pair(coin_in, coin_out, amount_in)
    }

    pub fn health_status(&self) -> HealthStatus {
        self.health_status_at(Utc::now())
    }

    pub fn health_status_at(&self, now: DateTime<Utc>) -> HealthStatus {
        let snapshot = self.snapshot();
        let stale_after_secs = self.settings.stale_after.as_secs();
        let failed_providers = self
            .last_report()
            .map(|report| report.failed_providers.clone())
            .unwrap_or_default();

        let (status, last_updated, seconds_since_update) = match snapshot.published_at() {
            None => (HealthState::Uninitialized, None, None),
            Some(published_at) => {
                let age = (now - published_at).num_seconds().max(0);
                let status = if age as u64 > stale_after_secs {
                    HealthState::Stale
                } else {
                    HealthState::Healthy
                };
                (status, Some(published_at), Some(age))
            }
        };

        HealthStatus {
            status,
            pool_count: snapshot.len(),
            last_updated,
            seconds_since_update,
            stale_after_secs,
            failed_providers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::exchanges::StaticPoolProvider;
    use crate::shared::errors::ProviderError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingProvider;

    #[async_trait]
    impl PoolProvider for FailingProvider {
        fn dex_type(&self) -> DexType {
            DexType::Cellana
        }

        fn name(&self) -> &str {
            "cellana-broken"
        }

        async fn fetch_pools(&self) -> Result<Vec<Pool>, ProviderError> {
            Err(ProviderError::Unavailable("connection refused".to_string()))
        }
    }

    /// Serves its pools once, then fails every later fetch
    struct FlakyProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PoolProvider for FlakyProvider {
        fn dex_type(&self) -> DexType {
            DexType::Thala
        }

        fn name(&self) -> &str {
            "thala-flaky"
        }

        async fn fetch_pools(&self) -> Result<Vec<Pool>, ProviderError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(vec![
                    pool("0xe1", DexType::Thala, APT, USDC, 1_000, 2_000, 30),
                    pool("0xe2", DexType::Thala, APT, THL, 1_000, 3_000, 30),
                ])
            } else {
                Err(ProviderError::Unavailable("gateway timeout".to_string()))
            }
        }
    }

    /// Sleeps inside the fetch and records how many fetches overlap
    struct SlowProvider {
        in_flight: Arc<AtomicUsize>,
        max_in_flight: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl PoolProvider for SlowProvider {
        fn dex_type(&self) -> DexType {
            DexType::SushiSwap
        }

        fn name(&self) -> &str {
            "sushiswap-slow"
        }

        async fn fetch_pools(&self) -> Result<Vec<Pool>, ProviderError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(30)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(vec![pool("0xf1", DexType::SushiSwap, APT, USDC, 100, 100, 30)])
        }
    }

    fn liquidswap() -> Arc<dyn PoolProvider> {
        Arc::new(StaticPoolProvider::new(
            DexType::Liquidswap,
            vec![
                pool("0xc1", DexType::Liquidswap, APT, USDC, 1_000, 2_000, 30),
                pool("0xc2", DexType::Liquidswap, APT, THL, 1_000, 5_000, 25),
            ],
        ))
    }

    fn pancakeswap() -> Arc<dyn PoolProvider> {
        Arc::new(StaticPoolProvider::new(
            DexType::PancakeSwap,
            vec![pool("0xt1", DexType::PancakeSwap, USDC, APT, 4_000, 2_000, 30)],
        ))
    }

    #[tokio::test]
    async fn test_refresh_drops_only_failing_provider() {
        let cache = PoolCache::new(
            vec![liquidswap(), Arc::new(FailingProvider), pancakeswap()],
            CacheSettings::default(),
        );

        let report = cache.refresh_all().await;

        assert!(report.published);
        assert_eq!(report.pool_count, 3);
        assert_eq!(report.failed_providers, vec!["cellana-broken".to_string()]);
        assert_eq!(report.succeeded.len(), 2);

        let health = cache.health_status();
        assert_eq!(health.pool_count, 3);
        assert_eq!(health.status, HealthState::Healthy);
        assert_eq!(health.failed_providers, vec!["cellana-broken".to_string()]);
        assert!(cache.pool("0xt1").is_ok());
    }

    #[tokio::test]
    async fn test_all_providers_failing_keeps_previous_snapshot() {
        let cache = PoolCache::new(
            vec![Arc::new(FlakyProvider {
                calls: AtomicUsize::new(0),
            })],
            CacheSettings::default(),
        );

        let first = cache.refresh_all().await;
        assert!(first.published);
        assert_eq!(first.pool_count, 2);
        let before = cache.snapshot();
        let published_at = cache.health_status().last_updated;

        let second = cache.refresh_all().await;
        assert!(!second.published);
        assert_eq!(second.pool_count, 2);
        assert_eq!(second.failed_providers, vec!["thala-flaky".to_string()]);
        assert!(Arc::ptr_eq(&before, &cache.snapshot()));

        let health = cache.health_status();
        assert_eq!(health.pool_count, 2);
        assert_eq!(health.last_updated, published_at);
        assert_eq!(health.failed_providers, vec!["thala-flaky".to_string()]);
        assert!(cache.pool("0xe2").is_ok());
    }

    #[tokio::test]
    async fn test_failing_provider_without_prior_snapshot_stays_uninitialized() {
        let cache = PoolCache::new(vec![Arc::new(FailingProvider)], CacheSettings::default());
        let report = cache.refresh_all().await;
        assert!(!report.published);
        assert_eq!(report.pool_count, 0);
        assert_eq!(cache.health_status().status, HealthState::Uninitialized);
    }

    #[tokio::test]
    async fn test_readers_keep_their_snapshot_across_refreshes() {
        let cache = PoolCache::new(vec![liquidswap()], CacheSettings::default());
        cache.refresh_all().await;
        let before = cache.snapshot();

        cache.refresh_all().await;
        assert_eq!(before.len(), 2);
        assert!(!Arc::ptr_eq(&before, &cache.snapshot()));
    }

    #[tokio::test]
    async fn test_pair_queries_symmetric_through_cache() {
        let cache = PoolCache::new(vec![liquidswap(), pancakeswap()], CacheSettings::default());
        cache.refresh_all().await;

        let apt = CoinId::from(APT);
        let usdc = CoinId::from(USDC);
        let forward: Vec<String> = cache.pools_for_pair(&apt, &usdc).iter().map(|p| p.address.clone()).collect();
        let backward: Vec<String> = cache.pools_for_pair(&usdc, &apt).iter().map(|p| p.address.clone()).collect();
        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 2);

        assert_eq!(cache.best_pool_for_pair(&apt, &usdc, 10).unwrap().address, "0xt1");
        assert_eq!(cache.all_pools().len(), 3);
        assert_eq!(cache.pool("0xnope"), Err(CacheError::PoolNotFound("0xnope".to_string())));
    }

    #[tokio::test]
    async fn test_health_reports_stale_without_failing_reads() {
        let cache = PoolCache::new(
            vec![liquidswap()],
            CacheSettings {
                stale_after: Duration::from_secs(60),
            },
        );
        assert_eq!(cache.health_status().status, HealthState::Uninitialized);
        assert_eq!(cache.health_status().pool_count, 0);

        cache.refresh_all().await;
        let later = Utc::now() + chrono::Duration::seconds(120);
        let health = cache.health_status_at(later);
        assert_eq!(health.status, HealthState::Stale);
        assert!(health.seconds_since_update.unwrap() >= 119);
        assert_eq!(cache.all_pools().len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_refreshes_are_serialized() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_in_flight = Arc::new(AtomicUsize::new(0));
        let cache = Arc::new(PoolCache::new(
            vec![Arc::new(SlowProvider {
                in_flight: Arc::clone(&in_flight),
                max_in_flight: Arc::clone(&max_in_flight),
            })],
            CacheSettings::default(),
        ));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.refresh_all().await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(cache.snapshot().len(), 1);
    }
}
