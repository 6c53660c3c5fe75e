//! Immutable, fully indexed view of every known pool

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

use super::Pool;
use crate::domain::dex::DexType;
use crate::shared::errors::CacheError;
use crate::shared::types::{CoinId, PairKey};

/// The complete set of pools valid as of one refresh cycle.
///
/// A snapshot is built in full before it is published and is never modified
/// afterwards, so any reader holding an `Arc<PoolSnapshot>` sees one
/// internally consistent liquidity graph.
#[derive(Debug, Default)]
pub struct PoolSnapshot {
    pools: Vec<Arc<Pool>>,
    by_address: HashMap<String, Arc<Pool>>,
    by_pair: HashMap<PairKey, Vec<Arc<Pool>>>,
    neighbors: HashMap<CoinId, BTreeSet<CoinId>>,
    published_at: Option<DateTime<Utc>>,
}

impl PoolSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Index `pools`. Invalid pools and repeated addresses are dropped; the
    /// first occurrence of an address wins.
    pub fn build(pools: Vec<Pool>, published_at: DateTime<Utc>) -> Self {
        let mut snapshot = Self {
            published_at: Some(published_at),
            ..Self::default()
        };

        for pool in pools {
            if let Err(e) = pool.validate() {
                warn!("⚠️  Dropping pool from snapshot: {}", e);
                continue;
            }
            if snapshot.by_address.contains_key(&pool.address) {
                warn!("⚠️  Duplicate pool address {} ({}), keeping first", pool.address, pool.dex_type);
                continue;
            }

            let pool = Arc::new(pool);
            let a = pool.coin_a.coin_type.clone();
            let b = pool.coin_b.coin_type.clone();

            snapshot.by_address.insert(pool.address.clone(), Arc::clone(&pool));
            snapshot.by_pair.entry(pool.pair_key()).or_default().push(Arc::clone(&pool));
            snapshot.neighbors.entry(a.clone()).or_default().insert(b.clone());
            snapshot.neighbors.entry(b).or_default().insert(a);
            snapshot.pools.push(pool);
        }

        debug!(
            "Indexed {} pools across {} pairs and {} coins",
            snapshot.pools.len(),
            snapshot.by_pair.len(),
            snapshot.neighbors.len()
        );
        snapshot
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// `None` for the placeholder snapshot that exists before the first refresh
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }

    pub fn all_pools(&self) -> &[Arc<Pool>] {
        &self.pools
    }

    /// Pools trading `a` against `b`; identical for `(a, b)` and `(b, a)`
    pub fn pools_for_pair(&self, a: &CoinId, b: &CoinId) -> &[Arc<Pool>] {
        self.by_pair
            .get(&PairKey::new(a, b))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn pool(&self, address: &str) -> Result<Arc<Pool>, CacheError> {
        self.by_address
            .get(address)
            .cloned()
            .ok_or_else(|| CacheError::PoolNotFound(address.to_string()))
    }

    /// Coins sharing at least one pool with `coin`, in a stable order
    pub fn neighbors(&self, coin: &CoinId) -> impl Iterator<Item = &CoinId> {
        self.neighbors.get(coin).into_iter().flatten()
    }

    pub fn contains_coin(&self, coin: &CoinId) -> bool {
        self.neighbors.contains_key(coin)
    }

    /// Pool paying the most `coin_out` for `amount_in` of `coin_in`.
    ///
    /// Pools whose evaluation fails (empty reserves, overflow) are skipped;
    /// `None` when no pool qualifies.
    pub fn best_pool_for_pair(&self, coin_in: &CoinId, coin_out: &CoinId, amount_in: u128) -> Option<Arc<Pool>> {
        self.best_pool_for_pair_excluding(coin_in, coin_out, amount_in, &HashSet::new())
            .map(|(pool, _)| pool)
    }

    /// [`best_pool_for_pair`](Self::best_pool_for_pair) ignoring pools of the
    /// excluded exchanges, returning the winning output alongside the pool.
    pub fn best_pool_for_pair_excluding(
        &self,
        coin_in: &CoinId,
        coin_out: &CoinId,
        amount_in: u128,
        excluded: &HashSet<DexType>,
    ) -> Option<(Arc<Pool>, Decimal)> {
        let mut best: Option<(Arc<Pool>, Decimal)> = None;

        for pool in self.pools_for_pair(coin_in, coin_out) {
            if excluded.contains(&pool.dex_type) {
                continue;
            }
            let amount_out = match pool.quote_out(coin_in, amount_in) {
                Ok(amount_out) => amount_out,
                Err(e) => {
                    debug!("Skipping pool {} for {} -> {}: {}", pool.address, coin_in, coin_out, e);
                    continue;
                }
            };
            let better = match &best {
                Some((_, current)) => amount_out > *current,
                None => true,
            };
            if better {
                best = Some((Arc::clone(pool), amount_out));
            }
        }

        best
    }
}
