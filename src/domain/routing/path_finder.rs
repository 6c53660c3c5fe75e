//! Candidate route search over the pool graph

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use super::quote::{QuoteRequest, MAX_HOPS};
use super::{Route, RouteStep};
use crate::domain::pool::{Pool, PoolSnapshot};
use crate::shared::types::CoinId;

/// How intermediate legs are chosen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStrategy {
    /// Best pool per edge only
    #[default]
    Greedy,
    /// Every pool per edge, capped by `max_exhaustive_candidates`
    Exhaustive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathFinderSettings {
    pub strategy: SearchStrategy,
    pub max_exhaustive_candidates: usize,
}

impl Default for PathFinderSettings {
    fn default() -> Self {
        Self {
            strategy: SearchStrategy::Greedy,
            max_exhaustive_candidates: 64,
        }
    }
}

/// Enumerates candidate routes over one pool snapshot
#[derive(Debug, Clone, Default)]
pub struct PathFinder {
    settings: PathFinderSettings,
}

/// Per-search state shared by every branch
struct Search<'a> {
    snapshot: &'a PoolSnapshot,
    request: &'a QuoteRequest,
    limit: Option<usize>,
    routes: Vec<Route>,
}

impl<'a> Search<'a> {
    fn is_full(&self) -> bool {
        self.limit.map_or(false, |limit| self.routes.len() >= limit)
    }
}

impl PathFinder {
    pub fn new(settings: PathFinderSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &PathFinderSettings {
        &self.settings
    }

    /// Every priceable candidate for `request`, single-hop first.
    ///
    /// Legs that cannot be priced drop only their own candidate.
    pub fn find_routes(&self, snapshot: &PoolSnapshot, request: &QuoteRequest) -> Vec<Route> {
        if request.coin_in == request.coin_out || request.amount_in == 0 {
            return Vec::new();
        }

        let mut search = Search {
            snapshot,
            request,
            limit: match self.settings.strategy {
                SearchStrategy::Greedy => None,
                SearchStrategy::Exhaustive => Some(self.settings.max_exhaustive_candidates),
            },
            routes: Vec::new(),
        };

        self.collect_direct(&mut search);

        let max_hops = request.max_hops.min(MAX_HOPS) as usize;
        if max_hops >= 2 {
            let mut visited = HashSet::new();
            visited.insert(request.coin_in.clone());
            self.extend(&mut search, Vec::new(), &request.coin_in, request.amount_in, visited, max_hops);
        }

        debug!(
            "Found {} candidate routes {} -> {} ({:?})",
            search.routes.len(),
            request.coin_in,
            request.coin_out,
            self.settings.strategy
        );
        search.routes
    }

    fn collect_direct(&self, search: &mut Search<'_>) {
        let request = search.request;
        for pool in search.snapshot.pools_for_pair(&request.coin_in, &request.coin_out) {
            if search.is_full() {
                return;
            }
            if request.exclude_dexes.contains(&pool.dex_type) {
                continue;
            }
            match Route::price_path(&[pool.as_ref()], &request.coin_in, request.amount_in) {
                Ok(route) => search.routes.push(route),
                Err(e) => debug!("Discarding direct route via {}: {}", pool.address, e),
            }
        }
    }

    /// Pools eligible for one edge, in preference order
    fn edge_pools(&self, snapshot: &PoolSnapshot, request: &QuoteRequest, from: &CoinId, to: &CoinId, amount_in: u128) -> Vec<Arc<Pool>> {
        match self.settings.strategy {
            SearchStrategy::Greedy => snapshot
                .best_pool_for_pair_excluding(from, to, amount_in, &request.exclude_dexes)
                .map(|(pool, _)| vec![pool])
                .unwrap_or_default(),
            SearchStrategy::Exhaustive => snapshot
                .pools_for_pair(from, to)
                .iter()
                .filter(|pool| !request.exclude_dexes.contains(&pool.dex_type))
                .cloned()
                .collect(),
        }
    }

    /// Depth-first walk from `coin` holding `amount`.
    ///
    /// `steps` is the priced prefix; `visited` belongs to this branch only.
    /// With a non-empty prefix the walk tries to close at the destination,
    /// and while at least two hops remain it moves on through unvisited
    /// intermediates.
    fn extend(
        &self,
        search: &mut Search<'_>,
        steps: Vec<RouteStep>,
        coin: &CoinId,
        amount: u128,
        visited: HashSet<CoinId>,
        hops_left: usize,
    ) {
        let snapshot = search.snapshot;
        let request = search.request;

        if !steps.is_empty() {
            for pool in self.edge_pools(snapshot, request, coin, &request.coin_out, amount) {
                if search.is_full() {
                    return;
                }
                match RouteStep::price(&pool, coin, amount) {
                    Ok(last) => {
                        let decimals = pool.decimals_of(&request.coin_out).unwrap_or_default();
                        let mut full = steps.clone();
                        full.push(last);
                        match Route::from_steps(full, decimals) {
                            Ok(route) => search.routes.push(route),
                            Err(e) => debug!("Discarding route closing at {}: {}", pool.address, e),
                        }
                    }
                    Err(e) => debug!("Discarding closing leg via {}: {}", pool.address, e),
                }
            }
        }

        if hops_left < 2 {
            return;
        }

        for next in snapshot.neighbors(coin) {
            if *next == request.coin_out || visited.contains(next) {
                continue;
            }
            for pool in self.edge_pools(snapshot, request, coin, next, amount) {
                if search.is_full() {
                    return;
                }
                let step = match RouteStep::price(&pool, coin, amount) {
                    Ok(step) => step,
                    Err(e) => {
                        debug!("Discarding leg {} -> {} via {}: {}", coin, next, pool.address, e);
                        continue;
                    }
                };

                let next_amount = step.amount_out;
                let mut branch_steps = steps.clone();
                branch_steps.push(step);
                let mut branch_visited = visited.clone();
                branch_visited.insert(next.clone());

                self.extend(search, branch_steps, next, next_amount, branch_visited, hops_left - 1);
            }
        }
    }
}
