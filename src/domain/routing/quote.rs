//! Quote requests, validation and the router tying search to ranking

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use super::{PathFinder, Route, RouteSelector};
use crate::domain::dex::DexType;
use crate::domain::pool::{PoolCache, PoolSnapshot};
use crate::math;
use crate::shared::errors::ValidationError;
use crate::shared::types::CoinId;

pub const MAX_HOPS: u8 = 3;
pub const DEFAULT_MAX_HOPS: u8 = 3;
pub const DEFAULT_SLIPPAGE_BP: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    pub coin_in: CoinId,
    pub coin_out: CoinId,
    pub amount_in: u128,
    pub slippage_tolerance_bp: u32,
    pub exclude_dexes: HashSet<DexType>,
    pub max_hops: u8,
}

impl QuoteRequest {
    pub fn new(coin_in: CoinId, coin_out: CoinId, amount_in: u128) -> Self {
        Self {
            coin_in,
            coin_out,
            amount_in,
            slippage_tolerance_bp: DEFAULT_SLIPPAGE_BP,
            exclude_dexes: HashSet::new(),
            max_hops: DEFAULT_MAX_HOPS,
        }
    }

    pub fn with_slippage(mut self, slippage_tolerance_bp: u32) -> Self {
        self.slippage_tolerance_bp = slippage_tolerance_bp;
        self
    }

    pub fn with_max_hops(mut self, max_hops: u8) -> Self {
        self.max_hops = max_hops;
        self
    }

    pub fn excluding(mut self, dexes: impl IntoIterator<Item = DexType>) -> Self {
        self.exclude_dexes.extend(dexes);
        self
    }

    /// Reject requests that can never be quoted, before any search
    pub fn validate(&self) -> Result<(), ValidationError> {
        for coin in [&self.coin_in, &self.coin_out] {
            if !coin.is_well_formed() {
                return Err(ValidationError::MalformedCoin(coin.to_string()));
            }
        }
        if self.coin_in == self.coin_out {
            return Err(ValidationError::IdenticalCoins);
        }
        if self.amount_in == 0 {
            return Err(ValidationError::InvalidAmount("amount_in must be positive".to_string()));
        }
        if self.max_hops == 0 || self.max_hops > MAX_HOPS {
            return Err(ValidationError::HopsOutOfRange {
                value: self.max_hops,
                max: MAX_HOPS,
            });
        }
        if self.slippage_tolerance_bp == 0 || self.slippage_tolerance_bp > math::BPS_DENOMINATOR {
            return Err(ValidationError::SlippageOutOfRange(self.slippage_tolerance_bp));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub best: Route,
    /// Best output after the slippage tolerance, floored
    pub minimum_amount_out: u128,
    pub alternatives: Vec<Route>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteResult {
    NoRoute,
    Found(Quote),
}

impl QuoteResult {
    pub fn best(&self) -> Option<&Route> {
        match self {
            QuoteResult::NoRoute => None,
            QuoteResult::Found(quote) => Some(&quote.best),
        }
    }
}

/// Search and ranking over a given snapshot
#[derive(Debug, Clone, Default)]
pub struct Router {
    finder: PathFinder,
    selector: RouteSelector,
}

impl Router {
    pub fn new(finder: PathFinder, selector: RouteSelector) -> Self {
        Self { finder, selector }
    }

    pub fn quote(&self, snapshot: &PoolSnapshot, request: &QuoteRequest) -> Result<QuoteResult, ValidationError> {
        request.validate()?;

        let candidates = self.finder.find_routes(snapshot, request);
        let ranked = match self.selector.select(candidates) {
            Some(ranked) => ranked,
            None => {
                debug!("No route {} -> {}", request.coin_in, request.coin_out);
                return Ok(QuoteResult::NoRoute);
            }
        };

        let minimum_amount_out = math::from_raw_units(ranked.best.amount_out)
            .and_then(|out| math::calculate_min_output(out, request.slippage_tolerance_bp))
            .and_then(math::to_raw_units)
            .map_err(|_| ValidationError::SlippageOutOfRange(request.slippage_tolerance_bp))?;

        info!(
            "💱 Quote {} {} -> {} {} via {}",
            request.amount_in,
            request.coin_in,
            ranked.best.amount_out,
            request.coin_out,
            ranked.best.path_label()
        );

        Ok(QuoteResult::Found(Quote {
            best: ranked.best,
            minimum_amount_out,
            alternatives: ranked.alternatives,
        }))
    }
}

/// Quotes against whatever snapshot the cache holds when the request arrives
pub struct QuoteService {
    cache: Arc<PoolCache>,
    router: Router,
}

impl QuoteService {
    pub fn new(cache: Arc<PoolCache>, router: Router) -> Self {
        Self { cache, router }
    }

    pub fn cache(&self) -> &Arc<PoolCache> {
        &self.cache
    }

    pub fn quote(&self, request: &QuoteRequest) -> Result<QuoteResult, ValidationError> {
        request.validate()?;
        let snapshot = self.cache.snapshot();
        self.router.quote(&snapshot, request)
    }
}
