//! Routing domain - candidate search, ranking and quoting

mod path_finder;
mod quote;
mod route_selector;

pub use path_finder::{PathFinder, PathFinderSettings, SearchStrategy};
pub use quote::{Quote, QuoteRequest, QuoteResult, QuoteService, Router, DEFAULT_MAX_HOPS, DEFAULT_SLIPPAGE_BP, MAX_HOPS};
pub use route_selector::{RankedRoutes, RouteSelector, SelectorSettings};

use crate::domain::dex::DexType;
use crate::domain::pool::Pool;
use crate::math;
use crate::shared::errors::{MathError, RouteError};
use crate::shared::types::CoinId;

/// One swap through one pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteStep {
    pub dex_type: DexType,
    pub coin_in: CoinId,
    pub coin_out: CoinId,
    pub pool_address: String,
    pub amount_in: u128,
    pub amount_out: u128,
    pub fee_rate: u32,
    /// Fee charged on `amount_in`, raw units of `coin_in`
    pub fee_amount: u128,
    pub price_impact: u32,
}

impl RouteStep {
    /// Price a swap of `amount_in` of `coin_in` through `pool`.
    ///
    /// Outputs are truncated to whole raw units; a leg that truncates to
    /// zero cannot feed the next one and is rejected.
    pub fn price(pool: &Pool, coin_in: &CoinId, amount_in: u128) -> Result<Self, MathError> {
        let (reserve_in, reserve_out) = pool.reserves_for(coin_in).ok_or_else(|| {
            MathError::InvalidAmount(format!("{} is not traded by pool {}", coin_in, pool.address))
        })?;
        let coin_out = pool
            .other_coin(coin_in)
            .map(|info| info.coin_type.clone())
            .ok_or_else(|| MathError::InvalidAmount(format!("{} has no counterpart in {}", coin_in, pool.address)))?;

        let amount_out = math::to_raw_units(pool.quote_out(coin_in, amount_in)?)?;
        if amount_out == 0 {
            return Err(MathError::InsufficientLiquidity(format!(
                "{} -> {} through {} yields nothing",
                coin_in, coin_out, pool.address
            )));
        }

        let amount_in_dec = math::from_raw_units(amount_in)?;
        let price_impact = math::calculate_price_impact(
            amount_in_dec,
            math::from_raw_units(amount_out)?,
            math::from_raw_units(reserve_in)?,
            math::from_raw_units(reserve_out)?,
        )?;
        let fee_amount = math::to_raw_units(math::calculate_fee(amount_in_dec, pool.fee_rate)?)?;

        Ok(Self {
            dex_type: pool.dex_type,
            coin_in: coin_in.clone(),
            coin_out,
            pool_address: pool.address.clone(),
            amount_in,
            amount_out,
            fee_rate: pool.fee_rate,
            fee_amount,
            price_impact,
        })
    }
}

/// A chain of swaps from the request's input coin to its output coin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub steps: Vec<RouteStep>,
    pub amount_in: u128,
    pub amount_out: u128,
    /// Sum of step impacts, capped at 100%
    pub price_impact: u32,
    /// Sum of per-leg fees, each in its leg's input coin
    pub fee: u128,
    pub estimated_gas: u64,
    pub coin_out_decimals: u8,
}

impl Route {
    pub fn from_steps(steps: Vec<RouteStep>, coin_out_decimals: u8) -> Result<Self, RouteError> {
        let (first, last) = match (steps.first(), steps.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(RouteError::Empty),
        };
        for (index, pair) in steps.windows(2).enumerate() {
            if pair[0].coin_out != pair[1].coin_in || pair[0].amount_out != pair[1].amount_in {
                return Err(RouteError::Disconnected(index + 1));
            }
        }

        let amount_in = first.amount_in;
        let amount_out = last.amount_out;
        let price_impact = steps
            .iter()
            .fold(0u32, |acc, step| acc.saturating_add(step.price_impact))
            .min(math::MAX_PRICE_IMPACT_BPS);
        let fee = steps
            .iter()
            .try_fold(0u128, |acc, step| acc.checked_add(step.fee_amount))
            .ok_or(MathError::Overflow)?;
        let estimated_gas = steps.iter().map(|step| step.dex_type.base_gas()).sum();

        Ok(Self {
            steps,
            amount_in,
            amount_out,
            price_impact,
            fee,
            estimated_gas,
            coin_out_decimals,
        })
    }

    /// Price `amount_in` of `coin_in` through `pools` in order
    pub fn price_path(pools: &[&Pool], coin_in: &CoinId, amount_in: u128) -> Result<Self, RouteError> {
        let mut steps = Vec::with_capacity(pools.len());
        let mut coin = coin_in.clone();
        let mut amount = amount_in;

        for pool in pools {
            let step = RouteStep::price(pool, &coin, amount)?;
            coin = step.coin_out.clone();
            amount = step.amount_out;
            steps.push(step);
        }

        let decimals = pools
            .last()
            .and_then(|pool| pool.decimals_of(&coin))
            .ok_or(RouteError::Empty)?;
        Self::from_steps(steps, decimals)
    }

    pub fn coin_in(&self) -> &CoinId {
        &self.steps[0].coin_in
    }

    pub fn coin_out(&self) -> &CoinId {
        &self.steps[self.steps.len() - 1].coin_out
    }

    pub fn hops(&self) -> usize {
        self.steps.len()
    }

    /// Pool addresses in traversal order, e.g. for logs
    pub fn path_label(&self) -> String {
        self.steps
            .iter()
            .map(|step| format!("{}:{}", step.dex_type, step.pool_address))
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pool::test_support::*;

    #[test]
    fn test_price_step_reference_pool() {
        let pool = pool("0xa1", DexType::Liquidswap, APT, USDC, 1000, 2000, 30);
        let step = RouteStep::price(&pool, &CoinId::from(APT), 100).unwrap();

        assert_eq!(step.coin_out, CoinId::from(USDC));
        assert_eq!(step.amount_out, 181);
        assert_eq!(step.fee_amount, 0);
        assert!(step.price_impact > 900 && step.price_impact < 1000, "impact {}", step.price_impact);
    }

    #[test]
    fn test_price_step_rejects_foreign_coin_and_dust() {
        let pool = pool("0xa1", DexType::Liquidswap, APT, USDC, 1_000_000, 10, 30);
        assert!(RouteStep::price(&pool, &CoinId::from(THL), 100).is_err());
        assert!(matches!(
            RouteStep::price(&pool, &CoinId::from(APT), 1),
            Err(MathError::InsufficientLiquidity(_))
        ));
    }

    #[test]
    fn test_two_hop_route_aggregates() {
        let first = pool("0xa1", DexType::Liquidswap, APT, USDC, 1_000_000, 2_000_000, 30);
        let second = pool("0xa2", DexType::PancakeSwap, USDC, THL, 2_000_000, 8_000_000, 25);

        let route = Route::price_path(&[&first, &second], &CoinId::from(APT), 10_000).unwrap();

        assert_eq!(route.hops(), 2);
        assert_eq!(route.coin_in(), &CoinId::from(APT));
        assert_eq!(route.coin_out(), &CoinId::from(THL));
        assert_eq!(route.steps[0].amount_out, route.steps[1].amount_in);
        assert_eq!(route.amount_out, route.steps[1].amount_out);
        assert_eq!(route.price_impact, route.steps[0].price_impact + route.steps[1].price_impact);
        assert_eq!(route.fee, 30 + route.steps[1].fee_amount);
        assert_eq!(route.estimated_gas, DexType::Liquidswap.base_gas() + DexType::PancakeSwap.base_gas());
        assert_eq!(route.coin_out_decimals, 9);
        assert_eq!(route.path_label(), "liquidswap:0xa1 -> pancakeswap:0xa2");
    }

    #[test]
    fn test_from_steps_checks_chain() {
        assert_eq!(Route::from_steps(vec![], 9), Err(RouteError::Empty));

        let a = pool("0xa1", DexType::Liquidswap, APT, USDC, 1_000_000, 2_000_000, 30);
        let b = pool("0xa2", DexType::Thala, APT, THL, 1_000_000, 2_000_000, 30);
        let first = RouteStep::price(&a, &CoinId::from(APT), 1000).unwrap();
        let second = RouteStep::price(&b, &CoinId::from(APT), first.amount_out).unwrap();

        assert_eq!(Route::from_steps(vec![first, second], 9), Err(RouteError::Disconnected(1)));
    }
}
