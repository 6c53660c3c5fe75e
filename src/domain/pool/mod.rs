//! Pool domain - liquidity pool snapshot and cache

mod pool_cache;
mod refresh;
mod snapshot;

pub use pool_cache::{CacheSettings, HealthState, HealthStatus, PoolCache, ProviderOutcome, RefreshReport};
pub use refresh::spawn_refresh_task;
pub use snapshot::PoolSnapshot;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::dex::DexType;
use crate::math;
use crate::shared::errors::{MathError, PoolError};
use crate::shared::types::{amount_string, CoinId, CoinInfo, PairKey};

/// One on-chain constant-product liquidity pair.
///
/// Pools are published inside an immutable [`PoolSnapshot`] and shared as
/// `Arc<Pool>`; a refresh replaces them, it never edits them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub address: String,
    pub coin_a: CoinInfo,
    pub coin_b: CoinInfo,
    pub dex_type: DexType,
    #[serde(with = "amount_string")]
    pub reserve_a: u128,
    #[serde(with = "amount_string")]
    pub reserve_b: u128,
    /// Basis points, always below 10000
    pub fee_rate: u32,
    pub last_updated: DateTime<Utc>,
}

impl Pool {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        address: impl Into<String>,
        coin_a: CoinInfo,
        coin_b: CoinInfo,
        dex_type: DexType,
        reserve_a: u128,
        reserve_b: u128,
        fee_rate: u32,
        last_updated: DateTime<Utc>,
    ) -> Result<Self, PoolError> {
        let pool = Self {
            address: address.into(),
            coin_a,
            coin_b,
            dex_type,
            reserve_a,
            reserve_b,
            fee_rate,
            last_updated,
        };
        pool.validate()?;
        Ok(pool)
    }

    pub fn validate(&self) -> Result<(), PoolError> {
        if self.address.trim().is_empty() {
            return Err(PoolError::InvalidPoolData("empty pool address".to_string()));
        }
        if self.fee_rate >= math::BPS_DENOMINATOR {
            return Err(PoolError::InvalidPoolData(format!(
                "pool {} fee rate {} bp is not below 100%",
                self.address, self.fee_rate
            )));
        }
        if self.coin_a.coin_type == self.coin_b.coin_type {
            return Err(PoolError::InvalidPoolData(format!(
                "pool {} pairs {} with itself",
                self.address, self.coin_a.coin_type
            )));
        }
        Ok(())
    }

    pub fn pair_key(&self) -> PairKey {
        PairKey::new(&self.coin_a.coin_type, &self.coin_b.coin_type)
    }

    pub fn connects(&self, a: &CoinId, b: &CoinId) -> bool {
        (self.coin_a.coin_type == *a && self.coin_b.coin_type == *b)
            || (self.coin_a.coin_type == *b && self.coin_b.coin_type == *a)
    }

    /// `(reserve_in, reserve_out)` when swapping `coin_in` through this pool
    pub fn reserves_for(&self, coin_in: &CoinId) -> Option<(u128, u128)> {
        if self.coin_a.coin_type == *coin_in {
            Some((self.reserve_a, self.reserve_b))
        } else if self.coin_b.coin_type == *coin_in {
            Some((self.reserve_b, self.reserve_a))
        } else {
            None
        }
    }

    pub fn other_coin(&self, coin: &CoinId) -> Option<&CoinInfo> {
        if self.coin_a.coin_type == *coin {
            Some(&self.coin_b)
        } else if self.coin_b.coin_type == *coin {
            Some(&self.coin_a)
        } else {
            None
        }
    }

    pub fn decimals_of(&self, coin: &CoinId) -> Option<u8> {
        if self.coin_a.coin_type == *coin {
            Some(self.coin_a.decimals)
        } else if self.coin_b.coin_type == *coin {
            Some(self.coin_b.decimals)
        } else {
            None
        }
    }

    /// Exact AMM output for `amount_in` of `coin_in`, before truncation to raw units
    pub fn quote_out(&self, coin_in: &CoinId, amount_in: u128) -> Result<Decimal, MathError> {
        let (reserve_in, reserve_out) = self.reserves_for(coin_in).ok_or_else(|| {
            MathError::InvalidAmount(format!("{} is not traded by pool {}", coin_in, self.address))
        })?;
        math::get_amount_out(
            math::from_raw_units(amount_in)?,
            math::from_raw_units(reserve_in)?,
            math::from_raw_units(reserve_out)?,
            self.fee_rate,
        )
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub const APT: &str = "0x1::aptos_coin::AptosCoin";
    pub const USDC: &str = "0xdba3::usdc::USDC";
    pub const THL: &str = "0x7fd5::thl_coin::THL";
    pub const DEEP: &str = "0xdeeb::deep::DEEP";
    pub const WETH: &str = "0xaf8c::coin::COIN";

    pub fn decimals(coin: &str) -> u8 {
        match coin {
            USDC | WETH | DEEP => 6,
            _ => 9,
        }
    }

    pub fn pool(
        address: &str,
        dex_type: DexType,
        coin_a: &str,
        coin_b: &str,
        reserve_a: u128,
        reserve_b: u128,
        fee_rate: u32,
    ) -> Pool {
        Pool::new(
            address,
            CoinInfo::new(coin_a, decimals(coin_a)),
            CoinInfo::new(coin_b, decimals(coin_b)),
            dex_type,
            reserve_a,
            reserve_b,
            fee_rate,
            Utc::now(),
        )
        .expect("valid test pool")
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_pool_rejects_full_fee() {
        let result = Pool::new(
            "0x1",
            CoinInfo::new(APT, 9),
            CoinInfo::new(USDC, 6),
            DexType::Liquidswap,
            1,
            1,
            10_000,
            Utc::now(),
        );
        assert!(matches!(result, Err(PoolError::InvalidPoolData(_))));
    }

    #[test]
    fn test_pool_rejects_self_pair() {
        let result = Pool::new(
            "0x1",
            CoinInfo::new(APT, 9),
            CoinInfo::new(APT, 9),
            DexType::Liquidswap,
            1,
            1,
            30,
            Utc::now(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_reserves_follow_direction() {
        let p = pool("0x1", DexType::Thala, APT, USDC, 1_000, 2_000, 30);
        let apt = CoinId::from(APT);
        let usdc = CoinId::from(USDC);

        assert_eq!(p.reserves_for(&apt), Some((1_000, 2_000)));
        assert_eq!(p.reserves_for(&usdc), Some((2_000, 1_000)));
        assert_eq!(p.reserves_for(&CoinId::from(THL)), None);
        assert_eq!(p.other_coin(&apt).map(|c| c.coin_type.clone()), Some(usdc.clone()));
        assert_eq!(p.decimals_of(&usdc), Some(6));
        assert!(p.connects(&usdc, &apt));
    }

    #[test]
    fn test_quote_out_uses_amm_math() {
        let p = pool("0x1", DexType::Liquidswap, APT, USDC, 1_000, 2_000, 30);
        let out = p.quote_out(&CoinId::from(APT), 100).unwrap();
        assert_eq!(math::to_raw_units(out).unwrap(), 181);

        let empty = pool("0x2", DexType::Liquidswap, APT, USDC, 0, 2_000, 30);
        assert!(empty.quote_out(&CoinId::from(APT), 100).is_err());
    }

    #[test]
    fn test_pool_serializes_reserves_as_strings() {
        let p = pool("0x1", DexType::PancakeSwap, APT, USDC, 1_000, 2_000, 25);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["reserve_a"], "1000");
        assert_eq!(json["dex_type"], "pancakeswap");
    }
}
