//! Wire records shared by every pool provider and their conversion into pools

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::domain::dex::DexType;
use crate::domain::pool::Pool;
use crate::shared::types::CoinInfo;

/// Uniform pool record every exchange provider reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolRecord {
    #[serde(alias = "pool_address")]
    pub address: String,
    pub coin_a: CoinRecord,
    pub coin_b: CoinRecord,
    pub reserve_a: RawAmount,
    pub reserve_b: RawAmount,
    /// Basis points
    pub fee_rate: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinRecord {
    #[serde(alias = "type")]
    pub coin_type: String,
    pub decimals: u8,
}

/// Reserves arrive either as decimal strings or as plain JSON numbers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Text(String),
    Number(u64),
}

impl RawAmount {
    pub fn to_u128(&self) -> Option<u128> {
        match self {
            RawAmount::Text(text) => text.trim().parse().ok(),
            RawAmount::Number(value) => Some(*value as u128),
        }
    }
}

/// Response body of a pool list endpoint: a bare array or `{"data": [...]}`.
/// Elements stay raw so one malformed record cannot sink the whole list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PoolListResponse {
    Bare(Vec<Value>),
    Wrapped { data: Vec<Value> },
}

impl PoolListResponse {
    /// Decode each element on its own, skipping the ones that do not fit `PoolRecord`
    pub fn into_records(self, dex_type: DexType) -> Vec<PoolRecord> {
        let values = match self {
            PoolListResponse::Bare(values) => values,
            PoolListResponse::Wrapped { data } => data,
        };

        values
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value::<PoolRecord>(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("⚠️  Skipping {} pool record #{}: {}", dex_type, index, e);
                    None
                }
            })
            .collect()
    }
}

/// Convert provider records into pools stamped with `fetched_at`.
/// Records that do not describe a valid pool are skipped with a warning.
pub fn records_into_pools(dex_type: DexType, records: Vec<PoolRecord>, fetched_at: DateTime<Utc>) -> Vec<Pool> {
    let mut pools = Vec::with_capacity(records.len());

    for record in records {
        let (reserve_a, reserve_b) = match (record.reserve_a.to_u128(), record.reserve_b.to_u128()) {
            (Some(a), Some(b)) => (a, b),
            _ => {
                warn!(
                    "⚠️  Skipping {} pool {}: unreadable reserves {:?} / {:?}",
                    dex_type, record.address, record.reserve_a, record.reserve_b
                );
                continue;
            }
        };

        match Pool::new(
            record.address,
            CoinInfo::new(record.coin_a.coin_type, record.coin_a.decimals),
            CoinInfo::new(record.coin_b.coin_type, record.coin_b.decimals),
            dex_type,
            reserve_a,
            reserve_b,
            record.fee_rate,
            fetched_at,
        ) {
            Ok(pool) => pools.push(pool),
            Err(e) => warn!("⚠️  Skipping {} pool record: {}", dex_type, e),
        }
    }

    pools
}
