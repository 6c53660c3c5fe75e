use async_trait::async_trait;

use crate::domain::dex::DexType;
use crate::domain::pool::Pool;
use crate::exchanges::PoolProvider;
use crate::shared::errors::ProviderError;

/// Fixed in-memory pool list
pub struct StaticPoolProvider {
    dex_type: DexType,
    name: String,
    pools: Vec<Pool>,
}

impl StaticPoolProvider {
    pub fn new(dex_type: DexType, pools: Vec<Pool>) -> Self {
        Self {
            dex_type,
            name: format!("{}-static", dex_type.as_str()),
            pools,
        }
    }
}

#[async_trait]
impl PoolProvider for StaticPoolProvider {
    fn dex_type(&self) -> DexType {
        self.dex_type
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_pools(&self) -> Result<Vec<Pool>, ProviderError> {
        Ok(self.pools.clone())
    }
}
