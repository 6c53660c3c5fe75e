use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use crate::domain::dex::DexType;
use crate::domain::pool::Pool;
use crate::exchanges::types::{records_into_pools, PoolListResponse};
use crate::exchanges::PoolProvider;
use crate::shared::errors::ProviderError;

/// Pool list fetched from an exchange's HTTP endpoint
pub struct HttpPoolProvider {
    http_client: Client,
    dex_type: DexType,
    name: String,
    url: String,
}

impl HttpPoolProvider {
    pub fn new(dex_type: DexType, name: String, url: String, timeout: Duration) -> Result<Self, ProviderError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            dex_type,
            name,
            url,
        })
    }
}

#[async_trait]
impl PoolProvider for HttpPoolProvider {
    fn dex_type(&self) -> DexType {
        self.dex_type
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_pools(&self) -> Result<Vec<Pool>, ProviderError> {
        debug!("🔍 Fetching {} pools from: {}", self.dex_type, self.url);

        let response = self.http_client.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        let records = serde_json::from_str::<PoolListResponse>(&body)?.into_records(self.dex_type);
        let received = records.len();
        let pools = records_into_pools(self.dex_type, records, Utc::now());

        info!("✅ Parsed {}/{} {} pool records", pools.len(), received, self.dex_type);
        Ok(pools)
    }
}
