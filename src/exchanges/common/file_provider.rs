use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use tracing::debug;

use crate::domain::dex::DexType;
use crate::domain::pool::Pool;
use crate::exchanges::types::{records_into_pools, PoolListResponse};
use crate::exchanges::PoolProvider;
use crate::shared::errors::ProviderError;

/// Pool list read from a JSON file on every refresh.
/// Same record shape as the HTTP endpoints, for offline runs and fixtures.
pub struct FilePoolProvider {
    dex_type: DexType,
    name: String,
    path: PathBuf,
}

impl FilePoolProvider {
    pub fn new(dex_type: DexType, name: String, path: PathBuf) -> Self {
        Self { dex_type, name, path }
    }
}

#[async_trait]
impl PoolProvider for FilePoolProvider {
    fn dex_type(&self) -> DexType {
        self.dex_type
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_pools(&self) -> Result<Vec<Pool>, ProviderError> {
        debug!("Reading {} pools from {}", self.dex_type, self.path.display());
        let content = tokio::fs::read_to_string(&self.path).await?;
        let records = serde_json::from_str::<PoolListResponse>(&content)?.into_records(self.dex_type);
        Ok(records_into_pools(self.dex_type, records, Utc::now()))
    }
}
