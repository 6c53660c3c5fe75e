//! Pool providers: the fetch seam and its HTTP, file and in-memory implementations

pub mod api_clients;
pub mod common;
pub mod types;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{ProviderConfig, ProviderSource};
use crate::domain::dex::DexType;
use crate::domain::pool::Pool;
use crate::shared::errors::ProviderError;

pub use api_clients::HttpPoolProvider;
pub use common::{FilePoolProvider, StaticPoolProvider};

/// Pool-data source for one exchange.
///
/// The cache only relies on this shape: a provider either returns its
/// current pools or fails as a whole.
#[async_trait]
pub trait PoolProvider: Send + Sync {
    fn dex_type(&self) -> DexType;

    /// Label used in logs and health output
    fn name(&self) -> &str;

    async fn fetch_pools(&self) -> Result<Vec<Pool>, ProviderError>;
}

/// Build the provider described by one `[[providers]]` entry
pub fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn PoolProvider>, ProviderError> {
    let name = config.display_name();
    match &config.source {
        ProviderSource::Http { url, timeout_secs } => Ok(Arc::new(HttpPoolProvider::new(
            config.dex,
            name,
            url.clone(),
            Duration::from_secs(*timeout_secs),
        )?)),
        ProviderSource::File { path } => Ok(Arc::new(FilePoolProvider::new(config.dex, name, path.clone()))),
    }
}

/// Build every configured provider; the first construction error aborts startup
pub fn create_providers(configs: &[ProviderConfig]) -> Result<Vec<Arc<dyn PoolProvider>>, ProviderError> {
    configs.iter().map(create_provider).collect()
}
