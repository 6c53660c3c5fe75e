use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::dex::DexType;
use crate::domain::pool::CacheSettings;
use crate::domain::routing::{
    PathFinderSettings, SearchStrategy, SelectorSettings, DEFAULT_MAX_HOPS, DEFAULT_SLIPPAGE_BP, MAX_HOPS,
};
use crate::math::BPS_DENOMINATOR;
use crate::shared::errors::AppError;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    pub refresh_interval_secs: u64,
    pub stale_after_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 30,
            stale_after_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    pub max_hops: u8,
    pub max_alternatives: usize,
    /// Display units of the output coin
    pub tie_epsilon: Decimal,
    pub strategy: SearchStrategy,
    pub max_exhaustive_candidates: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_hops: DEFAULT_MAX_HOPS,
            max_alternatives: 5,
            tie_epsilon: dec!(0.001),
            strategy: SearchStrategy::Greedy,
            max_exhaustive_candidates: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct QuoteConfig {
    pub default_slippage_bp: u32,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            default_slippage_bp: DEFAULT_SLIPPAGE_BP,
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

/// Where one exchange's pool list comes from
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProviderSource {
    Http {
        url: String,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
    File {
        path: PathBuf,
    },
}

impl ProviderSource {
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderSource::Http { .. } => "http",
            ProviderSource::File { .. } => "file",
        }
    }
}

/// One `[[providers]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProviderConfig {
    pub dex: DexType,
    #[serde(default)]
    pub name: Option<String>,
    pub source: ProviderSource,
}

impl ProviderConfig {
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{}-{}", self.dex, self.source.kind()))
    }
}

/// Whole configuration file; every section may be omitted
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub cache: CacheConfig,
    pub router: RouterConfig,
    pub quote: QuoteConfig,
    pub providers: Vec<ProviderConfig>,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("read {}", path.as_ref().display()))?;
        let cfg: Self = toml::from_str(&s).context("parse config TOML")?;
        Ok(cfg)
    }

    /// Reject values no component can run with
    pub fn validate(&self) -> Result<(), AppError> {
        if self.cache.refresh_interval_secs == 0 {
            return Err(AppError::ConfigError("cache.refresh_interval_secs must be positive".to_string()));
        }
        if self.router.max_hops == 0 || self.router.max_hops > MAX_HOPS {
            return Err(AppError::ConfigError(format!(
                "router.max_hops must be between 1 and {}, got {}",
                MAX_HOPS, self.router.max_hops
            )));
        }
        if self.router.tie_epsilon < Decimal::ZERO {
            return Err(AppError::ConfigError(format!(
                "router.tie_epsilon must not be negative, got {}",
                self.router.tie_epsilon
            )));
        }
        if self.router.max_exhaustive_candidates == 0 {
            return Err(AppError::ConfigError("router.max_exhaustive_candidates must be positive".to_string()));
        }
        let slippage = self.quote.default_slippage_bp;
        if slippage == 0 || slippage > BPS_DENOMINATOR {
            return Err(AppError::ConfigError(format!(
                "quote.default_slippage_bp must be between 1 and {}, got {}",
                BPS_DENOMINATOR, slippage
            )));
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.cache.refresh_interval_secs)
    }

    pub fn cache_settings(&self) -> CacheSettings {
        CacheSettings {
            stale_after: Duration::from_secs(self.cache.stale_after_secs),
        }
    }

    pub fn path_finder_settings(&self) -> PathFinderSettings {
        PathFinderSettings {
            strategy: self.router.strategy,
            max_exhaustive_candidates: self.router.max_exhaustive_candidates,
        }
    }

    pub fn selector_settings(&self) -> SelectorSettings {
        SelectorSettings {
            tie_epsilon: self.router.tie_epsilon,
            max_alternatives: self.router.max_alternatives,
        }
    }
}
