// src/app.rs
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::{Cli, CommandExecutor};
use crate::config::{Config, ProviderConfig, ProviderSource};
use crate::domain::dex::DexType;
use crate::domain::pool::PoolCache;
use crate::domain::routing::{PathFinder, RouteSelector, Router, SearchStrategy};
use crate::exchanges;
use crate::shared::errors::AppError;

/// Effective settings after layering: CLI args > config file > defaults
#[derive(Debug, Clone)]
pub struct AppCfg {
    pub config: Config,
    pub config_path: Option<PathBuf>,
}

impl AppCfg {
    pub fn from_sources(file: Option<Config>, cli: &Cli) -> Result<Self, AppError> {
        let mut config = file.unwrap_or_default();

        if let Some(secs) = cli.refresh_interval_secs {
            config.cache.refresh_interval_secs = secs;
        }
        if let Some(strategy) = &cli.strategy {
            config.router.strategy = parse_strategy(strategy)?;
        }
        if let Some(max_alternatives) = cli.max_alternatives {
            config.router.max_alternatives = max_alternatives;
        }
        for entry in &cli.pool_files {
            config.providers.push(parse_pool_file(entry)?);
        }

        config.validate()?;
        Ok(Self {
            config,
            config_path: cli.config.clone(),
        })
    }
}

fn parse_strategy(value: &str) -> Result<SearchStrategy, AppError> {
    match value.trim().to_lowercase().as_str() {
        "greedy" => Ok(SearchStrategy::Greedy),
        "exhaustive" => Ok(SearchStrategy::Exhaustive),
        other => Err(AppError::ConfigError(format!("unknown search strategy {:?}", other))),
    }
}

/// `dex=path` into a file provider entry
fn parse_pool_file(entry: &str) -> Result<ProviderConfig, AppError> {
    let (dex, path) = entry
        .split_once('=')
        .ok_or_else(|| AppError::ConfigError(format!("--pools-file expects dex=path, got {:?}", entry)))?;
    Ok(ProviderConfig {
        dex: dex.parse::<DexType>()?,
        name: None,
        source: ProviderSource::File {
            path: PathBuf::from(path.trim()),
        },
    })
}

pub fn build_cache(cfg: &AppCfg) -> Result<Arc<PoolCache>, AppError> {
    let providers = exchanges::create_providers(&cfg.config.providers)?;
    if providers.is_empty() {
        warn!("⚠️ No pool providers configured, every quote will find no route");
    }
    Ok(Arc::new(PoolCache::new(providers, cfg.config.cache_settings())))
}

pub fn build_router(cfg: &AppCfg) -> Router {
    Router::new(
        PathFinder::new(cfg.config.path_finder_settings()),
        RouteSelector::new(cfg.config.selector_settings()),
    )
}

pub async fn run(cli: Cli) -> Result<()> {
    let file = match &cli.config {
        Some(path) => Some(Config::from_file(path)?),
        None => None,
    };
    let app_cfg = AppCfg::from_sources(file, &cli)?;

    info!("Starting dexroute");
    info!(
        "Configuration: {} providers, strategy {:?}, max_hops {}, refresh every {}s",
        app_cfg.config.providers.len(),
        app_cfg.config.router.strategy,
        app_cfg.config.router.max_hops,
        app_cfg.config.cache.refresh_interval_secs
    );
    if let Some(path) = &app_cfg.config_path {
        info!("Loaded config from {}", path.display());
    }

    CommandExecutor::execute(cli.command, &app_cfg).await?;
    Ok(())
}
