//! CLI commands and handlers
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::app::{self, AppCfg};
use crate::application::dto::{QuoteRequestBody, QuoteResponseBody};
use crate::domain::dex::DexType;
use crate::domain::pool::{spawn_refresh_task, HealthState, Pool, PoolCache};
use crate::domain::routing::QuoteService;
use crate::shared::errors::AppError;
use crate::shared::types::CoinId;
use crate::shared::utils::{format_amount, format_pool_address};

#[derive(Parser, Debug)]
#[command(name = "dexroute")]
#[command(version, about = "Best-route quotes across constant-product DEX pools")]
pub struct Cli {
    /// Path to config file (optional)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `dexroute=trace` (overrides RUST_LOG)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Pool refresh interval in seconds (overrides config)
    #[arg(long, global = true)]
    pub refresh_interval_secs: Option<u64>,

    /// Multi-hop search strategy: greedy or exhaustive (overrides config)
    #[arg(long, global = true)]
    pub strategy: Option<String>,

    /// Number of alternative routes to return (overrides config)
    #[arg(long, global = true)]
    pub max_alternatives: Option<usize>,

    /// Extra pool source as `dex=path/to/pools.json`, may repeat
    #[arg(long = "pools-file", global = true)]
    pub pool_files: Vec<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Quote the best route for a swap
    Quote {
        /// Input coin type, e.g. 0x1::aptos_coin::AptosCoin
        #[arg(long)]
        coin_in: String,

        /// Output coin type
        #[arg(long)]
        coin_out: String,

        /// Input amount in raw units
        #[arg(long)]
        amount_in: String,

        /// Slippage tolerance in basis points (defaults to config)
        #[arg(long)]
        slippage_bp: Option<u32>,

        /// Exchange to leave out, may repeat
        #[arg(long)]
        exclude_dex: Vec<String>,

        /// Maximum route length (defaults to config)
        #[arg(long)]
        max_hops: Option<u8>,
    },

    /// List cached pools
    Pools {
        /// Show a single pool by address
        #[arg(long, conflicts_with_all = ["coin_a", "coin_b"])]
        address: Option<String>,

        /// Only pools trading this coin against `--coin-b`
        #[arg(long, requires = "coin_b")]
        coin_a: Option<String>,

        #[arg(long, requires = "coin_a")]
        coin_b: Option<String>,

        /// Filter by DEX type
        #[arg(short, long)]
        dex: Option<String>,

        /// Limit number of pools to show
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },

    /// Refresh once and print cache health
    Health,

    /// Keep refreshing pools and log health every cycle
    Watch {
        /// Stop after this many seconds (runs until Ctrl-C otherwise)
        #[arg(short, long)]
        duration: Option<u64>,
    },
}

pub struct CommandExecutor;

impl CommandExecutor {
    /// Execute the selected command
    pub async fn execute(command: Commands, cfg: &AppCfg) -> Result<(), AppError> {
        let cache = app::build_cache(cfg)?;

        match command {
            Commands::Quote {
                coin_in,
                coin_out,
                amount_in,
                slippage_bp,
                exclude_dex,
                max_hops,
            } => {
                let body = QuoteRequestBody {
                    coin_in,
                    coin_out,
                    amount_in,
                    slippage_tolerance_bp: slippage_bp.unwrap_or(cfg.config.quote.default_slippage_bp),
                    exclude_dexes: exclude_dex,
                    max_hops: max_hops.unwrap_or(cfg.config.router.max_hops),
                };
                Self::execute_quote_command(body, cache, cfg).await
            }
            Commands::Pools { address, coin_a, coin_b, dex, limit } => {
                Self::execute_pools_command(address, coin_a, coin_b, dex, limit, cache).await
            }
            Commands::Health => Self::execute_health_command(cache).await,
            Commands::Watch { duration } => Self::execute_watch_command(duration, cache, cfg).await,
        }
    }

    async fn execute_quote_command(body: QuoteRequestBody, cache: Arc<PoolCache>, cfg: &AppCfg) -> Result<(), AppError> {
        let request = body.into_request()?;
        cache.refresh_all().await;

        let service = QuoteService::new(cache, app::build_router(cfg));
        let result = service.quote(&request)?;
        let response = QuoteResponseBody::from(&result);

        if response.is_no_route() {
            warn!("❌ No route from {} to {}", request.coin_in, request.coin_out);
        }
        println!("{}", serde_json::to_string_pretty(&response)?);
        Ok(())
    }

    async fn execute_pools_command(
        address: Option<String>,
        coin_a: Option<String>,
        coin_b: Option<String>,
        dex_filter: Option<String>,
        limit: usize,
        cache: Arc<PoolCache>,
    ) -> Result<(), AppError> {
        info!("🔍 Loading pools...");
        cache.refresh_all().await;

        let dex_filter = dex_filter.map(|tag| tag.parse::<DexType>()).transpose()?;
        let pools: Vec<Arc<Pool>> = match (address, coin_a, coin_b) {
            (Some(address), _, _) => vec![cache.pool(&address)?],
            (None, Some(a), Some(b)) => cache.pools_for_pair(&CoinId::new(a), &CoinId::new(b)),
            _ => cache.all_pools(),
        };
        let matching: Vec<&Arc<Pool>> = pools
            .iter()
            .filter(|pool| dex_filter.map_or(true, |dex| pool.dex_type == dex))
            .collect();

        info!("📊 {} pools (showing {})", matching.len(), matching.len().min(limit));
        for (i, pool) in matching.iter().take(limit).enumerate() {
            info!(
                "   {}. [{}] {} {} <-> {} {} (fee {} bp, ID: {})",
                i + 1,
                pool.dex_type.display_name(),
                format_amount(pool.reserve_a, pool.coin_a.decimals),
                pool.coin_a.coin_type,
                format_amount(pool.reserve_b, pool.coin_b.decimals),
                pool.coin_b.coin_type,
                pool.fee_rate,
                format_pool_address(&pool.address)
            );
        }
        Ok(())
    }

    async fn execute_health_command(cache: Arc<PoolCache>) -> Result<(), AppError> {
        cache.refresh_all().await;
        println!("{}", serde_json::to_string_pretty(&cache.health_status())?);
        Ok(())
    }

    async fn execute_watch_command(duration: Option<u64>, cache: Arc<PoolCache>, cfg: &AppCfg) -> Result<(), AppError> {
        info!("🚀 Watching {} pool providers", cache.provider_count());

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let refresh_interval = cfg.config.refresh_interval();
        let handle = spawn_refresh_task(Arc::clone(&cache), refresh_interval, shutdown_rx);

        let deadline = async {
            match duration {
                Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline);

        let mut ticker = tokio::time::interval(refresh_interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let health = cache.health_status();
                    match health.status {
                        HealthState::Healthy => info!("✅ {} pools, updated {:?}s ago", health.pool_count, health.seconds_since_update),
                        HealthState::Stale => warn!("⚠️ Pool data stale: {:?}s old, failed providers {:?}", health.seconds_since_update, health.failed_providers),
                        HealthState::Uninitialized => info!("⏳ Waiting for first pool snapshot"),
                    }
                }
                _ = &mut deadline => {
                    info!("⏱️ Watch duration elapsed");
                    break;
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("🛑 Interrupted");
                    break;
                }
            }
        }

        let _ = shutdown_tx.send(true);
        if let Err(e) = handle.await {
            warn!("Refresh task ended abnormally: {}", e);
        }
        Ok(())
    }
}
