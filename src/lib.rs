//! dexroute - best-route quoting across constant-product DEX pools
//! Built with Domain-Driven Design principles

pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod exchanges;
pub mod math;
pub mod shared;

// Re-export main types for convenience
pub use domain::dex::{DexRegistry, DexType};
pub use domain::pool::{Pool, PoolCache, PoolSnapshot};
pub use domain::routing::{PathFinder, QuoteRequest, QuoteResult, QuoteService, Route, RouteSelector, Router};
pub use exchanges::PoolProvider;
