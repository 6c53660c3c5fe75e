//! Error handling for the application

use thiserror::Error;

/// AMM math errors. Always local to one pool evaluation or one candidate route.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MathError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid fee rate: {0} bp")]
    InvalidFee(u32),

    #[error("Invalid tolerance: {0} bp")]
    InvalidTolerance(u32),

    #[error("Insufficient liquidity: {0}")]
    InsufficientLiquidity(String),

    #[error("Arithmetic overflow")]
    Overflow,
}

/// Route assembly errors. Discards one candidate, never the whole search.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("Route has no steps")]
    Empty,

    #[error("Route is disconnected at step {0}")]
    Disconnected(usize),

    #[error(transparent)]
    Math(#[from] MathError),
}

/// Pool cache lookup errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Pool not found: {0}")]
    PoolNotFound(String),
}

/// Pool-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("Invalid pool data: {0}")]
    InvalidPoolData(String),
}

/// Pool-data provider errors. A failing provider only loses its own pools for one cycle.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider responded with status {0}")]
    Status(u16),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode pool data: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

/// Request validation errors, raised before any path search begins
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Malformed coin identifier: {0:?}")]
    MalformedCoin(String),

    #[error("coin_in and coin_out must differ")]
    IdenticalCoins,

    #[error("Invalid amount_in: {0}")]
    InvalidAmount(String),

    #[error("max_hops must be between 1 and {max}, got {value}")]
    HopsOutOfRange { value: u8, max: u8 },

    #[error("slippage_tolerance_bp must be between 1 and 10000, got {0}")]
    SlippageOutOfRange(u32),

    #[error("Unknown DEX type: {0}")]
    UnknownDex(String),
}

impl ValidationError {
    /// Transport status code for a client-fault condition
    pub fn status_code(&self) -> u16 {
        400
    }
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        AppError::ProviderError(err.to_string())
    }
}

impl From<CacheError> for AppError {
    fn from(err: CacheError) -> Self {
        AppError::NotFound(err.to_string())
    }
}
