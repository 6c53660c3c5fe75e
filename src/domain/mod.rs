//! Domain layer - core business logic and entities

pub mod dex;
pub mod pool;
pub mod routing;
