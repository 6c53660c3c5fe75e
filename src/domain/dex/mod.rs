//! DEX domain - decentralized exchange integrations

mod dex_registry;

pub use dex_registry::{DexInfo, DexRegistry, DexType};
