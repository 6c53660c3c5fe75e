pub mod http_pool_client;

pub use http_pool_client::HttpPoolProvider;
