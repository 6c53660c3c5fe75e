pub mod file_provider;
pub mod static_provider;

pub use file_provider::FilePoolProvider;
pub use static_provider::StaticPoolProvider;
