mod geo_provider;
mod provider_factory;
mod query_cache;

pub use geo_provider::GeoProvider;
pub use provider_factory::ProviderFactory;
pub use query_cache::QueryCache;
