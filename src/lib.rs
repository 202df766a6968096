//! ipapi-agent Library
//!
//! IP and domain geolocation over interchangeable upstream providers. This
//! module exposes the components for use in integration tests and as a
//! library.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use application::QueryService;
pub use config::{load_config, Config};
pub use domain::entities::{CanonicalResponse, QueryStatus};
pub use domain::error::{ConfigError, QueryError, UpstreamError};
pub use domain::ports::{GeoProvider, ProviderFactory, QueryCache};
pub use domain::services::{ProviderSelector, SelectionPolicy};
pub use domain::value_objects::{ProviderId, SelectionMode};
