//! Domain Layer
//!
//! Entities, value objects, ports and pure services. Nothing in here
//! performs I/O.

pub mod country;
pub mod entities;
pub mod error;
pub mod ports;
pub mod services;
pub mod value_objects;

pub use entities::{CacheEntry, CanonicalResponse, QueryStatus};
pub use error::{ConfigError, QueryError, UpstreamError};
pub use value_objects::{ProviderId, SelectionMode};
