//! Provider Factory Port
//!
//! Maps a provider identifier to a ready-to-use client.

use crate::domain::ports::GeoProvider;
use crate::domain::value_objects::ProviderId;

/// Builds provider clients on demand.
///
/// Construction is total over [`ProviderId`]; unknown names are rejected
/// earlier, when parsing configuration. The client type is fixed per
/// factory, so callers dispatch statically.
pub trait ProviderFactory: Send + Sync + 'static {
    type Provider: GeoProvider;

    fn construct(&self, id: ProviderId) -> Self::Provider;
}
