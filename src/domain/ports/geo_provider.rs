//! Geo Provider Port
//!
//! Defines the interface for looking up an address at an upstream
//! geolocation service.

use crate::domain::entities::CanonicalResponse;
use crate::domain::error::UpstreamError;
use crate::domain::value_objects::ProviderId;
use async_trait::async_trait;

/// Client for one upstream geolocation provider.
///
/// This is an outbound port. Implementations issue a single HTTP request
/// per call, hold no mutable state between calls and never retry.
#[async_trait]
pub trait GeoProvider: Send + Sync {
    /// Which provider this client talks to.
    fn id(&self) -> ProviderId;

    /// Look up an already validated IP address.
    ///
    /// The returned response has `status` and `message` left at their
    /// defaults; the orchestrator owns those fields.
    async fn fetch(&self, addr: &str) -> Result<CanonicalResponse, UpstreamError>;
}
