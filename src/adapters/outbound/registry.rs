//! Upstream Provider Registry
//!
//! Maps a [`ProviderId`] to a concrete client. The provider set is closed, so
//! dispatch goes through the [`UpstreamClient`] enum rather than open-ended
//! trait objects.

use super::ip_api_com::{self, IpApiComClient};
use super::ipapi_co::{self, IpapiCoClient};
use super::ipinfo_free::{self, IpinfoFreeClient};
use crate::domain::entities::CanonicalResponse;
use crate::domain::error::{ConfigError, UpstreamError};
use crate::domain::ports::{GeoProvider, ProviderFactory};
use crate::domain::value_objects::ProviderId;
use async_trait::async_trait;

/// Base URLs of the three providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamEndpoints {
    pub ip_api_com: String,
    pub ipinfo_free: String,
    pub ipapi_co: String,
}

impl UpstreamEndpoints {
    /// Point every provider at the same base URL (mock servers).
    pub fn all(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            ip_api_com: base_url.clone(),
            ipinfo_free: base_url.clone(),
            ipapi_co: base_url,
        }
    }
}

impl Default for UpstreamEndpoints {
    fn default() -> Self {
        Self {
            ip_api_com: ip_api_com::DEFAULT_BASE_URL.to_string(),
            ipinfo_free: ipinfo_free::DEFAULT_BASE_URL.to_string(),
            ipapi_co: ipapi_co::DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// One of the three provider clients.
#[derive(Debug, Clone)]
pub enum UpstreamClient {
    IpApiCom(IpApiComClient),
    IpinfoFree(IpinfoFreeClient),
    IpapiCo(IpapiCoClient),
}

#[async_trait]
impl GeoProvider for UpstreamClient {
    fn id(&self) -> ProviderId {
        match self {
            Self::IpApiCom(c) => c.id(),
            Self::IpinfoFree(c) => c.id(),
            Self::IpapiCo(c) => c.id(),
        }
    }

    async fn fetch(&self, addr: &str) -> Result<CanonicalResponse, UpstreamError> {
        match self {
            Self::IpApiCom(c) => c.fetch(addr).await,
            Self::IpinfoFree(c) => c.fetch(addr).await,
            Self::IpapiCo(c) => c.fetch(addr).await,
        }
    }
}

/// Builds provider clients sharing one HTTP connection pool.
#[derive(Debug, Clone)]
pub struct UpstreamRegistry {
    http: reqwest::Client,
    endpoints: UpstreamEndpoints,
}

impl UpstreamRegistry {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_endpoints(http, UpstreamEndpoints::default())
    }

    pub fn with_endpoints(http: reqwest::Client, endpoints: UpstreamEndpoints) -> Self {
        Self { http, endpoints }
    }

    /// Resolve a configured provider name.
    pub fn resolve(&self, name: &str) -> Result<ProviderId, ConfigError> {
        name.parse()
    }

    /// Resolve a whole configured pool, rejecting an empty one.
    pub fn resolve_pool<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<ProviderId>, ConfigError> {
        if names.is_empty() {
            return Err(ConfigError::EmptyPool);
        }
        names.iter().map(|name| self.resolve(name.as_ref())).collect()
    }

    pub fn client(&self, id: ProviderId) -> UpstreamClient {
        let http = self.http.clone();
        match id {
            ProviderId::IpApiCom => UpstreamClient::IpApiCom(IpApiComClient::with_base_url(
                http,
                self.endpoints.ip_api_com.as_str(),
            )),
            ProviderId::IpinfoFree => UpstreamClient::IpinfoFree(IpinfoFreeClient::with_base_url(
                http,
                self.endpoints.ipinfo_free.as_str(),
            )),
            ProviderId::IpapiCo => UpstreamClient::IpapiCo(IpapiCoClient::with_base_url(
                http,
                self.endpoints.ipapi_co.as_str(),
            )),
        }
    }
}

impl ProviderFactory for UpstreamRegistry {
    type Provider = UpstreamClient;

    fn construct(&self, id: ProviderId) -> UpstreamClient {
        self.client(id)
    }
}
