//! ip-api.com Provider
//!
//! Free JSON endpoint, e.g. `http://ip-api.com/json/1.1.1.1?fields=53003`:
//!
//! ```text
//! {
//!   "status": "success",
//!   "country": "Australia",
//!   "countryCode": "AU",
//!   "regionName": "Queensland",
//!   "timezone": "Australia/Brisbane",
//!   "isp": "Cloudflare, Inc",
//!   "org": "APNIC and Cloudflare DNS Resolver project",
//!   "as": "AS13335 Cloudflare, Inc."
//! }
//! ```

use super::http_json::get_json;
use crate::domain::entities::CanonicalResponse;
use crate::domain::error::UpstreamError;
use crate::domain::ports::GeoProvider;
use crate::domain::services::timezone::utc_offset_minutes_at;
use crate::domain::value_objects::ProviderId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "http://ip-api.com";

/// Field mask selecting status, message, country, countryCode, regionName,
/// timezone, isp, org and as.
const FIELDS: u32 = 53003;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct IpApiComBody {
    status: String,
    message: String,
    country: String,
    country_code: String,
    region_name: String,
    timezone: String,
    isp: String,
    org: String,
    #[serde(rename = "as")]
    as_name: String,
}

/// Client for ip-api.com.
#[derive(Debug, Clone)]
pub struct IpApiComClient {
    http: reqwest::Client,
    base_url: String,
}

impl IpApiComClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_base_url(http, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, addr: &str) -> String {
        format!("{}/json/{}?fields={}", self.base_url, addr, FIELDS)
    }
}

#[async_trait]
impl GeoProvider for IpApiComClient {
    fn id(&self) -> ProviderId {
        ProviderId::IpApiCom
    }

    async fn fetch(&self, addr: &str) -> Result<CanonicalResponse, UpstreamError> {
        let body: IpApiComBody = get_json(&self.http, &self.url(addr)).await?;
        normalize(body, Utc::now())
    }
}

fn normalize(body: IpApiComBody, now: DateTime<Utc>) -> Result<CanonicalResponse, UpstreamError> {
    match body.status.as_str() {
        "success" => {}
        "fail" => return Err(UpstreamError::ProviderFailure(body.message)),
        // anything else is refused rather than passed through
        other => return Err(UpstreamError::UnknownStatus(other.to_string())),
    }

    let utc_offset_minutes = utc_offset_minutes_at(&body.timezone, now)?;
    let asn = parse_asn(&body.as_name)?;

    Ok(CanonicalResponse {
        data_source: ProviderId::IpApiCom.as_str().to_string(),
        country: body.country,
        country_code: body.country_code,
        region: body.region_name,
        timezone: body.timezone,
        utc_offset_minutes,
        organization: body.org,
        isp: body.isp,
        asn,
        ..Default::default()
    })
}

/// Extract the ASN from an `as` field such as `"AS13335 Cloudflare, Inc."`.
fn parse_asn(as_name: &str) -> Result<String, UpstreamError> {
    if !as_name.starts_with("AS") {
        return Err(UpstreamError::MalformedAsn(as_name.to_string()));
    }

    match as_name.split_once(' ') {
        Some((asn, _)) => Ok(asn.to_string()),
        None => Err(UpstreamError::MalformedAsn(as_name.to_string())),
    }
}
