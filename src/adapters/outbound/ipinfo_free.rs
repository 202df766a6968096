//! IPinfo Free Provider
//!
//! Token-less endpoint, e.g. `https://ipinfo.io/1.1.1.1/json`:
//!
//! ```text
//! {
//!   "ip": "1.1.1.1",
//!   "hostname": "one.one.one.one",
//!   "city": "Brisbane",
//!   "region": "Queensland",
//!   "country": "AU",
//!   "loc": "-27.4816,153.0175",
//!   "org": "AS13335 Cloudflare, Inc.",
//!   "postal": "4101",
//!   "timezone": "Australia/Brisbane",
//!   "anycast": true
//! }
//! ```
//!
//! Only the country code is reported, and ASN and organization share the
//! `org` field.

use super::http_json::get_json;
use crate::domain::country::country_name;
use crate::domain::entities::CanonicalResponse;
use crate::domain::error::UpstreamError;
use crate::domain::ports::GeoProvider;
use crate::domain::services::timezone::utc_offset_minutes_at;
use crate::domain::value_objects::ProviderId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://ipinfo.io";

const DATA_SOURCE: &str = "IPinfo Free";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IpinfoBody {
    region: String,
    country: String,
    org: String,
    timezone: String,
    anycast: Option<bool>,
}

/// Client for ipinfo.io without an access token.
#[derive(Debug, Clone)]
pub struct IpinfoFreeClient {
    http: reqwest::Client,
    base_url: String,
}

impl IpinfoFreeClient {
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
        format!("{}/{}/json", self.base_url, addr)
    }
}

#[async_trait]
impl GeoProvider for IpinfoFreeClient {
    fn id(&self) -> ProviderId {
        ProviderId::IpinfoFree
    }

    async fn fetch(&self, addr: &str) -> Result<CanonicalResponse, UpstreamError> {
        let body: IpinfoBody = get_json(&self.http, &self.url(addr)).await?;
        normalize(body, Utc::now())
    }
}

fn normalize(body: IpinfoBody, now: DateTime<Utc>) -> Result<CanonicalResponse, UpstreamError> {
    let country = country_name(&body.country)
        .ok_or_else(|| UpstreamError::UnknownCountry(body.country.clone()))?;
    let utc_offset_minutes = utc_offset_minutes_at(&body.timezone, now)?;
    let (asn, organization) = split_org(&body.org)?;

    Ok(CanonicalResponse {
        data_source: DATA_SOURCE.to_string(),
        country: country.to_string(),
        country_code: body.country,
        region: body.region,
        timezone: body.timezone,
        utc_offset_minutes,
        organization,
        isp: String::new(),
        asn,
        anycast: body.anycast,
        ..Default::default()
    })
}

/// Split `"AS13335 Cloudflare, Inc."` into ASN and organization at the
/// first space.
fn split_org(org: &str) -> Result<(String, String), UpstreamError> {
    match org.split_once(' ') {
        Some((asn, organization)) => Ok((asn.to_string(), organization.to_string())),
        None => Err(UpstreamError::MalformedOrg(org.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    fn golden() -> serde_json::Value {
        serde_json::json!({
            "ip": "1.1.1.1",
            "hostname": "one.one.one.one",
            "city": "Brisbane",
            "region": "Queensland",
            "country": "AU",
            "loc": "-27.4816,153.0175",
            "org": "AS13335 Cloudflare, Inc.",
            "postal": "4101",
            "timezone": "Australia/Brisbane",
            "readme": "https://ipinfo.io/missingauth",
            "anycast": true
        })
    }

    fn body(value: serde_json::Value) -> IpinfoBody {
        serde_json::from_value(value).unwrap()
    }

    // ===== Normalization Tests =====

    #[test]
    fn test_golden_payload() {
        let resp = normalize(body(golden()), now()).unwrap();

        assert_eq!(resp.data_source, "IPinfo Free");
        assert_eq!(resp.country, "Australia");
        assert_eq!(resp.country_code, "AU");
        assert_eq!(resp.region, "Queensland");
        assert_eq!(resp.timezone, "Australia/Brisbane");
        assert_eq!(resp.utc_offset_minutes, 600);
        assert_eq!(resp.asn, "AS13335");
        assert_eq!(resp.organization, "Cloudflare, Inc.");
        assert_eq!(resp.isp, "");
        assert_eq!(resp.anycast, Some(true));
    }

    #[test]
    fn test_anycast_absent_stays_none() {
        let mut value = golden();
        value.as_object_mut().unwrap().remove("anycast");

        let resp = normalize(body(value), now()).unwrap();
        assert_eq!(resp.anycast, None);
    }

    #[test]
    fn test_anycast_false_is_kept() {
        let mut value = golden();
        value["anycast"] = serde_json::json!(false);

        let resp = normalize(body(value), now()).unwrap();
        assert_eq!(resp.anycast, Some(false));
    }

    #[test]
    fn test_org_without_space_is_error() {
        let mut value = golden();
        value["org"] = serde_json::json!("Cloudflare");

        assert_eq!(
            normalize(body(value), now()),
            Err(UpstreamError::MalformedOrg("Cloudflare".to_string()))
        );
    }

    #[test]
    fn test_kosovo_country_code() {
        let mut value = golden();
        value["city"] = serde_json::json!("Pristina");
        value["region"] = serde_json::json!("Pristina");
        value["country"] = serde_json::json!("XK");
        value["timezone"] = serde_json::json!("Europe/Belgrade");

        let resp = normalize(body(value), now()).unwrap();
        assert_eq!(resp.country, "Kosovo");
        assert_eq!(resp.country_code, "XK");
        assert_eq!(resp.utc_offset_minutes, 60);
    }

    #[test]
    fn test_unknown_country_code_is_error() {
        let mut value = golden();
        value["country"] = serde_json::json!("ZZ");

        assert_eq!(
            normalize(body(value), now()),
            Err(UpstreamError::UnknownCountry("ZZ".to_string()))
        );
    }

    #[test]
    fn test_unknown_timezone_is_error() {
        let mut value = golden();
        value["timezone"] = serde_json::json!("Atlantis/Capital");

        assert!(matches!(
            normalize(body(value), now()),
            Err(UpstreamError::UnknownTimezone(_))
        ));
    }

    // ===== Org Splitting Tests =====

    #[test]
    fn test_split_org_keeps_rest_verbatim() {
        let (asn, org) = split_org("AS15169 Google LLC").unwrap();
        assert_eq!(asn, "AS15169");
        assert_eq!(org, "Google LLC");
    }

    #[test]
    fn test_url() {
        let client = IpinfoFreeClient::with_base_url(reqwest::Client::new(), "http://mock");
        assert_eq!(client.url("2606:4700::1111"), "http://mock/2606:4700::1111/json");
    }
}
