//! ipapi.co Provider
//!
//! Free JSON endpoint, e.g. `https://ipapi.co/1.1.1.1/json/`. The body has
//! no status field and no ISP; `org` is reported for both organization and
//! ISP.

use super::http_json::get_json;
use crate::domain::entities::CanonicalResponse;
use crate::domain::error::UpstreamError;
use crate::domain::ports::GeoProvider;
use crate::domain::services::timezone::utc_offset_minutes_at;
use crate::domain::value_objects::ProviderId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://ipapi.co";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IpapiCoBody {
    region: String,
    country_code: String,
    country_name: String,
    timezone: String,
    asn: String,
    org: String,
}

/// Client for ipapi.co.
#[derive(Debug, Clone)]
pub struct IpapiCoClient {
    http: reqwest::Client,
    base_url: String,
}

impl IpapiCoClient {
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
        format!("{}/{}/json/", self.base_url, addr)
    }
}

#[async_trait]
impl GeoProvider for IpapiCoClient {
    fn id(&self) -> ProviderId {
        ProviderId::IpapiCo
    }

    async fn fetch(&self, addr: &str) -> Result<CanonicalResponse, UpstreamError> {
        let body: IpapiCoBody = get_json(&self.http, &self.url(addr)).await?;
        normalize(body, Utc::now())
    }
}

fn normalize(body: IpapiCoBody, now: DateTime<Utc>) -> Result<CanonicalResponse, UpstreamError> {
    let utc_offset_minutes = utc_offset_minutes_at(&body.timezone, now)?;

    Ok(CanonicalResponse {
        data_source: ProviderId::IpapiCo.as_str().to_string(),
        country: body.country_name,
        country_code: body.country_code,
        region: body.region,
        timezone: body.timezone,
        utc_offset_minutes,
        isp: body.org.clone(),
        organization: body.org,
        asn: body.asn,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn golden() -> IpapiCoBody {
        serde_json::from_value(serde_json::json!({
            "ip": "1.1.1.1",
            "network": "1.1.1.0/24",
            "version": "IPv4",
            "city": "Sydney",
            "region": "New South Wales",
            "region_code": "NSW",
            "country": "AU",
            "country_name": "Australia",
            "country_code": "AU",
            "country_code_iso3": "AUS",
            "in_eu": false,
            "latitude": -33.859336,
            "longitude": 151.203624,
            "timezone": "Australia/Sydney",
            "utc_offset": "+1000",
            "country_area": 7686850,
            "country_population": 24992369,
            "asn": "AS13335",
            "org": "CLOUDFLARENET"
        }))
        .unwrap()
    }

    #[test]
    fn test_golden_payload() {
        // Southern winter, no daylight saving
        let now = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let resp = normalize(golden(), now).unwrap();

        assert_eq!(resp.data_source, "ipapi.co");
        assert_eq!(resp.country, "Australia");
        assert_eq!(resp.country_code, "AU");
        assert_eq!(resp.region, "New South Wales");
        assert_eq!(resp.timezone, "Australia/Sydney");
        assert_eq!(resp.utc_offset_minutes, 600);
        assert_eq!(resp.organization, "CLOUDFLARENET");
        assert_eq!(resp.isp, "CLOUDFLARENET");
        assert_eq!(resp.asn, "AS13335");
        assert_eq!(resp.anycast, None);
    }

    #[test]
    fn test_offset_is_derived_not_copied() {
        // Provider says +1000 but daylight saving applies in January
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        let resp = normalize(golden(), now).unwrap();

        assert_eq!(resp.utc_offset_minutes, 660);
    }

    #[test]
    fn test_missing_timezone_is_error() {
        let now = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let mut body = golden();
        body.timezone = String::new();

        assert!(matches!(normalize(body, now), Err(UpstreamError::UnknownTimezone(_))));
    }

    #[test]
    fn test_url_has_trailing_slash() {
        let client = IpapiCoClient::with_base_url(reqwest::Client::new(), "http://mock");
        assert_eq!(client.url("8.8.8.8"), "http://mock/8.8.8.8/json/");
    }
}
