//! Domain Entities - Core business objects
//!
//! These entities represent the core concepts of the ipapi-agent domain.
//! They have no external dependencies and contain only business logic.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Outcome marker carried in every response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    Success,
    Failure,
}

impl Default for QueryStatus {
    fn default() -> Self {
        Self::Success
    }
}

/// Normalized geolocation answer, independent of the provider it came from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalResponse {
    pub status: QueryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Human-readable name of the provider that answered
    pub data_source: String,
    /// Full country name
    pub country: String,
    /// ISO 3166-1 alpha-2
    pub country_code: String,
    pub region: String,
    /// IANA timezone name
    pub timezone: String,
    /// Offset of `timezone` from UTC at lookup time, in minutes
    #[serde(rename = "utcOffset")]
    pub utc_offset_minutes: i32,
    #[serde(rename = "org")]
    pub organization: String,
    /// Empty when the provider has no ISP data
    pub isp: String,
    /// "AS" followed by digits
    pub asn: String,
    /// Only reported by ipinfo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anycast: Option<bool>,
}

/// A cached response with its own expiry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: CanonicalResponse,
    pub inserted_at: Instant,
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn new(value: CanonicalResponse, ttl: Duration) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
            ttl,
        }
    }

    /// Whether the entry has outlived its TTL at `now`.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) >= self.ttl
    }
}
