//! Upstream HTTP helper
//!
//! One GET, one status check, one JSON decode. Shared by every provider
//! client.

use crate::domain::error::UpstreamError;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Build the shared outbound client.
///
/// `timeout` bounds the whole request; hitting it surfaces as
/// [`UpstreamError::Timeout`].
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("ipapi-agent/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// GET `url` and decode a 200 response body as `T`.
pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    url: &str,
) -> Result<T, UpstreamError> {
    let resp = http.get(url).send().await?;

    let status = resp.status();
    if status != StatusCode::OK {
        return Err(UpstreamError::Status(status.as_u16()));
    }

    let body = resp.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| UpstreamError::Decode(e.to_string()))
}
