//! Integration tests for the query service
//!
//! Wires the real registry, selector and cache against a wiremock upstream.

use futures::future::join_all;
use ipapi_agent::adapters::outbound::{
    build_http_client, DashMapQueryCache, UpstreamEndpoints, UpstreamRegistry,
};
use ipapi_agent::{
    ProviderId, ProviderSelector, QueryCache, QueryError, QueryService, QueryStatus,
    SelectionPolicy, UpstreamError,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ip_api_success() -> serde_json::Value {
    json!({
        "status": "success",
        "country": "Australia",
        "countryCode": "AU",
        "regionName": "Queensland",
        "timezone": "Australia/Brisbane",
        "isp": "Cloudflare, Inc",
        "org": "APNIC and Cloudflare DNS Resolver project",
        "as": "AS13335 Cloudflare, Inc."
    })
}

fn service(server: &MockServer, policy: SelectionPolicy) -> (QueryService, Arc<DashMapQueryCache>) {
    let http = build_http_client(Duration::from_secs(2)).unwrap();
    let registry = UpstreamRegistry::with_endpoints(http, UpstreamEndpoints::all(server.uri()));
    let cache = Arc::new(DashMapQueryCache::default());
    let service = QueryService::new(ProviderSelector::new(policy), registry, cache.clone());
    (service, cache)
}

#[tokio::test]
async fn test_resolve_twice_hits_upstream_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/1.1.1.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ip_api_success()))
        .expect(1)
        .mount(&server)
        .await;

    let (service, _) = service(&server, SelectionPolicy::Single(ProviderId::IpApiCom));

    let first = service.resolve("1.1.1.1", true).await.unwrap();
    let second = service.resolve("1.1.1.1", true).await.unwrap();

    assert_eq!(first.status, QueryStatus::Success);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_bypass_refetches_and_refreshes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/1.1.1.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ip_api_success()))
        .expect(3)
        .mount(&server)
        .await;

    let (service, cache) = service(&server, SelectionPolicy::Single(ProviderId::IpApiCom));

    service.resolve("1.1.1.1", true).await.unwrap();
    service.resolve("1.1.1.1", false).await.unwrap();
    service.resolve("1.1.1.1", false).await.unwrap();
    service.resolve("1.1.1.1", true).await.unwrap();

    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn test_provider_fail_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/1.1.1.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "fail",
            "message": "private range"
        })))
        .expect(2)
        .mount(&server)
        .await;

    let (service, cache) = service(&server, SelectionPolicy::Single(ProviderId::IpApiCom));

    for _ in 0..2 {
        let err = service.resolve("1.1.1.1", true).await.unwrap_err();
        assert_eq!(
            err,
            QueryError::Upstream {
                provider: ProviderId::IpApiCom,
                source: UpstreamError::ProviderFailure("private range".to_string()),
            }
        );
        assert_eq!(err.public_message(), "Upstream error");
    }

    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_rotate_policy_keeps_one_provider_within_interval() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/8.8.8.8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ip_api_success()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/8.8.8.8/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "region": "California",
            "country_name": "United States",
            "country_code": "US",
            "timezone": "America/Los_Angeles",
            "asn": "AS15169",
            "org": "GOOGLE"
        })))
        .mount(&server)
        .await;

    let policy = SelectionPolicy::Rotate {
        pool: vec![ProviderId::IpApiCom, ProviderId::IpapiCo],
        interval: Duration::from_secs(3600),
    };
    let (service, _) = service(&server, policy);

    let mut sources = Vec::new();
    for _ in 0..5 {
        let resp = service.resolve("8.8.8.8", false).await.unwrap();
        sources.push(resp.data_source);
    }

    assert!(sources.iter().all(|s| *s == sources[0]), "sources: {:?}", sources);
}

#[tokio::test]
async fn test_concurrent_misses_all_succeed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/1.1.1.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ip_api_success()))
        .mount(&server)
        .await;

    let (service, cache) = service(&server, SelectionPolicy::Single(ProviderId::IpApiCom));
    let service = Arc::new(service);

    let results = join_all((0..8).map(|_| {
        let service = service.clone();
        async move { service.resolve("1.1.1.1", true).await }
    }))
    .await;

    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(cache.len(), 1);

    // Concurrent misses may each reach the upstream; at least one must have
    let requests = server.received_requests().await.unwrap();
    assert!(!requests.is_empty() && requests.len() <= 8);
}
