//! Lookup API Server
//!
//! HTTP front end over the query service: a plain-text view of the caller's
//! own address and JSON lookups of any public address or domain.

use super::client_ip::client_ip;
use super::query_target::TargetPolicy;
use super::text::{render_failure, render_success};
use crate::adapters::outbound::UpstreamRegistry;
use crate::application::QueryService;
use crate::domain::ports::ProviderFactory;
use crate::infrastructure::ShutdownController;
use axum::{
    extract::{ConnectInfo, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// API Server state.
pub struct ApiState<F: ProviderFactory = UpstreamRegistry> {
    pub service: Arc<QueryService<F>>,
    pub targets: Arc<TargetPolicy>,
    /// Peers whose forwarding headers are honoured
    pub trusted_proxies: Arc<Vec<IpAddr>>,
}

impl<F: ProviderFactory> Clone for ApiState<F> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            targets: self.targets.clone(),
            trusted_proxies: self.trusted_proxies.clone(),
        }
    }
}

impl<F: ProviderFactory> ApiState<F> {
    pub fn new(
        service: Arc<QueryService<F>>,
        targets: TargetPolicy,
        trusted_proxies: Vec<IpAddr>,
    ) -> Self {
        Self {
            service,
            targets: Arc::new(targets),
            trusted_proxies: Arc::new(trusted_proxies),
        }
    }

    fn client_ip(&self, peer: SocketAddr, headers: &HeaderMap) -> IpAddr {
        client_ip(peer.ip(), headers, &self.trusted_proxies)
    }
}

/// Build the router. Handlers need `ConnectInfo<SocketAddr>`.
pub fn router<F: ProviderFactory>(state: ApiState<F>, access_log: bool) -> Router {
    let app = Router::new()
        .route("/", get(root_handler::<F>))
        .route("/query", get(query_self_handler::<F>))
        .route("/query/:addr", get(query_addr_handler::<F>))
        .route("/generate_204", get(generate_204_handler))
        .with_state(state);

    if access_log {
        app.layer(TraceLayer::new_for_http())
    } else {
        app
    }
}

/// API Server.
pub struct ApiServer<F: ProviderFactory = UpstreamRegistry> {
    listen_addr: String,
    state: ApiState<F>,
    access_log: bool,
}

impl<F: ProviderFactory> ApiServer<F> {
    pub fn new(listen_addr: String, state: ApiState<F>, access_log: bool) -> Self {
        Self {
            listen_addr,
            state,
            access_log,
        }
    }

    /// Run the API server until `shutdown` fires.
    #[cfg_attr(coverage_nightly, coverage(off))]
    pub async fn run(self, shutdown: ShutdownController) -> anyhow::Result<()> {
        let app = router(self.state, self.access_log);

        let listener = TcpListener::bind(&self.listen_addr).await?;
        tracing::info!("lookup API listening on {}", self.listen_addr);

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown.wait())
        .await?;

        tracing::info!("lookup API stopped");
        Ok(())
    }
}

// Handler functions

async fn generate_204_handler() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn root_handler<F: ProviderFactory>(
    State(state): State<ApiState<F>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    let colorful = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|ua| ua.starts_with("curl"))
        .unwrap_or(false);

    let query = state.client_ip(peer, &headers).to_string();

    let addr = match state.targets.resolve(&query).await {
        Ok(addr) => addr,
        Err(e) => {
            tracing::info!("rejected query {}: {}", query, e);
            return (
                StatusCode::BAD_REQUEST,
                render_failure(colorful, e.public_message()),
            )
                .into_response();
        }
    };

    match state.service.resolve(&addr, true).await {
        Ok(resp) => (StatusCode::OK, render_success(colorful, &addr, &resp)).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            render_failure(colorful, e.public_message()),
        )
            .into_response(),
    }
}

async fn query_self_handler<F: ProviderFactory>(
    State(state): State<ApiState<F>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let query = state.client_ip(peer, &headers).to_string();
    json_lookup(&state, &query, &params).await
}

async fn query_addr_handler<F: ProviderFactory>(
    State(state): State<ApiState<F>>,
    Path(addr): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    json_lookup(&state, &addr, &params).await
}

async fn json_lookup<F: ProviderFactory>(
    state: &ApiState<F>,
    query: &str,
    params: &HashMap<String, String>,
) -> Response {
    let addr = match state.targets.resolve(query).await {
        Ok(addr) => addr,
        Err(e) => {
            tracing::info!("rejected query {}: {}", query, e);
            return failure(StatusCode::BAD_REQUEST, e.public_message());
        }
    };

    let use_cache = match params.get("cache") {
        None => true,
        Some(raw) => match parse_bool(raw) {
            Some(v) => v,
            None => return StatusCode::BAD_REQUEST.into_response(),
        },
    };

    match state.service.resolve(&addr, use_cache).await {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(e) => failure(StatusCode::INTERNAL_SERVER_ERROR, e.public_message()),
    }
}

fn failure(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(serde_json::json!({
            "status": "failure",
            "message": message
        })),
    )
        .into_response()
}

/// Boolean spellings accepted by the `cache` query parameter.
fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}
