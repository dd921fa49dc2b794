//! HTTP request handlers

use std::sync::{Arc, LazyLock};

use axum::{extract::State, response::IntoResponse, Json};
use http::HeaderMap;
use regex::Regex;
use serde::Serialize;
use shipkit_api::{ConfigResponse, RpcConfig};

use crate::server::state::ServerState;
use crate::utils::version_info;

static INTERNAL_HOST_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)(gateway-api|localhost:8080)").ok());

/// Whether `url` points at a host only reachable inside the deployment
/// network. A match only counts when not followed by a word char or `-`.
pub fn is_internal_url(url: &str) -> bool {
    let Some(re) = INTERNAL_HOST_PATTERN.as_ref() else {
        return false;
    };
    re.find_iter(url).any(|m| {
        url[m.end()..]
            .chars()
            .next()
            .is_none_or(|c| !(c.is_alphanumeric() || c == '_' || c == '-'))
    })
}

/// GraphQL URL as seen by a client that reached us with `headers`
pub fn public_graphql_url(configured: Option<&str>, headers: &HeaderMap) -> String {
    if let Some(url) = configured.filter(|url| !url.is_empty() && !is_internal_url(url)) {
        return url.to_string();
    }

    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    let host = header("x-forwarded-host")
        .or_else(|| header("host"))
        .unwrap_or("localhost");
    let proto = header("x-forwarded-proto").unwrap_or("http");
    format!("{}://{}/graphql", proto, host)
}

/// Runtime config handler
pub async fn config_handler(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    Json(ConfigResponse {
        graphql_url: public_graphql_url(state.graphql_url.as_deref(), &headers),
        app_name: state.app_name.clone(),
    })
}

/// RPC envelope
#[derive(Debug, Serialize)]
pub struct RpcResponse<T> {
    pub result: RpcResult<T>,
}

#[derive(Debug, Serialize)]
pub struct RpcResult<T> {
    pub data: T,
}

/// RPC `config` procedure handler
pub async fn rpc_config_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    Json(RpcResponse {
        result: RpcResult {
            data: RpcConfig {
                api_base_url: state.api_base_url.clone(),
                app_name: state.app_name.clone(),
            },
        },
    })
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "shipkit".to_string(),
        version: version_info().version,
    })
}

/// Version handler
pub async fn version_handler() -> impl IntoResponse {
    Json(version_info())
}
