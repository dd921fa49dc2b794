//! GraphQL transport

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use shipkit_api::documents::operation_name;
use shipkit_api::{GraphQlRequest, GraphQlResponse};
use tracing::{debug, error, warn};

use crate::authn::session_mngr::SessionManagerExt;
use crate::errors::ShipkitError;

/// Header carrying a per-request correlation id
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// GraphQL client for gateway communication
pub struct GraphQlClient {
    client: Client,
    endpoint: String,
    session: Arc<dyn SessionManagerExt>,
}

impl GraphQlClient {
    /// Create a new GraphQL client
    pub fn new(
        endpoint: &str,
        session: Arc<dyn SessionManagerExt>,
        timeout: Duration,
    ) -> Result<Self, ShipkitError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("shipkit/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            session,
        })
    }

    /// Get the endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Get the session this client authenticates with
    pub fn session(&self) -> &Arc<dyn SessionManagerExt> {
        &self.session
    }

    /// Execute a GraphQL document and decode its `data`
    pub async fn execute<V, T>(&self, document: &str, variables: V) -> Result<T, ShipkitError>
    where
        V: Serialize + Send,
        T: DeserializeOwned,
    {
        let operation = operation_name(document);
        let request_id = crate::utils::request_id();
        debug!("POST {} ({})", self.endpoint, operation.unwrap_or("anonymous"));

        let authorization = match self.session.bearer_token().await? {
            Some(token) => format!("Bearer {}", token),
            None => String::new(),
        };

        let body = GraphQlRequest {
            query: document,
            operation_name: operation,
            variables,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header(header::AUTHORIZATION, authorization)
            .header(REQUEST_ID_HEADER, &request_id)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!("Gateway returned 401 for {}, clearing session", request_id);
            self.session.clear().await?;
            return Err(ShipkitError::AuthError("session is no longer valid".to_string()));
        }

        let text = response.text().await?;
        // errors are inspected before `data` is typed: a failed field may be
        // null in `data` even when `T` does not allow it
        let payload: GraphQlResponse<serde_json::Value> = match serde_json::from_str(&text) {
            Ok(payload) => payload,
            Err(e) if status.is_success() => return Err(e.into()),
            Err(_) => {
                error!("GraphQL request failed: {} - {}", status, text);
                return Err(ShipkitError::ServerError(format!("{}: {}", status, text)));
            }
        };

        if !payload.errors.is_empty() {
            for err in &payload.errors {
                error!(
                    "GraphQL error: Message: {}, Path: {:?}, Request: {}",
                    err.message, err.path, request_id
                );
            }
            let err = ShipkitError::from_graphql(&payload.errors);
            if err.is_auth_failure() {
                self.session.clear().await?;
            }
            return Err(err);
        }

        let data = payload.data.ok_or_else(|| {
            ShipkitError::ServerError(format!("{} returned no data", status))
        })?;
        Ok(serde_json::from_value(data)?)
    }
}
