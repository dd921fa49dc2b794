//! Server state

use crate::storage::settings::RelaySettings;

/// Server state shared across handlers
pub struct ServerState {
    /// Public GraphQL URL handed to clients, if configured
    pub graphql_url: Option<String>,

    /// Gateway base URL exposed through the RPC config procedure
    pub api_base_url: String,

    pub app_name: String,
}

impl ServerState {
    pub fn new(settings: &RelaySettings) -> Self {
        Self {
            graphql_url: settings.graphql_url.clone(),
            api_base_url: settings.api_base_url.clone(),
            app_name: settings.app_name.clone(),
        }
    }
}
