//! GraphQL endpoint discovery

use std::time::Duration;

use serde::{Deserialize, Serialize};
use shipkit_api::ConfigResponse;
use tracing::{debug, info, warn};
use url::Url;

use crate::errors::ShipkitError;
use crate::filesys::file::File;
use crate::storage::settings::ApiSettings;

const CONFIG_PATH: &str = "/api/config";
const CONFIG_TIMEOUT: Duration = Duration::from_secs(10);

/// Endpoint remembered from a previous `/api/config` lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedEndpoint {
    pub graphql_url: String,
    #[serde(default)]
    pub console_url: Option<String>,
}

/// Resolve the GraphQL URL: explicit setting, then the cached lookup, then
/// the console's `/api/config`, then the fallback.
pub async fn resolve_graphql_url(api: &ApiSettings, cache: &File) -> String {
    if let Some(url) = &api.graphql_url {
        debug!("Using configured GraphQL endpoint {}", url);
        return url.clone();
    }

    match cache.read_json_opt::<CachedEndpoint>().await {
        Ok(Some(cached)) if cached.console_url == api.console_url => {
            debug!("Using cached GraphQL endpoint {}", cached.graphql_url);
            return cached.graphql_url;
        }
        Ok(_) => {}
        Err(e) => warn!("Ignoring unreadable endpoint cache: {}", e),
    }

    if let Some(console_url) = &api.console_url {
        match fetch_config(console_url).await {
            Ok(config) => {
                info!("Discovered GraphQL endpoint {}", config.graphql_url);
                let cached = CachedEndpoint {
                    graphql_url: config.graphql_url.clone(),
                    console_url: Some(console_url.clone()),
                };
                if let Err(e) = cache.write_json(&cached).await {
                    warn!("Failed to cache GraphQL endpoint: {}", e);
                }
                return config.graphql_url;
            }
            Err(e) => warn!("Failed to load runtime config from {}: {}", console_url, e),
        }
    }

    warn!(
        "No GraphQL endpoint configured, falling back to {}",
        api.fallback_graphql_url
    );
    api.fallback_graphql_url.clone()
}

/// Forget the cached endpoint
pub async fn forget_cached(cache: &File) -> Result<(), ShipkitError> {
    cache.delete().await
}

/// GET `<console_url>/api/config`
pub async fn fetch_config(console_url: &str) -> Result<ConfigResponse, ShipkitError> {
    let url = Url::parse(console_url)
        .and_then(|base| base.join(CONFIG_PATH))
        .map_err(|e| ShipkitError::ConfigError(format!("invalid console URL {}: {}", console_url, e)))?;

    let response = reqwest::Client::builder()
        .timeout(CONFIG_TIMEOUT)
        .build()?
        .get(url)
        .send()
        .await?
        .error_for_status()?;

    Ok(response.json::<ConfigResponse>().await?)
}
