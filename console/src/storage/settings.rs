//! Settings file management

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::filesys::file::File;
use crate::logs::LogLevel;

/// Console settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,

    /// Also write logs to a rolling file under the logs directory
    #[serde(default)]
    pub log_to_file: bool,

    /// Gateway API configuration
    #[serde(default)]
    pub api: ApiSettings,

    /// Status polling configuration
    #[serde(default)]
    pub poller: PollerSettings,

    /// Configuration relay server
    #[serde(default)]
    pub relay: RelaySettings,
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_to_file: false,
            api: ApiSettings::default(),
            poller: PollerSettings::default(),
            relay: RelaySettings::default(),
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults when the file is missing or unreadable
    pub async fn load(file: &File) -> Self {
        match file.read_json_opt::<Settings>().await {
            Ok(Some(settings)) => settings,
            Ok(None) => Settings::default(),
            Err(e) => {
                warn!("Ignoring unreadable settings file {:?}: {}", file.path(), e);
                Settings::default()
            }
        }
    }
}

/// Gateway API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Explicit GraphQL endpoint; skips discovery when set
    #[serde(default)]
    pub graphql_url: Option<String>,

    /// Base URL of a console serving `/api/config`
    #[serde(default)]
    pub console_url: Option<String>,

    /// Endpoint used when discovery fails
    #[serde(default = "default_fallback_graphql_url")]
    pub fallback_graphql_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

pub(crate) fn default_fallback_graphql_url() -> String {
    "http://localhost:8080/graphql".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            graphql_url: None,
            console_url: None,
            fallback_graphql_url: default_fallback_graphql_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Status polling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerSettings {
    /// Status polling interval in seconds
    #[serde(default = "default_polling_interval")]
    pub interval_secs: u64,

    /// Delay before re-fetching a status after a start/stop
    #[serde(default = "default_refetch_delay")]
    pub refetch_delay_secs: u64,

    /// Deployments list refresh interval in seconds (watch mode)
    #[serde(default = "default_list_refresh")]
    pub list_refresh_secs: u64,
}

fn default_polling_interval() -> u64 {
    15
}

fn default_refetch_delay() -> u64 {
    2
}

fn default_list_refresh() -> u64 {
    60
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_polling_interval(),
            refetch_delay_secs: default_refetch_delay(),
            list_refresh_secs: default_list_refresh(),
        }
    }
}

/// Configuration relay settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelaySettings {
    /// Host to bind to
    #[serde(default = "default_relay_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_relay_port")]
    pub port: u16,

    /// Public GraphQL URL handed to clients
    #[serde(default)]
    pub graphql_url: Option<String>,

    /// API base URL reported by the RPC relay
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Application name reported to clients
    #[serde(default = "default_app_name")]
    pub app_name: String,
}

fn default_relay_host() -> String {
    "127.0.0.1".to_string()
}

fn default_relay_port() -> u16 {
    3000
}

fn default_api_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_app_name() -> String {
    "Shipkit".to_string()
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            host: default_relay_host(),
            port: default_relay_port(),
            graphql_url: None,
            api_base_url: default_api_base_url(),
            app_name: default_app_name(),
        }
    }
}
