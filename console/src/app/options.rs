//! Application configuration options

use std::time::Duration;

use crate::actions::coordinator;
use crate::server::serve::ServerOptions;
use crate::storage::layout::StorageLayout;
use crate::storage::settings::{RelaySettings, Settings};
use crate::workers::{list_refresh, poller};

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Storage layout paths
    pub layout: StorageLayout,

    /// GraphQL request timeout
    pub request_timeout: Duration,

    /// Status polling and action options
    pub dashboard: DashboardOptions,

    /// Watch mode options
    pub watch: WatchOptions,

    /// Config relay options
    pub relay: RelaySettings,
}

impl AppOptions {
    /// Build options from persisted settings
    pub fn from_settings(layout: StorageLayout, settings: &Settings) -> Self {
        Self {
            layout,
            request_timeout: Duration::from_secs(settings.api.request_timeout_secs),
            dashboard: DashboardOptions {
                poller: poller::Options {
                    interval: Duration::from_secs(settings.poller.interval_secs),
                },
                coordinator: coordinator::Options {
                    refetch_delay: Duration::from_secs(settings.poller.refetch_delay_secs),
                },
            },
            watch: WatchOptions {
                list_refresh: list_refresh::Options {
                    interval: Duration::from_secs(settings.poller.list_refresh_secs),
                },
                ..Default::default()
            },
            relay: settings.relay.clone(),
        }
    }

    pub fn server_options(&self) -> ServerOptions {
        ServerOptions {
            host: self.relay.host.clone(),
            port: self.relay.port,
        }
    }
}

/// Options of the status layer
#[derive(Debug, Clone, Default)]
pub struct DashboardOptions {
    pub poller: poller::Options,
    pub coordinator: coordinator::Options,
}

/// Watch mode options
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Deployments list refresh
    pub list_refresh: list_refresh::Options,

    /// Screen redraw interval
    pub render_interval: Duration,

    /// Also serve the config relay
    pub enable_relay: bool,

    /// Maximum delay for graceful shutdown
    pub max_shutdown_delay: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            list_refresh: list_refresh::Options::default(),
            render_interval: Duration::from_secs(1),
            enable_relay: false,
            max_shutdown_delay: Duration::from_secs(10),
        }
    }
}
