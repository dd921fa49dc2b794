//! Deployments list refresh worker

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::app::state::Dashboard;

/// List refresh worker options
#[derive(Debug, Clone)]
pub struct Options {
    /// Refresh interval
    pub interval: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
        }
    }
}

/// Run the list refresh worker. Loads the list right away, then keeps the
/// poller pointed at whatever the gateway reports.
pub async fn run<S, F>(
    options: &Options,
    dashboard: &Dashboard,
    sleep_fn: S,
    mut shutdown_signal: Pin<Box<dyn Future<Output = ()> + Send>>,
) where
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    info!("List refresh worker starting...");

    loop {
        debug!("Refreshing deployments list...");
        match dashboard.refresh().await {
            Ok(_) => dashboard.track(),
            Err(e) if e.is_auth_failure() => {
                warn!("Session is no longer valid, run `shipkit login`: {}", e);
                dashboard.poller().stop();
            }
            Err(e) => {
                error!("Failed to refresh deployments: {}", e);
            }
        }

        tokio::select! {
            _ = &mut shutdown_signal => {
                info!("List refresh worker shutting down...");
                return;
            }
            _ = sleep_fn(options.interval) => {}
        }
    }
}
