//! Single-flight deployment status fetcher

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use shipkit_api::DeploymentState;
use tokio::sync::Notify;
use tracing::{debug, error};

use crate::cache::status::StatusCache;
use crate::http::deployments::DeploymentApi;

/// Result of a status fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The cache entry was replaced with a fresh status
    Updated(DeploymentState),
    /// A fetch for this id was already running, nothing was sent
    AlreadyInFlight,
    /// The request failed; the cache is untouched
    Failed,
}

/// Fetches deployment statuses into the cache, at most one request per id
pub struct StatusFetcher {
    api: Arc<dyn DeploymentApi>,
    cache: Arc<StatusCache>,
    in_flight: Mutex<HashSet<String>>,
    released: Notify,
}

impl StatusFetcher {
    pub fn new(api: Arc<dyn DeploymentApi>, cache: Arc<StatusCache>) -> Self {
        Self {
            api,
            cache,
            in_flight: Mutex::new(HashSet::new()),
            released: Notify::new(),
        }
    }

    pub fn cache(&self) -> &Arc<StatusCache> {
        &self.cache
    }

    /// Whether a fetch for `id` is currently running
    pub fn is_in_flight(&self, id: &str) -> bool {
        let set = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        set.contains(id)
    }

    /// Fetch the status of one deployment. Errors are logged, never returned.
    pub async fn fetch_status(&self, id: &str) -> FetchOutcome {
        let Some(_claim) = self.claim(id) else {
            debug!("Status fetch for {} already in flight, skipping", id);
            return FetchOutcome::AlreadyInFlight;
        };

        match self.api.deployment_status(id).await {
            Ok(status) => {
                let state = status.state;
                debug!("Deployment {} is {}", id, state);
                self.cache.replace(id, status);
                FetchOutcome::Updated(state)
            }
            Err(e) => {
                error!("Error fetching deployment status for {}: {}", id, e);
                FetchOutcome::Failed
            }
        }
    }

    /// Fetch a status that must reflect the server as of now. Waits for a
    /// fetch already in flight for `id` to land, then sends its own request.
    pub async fn refetch_status(&self, id: &str) -> FetchOutcome {
        loop {
            let released = self.released.notified();
            tokio::pin!(released);
            released.as_mut().enable();

            match self.fetch_status(id).await {
                FetchOutcome::AlreadyInFlight => {
                    debug!("Waiting for in-flight fetch of {} before refetching", id);
                    released.await;
                }
                outcome => return outcome,
            }
        }
    }

    fn claim(&self, id: &str) -> Option<InFlightClaim<'_>> {
        let mut set = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if !set.insert(id.to_string()) {
            return None;
        }
        Some(InFlightClaim {
            fetcher: self,
            id: id.to_string(),
        })
    }
}

/// Releases the in-flight slot when the fetch finishes or is dropped
struct InFlightClaim<'a> {
    fetcher: &'a StatusFetcher,
    id: String,
}

impl Drop for InFlightClaim<'_> {
    fn drop(&mut self) {
        {
            let mut set = self.fetcher.in_flight.lock().unwrap_or_else(|e| e.into_inner());
            set.remove(&self.id);
        }
        self.fetcher.released.notify_waiters();
    }
}
