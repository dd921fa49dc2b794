//! Start/stop/delete coordination with optimistic status updates

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::actions::fsm::{ActionEvent, ActionFsm, ActionKind};
use crate::cache::status::StatusOverride;
use crate::errors::ShipkitError;
use crate::http::deployments::DeploymentApi;
use crate::notify::Notifier;
use crate::sync::fetcher::StatusFetcher;

/// Coordinator options
#[derive(Debug, Clone)]
pub struct Options {
    /// Delay before the confirming fetch after a successful start/stop
    pub refetch_delay: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            refetch_delay: Duration::from_secs(2),
        }
    }
}

/// Runs deployment actions and tracks which ones are in flight.
///
/// Actions of different kinds on the same deployment are not serialized;
/// callers use [`ActionCoordinator::is_busy`] to disable conflicting ones.
pub struct ActionCoordinator {
    options: Options,
    api: Arc<dyn DeploymentApi>,
    fetcher: Arc<StatusFetcher>,
    notifier: Arc<dyn Notifier>,
    actions: Mutex<HashMap<(ActionKind, String), ActionFsm>>,
    refetches: Mutex<Vec<JoinHandle<()>>>,
}

impl ActionCoordinator {
    pub fn new(
        options: Options,
        api: Arc<dyn DeploymentApi>,
        fetcher: Arc<StatusFetcher>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            options,
            api,
            fetcher,
            notifier,
            actions: Mutex::new(HashMap::new()),
            refetches: Mutex::new(Vec::new()),
        }
    }

    pub async fn start(&self, id: &str) -> Result<(), ShipkitError> {
        self.run_action(ActionKind::Start, id).await
    }

    pub async fn stop(&self, id: &str) -> Result<(), ShipkitError> {
        self.run_action(ActionKind::Stop, id).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ShipkitError> {
        self.run_action(ActionKind::Delete, id).await
    }

    /// Whether `kind` is in flight for deployment `id`
    pub fn is_loading(&self, kind: ActionKind, id: &str) -> bool {
        let actions = self.actions.lock().unwrap_or_else(|e| e.into_inner());
        actions
            .get(&(kind, id.to_string()))
            .is_some_and(|fsm| fsm.is_in_flight())
    }

    /// Whether any action is in flight for deployment `id`
    pub fn is_busy(&self, id: &str) -> bool {
        [ActionKind::Start, ActionKind::Stop, ActionKind::Delete]
            .into_iter()
            .any(|kind| self.is_loading(kind, id))
    }

    /// Wait for every scheduled confirming fetch to finish
    pub async fn settle(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut refetches = self.refetches.lock().unwrap_or_else(|e| e.into_inner());
            refetches.drain(..).collect()
        };
        for handle in handles {
            if let Err(e) = handle.await {
                debug!("Refetch task ended early: {}", e);
            }
        }
    }

    async fn run_action(&self, kind: ActionKind, id: &str) -> Result<(), ShipkitError> {
        self.transition(kind, id, ActionEvent::Invoke)?;
        info!("Running {} on deployment {}", kind.as_str(), id);

        let result = match kind {
            ActionKind::Start => self.api.start_deployment(id).await.map(|_| ()),
            ActionKind::Stop => self.api.stop_deployment(id).await,
            ActionKind::Delete => self.api.delete_deployment(id).await,
        };

        match result {
            Ok(()) => {
                self.transition(kind, id, ActionEvent::Succeeded)?;
                self.notifier.success(kind.success_message());

                let cache = self.fetcher.cache();
                match kind.optimistic_state() {
                    Some(state) => {
                        cache.apply_override(id, StatusOverride::state(state));
                        self.schedule_refetch(id);
                    }
                    None => {
                        cache.remove(id);
                    }
                }
                Ok(())
            }
            Err(e) => {
                error!("Failed to {} deployment {}: {}", kind.as_str(), id, e);
                self.transition(kind, id, ActionEvent::Failed(e.to_string()))?;
                self.notifier.error(kind.failure_message());
                Err(e)
            }
        }
    }

    fn transition(
        &self,
        kind: ActionKind,
        id: &str,
        event: ActionEvent,
    ) -> Result<(), ShipkitError> {
        let mut actions = self.actions.lock().unwrap_or_else(|e| e.into_inner());
        let key = (kind, id.to_string());
        let fsm = actions.entry(key.clone()).or_default();
        fsm.process(event).map_err(|e| {
            ShipkitError::ValidationError(format!(
                "{} already in progress for {}: {}",
                kind.as_str(),
                id,
                e
            ))
        })?;
        if !fsm.is_in_flight() {
            actions.remove(&key);
        }
        Ok(())
    }

    fn schedule_refetch(&self, id: &str) {
        let fetcher = self.fetcher.clone();
        let delay = self.options.refetch_delay;
        let id = id.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            fetcher.refetch_status(&id).await;
        });

        let mut refetches = self.refetches.lock().unwrap_or_else(|e| e.into_inner());
        refetches.retain(|h| !h.is_finished());
        refetches.push(handle);
    }
}
