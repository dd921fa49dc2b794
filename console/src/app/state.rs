//! Application state management

use std::sync::{Arc, Mutex, RwLock};

use futures::future::join_all;
use shipkit_api::Deployment;
use tracing::{debug, info, warn};

use crate::actions::coordinator::ActionCoordinator;
use crate::actions::fsm::ActionKind;
use crate::app::options::{AppOptions, DashboardOptions};
use crate::authn::session_mngr::SessionManager;
use crate::cache::status::StatusCache;
use crate::errors::ShipkitError;
use crate::http::client::GraphQlClient;
use crate::http::deployments::DeploymentApi;
use crate::http::endpoint::resolve_graphql_url;
use crate::notify::Notifier;
use crate::storage::settings::ApiSettings;
use crate::sync::fetcher::{FetchOutcome, StatusFetcher};
use crate::view::list::{project, ListView};
use crate::workers::poller::Poller;

/// Deployments list plus the status layer built on top of it
pub struct Dashboard {
    api: Arc<dyn DeploymentApi>,
    cache: Arc<StatusCache>,
    fetcher: Arc<StatusFetcher>,
    poller: Poller,
    coordinator: ActionCoordinator,
    deployments: RwLock<Vec<Deployment>>,
    tracked: Mutex<Vec<String>>,
}

impl Dashboard {
    pub fn new(
        options: DashboardOptions,
        api: Arc<dyn DeploymentApi>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let cache = Arc::new(StatusCache::new());
        let fetcher = Arc::new(StatusFetcher::new(api.clone(), cache.clone()));
        let poller = Poller::new(options.poller, fetcher.clone());
        let coordinator =
            ActionCoordinator::new(options.coordinator, api.clone(), fetcher.clone(), notifier);

        Self {
            api,
            cache,
            fetcher,
            poller,
            coordinator,
            deployments: RwLock::new(Vec::new()),
            tracked: Mutex::new(Vec::new()),
        }
    }

    pub fn cache(&self) -> &Arc<StatusCache> {
        &self.cache
    }

    pub fn fetcher(&self) -> &Arc<StatusFetcher> {
        &self.fetcher
    }

    pub fn poller(&self) -> &Poller {
        &self.poller
    }

    pub fn coordinator(&self) -> &ActionCoordinator {
        &self.coordinator
    }

    pub fn deployments(&self) -> Vec<Deployment> {
        let deployments = self.deployments.read().unwrap_or_else(|e| e.into_inner());
        deployments.clone()
    }

    pub fn deployment(&self, id: &str) -> Option<Deployment> {
        let deployments = self.deployments.read().unwrap_or_else(|e| e.into_inner());
        deployments.iter().find(|d| d.id == id).cloned()
    }

    /// Reload the deployments list. Cache entries of vanished deployments are dropped.
    pub async fn refresh(&self) -> Result<Vec<Deployment>, ShipkitError> {
        let fresh = self.api.list_deployments().await?;
        let ids: Vec<String> = fresh.iter().map(|d| d.id.clone()).collect();
        self.cache.retain_ids(&ids);

        let mut deployments = self.deployments.write().unwrap_or_else(|e| e.into_inner());
        *deployments = fresh.clone();
        debug!("Loaded {} deployment(s)", fresh.len());
        Ok(fresh)
    }

    /// Point the poller at the current list. Only restarts polling when the
    /// set of ids changed.
    pub fn track(&self) {
        let ids: Vec<String> = self.deployments().into_iter().map(|d| d.id).collect();
        let mut tracked = self.tracked.lock().unwrap_or_else(|e| e.into_inner());
        if *tracked == ids && self.poller.is_running() {
            return;
        }
        self.poller.set_deployments(ids.clone());
        *tracked = ids;
    }

    /// Fetch every deployment's status once and wait for the results
    pub async fn fetch_all(&self) -> Vec<FetchOutcome> {
        let ids: Vec<String> = self.deployments().into_iter().map(|d| d.id).collect();
        join_all(ids.iter().map(|id| self.fetcher.fetch_status(id))).await
    }

    /// Run an action, then reload the list. A failed reload is only logged.
    pub async fn act(&self, kind: ActionKind, id: &str) -> Result<(), ShipkitError> {
        match kind {
            ActionKind::Start => self.coordinator.start(id).await?,
            ActionKind::Stop => self.coordinator.stop(id).await?,
            ActionKind::Delete => self.coordinator.delete(id).await?,
        }
        if let Err(e) = self.refresh().await {
            warn!("Failed to reload deployments after {}: {}", kind.as_str(), e);
        }
        Ok(())
    }

    pub fn view(&self) -> ListView {
        project(&self.deployments(), &self.cache, &self.coordinator)
    }

    pub fn shutdown(&self) {
        self.poller.stop();
    }
}

/// Main application state
pub struct AppState {
    /// GraphQL client for gateway communication
    pub client: Arc<GraphQlClient>,

    /// Local session
    pub session: Arc<SessionManager>,

    /// Deployments and their statuses
    pub dashboard: Arc<Dashboard>,
}

impl AppState {
    /// Initialize application state
    pub async fn init(
        options: &AppOptions,
        api_settings: &ApiSettings,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ShipkitError> {
        info!("Initializing application state...");

        let session = Arc::new(SessionManager::new(Arc::new(options.layout.session_file())));
        let endpoint =
            resolve_graphql_url(api_settings, &options.layout.endpoint_file()).await;
        let client = Arc::new(GraphQlClient::new(
            &endpoint,
            session.clone(),
            options.request_timeout,
        )?);
        let dashboard = Arc::new(Dashboard::new(
            options.dashboard.clone(),
            client.clone(),
            notifier,
        ));

        Ok(Self {
            client,
            session,
            dashboard,
        })
    }

    /// Shutdown application state
    pub async fn shutdown(&self) -> Result<(), ShipkitError> {
        info!("Shutting down application state...");
        self.dashboard.shutdown();
        self.dashboard.coordinator().settle().await;
        Ok(())
    }
}
