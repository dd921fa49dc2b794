//! Test doubles

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use shipkit::errors::ShipkitError;
use shipkit::http::deployments::DeploymentApi;
use shipkit_api::{Deployment, DeploymentState, DeploymentStatus};

pub fn deployment(id: &str, name: &str) -> Deployment {
    Deployment {
        id: id.to_string(),
        name: name.to_string(),
        compose_yaml: "services:\n  web:\n    image: nginx\n".to_string(),
        created_at: Some("2025-01-01T00:00:00Z".to_string()),
    }
}

pub fn status(id: &str, state: DeploymentState) -> DeploymentStatus {
    DeploymentStatus {
        uuid: id.to_string(),
        state,
        message: None,
        status: 200,
        containers: vec![],
    }
}

/// In-memory gateway
#[derive(Default)]
pub struct MockApi {
    pub deployments: Mutex<Vec<Deployment>>,
    pub states: Mutex<HashMap<String, DeploymentState>>,
    pub status_calls: Mutex<HashMap<String, usize>>,
    pub action_calls: Mutex<Vec<(&'static str, String)>>,
    pub fail_status: AtomicBool,
    pub fail_actions: AtomicBool,
    pub status_delay: Duration,
    pub action_delay: Duration,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delays(status_delay: Duration, action_delay: Duration) -> Self {
        Self {
            status_delay,
            action_delay,
            ..Default::default()
        }
    }

    pub fn set_state(&self, id: &str, state: DeploymentState) {
        self.states.lock().unwrap().insert(id.to_string(), state);
    }

    pub fn set_deployments(&self, deployments: Vec<Deployment>) {
        *self.deployments.lock().unwrap() = deployments;
    }

    pub fn status_calls(&self, id: &str) -> usize {
        self.status_calls.lock().unwrap().get(id).copied().unwrap_or(0)
    }

    pub fn action_calls(&self) -> Vec<(&'static str, String)> {
        self.action_calls.lock().unwrap().clone()
    }

    async fn action(&self, name: &'static str, id: &str) -> Result<(), ShipkitError> {
        self.action_calls.lock().unwrap().push((name, id.to_string()));
        if !self.action_delay.is_zero() {
            tokio::time::sleep(self.action_delay).await;
        }
        if self.fail_actions.load(Ordering::SeqCst) {
            return Err(ShipkitError::ServerError("docker daemon unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DeploymentApi for MockApi {
    async fn list_deployments(&self) -> Result<Vec<Deployment>, ShipkitError> {
        Ok(self.deployments.lock().unwrap().clone())
    }

    async fn deployment_status(&self, id: &str) -> Result<DeploymentStatus, ShipkitError> {
        *self
            .status_calls
            .lock()
            .unwrap()
            .entry(id.to_string())
            .or_default() += 1;
        // the answer reflects the server as of the request, not the response
        let state = self
            .states
            .lock()
            .unwrap()
            .get(id)
            .copied()
            .unwrap_or(DeploymentState::Unknown);
        if !self.status_delay.is_zero() {
            tokio::time::sleep(self.status_delay).await;
        }
        if self.fail_status.load(Ordering::SeqCst) {
            return Err(ShipkitError::ServerError("timeout".to_string()));
        }
        Ok(status(id, state))
    }

    async fn start_deployment(&self, id: &str) -> Result<Deployment, ShipkitError> {
        self.action("start", id).await?;
        Ok(deployment(id, id))
    }

    async fn stop_deployment(&self, id: &str) -> Result<(), ShipkitError> {
        self.action("stop", id).await
    }

    async fn delete_deployment(&self, id: &str) -> Result<(), ShipkitError> {
        self.action("delete", id).await?;
        self.deployments.lock().unwrap().retain(|d| d.id != id);
        Ok(())
    }
}

/// Scripted `setupDomain` responses
pub mod domain {
    use super::*;
    use shipkit::domain::wizard::DomainApi;
    use shipkit::http::platform::DomainSetup;
    use shipkit_api::PlatformSetting;

    #[derive(Default)]
    pub struct MockDomainApi {
        pub settings: Option<PlatformSetting>,
        pub responses: Mutex<VecDeque<Result<bool, ShipkitError>>>,
        pub requests: Mutex<Vec<DomainSetup>>,
    }

    impl MockDomainApi {
        pub fn with_responses(responses: Vec<Result<bool, ShipkitError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                ..Default::default()
            }
        }

        pub fn requests(&self) -> Vec<DomainSetup> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DomainApi for MockDomainApi {
        async fn platform_settings(&self) -> Result<Option<PlatformSetting>, ShipkitError> {
            Ok(self.settings.clone())
        }

        async fn setup_domain(&self, setup: &DomainSetup) -> Result<bool, ShipkitError> {
            self.requests.lock().unwrap().push(setup.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(true))
        }
    }
}
