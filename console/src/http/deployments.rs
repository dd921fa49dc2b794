//! Deployment API client

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use shipkit_api::documents;
use shipkit_api::{CreateDeploymentInput, Deployment, DeploymentStatus, UpdateDeploymentInput};

use crate::errors::ShipkitError;
use crate::http::client::GraphQlClient;

/// Deployment operations the status layer depends on
#[async_trait]
pub trait DeploymentApi: Send + Sync {
    /// List all deployments
    async fn list_deployments(&self) -> Result<Vec<Deployment>, ShipkitError>;

    /// Fetch the current status of one deployment
    async fn deployment_status(&self, id: &str) -> Result<DeploymentStatus, ShipkitError>;

    /// Start (or restart) a deployment
    async fn start_deployment(&self, id: &str) -> Result<Deployment, ShipkitError>;

    /// Stop a deployment
    async fn stop_deployment(&self, id: &str) -> Result<(), ShipkitError>;

    /// Delete a deployment
    async fn delete_deployment(&self, id: &str) -> Result<(), ShipkitError>;
}

#[derive(Debug, Deserialize)]
struct DeploymentsData {
    deployments: Vec<Deployment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeploymentStatusData {
    deployment_status: DeploymentStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateDeploymentData {
    create_deployment: Deployment,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateDeploymentData {
    update_deployment: Deployment,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartDeploymentData {
    start_deployment: Deployment,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StopDeploymentData {
    stop_deployment: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteDeploymentData {
    delete_deployment: bool,
}

impl GraphQlClient {
    /// Create a deployment from a compose definition
    pub async fn create_deployment(
        &self,
        input: CreateDeploymentInput,
    ) -> Result<Deployment, ShipkitError> {
        let data: CreateDeploymentData = self
            .execute(documents::CREATE_DEPLOYMENT, json!({ "input": input }))
            .await?;
        Ok(data.create_deployment)
    }

    /// Update a deployment's name and/or compose definition
    pub async fn update_deployment(
        &self,
        id: &str,
        input: UpdateDeploymentInput,
    ) -> Result<Deployment, ShipkitError> {
        let data: UpdateDeploymentData = self
            .execute(documents::UPDATE_DEPLOYMENT, json!({ "id": id, "input": input }))
            .await?;
        Ok(data.update_deployment)
    }

    /// Find a deployment by id in the list
    pub async fn find_deployment(&self, id: &str) -> Result<Deployment, ShipkitError> {
        self.list_deployments()
            .await?
            .into_iter()
            .find(|d| d.id == id)
            .ok_or_else(|| ShipkitError::NotFound(format!("deployment {}", id)))
    }
}

#[async_trait]
impl DeploymentApi for GraphQlClient {
    async fn list_deployments(&self) -> Result<Vec<Deployment>, ShipkitError> {
        let data: DeploymentsData = self.execute(documents::GET_DEPLOYMENTS, json!({})).await?;
        Ok(data.deployments)
    }

    async fn deployment_status(&self, id: &str) -> Result<DeploymentStatus, ShipkitError> {
        let data: DeploymentStatusData = self
            .execute(documents::GET_DEPLOYMENT_STATUS, json!({ "id": id }))
            .await?;
        Ok(data.deployment_status)
    }

    async fn start_deployment(&self, id: &str) -> Result<Deployment, ShipkitError> {
        let data: StartDeploymentData = self
            .execute(documents::START_DEPLOYMENT, json!({ "id": id }))
            .await?;
        Ok(data.start_deployment)
    }

    async fn stop_deployment(&self, id: &str) -> Result<(), ShipkitError> {
        let data: StopDeploymentData = self
            .execute(documents::STOP_DEPLOYMENT, json!({ "id": id }))
            .await?;
        if !data.stop_deployment {
            return Err(ShipkitError::ServerError(format!("gateway refused to stop {}", id)));
        }
        Ok(())
    }

    async fn delete_deployment(&self, id: &str) -> Result<(), ShipkitError> {
        let data: DeleteDeploymentData = self
            .execute(documents::DELETE_DEPLOYMENT, json!({ "id": id }))
            .await?;
        if !data.delete_deployment {
            return Err(ShipkitError::ServerError(format!("gateway refused to delete {}", id)));
        }
        Ok(())
    }
}
