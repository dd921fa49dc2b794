//! API models

use std::fmt;

use serde::{Deserialize, Serialize};

/// A Docker Compose deployment managed by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub compose_yaml: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Runtime state of a deployment as last observed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DeploymentState {
    Running,
    Stopped,
    Starting,
    Stopping,
    Error,
    #[default]
    Unknown,
}

impl DeploymentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentState::Running => "running",
            DeploymentState::Stopped => "stopped",
            DeploymentState::Starting => "starting",
            DeploymentState::Stopping => "stopping",
            DeploymentState::Error => "error",
            DeploymentState::Unknown => "unknown",
        }
    }

    /// Parse a state name reported by the gateway. Unrecognized names are `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "running" => DeploymentState::Running,
            "stopped" => DeploymentState::Stopped,
            "starting" => DeploymentState::Starting,
            "stopping" => DeploymentState::Stopping,
            "error" => DeploymentState::Error,
            _ => DeploymentState::Unknown,
        }
    }
}

impl fmt::Display for DeploymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DeploymentState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DeploymentState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = Option::<String>::deserialize(deserializer)?;
        Ok(s.as_deref().map(DeploymentState::parse).unwrap_or_default())
    }
}

/// Status of a single compose service container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerStatus {
    pub name: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub health: Option<String>,
    #[serde(default)]
    pub ports: Vec<String>,
}

/// Deployment status as reported by `deploymentStatus`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentStatus {
    pub uuid: String,
    #[serde(default)]
    pub state: DeploymentState,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: i32,
    #[serde(default)]
    pub containers: Vec<ContainerStatus>,
}

/// Input for `createDeployment`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeploymentInput {
    pub name: String,
    pub compose_yaml: String,
}

/// Input for `updateDeployment`; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDeploymentInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compose_yaml: Option<String>,
}

/// Input for `register`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccountInput {
    pub email: String,
    pub password: String,
}

/// Input for `changePassword`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordInput {
    pub old_password: String,
    pub new_password: String,
}

/// Account info returned alongside a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub email: String,
    #[serde(default)]
    pub authorities: Vec<String>,
}

/// Token payload returned by the account mutations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthPayload {
    pub token: String,
    #[serde(default)]
    pub account: Option<AccountInfo>,
}

/// Platform health and initialization status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub admin_initialized: bool,
    #[serde(default)]
    pub domain_initialized: bool,
}

/// Platform domain settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformSetting {
    pub fqdn: String,
    #[serde(default)]
    pub ssl_enabled: bool,
    #[serde(default)]
    pub force_ssl: bool,
}

/// Response of the `/api/config` relay endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub graphql_url: String,
    #[serde(default)]
    pub app_name: String,
}

/// Response of the `config` RPC relay procedure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcConfig {
    pub api_base_url: String,
    pub app_name: String,
}

// ================================ GRAPHQL ENVELOPE ================================ //

/// GraphQL request body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlRequest<'a, V> {
    pub query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<&'a str>,
    pub variables: V,
}

/// GraphQL response body
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

/// A single GraphQL error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(default)]
    pub path: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub extensions: Option<ErrorExtensions>,
}

impl GraphQlError {
    /// The structured error object, if the gateway attached one
    pub fn error_object(&self) -> Option<&ErrorObject> {
        self.extensions.as_ref().and_then(|e| e.error.as_ref())
    }

    /// HTTP-like status code carried by the error, if any
    pub fn status_code(&self) -> Option<u16> {
        let extensions = self.extensions.as_ref()?;
        extensions
            .error
            .as_ref()
            .and_then(|e| e.status_code)
            .or(extensions.status_code)
    }
}

/// Error extensions attached by the gateway
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorExtensions {
    #[serde(default)]
    pub error: Option<ErrorObject>,
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub classification: Option<String>,
}

/// Structured error object under `extensions.error`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorObject {
    #[serde(default)]
    pub code: Option<ErrorCode>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status_code: Option<u16>,
}

/// Application error codes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    DomainValidation,
    CertificateIssuance,
    Other(String),
}

impl ErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::DomainValidation => "DOMAIN_VALIDATION_ERROR",
            ErrorCode::CertificateIssuance => "CERTIFICATE_ISSUANCE_ERROR",
            ErrorCode::Other(code) => code,
        }
    }
}

impl From<&str> for ErrorCode {
    fn from(s: &str) -> Self {
        match s {
            "DOMAIN_VALIDATION_ERROR" => ErrorCode::DomainValidation,
            "CERTIFICATE_ISSUANCE_ERROR" => ErrorCode::CertificateIssuance,
            other => ErrorCode::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(ErrorCode::from(s.as_str()))
    }
}
