//! Error types for the Shipkit console

use shipkit_api::{ErrorCode, GraphQlError};
use thiserror::Error;

/// Main error type for the Shipkit console
#[derive(Error, Debug)]
pub enum ShipkitError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The gateway rejected our credentials or the token expired
    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Not logged in: {0}")]
    NotAuthenticated(String),

    #[error("Token error: {0}")]
    TokenError(String),

    /// A GraphQL application error
    #[error("GraphQL error: {message}")]
    GraphQlError {
        message: String,
        code: Option<ErrorCode>,
        status_code: Option<u16>,
    },

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Shutdown error: {0}")]
    ShutdownError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

const AUTH_FAILURE_MARKERS: [&str; 3] = ["Access Denied", "Unauthorized", "jwt expired"];

impl ShipkitError {
    /// Build an error from the first GraphQL error of a response
    pub fn from_graphql(errors: &[GraphQlError]) -> Self {
        let Some(first) = errors.first() else {
            return ShipkitError::Internal("empty GraphQL error list".to_string());
        };

        if errors.iter().any(is_auth_error) {
            return ShipkitError::AuthError(first.message.clone());
        }

        let object = first.error_object();
        ShipkitError::GraphQlError {
            message: object
                .and_then(|o| o.message.clone())
                .unwrap_or_else(|| first.message.clone()),
            code: object.and_then(|o| o.code.clone()),
            status_code: first.status_code(),
        }
    }

    /// Whether the session must be cleared and the user sent back to login
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            ShipkitError::AuthError(_) | ShipkitError::NotAuthenticated(_)
        )
    }

    /// The application error code, if the gateway attached one
    pub fn code(&self) -> Option<&ErrorCode> {
        match self {
            ShipkitError::GraphQlError { code, .. } => code.as_ref(),
            _ => None,
        }
    }

    /// Code and message of a coded GraphQL error
    pub fn domain_error(&self) -> Option<(&ErrorCode, &str)> {
        match self {
            ShipkitError::GraphQlError {
                code: Some(code),
                message,
                ..
            } => Some((code, message.as_str())),
            _ => None,
        }
    }
}

/// Whether a GraphQL error signals an authentication failure
pub fn is_auth_error(error: &GraphQlError) -> bool {
    error.status_code() == Some(401)
        || AUTH_FAILURE_MARKERS
            .iter()
            .any(|marker| error.message.contains(marker))
}

impl From<anyhow::Error> for ShipkitError {
    fn from(err: anyhow::Error) -> Self {
        ShipkitError::Internal(err.to_string())
    }
}
