//! Session file management
//!
//! The session holds two string keys: `authToken` and `authUser` (a JSON blob
//! of the user profile). Both must be present for the console to consider
//! itself logged in.

use serde::{Deserialize, Serialize};

use crate::errors::ShipkitError;
use crate::filesys::file::File;

/// Profile of the logged in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
}

/// Persisted session keys
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(rename = "authToken", default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    #[serde(rename = "authUser", default, skip_serializing_if = "Option::is_none")]
    pub auth_user: Option<String>,
}

impl SessionRecord {
    /// Create a record for a freshly issued token
    pub fn new(token: String, user: &UserProfile) -> Result<Self, ShipkitError> {
        Ok(Self {
            auth_token: Some(token),
            auth_user: Some(serde_json::to_string(user)?),
        })
    }

    /// Both keys present
    pub fn is_authenticated(&self) -> bool {
        self.auth_token.is_some() && self.auth_user.is_some()
    }

    /// Decode the user profile blob
    pub fn user(&self) -> Option<UserProfile> {
        self.auth_user
            .as_deref()
            .and_then(|blob| serde_json::from_str(blob).ok())
    }
}

/// Load the session, treating a missing file as an empty session
pub async fn load_session(session_file: &File) -> Result<SessionRecord, ShipkitError> {
    Ok(session_file.read_json_opt().await?.unwrap_or_default())
}

/// Save the session with owner-only permissions
pub async fn save_session(session_file: &File, record: &SessionRecord) -> Result<(), ShipkitError> {
    session_file.write_json(record).await?;
    session_file.set_permissions_600().await
}

/// Remove both session keys
pub async fn clear_session(session_file: &File) -> Result<(), ShipkitError> {
    session_file.delete().await
}
