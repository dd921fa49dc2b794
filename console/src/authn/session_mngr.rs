//! Session manager for gateway authentication

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::authn::token::is_token_expired;
use crate::errors::ShipkitError;
use crate::filesys::file::File;
use crate::storage::session::{clear_session, load_session, save_session, SessionRecord, UserProfile};

/// Session manager trait for testability
#[async_trait]
pub trait SessionManagerExt: Send + Sync {
    /// Token to send as bearer credentials. Expired tokens are cleared and yield `None`.
    async fn bearer_token(&self) -> Result<Option<String>, ShipkitError>;

    /// The logged in user, if any
    async fn current_user(&self) -> Result<Option<UserProfile>, ShipkitError>;

    /// Both session keys present
    async fn is_authenticated(&self) -> Result<bool, ShipkitError>;

    /// Store a freshly issued token for a user
    async fn store(&self, token: String, user: UserProfile) -> Result<(), ShipkitError>;

    /// Replace the token, keeping the user profile
    async fn replace_token(&self, token: String) -> Result<(), ShipkitError>;

    /// Remove both session keys
    async fn clear(&self) -> Result<(), ShipkitError>;
}

/// File-backed session manager
pub struct SessionManager {
    session_file: Arc<File>,
    cached: RwLock<Option<SessionRecord>>,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new(session_file: Arc<File>) -> Self {
        Self {
            session_file,
            cached: RwLock::new(None),
        }
    }

    async fn record(&self) -> Result<SessionRecord, ShipkitError> {
        {
            let cached = self.cached.read().await;
            if let Some(record) = cached.as_ref() {
                return Ok(record.clone());
            }
        }

        let record = load_session(&self.session_file).await?;
        let mut cached = self.cached.write().await;
        *cached = Some(record.clone());
        Ok(record)
    }

    async fn save(&self, record: SessionRecord) -> Result<(), ShipkitError> {
        save_session(&self.session_file, &record).await?;
        let mut cached = self.cached.write().await;
        *cached = Some(record);
        Ok(())
    }
}

#[async_trait]
impl SessionManagerExt for SessionManager {
    async fn bearer_token(&self) -> Result<Option<String>, ShipkitError> {
        let record = self.record().await?;
        match record.auth_token {
            Some(token) if is_token_expired(&token) => {
                info!("Session token expired, clearing session");
                self.clear().await?;
                Ok(None)
            }
            token => Ok(token),
        }
    }

    async fn current_user(&self) -> Result<Option<UserProfile>, ShipkitError> {
        Ok(self.record().await?.user())
    }

    async fn is_authenticated(&self) -> Result<bool, ShipkitError> {
        Ok(self.record().await?.is_authenticated())
    }

    async fn store(&self, token: String, user: UserProfile) -> Result<(), ShipkitError> {
        debug!("Storing session for {}", user.email);
        self.save(SessionRecord::new(token, &user)?).await
    }

    async fn replace_token(&self, token: String) -> Result<(), ShipkitError> {
        let mut record = self.record().await?;
        if record.auth_user.is_none() {
            return Err(ShipkitError::NotAuthenticated(
                "no user profile in session".to_string(),
            ));
        }
        record.auth_token = Some(token);
        self.save(record).await
    }

    async fn clear(&self) -> Result<(), ShipkitError> {
        clear_session(&self.session_file).await?;
        let mut cached = self.cached.write().await;
        *cached = Some(SessionRecord::default());
        Ok(())
    }
}
