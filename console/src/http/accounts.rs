//! Account API client

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use shipkit_api::documents;
use shipkit_api::{AuthPayload, ChangePasswordInput, CreateAccountInput};
use tracing::info;

use crate::errors::ShipkitError;
use crate::http::client::GraphQlClient;
use crate::storage::session::UserProfile;

#[derive(Debug, Deserialize)]
struct LoginData {
    login: AuthPayload,
}

#[derive(Debug, Deserialize)]
struct RegisterData {
    register: AuthPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangePasswordData {
    change_password: AuthPayload,
}

impl GraphQlClient {
    /// Log in and store the session
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<UserProfile, ShipkitError> {
        let data: LoginData = self
            .execute(
                documents::LOGIN,
                json!({ "email": email, "password": password.expose_secret() }),
            )
            .await?;
        self.store_session(email, data.login).await
    }

    /// Create the first admin account and store the session
    pub async fn register(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<UserProfile, ShipkitError> {
        let input = CreateAccountInput {
            email: email.to_string(),
            password: password.expose_secret().to_string(),
        };
        let data: RegisterData = self
            .execute(documents::REGISTER, json!({ "input": input }))
            .await?;
        self.store_session(email, data.register).await
    }

    /// Change the password; the gateway answers with a fresh token
    pub async fn change_password(
        &self,
        old_password: &SecretString,
        new_password: &SecretString,
    ) -> Result<(), ShipkitError> {
        let input = ChangePasswordInput {
            old_password: old_password.expose_secret().to_string(),
            new_password: new_password.expose_secret().to_string(),
        };
        let data: ChangePasswordData = self
            .execute(documents::CHANGE_PASSWORD, json!({ "input": input }))
            .await?;
        self.session().replace_token(data.change_password.token).await?;
        info!("Password changed");
        Ok(())
    }

    /// Drop the local session
    pub async fn logout(&self) -> Result<(), ShipkitError> {
        self.session().clear().await
    }

    async fn store_session(
        &self,
        email: &str,
        payload: AuthPayload,
    ) -> Result<UserProfile, ShipkitError> {
        let profile = UserProfile {
            email: payload
                .account
                .map(|a| a.email)
                .unwrap_or_else(|| email.to_string()),
        };
        self.session().store(payload.token, profile.clone()).await?;
        info!("Logged in as {}", profile.email);
        Ok(profile)
    }
}
