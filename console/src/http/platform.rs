//! Platform status and settings client

use serde::Deserialize;
use serde_json::json;
use shipkit_api::documents;
use shipkit_api::{PlatformSetting, PlatformStatus};

use crate::errors::ShipkitError;
use crate::http::client::GraphQlClient;

/// Arguments of `setupDomain`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainSetup {
    pub domain: String,
    pub skip_validation: bool,
    pub ssl_enabled: bool,
    pub force_ssl: bool,
}

#[derive(Debug, Deserialize)]
struct StatusData {
    status: PlatformStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlatformSettingsData {
    platform_settings: Option<PlatformSetting>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetupDomainData {
    setup_domain: bool,
}

impl GraphQlClient {
    /// Platform health and initialization flags. Does not need a session.
    pub async fn platform_status(&self) -> Result<PlatformStatus, ShipkitError> {
        let data: StatusData = self.execute(documents::GET_STATUS, json!({})).await?;
        Ok(data.status)
    }

    /// Current domain settings, if a domain was ever configured
    pub async fn platform_settings(&self) -> Result<Option<PlatformSetting>, ShipkitError> {
        let data: PlatformSettingsData = self
            .execute(documents::PLATFORM_SETTINGS, json!({}))
            .await?;
        Ok(data.platform_settings)
    }

    /// Configure the platform domain
    pub async fn setup_domain(&self, setup: &DomainSetup) -> Result<bool, ShipkitError> {
        let data: SetupDomainData = self
            .execute(
                documents::SETUP_DOMAIN,
                json!({
                    "domain": setup.domain,
                    "skipValidation": setup.skip_validation,
                    "sslEnabled": setup.ssl_enabled,
                    "forceSsl": setup.force_ssl,
                }),
            )
            .await?;
        Ok(data.setup_domain)
    }
}
