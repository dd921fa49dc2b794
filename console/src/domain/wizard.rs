//! Domain and SSL setup wizard

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use shipkit_api::{ErrorCode, PlatformSetting};
use tracing::{info, warn};

use crate::errors::ShipkitError;
use crate::forms::DomainForm;
use crate::http::client::GraphQlClient;
use crate::http::platform::DomainSetup;
use crate::notify::Notifier;

pub const SUCCESS_MESSAGE: &str = "Domain configured successfully!";

/// Steps shown when the domain does not resolve yet
pub const A_RECORD_STEPS: [&str; 4] = [
    "Go to your domain registrar's DNS management",
    "Create an A record for your domain",
    "Point it to your server's IP address",
    "Wait for DNS propagation (can take up to 24 hours)",
];

static SERVER_IP_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"pointing to ([\d.]+)").ok());

/// Domain operations the wizard needs
#[async_trait]
pub trait DomainApi: Send + Sync {
    async fn platform_settings(&self) -> Result<Option<PlatformSetting>, ShipkitError>;

    async fn setup_domain(&self, setup: &DomainSetup) -> Result<bool, ShipkitError>;
}

#[async_trait]
impl DomainApi for GraphQlClient {
    async fn platform_settings(&self) -> Result<Option<PlatformSetting>, ShipkitError> {
        GraphQlClient::platform_settings(self).await
    }

    async fn setup_domain(&self, setup: &DomainSetup) -> Result<bool, ShipkitError> {
        GraphQlClient::setup_domain(self, setup).await
    }
}

/// A recoverable setup failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub show_continue_anyway: bool,
}

/// Classify a setup error. Only coded errors are recoverable; continuing
/// anyway is only offered for failed domain validation.
pub fn parse_domain_error(err: &ShipkitError) -> Option<DomainError> {
    let (code, message) = err.domain_error()?;
    Some(DomainError {
        code: code.clone(),
        message: message.to_string(),
        show_continue_anyway: *code == ErrorCode::DomainValidation,
    })
}

/// Friendlier text for DNS resolution failures
pub fn describe_resolution_failure(domain: &str, message: &str) -> Option<String> {
    if !message.contains("does not resolve") && !message.contains("Configure an A record") {
        return None;
    }
    let server_ip = SERVER_IP_PATTERN
        .as_ref()
        .and_then(|re| re.captures(message))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "your server IP".to_string());
    Some(format!(
        "Domain resolution failed. Please create a DNS A record for '{}' pointing to {}",
        domain, server_ip
    ))
}

/// Result of a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Configured,
    Recoverable(DomainError),
    Failed(String),
}

/// Drives the setup-domain form
pub struct DomainWizard {
    api: Arc<dyn DomainApi>,
    notifier: Arc<dyn Notifier>,
    form: DomainForm,
    error: Option<DomainError>,
    processing: bool,
}

impl DomainWizard {
    pub fn new(api: Arc<dyn DomainApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            form: DomainForm::default(),
            error: None,
            processing: false,
        }
    }

    pub fn form(&self) -> &DomainForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut DomainForm {
        &mut self.form
    }

    pub fn error(&self) -> Option<&DomainError> {
        self.error.as_ref()
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    /// Fill the form from the current platform settings
    pub async fn prefill(&mut self) -> Result<(), ShipkitError> {
        if let Some(settings) = self.api.platform_settings().await? {
            self.form.domain = settings.fqdn;
            self.form.set_ssl_enabled(settings.ssl_enabled);
            self.form.set_force_ssl(settings.force_ssl);
        }
        Ok(())
    }

    /// Submit with validation
    pub async fn submit(&mut self) -> Result<SubmitOutcome, ShipkitError> {
        self.form.validate()?;
        self.error = None;
        self.send(false).await
    }

    /// Resubmit skipping domain validation
    pub async fn continue_anyway(&mut self) -> Result<SubmitOutcome, ShipkitError> {
        if !self.error.as_ref().is_some_and(|e| e.show_continue_anyway) {
            return Err(ShipkitError::ValidationError(
                "continuing is only possible after a failed domain validation".to_string(),
            ));
        }
        self.error = None;
        self.send(true).await
    }

    /// Dismiss the current error
    pub fn try_again(&mut self) {
        self.error = None;
    }

    async fn send(&mut self, skip_validation: bool) -> Result<SubmitOutcome, ShipkitError> {
        let setup = DomainSetup {
            domain: self.form.domain.trim().to_string(),
            skip_validation,
            ssl_enabled: self.form.ssl_enabled,
            force_ssl: self.form.force_ssl,
        };
        info!(
            "Setting up domain {} (ssl: {}, force ssl: {}, skip validation: {})",
            setup.domain, setup.ssl_enabled, setup.force_ssl, setup.skip_validation
        );

        self.processing = true;
        let result = self.api.setup_domain(&setup).await;
        self.processing = false;

        match result {
            Ok(_) => {
                self.notifier.success(SUCCESS_MESSAGE);
                Ok(SubmitOutcome::Configured)
            }
            Err(e) if e.is_auth_failure() => Err(e),
            Err(e) => match parse_domain_error(&e) {
                Some(mut domain_error) => {
                    if let Some(text) = describe_resolution_failure(&setup.domain, &domain_error.message) {
                        domain_error.message = text;
                    }
                    warn!("Domain setup failed ({}): {}", domain_error.code, domain_error.message);
                    self.error = Some(domain_error.clone());
                    Ok(SubmitOutcome::Recoverable(domain_error))
                }
                None => {
                    let message = e.to_string();
                    self.notifier.error(&message);
                    Ok(SubmitOutcome::Failed(message))
                }
            },
        }
    }
}
