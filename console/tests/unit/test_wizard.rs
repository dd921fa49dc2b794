//! Domain wizard tests

use std::sync::Arc;

use shipkit::domain::wizard::{DomainWizard, SubmitOutcome, SUCCESS_MESSAGE};
use shipkit::errors::ShipkitError;
use shipkit::notify::{Level, MemoryNotifier};
use shipkit_api::{ErrorCode, PlatformSetting};
use tokio_test::{assert_err, assert_ok};

use crate::mocks::domain::MockDomainApi;

fn coded(code: ErrorCode, message: &str) -> ShipkitError {
    ShipkitError::GraphQlError {
        message: message.to_string(),
        code: Some(code),
        status_code: Some(400),
    }
}

fn wizard(api: MockDomainApi) -> (Arc<MockDomainApi>, Arc<MemoryNotifier>, DomainWizard) {
    let api = Arc::new(api);
    let notifier = Arc::new(MemoryNotifier::new());
    let wizard = DomainWizard::new(api.clone(), notifier.clone());
    (api, notifier, wizard)
}

#[tokio::test]
async fn test_successful_setup() {
    let (api, notifier, mut wizard) = wizard(MockDomainApi::default());
    wizard.form_mut().domain = " apps.example.com ".to_string();

    let outcome = wizard.submit().await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Configured);
    assert!(!wizard.is_processing());
    assert!(wizard.error().is_none());

    let requests = api.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].domain, "apps.example.com");
    assert!(requests[0].ssl_enabled);
    assert!(requests[0].force_ssl);
    assert!(!requests[0].skip_validation);

    let latest = notifier.latest().unwrap();
    assert_eq!(latest.level, Level::Success);
    assert_eq!(latest.message, SUCCESS_MESSAGE);
}

#[tokio::test]
async fn test_validation_failure_offers_continue_anyway() {
    let (api, notifier, mut wizard) = wizard(MockDomainApi::with_responses(vec![
        Err(coded(
            ErrorCode::DomainValidation,
            "Domain apps.example.com does not resolve. Configure an A record pointing to 203.0.113.7",
        )),
        Ok(true),
    ]));
    wizard.form_mut().domain = "apps.example.com".to_string();

    let outcome = wizard.submit().await.unwrap();
    let SubmitOutcome::Recoverable(error) = outcome else {
        panic!("expected a recoverable error, got {outcome:?}");
    };
    assert_eq!(error.code, ErrorCode::DomainValidation);
    assert!(error.show_continue_anyway);
    assert_eq!(
        error.message,
        "Domain resolution failed. Please create a DNS A record for 'apps.example.com' pointing to 203.0.113.7"
    );
    assert_eq!(wizard.error(), Some(&error));
    assert!(notifier.all().is_empty());

    let outcome = assert_ok!(wizard.continue_anyway().await);
    assert_eq!(outcome, SubmitOutcome::Configured);
    assert!(wizard.error().is_none());

    let requests = api.requests();
    assert_eq!(requests.len(), 2);
    assert!(!requests[0].skip_validation);
    assert!(requests[1].skip_validation);
}

#[tokio::test]
async fn test_certificate_failure_cannot_be_skipped() {
    let (api, _, mut wizard) = wizard(MockDomainApi::with_responses(vec![Err(coded(
        ErrorCode::CertificateIssuance,
        "Failed to issue certificate",
    ))]));
    wizard.form_mut().domain = "apps.example.com".to_string();

    let outcome = wizard.submit().await.unwrap();
    let SubmitOutcome::Recoverable(error) = outcome else {
        panic!("expected a recoverable error, got {outcome:?}");
    };
    assert!(!error.show_continue_anyway);
    assert_eq!(error.message, "Failed to issue certificate");

    let err = assert_err!(wizard.continue_anyway().await);
    assert!(matches!(err, ShipkitError::ValidationError(_)));
    assert_eq!(api.requests().len(), 1);
}

#[tokio::test]
async fn test_uncoded_failure_notifies() {
    let (_, notifier, mut wizard) = wizard(MockDomainApi::with_responses(vec![Err(
        ShipkitError::ServerError("gateway unavailable".to_string()),
    )]));
    wizard.form_mut().domain = "apps.example.com".to_string();

    let outcome = wizard.submit().await.unwrap();
    assert!(matches!(outcome, SubmitOutcome::Failed(_)));
    assert!(wizard.error().is_none());

    let latest = notifier.latest().unwrap();
    assert_eq!(latest.level, Level::Error);
    assert!(latest.message.contains("gateway unavailable"));
}

#[tokio::test]
async fn test_auth_failure_propagates() {
    let (_, _, mut wizard) = wizard(MockDomainApi::with_responses(vec![Err(
        ShipkitError::AuthError("Access Denied".to_string()),
    )]));
    wizard.form_mut().domain = "apps.example.com".to_string();

    let err = wizard.submit().await.unwrap_err();
    assert!(err.is_auth_failure());
}

#[tokio::test]
async fn test_try_again_clears_error() {
    let (api, _, mut wizard) = wizard(MockDomainApi::with_responses(vec![Err(coded(
        ErrorCode::DomainValidation,
        "Domain does not resolve",
    ))]));
    wizard.form_mut().domain = "apps.example.com".to_string();

    wizard.submit().await.unwrap();
    assert!(wizard.error().is_some());

    wizard.try_again();
    assert!(wizard.error().is_none());
    assert_err!(wizard.continue_anyway().await);
    assert_eq!(api.requests().len(), 1);
}

#[tokio::test]
async fn test_empty_domain_is_rejected_locally() {
    let (api, _, mut wizard) = wizard(MockDomainApi::default());
    wizard.form_mut().domain = "  ".to_string();

    let err = wizard.submit().await.unwrap_err();
    assert!(matches!(err, ShipkitError::ValidationError(_)));
    assert!(api.requests().is_empty());
}

#[tokio::test]
async fn test_prefill_from_platform_settings() {
    let api = MockDomainApi {
        settings: Some(PlatformSetting {
            fqdn: "ship.example.com".to_string(),
            ssl_enabled: false,
            force_ssl: true,
        }),
        ..Default::default()
    };
    let (_, _, mut wizard) = wizard(api);

    wizard.prefill().await.unwrap();
    assert_eq!(wizard.form().domain, "ship.example.com");
    assert!(!wizard.form().ssl_enabled);
    // forced SSL cannot stay on without SSL
    assert!(!wizard.form().force_ssl);
}
