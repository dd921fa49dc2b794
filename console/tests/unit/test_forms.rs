//! Form validation tests

use shipkit::errors::ShipkitError;
use shipkit::forms::{
    validate_change_password, validate_deployment, validate_login, validate_register, DomainForm,
};

#[test]
fn test_login_form() {
    assert!(validate_login("admin@example.com", "secret").is_ok());

    let errors = validate_login("admin", "").unwrap_err();
    assert_eq!(
        errors.for_field("email"),
        Some("Please enter a valid email address")
    );
    assert_eq!(errors.for_field("password"), Some("Password is required"));
}

#[test]
fn test_register_form() {
    assert!(validate_register("admin@example.com", "secret", "secret").is_ok());

    let errors = validate_register("admin@example.com", "abc", "abd").unwrap_err();
    assert_eq!(errors.for_field("email"), None);
    assert_eq!(
        errors.for_field("password"),
        Some("Password must be at least 6 characters")
    );
    assert_eq!(
        errors.for_field("confirmPassword"),
        Some("Passwords don't match")
    );
}

#[test]
fn test_change_password_form() {
    assert!(validate_change_password("old", "newpass", "newpass").is_ok());

    let errors = validate_change_password("", "short", "other").unwrap_err();
    assert_eq!(
        errors.for_field("oldPassword"),
        Some("Current password is required")
    );
    assert_eq!(
        errors.for_field("newPassword"),
        Some("New password must be at least 6 characters")
    );
    assert_eq!(
        errors.for_field("confirmPassword"),
        Some("New passwords don't match")
    );
}

#[test]
fn test_deployment_form() {
    assert!(validate_deployment("web", "services:\n  web:\n    image: nginx").is_ok());
    assert!(validate_deployment("web", "SERVICES: {}").is_ok());

    let errors = validate_deployment("", "").unwrap_err();
    assert_eq!(errors.for_field("name"), Some("Deployment name is required"));
    assert_eq!(
        errors.for_field("composeYaml"),
        Some("Docker Compose YAML is required")
    );

    let errors = validate_deployment("ab", "version: '3'").unwrap_err();
    assert_eq!(
        errors.for_field("name"),
        Some("Name must be at least 3 characters")
    );
    assert_eq!(
        errors.for_field("composeYaml"),
        Some("Invalid Docker Compose YAML format")
    );
}

#[test]
fn test_form_errors_convert_to_validation_error() {
    let errors = validate_login("", "").unwrap_err();
    let err = ShipkitError::from(errors);
    match err {
        ShipkitError::ValidationError(message) => {
            assert!(message.contains("email: Please enter a valid email address"));
            assert!(message.contains("password: Password is required"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_domain_form_requires_domain() {
    let mut form = DomainForm::default();
    assert!(form.ssl_enabled);
    assert!(form.force_ssl);

    form.domain = "   ".to_string();
    let errors = form.validate().unwrap_err();
    assert_eq!(errors.for_field("domain"), Some("Domain is required"));

    form.domain = "apps.example.com".to_string();
    assert!(form.validate().is_ok());
}
