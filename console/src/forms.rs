//! Form validation

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static EMAIL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

const MIN_PASSWORD_LEN: usize = 6;
const MIN_DEPLOYMENT_NAME_LEN: usize = 3;

/// A validation failure on a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All field errors of one form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(pub Vec<FieldError>);

impl FormErrors {
    fn push(&mut self, field: &'static str, message: &'static str) {
        self.0.push(FieldError { field, message });
    }

    fn into_result(self) -> Result<(), FormErrors> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn for_field(&self, field: &str) -> Option<&'static str> {
        self.0.iter().find(|e| e.field == field).map(|e| e.message)
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for FormErrors {}

impl From<FormErrors> for crate::errors::ShipkitError {
    fn from(errors: FormErrors) -> Self {
        crate::errors::ShipkitError::ValidationError(errors.to_string())
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN
        .as_ref()
        .is_some_and(|re| re.is_match(email))
}

pub fn validate_login(email: &str, password: &str) -> Result<(), FormErrors> {
    let mut errors = FormErrors::default();
    if !is_valid_email(email) {
        errors.push("email", "Please enter a valid email address");
    }
    if password.is_empty() {
        errors.push("password", "Password is required");
    }
    errors.into_result()
}

pub fn validate_register(email: &str, password: &str, confirm: &str) -> Result<(), FormErrors> {
    let mut errors = FormErrors::default();
    if !is_valid_email(email) {
        errors.push("email", "Please enter a valid email address");
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push("password", "Password must be at least 6 characters");
    }
    if password != confirm {
        errors.push("confirmPassword", "Passwords don't match");
    }
    errors.into_result()
}

pub fn validate_change_password(
    old_password: &str,
    new_password: &str,
    confirm: &str,
) -> Result<(), FormErrors> {
    let mut errors = FormErrors::default();
    if old_password.is_empty() {
        errors.push("oldPassword", "Current password is required");
    }
    if new_password.chars().count() < MIN_PASSWORD_LEN {
        errors.push("newPassword", "New password must be at least 6 characters");
    }
    if new_password != confirm {
        errors.push("confirmPassword", "New passwords don't match");
    }
    errors.into_result()
}

/// Create and edit share the same rules
pub fn validate_deployment(name: &str, compose_yaml: &str) -> Result<(), FormErrors> {
    let mut errors = FormErrors::default();
    if name.is_empty() {
        errors.push("name", "Deployment name is required");
    } else if name.chars().count() < MIN_DEPLOYMENT_NAME_LEN {
        errors.push("name", "Name must be at least 3 characters");
    }
    if compose_yaml.is_empty() {
        errors.push("composeYaml", "Docker Compose YAML is required");
    } else if !compose_yaml.to_lowercase().contains("services") {
        errors.push("composeYaml", "Invalid Docker Compose YAML format");
    }
    errors.into_result()
}

/// Domain settings form values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainForm {
    pub domain: String,
    pub ssl_enabled: bool,
    pub force_ssl: bool,
}

impl Default for DomainForm {
    fn default() -> Self {
        Self {
            domain: String::new(),
            ssl_enabled: true,
            force_ssl: true,
        }
    }
}

impl DomainForm {
    /// Turning SSL off also turns off forced SSL
    pub fn set_ssl_enabled(&mut self, enabled: bool) {
        self.ssl_enabled = enabled;
        if !enabled {
            self.force_ssl = false;
        }
    }

    /// Forced SSL can only be on while SSL is on
    pub fn set_force_ssl(&mut self, force: bool) {
        self.force_ssl = force && self.ssl_enabled;
    }

    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        if self.domain.trim().is_empty() {
            errors.push("domain", "Domain is required");
        }
        errors.into_result()
    }
}
