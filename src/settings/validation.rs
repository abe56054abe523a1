//! Settings validation.
//!
//! Serde handles syntax; this pass checks values that would make the
//! loader misbehave. All problems are reported, not just the first.

use std::fmt;

use crate::settings::schema::ServiceSettings;

/// A single semantic problem with [`ServiceSettings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate settings, collecting every error.
pub fn validate_settings(settings: &ServiceSettings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let names = [
        ("home_env_var", &settings.home_env_var),
        ("config_dir", &settings.config_dir),
        ("primary_file", &settings.primary_file),
        ("modules_dir", &settings.modules_dir),
        ("module_extension", &settings.module_extension),
    ];
    for (field, value) in names {
        if value.trim().is_empty() {
            errors.push(ValidationError::new(field, "must not be empty"));
        }
    }

    if settings.primary_file == settings.local_file {
        errors.push(ValidationError::new(
            "local_file",
            "must differ from primary_file",
        ));
    }

    if settings.array_separator == '\\' {
        errors.push(ValidationError::new(
            "array_separator",
            "backslash is reserved for escaping",
        ));
    }

    if settings.reload.enabled && settings.reload.poll_interval_ms == 0 {
        errors.push(ValidationError::new(
            "reload.poll_interval_ms",
            "must be greater than zero",
        ));
    }

    for pattern in &settings.environment.allow {
        let body = pattern.strip_suffix('*').unwrap_or(pattern);
        if pattern.trim().is_empty() || body.contains('*') {
            errors.push(ValidationError::new(
                "environment.allow",
                format!("invalid pattern '{}'", pattern),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
