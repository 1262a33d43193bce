//! Configuration validation
//!
//! Validates configuration and reports issues.

use std::fmt;

use url::Url;

use super::types::Config;

/// Result of configuration validation
#[derive(Debug, Clone)]
pub struct ConfigValidationResult {
    /// Whether the config is valid
    pub valid: bool,
    /// Validation errors (critical)
    pub errors: Vec<ValidationIssue>,
    /// Validation warnings (non-critical)
    pub warnings: Vec<ValidationIssue>,
}

impl ConfigValidationResult {
    /// Create a valid result
    pub fn valid() -> Self {
        ConfigValidationResult {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add an error
    pub fn with_error(mut self, issue: ValidationIssue) -> Self {
        self.valid = false;
        self.errors.push(issue);
        self
    }

    /// Add a warning
    pub fn with_warning(mut self, issue: ValidationIssue) -> Self {
        self.warnings.push(issue);
        self
    }
}

/// A validation issue
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Path to the config field
    pub path: String,
    /// Issue message
    pub message: String,
    /// Suggested fix
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    /// Create a new issue
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationIssue {
            path: path.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " ({})", suggestion)?;
        }
        Ok(())
    }
}

/// Validate the configuration
pub fn validate_config(config: &Config) -> ConfigValidationResult {
    let mut result = ConfigValidationResult::valid();

    result = validate_gateway_config(config, result);
    result = validate_session_config(config, result);

    result
}

fn validate_gateway_config(config: &Config, mut result: ConfigValidationResult) -> ConfigValidationResult {
    match Url::parse(&config.gateway.url) {
        Ok(url) => {
            if url.scheme() != "ws" && url.scheme() != "wss" {
                result = result.with_error(
                    ValidationIssue::new(
                        "gateway.url",
                        format!("unsupported scheme '{}'", url.scheme()),
                    )
                    .with_suggestion("use ws:// or wss://"),
                );
            } else if url.host_str().is_none() {
                result = result.with_error(ValidationIssue::new("gateway.url", "missing host"));
            }
        }
        Err(e) => {
            result = result.with_error(
                ValidationIssue::new("gateway.url", format!("not a valid URL: {}", e))
                    .with_suggestion("e.g. ws://localhost:3000"),
            );
        }
    }

    result
}

fn validate_session_config(config: &Config, mut result: ConfigValidationResult) -> ConfigValidationResult {
    if config.session.default_user_id.trim().is_empty() {
        result = result.with_warning(
            ValidationIssue::new("session.default_user_id", "no default user ID")
                .with_suggestion("an empty answer at the prompt will end the session"),
        );
    }

    if config.display.preview_chars == 0 {
        result = result.with_warning(ValidationIssue::new(
            "display.preview_chars",
            "unrecognized events will be shown without any payload",
        ));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let result = validate_config(&Config::default());
        assert!(result.valid);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_http_url_is_rejected() {
        let mut config = Config::default();
        config.gateway.url = "http://localhost:3000".to_string();

        let result = validate_config(&config);
        assert!(!result.valid);
        assert_eq!(result.errors[0].path, "gateway.url");
    }

    #[test]
    fn test_garbage_url_is_rejected() {
        let mut config = Config::default();
        config.gateway.url = "localhost 3000".to_string();
        assert!(!validate_config(&config).valid);
    }

    #[test]
    fn test_empty_default_user_is_a_warning() {
        let mut config = Config::default();
        config.session.default_user_id = String::new();

        let result = validate_config(&config);
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].to_string().starts_with("session.default_user_id"));
    }
}
