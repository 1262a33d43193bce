//! Configuration I/O - Loading and saving configuration
//!
//! Handles reading configuration from files and environment variables.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::types::Config;
use super::validation::{validate_config, ValidationIssue};
use crate::error::{Error, Result};

/// A snapshot of the configuration file
#[derive(Debug, Clone)]
pub struct ConfigSnapshot {
    /// Path to the config file
    pub path: PathBuf,
    /// Whether the file exists
    pub exists: bool,
    /// Parsed configuration
    pub config: Option<Config>,
    /// Problems found while reading, parsing or validating
    pub issues: Vec<String>,
}

/// Load configuration with layered precedence:
/// 1. Config file if it exists, otherwise defaults
/// 2. Environment variable overrides (includes .env)
///
/// An explicit `path` replaces the default location and must exist.
pub fn load_config_from(path: Option<&Path>) -> Result<Config> {
    // `.env` may point at the config file itself
    dotenvy::dotenv().ok();

    let mut config = match path {
        Some(path) => load_config_from_path(path)?,
        None => {
            let default_path = super::paths::config_path();
            if default_path.exists() {
                load_config_from_path(&default_path)?
            } else {
                debug!(path = %default_path.display(), "No config file, using defaults");
                Config::default()
            }
        }
    };

    // Apply environment variable overrides (highest precedence)
    apply_env_overrides(&mut config);

    Ok(config)
}

/// Load configuration from a specific path
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    // Detect format by extension
    let config: Config = if path.extension().is_some_and(|ext| ext == "json") {
        // Parse as JSON5 (more lenient than strict JSON)
        json5::from_str(&content).map_err(|e| Error::Config(format!("Invalid JSON config: {}", e)))?
    } else if path.extension().is_some_and(|ext| ext == "toml") {
        toml::from_str(&content).map_err(|e| Error::Config(format!("Invalid TOML config: {}", e)))?
    } else {
        // Try JSON5 first, then TOML
        json5::from_str(&content)
            .or_else(|_| toml::from_str(&content).map_err(|e| Error::Config(e.to_string())))
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?
    };

    debug!(path = %path.display(), "Loaded config file");
    Ok(config)
}

/// Apply environment variable overrides to an existing config.
///
/// Loads a `.env` file first if one exists. Env vars have the highest
/// precedence after command-line flags: defaults < file < env < flags.
pub fn apply_env_overrides(config: &mut Config) {
    dotenvy::dotenv().ok();
    apply_overrides_from(config, |key| std::env::var(key).ok());
}

/// Apply overrides from any key lookup
pub fn apply_overrides_from<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    // Gateway overrides
    if let Some(url) = lookup("WA_GATEWAY_URL") {
        config.gateway.url = url;
    }

    // Session overrides
    if let Some(user_id) = lookup("WA_DEFAULT_USER_ID") {
        config.session.default_user_id = user_id;
    }

    // Display overrides
    if let Some(chars) = lookup("WA_PREVIEW_CHARS") {
        if let Ok(v) = chars.parse() {
            config.display.preview_chars = v;
        }
    }
    if let Some(style) = lookup("WA_QR_STYLE") {
        if let Ok(v) = style.parse() {
            config.display.qr = v;
        }
    }
}

/// Save configuration to a file
pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    let content = if path.extension().is_some_and(|ext| ext == "toml") {
        toml::to_string_pretty(config).map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?
    } else {
        serde_json::to_string_pretty(config).map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?
    };

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(path, content)?;
    Ok(())
}

/// Read and validate a configuration file into a snapshot
pub fn read_config_snapshot(path: &Path) -> ConfigSnapshot {
    if !path.exists() {
        return ConfigSnapshot {
            path: path.to_path_buf(),
            exists: false,
            config: None,
            issues: vec!["Configuration file does not exist (defaults apply)".to_string()],
        };
    }

    match load_config_from_path(path) {
        Ok(config) => {
            let validation = validate_config(&config);
            let issues = validation
                .errors
                .iter()
                .chain(validation.warnings.iter())
                .map(ValidationIssue::to_string)
                .collect();

            ConfigSnapshot {
                path: path.to_path_buf(),
                exists: true,
                config: Some(config),
                issues,
            }
        }
        Err(e) => ConfigSnapshot {
            path: path.to_path_buf(),
            exists: true,
            config: None,
            issues: vec![e.to_string()],
        },
    }
}
