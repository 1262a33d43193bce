//! Configuration module
//!
//! - types/mod.rs: configuration types (Config, GatewayConfig, ...)
//! - io.rs: configuration loading and saving
//! - validation.rs: configuration validation
//! - paths.rs: configuration file paths

mod io;
mod paths;
mod types;
mod validation;

// Re-export config types
pub use types::{Config, DisplayConfig, GatewayConfig, SessionConfig};

// Re-export IO and utilities
pub use io::{
    apply_env_overrides, apply_overrides_from, load_config_from,
    load_config_from_path, read_config_snapshot, save_config, ConfigSnapshot,
};
pub use paths::{
    config_dir, config_dir_from, config_path, config_path_from, CONFIG_DIR_ENV, CONFIG_FILE_ENV,
};
pub use validation::{validate_config, ConfigValidationResult, ValidationIssue};
