//! Configuration types module

use serde::{Deserialize, Serialize};

use crate::display::QrStyle;
use crate::gateway::protocol::DEFAULT_GATEWAY_URL;
use crate::session::{SessionOptions, DEFAULT_PREVIEW_CHARS, DEFAULT_USER_ID};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Gateway connection
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Session defaults
    #[serde(default)]
    pub session: SessionConfig,

    /// Terminal output
    #[serde(default)]
    pub display: DisplayConfig,
}

impl Config {
    /// Session options derived from this configuration
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            default_user_id: self.session.default_user_id.clone(),
            preview_chars: self.display.preview_chars,
        }
    }
}

/// Gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// WebSocket endpoint
    #[serde(default = "default_url")]
    pub url: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        GatewayConfig { url: default_url() }
    }
}

fn default_url() -> String {
    DEFAULT_GATEWAY_URL.to_string()
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Identity offered at the prompt; empty means the operator must type one
    #[serde(default = "default_user_id")]
    pub default_user_id: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            default_user_id: default_user_id(),
        }
    }
}

fn default_user_id() -> String {
    DEFAULT_USER_ID.to_string()
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Characters of payload shown for unrecognized events
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
    /// QR rendering style
    #[serde(default)]
    pub qr: QrStyle,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            preview_chars: default_preview_chars(),
            qr: QrStyle::default(),
        }
    }
}

fn default_preview_chars() -> usize {
    DEFAULT_PREVIEW_CHARS
}
