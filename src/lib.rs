//! # wa-gateway-client
//!
//! Interactive reference client for a session-oriented WhatsApp WebSocket
//! gateway.
//!
//! ## Features
//!
//! - **QR pairing:** every pairing code the gateway pushes is drawn in the terminal
//! - **Phase-gated actions:** requests are only offered once the backend is ready
//! - **Typed protocol:** inbound events are a closed enum with a diagnostic fallback
//! - **Serialized loop:** one frame or one prompt at a time, never both

pub mod config;
pub mod console;
pub mod display;
pub mod error;
pub mod gateway;
pub mod session;

pub use config::Config;
pub use error::{Error, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const NAME: &str = env!("CARGO_PKG_NAME");
