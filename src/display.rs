//! Presentation helpers
//!
//! Plain-text formatting for messages, groups, requests and QR codes.

use chrono::{DateTime, Local};
use qrcode::render::unicode;
use qrcode::QrCode;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::gateway::protocol::{ChatMessage, Group, OutboundRequest, RequestKind, TIME_WINDOW_FORMAT};

/// How QR codes are drawn in the terminal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QrStyle {
    /// Half-block characters, two modules per cell
    #[default]
    Unicode,
    /// `#` and spaces, for terminals without block glyphs
    Ascii,
}

impl std::str::FromStr for QrStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "unicode" | "dense" => Ok(QrStyle::Unicode),
            "ascii" => Ok(QrStyle::Ascii),
            _ => Err(Error::Config(format!(
                "Invalid QR style: {}. Valid options: unicode, ascii",
                s
            ))),
        }
    }
}

/// Render QR payload text for the terminal
pub fn render_qr(data: &str, style: QrStyle) -> Result<String> {
    let code = QrCode::new(data.as_bytes())
        .map_err(|e| Error::InvalidInput(format!("Cannot encode QR code: {}", e)))?;

    let rendered = match style {
        QrStyle::Unicode => code
            .render::<unicode::Dense1x2>()
            .dark_color(unicode::Dense1x2::Light)
            .light_color(unicode::Dense1x2::Dark)
            .build(),
        QrStyle::Ascii => code
            .render::<char>()
            .quiet_zone(true)
            .module_dimensions(2, 1)
            .build(),
    };

    Ok(rendered)
}

/// Epoch milliseconds as local `YYYY-MM-DD HH:MM:SS`
pub fn format_timestamp(millis: i64) -> String {
    match DateTime::from_timestamp_millis(millis) {
        Some(utc) => utc.with_timezone(&Local).format(TIME_WINDOW_FORMAT).to_string(),
        None => format!("{} ms", millis),
    }
}

/// `[timestamp] sender: body`
pub fn format_message(message: &ChatMessage) -> String {
    format!(
        "[{}] {}: {}",
        format_timestamp(message.timestamp),
        message.sender.as_deref().unwrap_or("Unknown Sender"),
        message.body.as_deref().unwrap_or("No Content"),
    )
}

/// `n. name (ID: id)` with a 1-based index
pub fn format_group(index: usize, group: &Group) -> String {
    format!("{}. {} (ID: {})", index + 1, group.display_name(), group.id)
}

/// Status line echoed after a request is sent
pub fn describe_request(request: &OutboundRequest) -> String {
    match &request.kind {
        RequestKind::Initiate => format!("Sent initiate request for user {}", request.user_id),
        RequestKind::GetGroups => "Requesting WhatsApp groups...".to_string(),
        RequestKind::GetMessages => "Requesting WhatsApp messages...".to_string(),
        RequestKind::GetGroupMessages { group_id, .. } => {
            format!("Requesting messages from group {}...", group_id)
        }
        RequestKind::SendMessage { recipient, .. } => format!("Sending message to {}...", recipient),
        RequestKind::Disconnect => "Sent disconnect request.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_placeholders() {
        let message = ChatMessage {
            timestamp: 0,
            sender: None,
            body: None,
        };
        let line = format_message(&message);
        assert!(line.ends_with("] Unknown Sender: No Content"));
    }

    #[test]
    fn test_group_line() {
        let group = Group {
            id: "120363@g.us".into(),
            name: String::new(),
        };
        assert_eq!(format_group(0, &group), "1. Unknown (ID: 120363@g.us)");
    }

    #[test]
    fn test_timestamp_shape() {
        let formatted = format_timestamp(1_700_000_000_000);
        assert_eq!(formatted.len(), "2023-11-14 22:13:20".len());
    }

    #[test]
    fn test_qr_renders_in_both_styles() {
        let unicode = render_qr("2@pairing-ref", QrStyle::Unicode).unwrap();
        let ascii = render_qr("2@pairing-ref", QrStyle::Ascii).unwrap();

        assert!(unicode.lines().count() > 10);
        assert!(ascii.contains('#'));
    }

    #[test]
    fn test_qr_style_from_str() {
        assert_eq!("ASCII".parse::<QrStyle>().unwrap(), QrStyle::Ascii);
        assert!("sixel".parse::<QrStyle>().is_err());
    }
}
