//! Terminal operator
//!
//! dialoguer prompts and console-styled output. Prompts block, so each one
//! runs on the blocking pool and the session loop awaits it.

use async_trait::async_trait;
use console::style;
use dialoguer::{theme::ColorfulTheme, Input};

use crate::display::{self, QrStyle};
use crate::error::{Error, Result};
use crate::gateway::protocol::Group;
use crate::session::{MenuAction, Operator, Reaction, Session, TimeBound};

/// Get the dialoguer theme
fn theme() -> ColorfulTheme {
    ColorfulTheme::default()
}

/// Run a free-text prompt off the async runtime
async fn prompt(message: String, default: Option<String>) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let theme = theme();
        let mut input = Input::<String>::with_theme(&theme)
            .with_prompt(message)
            .allow_empty(true);
        if let Some(default) = default {
            input = input.default(default);
        }
        input.interact_text()
    })
    .await
    .map_err(|e| Error::Prompt(format!("Prompt task failed: {}", e)))?
    .map_err(Error::from)
}

/// Operator backed by the controlling terminal
#[derive(Debug, Clone, Default)]
pub struct TerminalOperator {
    qr_style: QrStyle,
}

impl TerminalOperator {
    pub fn new(qr_style: QrStyle) -> Self {
        TerminalOperator { qr_style }
    }

    fn print_groups(groups: &[Group]) {
        println!("\n📂 {}", style("WhatsApp Groups List:").cyan().bold());
        if groups.is_empty() {
            println!("  {} No groups found.", style("✗").red());
        }
        for (index, group) in groups.iter().enumerate() {
            println!("  {}", display::format_group(index, group));
        }
    }
}

#[async_trait]
impl Operator for TerminalOperator {
    async fn identity(&mut self, default: &str) -> Result<String> {
        let message = format!("Enter your user ID (default: {})", default);
        let default = (!default.is_empty()).then(|| default.to_string());
        prompt(message, default).await
    }

    async fn menu_choice(&mut self, session: &Session) -> Result<String> {
        println!("\n📌 {}", style("Choose an action:").cyan().bold());
        for (index, action) in MenuAction::ALL.iter().enumerate() {
            println!("  {}  {}", style(index + 1).yellow(), action.label());
        }
        if session.is_listening() {
            println!("  {}", style("(listening for new messages)").dim());
        }
        prompt(format!("Enter your choice (1-{})", MenuAction::ALL.len()), None).await
    }

    async fn group_choice(&mut self, groups: &[Group]) -> Result<String> {
        println!("\n📌 {}", style("Select a group to fetch messages:").cyan().bold());
        for (index, group) in groups.iter().enumerate() {
            println!("  {}", display::format_group(index, group));
        }
        prompt("Enter group number (empty to go back)".to_string(), None).await
    }

    async fn time_bound(&mut self, bound: TimeBound) -> Result<String> {
        let message = match bound {
            TimeBound::Start => {
                "Enter start time (YYYY-MM-DD HH:MM:SS) or leave empty for recent messages"
            }
            TimeBound::End => "Enter end time (YYYY-MM-DD HH:MM:SS) or leave empty",
        };
        prompt(message.to_string(), None).await
    }

    async fn recipient(&mut self) -> Result<String> {
        prompt("Enter recipient (group ID or phone number)".to_string(), None).await
    }

    async fn message_body(&mut self) -> Result<String> {
        prompt("Enter your message".to_string(), None).await
    }

    fn show(&mut self, reaction: &Reaction) {
        match reaction {
            Reaction::ShowQr(code) => {
                println!("\n🔹 {}", style("QR Code Received! Scan it to connect WhatsApp.").bold());
                match display::render_qr(code, self.qr_style) {
                    Ok(rendered) => println!("{}", rendered),
                    Err(e) => {
                        println!("  {} {}", style("✗").red(), e);
                        println!("  Raw code: {}", code);
                    }
                }
                println!("📷 Scan the QR code above using WhatsApp.");
            }
            Reaction::Ready => {
                println!("\n{} WhatsApp client is ready!", style("✓").green());
            }
            Reaction::Groups(groups) => Self::print_groups(groups),
            Reaction::GroupMessages(messages) => {
                println!("\n📥 {}", style("Group Messages:").cyan().bold());
                if messages.is_empty() {
                    println!("  {} No messages found.", style("✗").red());
                }
                for message in messages {
                    println!("  {}", display::format_message(message));
                }
            }
            Reaction::Message(message) => {
                println!("\n📥 {}", style("Message:").cyan().bold());
                println!("  {}", display::format_message(message));
            }
            Reaction::MessageSent(recipient) => {
                println!(
                    "\n{} Message sent successfully to {}.",
                    style("✓").green(),
                    recipient.as_deref().unwrap_or("Unknown")
                );
            }
            Reaction::Disconnected => {
                println!("\n{} Disconnected from the server. Exiting...", style("✓").green());
            }
            Reaction::Diagnostic { tag, preview } => {
                println!("\n📩 Event: {}", style(tag).yellow());
                println!("🔹 Data: {}...", preview);
            }
            Reaction::Anomaly { tag, reason, preview, .. } => {
                println!(
                    "\n{} Unexpected '{}' payload ({}).",
                    style("⚠").yellow(),
                    tag,
                    reason
                );
                println!("🔹 Data: {}...", preview);
            }
            Reaction::OutOfPhase { tag, phase } => {
                println!(
                    "\n{} Ignoring '{}' event while {}.",
                    style("⚠").yellow(),
                    tag,
                    phase
                );
            }
            Reaction::Malformed { raw, .. } => {
                println!("\n{} Received non-JSON message: {}", style("✗").red(), raw);
            }
        }
    }

    fn info(&mut self, text: &str) {
        println!("   {} {}", style("→").cyan(), text);
    }

    fn warn(&mut self, text: &str) {
        println!("   {} {}", style("✗").red(), text);
    }
}
