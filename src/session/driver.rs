//! Command driver
//!
//! Turns operator input into the next outbound request. Every check here
//! runs locally; nothing is sent until the input is usable.

use chrono::NaiveDateTime;
use tracing::debug;

use crate::error::{Error, Result};
use crate::gateway::protocol::{Group, OutboundRequest, RequestKind, TIME_WINDOW_FORMAT};

use super::operator::{Operator, TimeBound};
use super::state::Session;

/// Entries of the action menu, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    WaitForMessages,
    FetchGroups,
    FetchGroupMessages,
    SendMessage,
    Disconnect,
}

impl MenuAction {
    pub const ALL: [MenuAction; 5] = [
        MenuAction::WaitForMessages,
        MenuAction::FetchGroups,
        MenuAction::FetchGroupMessages,
        MenuAction::SendMessage,
        MenuAction::Disconnect,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::WaitForMessages => "Get Messages (Wait for new messages)",
            MenuAction::FetchGroups => "Fetch Groups",
            MenuAction::FetchGroupMessages => "Fetch Messages from a Group",
            MenuAction::SendMessage => "Send a Message",
            MenuAction::Disconnect => "Disconnect",
        }
    }

    /// Parse a 1-based menu choice
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        input
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|index| Self::ALL.get(index).copied())
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "'{}' is not a menu choice (1-{})",
                    input,
                    Self::ALL.len()
                ))
            })
    }
}

/// Parse a 1-based group index; empty input cancels
pub fn parse_group_selection<'a>(input: &str, groups: &'a [Group]) -> Result<Option<&'a Group>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    let number: usize = input
        .parse()
        .map_err(|_| Error::InvalidInput("Please enter a valid number.".into()))?;

    number
        .checked_sub(1)
        .and_then(|index| groups.get(index))
        .map(Some)
        .ok_or_else(|| Error::InvalidInput("Invalid group selection.".into()))
}

/// Parse one end of the time window; empty means unbounded
pub fn parse_time_bound(input: &str) -> Result<Option<NaiveDateTime>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    NaiveDateTime::parse_from_str(input, TIME_WINDOW_FORMAT)
        .map(Some)
        .map_err(|_| {
            Error::InvalidInput(format!(
                "'{}' is not a timestamp of the form YYYY-MM-DD HH:MM:SS",
                input
            ))
        })
}

/// Build the `get_group_messages` request kind from validated parts
pub fn group_messages_kind(
    group: &Group,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> Result<RequestKind> {
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(Error::InvalidInput(
                "Start time must not be after end time.".into(),
            ));
        }
    }

    Ok(RequestKind::GetGroupMessages {
        group_id: group.id.clone(),
        start_time: start.map(|t| t.format(TIME_WINDOW_FORMAT).to_string()),
        end_time: end.map(|t| t.format(TIME_WINDOW_FORMAT).to_string()),
    })
}

/// Build the `send_message` request kind; both parts must be non-empty
pub fn send_message_kind(recipient: &str, message: &str) -> Result<RequestKind> {
    let recipient = recipient.trim();
    if recipient.is_empty() {
        return Err(Error::PreconditionUnmet("Recipient cannot be empty.".into()));
    }

    let message = message.trim();
    if message.is_empty() {
        return Err(Error::PreconditionUnmet("Message cannot be empty.".into()));
    }

    Ok(RequestKind::SendMessage {
        recipient: recipient.to_string(),
        message: message.to_string(),
    })
}

/// Prompt until the operator produces a request
///
/// Only valid while the session is ready. Bad input and refused actions
/// are explained and the menu is shown again.
pub async fn next_request<O>(session: &mut Session, operator: &mut O) -> Result<OutboundRequest>
where
    O: Operator + ?Sized,
{
    if !session.is_ready() {
        return Err(Error::PreconditionUnmet(format!(
            "actions are only available once the session is ready (currently {})",
            session.phase()
        )));
    }

    loop {
        let raw = operator.menu_choice(session).await?;
        let action = match MenuAction::parse(&raw) {
            Ok(action) => action,
            Err(e) => {
                debug!(error = %e, "Rejected menu choice");
                operator.warn("Invalid choice. Please try again.");
                continue;
            }
        };

        let request = match action {
            MenuAction::WaitForMessages => {
                session.mark_listening();
                Some(session.request(RequestKind::GetMessages)?)
            }
            MenuAction::FetchGroups => Some(session.request(RequestKind::GetGroups)?),
            MenuAction::FetchGroupMessages => fetch_group_messages(session, operator).await?,
            MenuAction::SendMessage => send_message(session, operator).await?,
            MenuAction::Disconnect => Some(session.begin_disconnect()?),
        };

        if let Some(request) = request {
            return Ok(request);
        }
    }
}

/// `None` sends the operator back to the menu
async fn fetch_group_messages<O>(
    session: &Session,
    operator: &mut O,
) -> Result<Option<OutboundRequest>>
where
    O: Operator + ?Sized,
{
    if session.groups().is_empty() {
        operator.warn("No groups found. Fetching groups first; choose this action again once they arrive.");
        return session.request(RequestKind::GetGroups).map(Some);
    }

    let group = loop {
        let raw = operator.group_choice(session.groups()).await?;
        match parse_group_selection(&raw, session.groups()) {
            Ok(Some(group)) => break group.clone(),
            Ok(None) => return Ok(None),
            Err(e) if e.is_recoverable() => operator.warn(&input_message(&e)),
            Err(e) => return Err(e),
        }
    };

    loop {
        let start = operator.time_bound(TimeBound::Start).await?;
        let end = operator.time_bound(TimeBound::End).await?;

        let kind = parse_time_bound(&start)
            .and_then(|start| Ok((start, parse_time_bound(&end)?)))
            .and_then(|(start, end)| group_messages_kind(&group, start, end));

        match kind {
            Ok(kind) => return session.request(kind).map(Some),
            Err(e) if e.is_recoverable() => operator.warn(&input_message(&e)),
            Err(e) => return Err(e),
        }
    }
}

async fn send_message<O>(session: &Session, operator: &mut O) -> Result<Option<OutboundRequest>>
where
    O: Operator + ?Sized,
{
    let recipient = operator.recipient().await?;
    if recipient.trim().is_empty() {
        operator.warn("Recipient cannot be empty.");
        return Ok(None);
    }

    let message = operator.message_body().await?;
    match send_message_kind(&recipient, &message) {
        Ok(kind) => session.request(kind).map(Some),
        Err(e) if e.is_recoverable() => {
            operator.warn(&input_message(&e));
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Operator-facing text without the error category prefix
fn input_message(err: &Error) -> String {
    match err {
        Error::InvalidInput(message) | Error::PreconditionUnmet(message) => message.clone(),
        other => other.to_string(),
    }
}
