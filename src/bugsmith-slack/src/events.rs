//! Event handling for the Slack Events API.
//!
//! Events arrive over HTTP as an envelope wrapping the actual event. Handled
//! types:
//! - `app_mention` - the bot is @mentioned in a channel
//! - `message` - direct messages to the bot

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{SlackError, SlackResult};

/// Outer payload delivered to the events endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct EventEnvelope {
    /// "url_verification" or "event_callback".
    #[serde(rename = "type")]
    pub kind: String,
    /// Echo-back token for endpoint verification handshakes.
    #[serde(default)]
    pub challenge: Option<String>,
    /// Tenant the event belongs to.
    #[serde(default)]
    pub team_id: Option<String>,
    /// The wrapped event, present for event_callback payloads.
    #[serde(default)]
    pub event: Option<serde_json::Value>,
}

impl EventEnvelope {
    pub fn is_url_verification(&self) -> bool {
        self.kind == "url_verification"
    }
}

/// Slack event types that we handle.
#[derive(Debug, Clone)]
pub enum SlackEvent {
    /// App mention event (@bugsmith in a channel).
    AppMention(AppMentionEvent),
    /// Message event (direct messages).
    Message(MessageEvent),
    /// Unknown event type (for forward compatibility).
    Unknown,
}

/// Event payload for app mentions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppMentionEvent {
    /// User who mentioned the bot.
    pub user: String,
    /// Text of the message (including the mention).
    pub text: String,
    /// Channel where the mention occurred.
    pub channel: String,
    /// Timestamp of the message.
    pub ts: String,
    /// Thread timestamp (if in a thread).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
}

/// Event payload for messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEvent {
    /// User who sent the message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Text of the message.
    #[serde(default)]
    pub text: String,
    /// Channel where the message was sent.
    pub channel: String,
    /// Channel type (im, channel, group, mpim).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_type: Option<String>,
    /// Timestamp of the message.
    pub ts: String,
    /// Subtype of message (e.g., "bot_message").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    /// Bot ID (if message is from a bot).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_id: Option<String>,
}

impl MessageEvent {
    /// Check if this is a direct message.
    pub fn is_direct_message(&self) -> bool {
        self.channel.starts_with('D') || self.channel_type.as_deref() == Some("im")
    }

    /// Check if this is a bot message (should be ignored to avoid loops).
    pub fn is_bot_message(&self) -> bool {
        self.bot_id.is_some() || self.subtype.as_deref() == Some("bot_message")
    }
}

/// Parse the wrapped event out of an envelope.
pub fn parse_event(envelope: &EventEnvelope) -> SlackResult<SlackEvent> {
    let event_json = envelope
        .event
        .as_ref()
        .ok_or_else(|| SlackError::InvalidPayload("Missing event field".to_string()))?;

    let event_type = event_json
        .get("type")
        .and_then(|t| t.as_str())
        .unwrap_or("unknown");

    debug!("Parsing event type: {}", event_type);

    match event_type {
        "app_mention" => {
            let event: AppMentionEvent = serde_json::from_value(event_json.clone())?;
            Ok(SlackEvent::AppMention(event))
        }
        "message" => {
            let event: MessageEvent = serde_json::from_value(event_json.clone())?;
            Ok(SlackEvent::Message(event))
        }
        _ => {
            warn!("Unknown event type: {}", event_type);
            Ok(SlackEvent::Unknown)
        }
    }
}
