//! HTTP surface: the Slack events endpoint and a health check.
//!
//! Slack expects an acknowledgment within its response budget, so the events
//! handler verifies the signature, acks immediately, and hands the actual
//! work to a spawned task that posts the reply when it is ready.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bugsmith_commands::CommandRouter;
use bugsmith_slack::events::{EventEnvelope, SlackEvent, parse_event};
use bugsmith_slack::text::strip_mentions;
use bugsmith_slack::{SlackClient, verify_signature};
use tracing::{debug, error, info, warn};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub router: CommandRouter,
    pub slack: SlackClient,
    pub signing_secret: String,
}

/// Build the axum application.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/slack/events", post(slack_events))
        .with_state(state)
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn slack_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let timestamp = header(&headers, "x-slack-request-timestamp");
    let signature = header(&headers, "x-slack-signature");

    if let Err(err) = verify_signature(
        &state.signing_secret,
        &timestamp,
        &body,
        &signature,
        chrono::Utc::now().timestamp(),
    ) {
        warn!(%err, "rejecting unverified request");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let envelope: EventEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(err) => {
            warn!(%err, "rejecting malformed event payload");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    if envelope.is_url_verification() {
        let challenge = envelope.challenge.unwrap_or_default();
        return Json(serde_json::json!({ "challenge": challenge })).into_response();
    }

    let Some(team_id) = envelope.team_id.clone() else {
        warn!("event without team_id; ignoring");
        return StatusCode::OK.into_response();
    };

    match parse_event(&envelope) {
        Ok(SlackEvent::AppMention(event)) => {
            let text = strip_mentions(&event.text);
            let reply_channel = event.channel.clone();
            let thread_ts = event.thread_ts.clone();
            spawn_reply(state, text, team_id, Some(event.channel), reply_channel, thread_ts);
        }
        Ok(SlackEvent::Message(event)) => {
            // Channel chatter is handled via mentions; here we only take DMs,
            // and never answer other bots.
            if event.is_bot_message() || !event.is_direct_message() {
                debug!("ignoring non-DM or bot message");
            } else {
                let reply_channel = event.channel.clone();
                // Direct messages carry no channel context for project
                // scoping; replies still go back to the DM conversation.
                spawn_reply(state, event.text, team_id, None, reply_channel, None);
            }
        }
        Ok(SlackEvent::Unknown) => debug!("ignoring unhandled event type"),
        Err(err) => warn!(%err, "failed to parse event"),
    }

    StatusCode::OK.into_response()
}

/// Run the command off the acknowledgment path and post the reply.
fn spawn_reply(
    state: AppState,
    text: String,
    team_id: String,
    context_channel: Option<String>,
    reply_channel: String,
    thread_ts: Option<String>,
) {
    tokio::spawn(async move {
        info!(team = %team_id, channel = %reply_channel, "handling command");
        let reply = state
            .router
            .handle_message(&text, &team_id, context_channel.as_deref())
            .await;

        if let Err(err) = state
            .slack
            .post_message(&reply_channel, &reply, thread_ts.as_deref())
            .await
        {
            error!(%err, channel = %reply_channel, "failed to post reply");
        }
    });
}

fn header(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
