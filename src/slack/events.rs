//! Slack Events API endpoint.
//!
//! Slack pushes events as signed HTTP callbacks. The endpoint verifies the
//! signature, answers the one-time `url_verification` handshake, and
//! acknowledges `event_callback` requests immediately; message events are
//! relayed on their own task so Slack never waits on Discord.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::bridge::Relay;
use crate::common::{wait_for_shutdown, SlackMessageEvent};
use crate::slack::signature::{SlackVerifier, SIGNATURE_HEADER, TIMESTAMP_HEADER};

/// Outer envelope of every Events API request.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Envelope {
    UrlVerification { challenge: String },
    EventCallback { event: SlackEvent },
    #[serde(other)]
    Unsupported,
}

/// The inner event of an `event_callback`.
#[derive(Debug, Deserialize)]
struct SlackEvent {
    #[serde(rename = "type")]
    kind: String,
    subtype: Option<String>,
    user: Option<String>,
    channel: Option<String>,
    text: Option<String>,
}

impl SlackEvent {
    fn into_message(self) -> Option<SlackMessageEvent> {
        if self.kind != "message" {
            return None;
        }
        Some(SlackMessageEvent {
            subtype: self.subtype,
            user: self.user,
            channel: self.channel.unwrap_or_default(),
            text: self.text.unwrap_or_default(),
        })
    }
}

#[derive(Clone)]
struct EventsState {
    relay: Arc<Relay>,
    verifier: SlackVerifier,
}

/// Build the router serving the events endpoint at `path`.
pub fn router(path: &str, relay: Arc<Relay>, verifier: SlackVerifier) -> Router {
    Router::new()
        .route(path, post(handle_events))
        .with_state(EventsState { relay, verifier })
}

/// Serve the events endpoint until `shutdown_rx` flips to `true`.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    mut shutdown_rx: watch::Receiver<bool>,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Listening for Slack events on {}", addr);
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            wait_for_shutdown(&mut shutdown_rx).await;
            info!("Slack events server shutting down");
        })
        .await
}

async fn handle_events(
    State(state): State<EventsState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let timestamp = header_str(&headers, TIMESTAMP_HEADER);
    let signature = header_str(&headers, SIGNATURE_HEADER);

    if let Err(e) = state.verifier.verify(timestamp, signature, &body) {
        warn!("Rejected Slack request: {}", e);
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let envelope: Envelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!("Malformed Slack event payload: {}", e);
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    match envelope {
        Envelope::UrlVerification { challenge } => {
            info!("Answering Slack URL verification");
            Json(json!({ "challenge": challenge })).into_response()
        }
        Envelope::EventCallback { event } => {
            match event.into_message() {
                Some(message) => {
                    let relay = Arc::clone(&state.relay);
                    tokio::spawn(async move {
                        relay.on_slack_message(message).await;
                    });
                }
                None => debug!("Ignoring non-message Slack event"),
            }
            StatusCode::OK.into_response()
        }
        Envelope::Unsupported => {
            debug!("Ignoring unsupported Slack request type");
            StatusCode::OK.into_response()
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
