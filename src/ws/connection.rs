//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding filtered events.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsMessage, WsMessageType};
use super::subscription::SubscriptionManager;
use crate::domain::{AdType, ServingEvent};

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards matching events from the [`broadcast::Receiver`] to the client.
pub async fn run_connection(socket: WebSocket, mut event_rx: broadcast::Receiver<ServingEvent>) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    loop {
        tokio::select! {
            // Incoming message from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = handle_text_message(&text, &mut subs);
                        if let Some(resp_json) = response
                            && ws_tx.send(Message::text(resp_json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            // Event from EventBus
            event = event_rx.recv() => {
                match event {
                    Ok(serving_event) => {
                        if subs.matches(serving_event.ad_type()) {
                            let msg = WsMessage {
                                id: uuid::Uuid::new_v4().to_string(),
                                msg_type: WsMessageType::Event,
                                timestamp: chrono::Utc::now(),
                                payload: serde_json::to_value(&serving_event).unwrap_or_default(),
                            };
                            let json = serde_json::to_string(&msg).unwrap_or_default();
                            if ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Handles a text message from the client, returning an optional JSON response.
fn handle_text_message(text: &str, subs: &mut SubscriptionManager) -> Option<String> {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        let err = WsMessage {
            id: String::new(),
            msg_type: WsMessageType::Error,
            timestamp: chrono::Utc::now(),
            payload: serde_json::json!({
                "code": 400,
                "message": "malformed JSON"
            }),
        };
        return serde_json::to_string(&err).ok();
    };

    // Subscribe/unsubscribe commands carry an ad_types array
    if let Some(ad_types) = msg.payload.get("ad_types").and_then(|v| v.as_array()) {
        let command = msg
            .payload
            .get("command")
            .and_then(|v| v.as_str())
            .unwrap_or("subscribe");

        match command {
            "subscribe" => {
                let mut types = Vec::new();
                let mut wildcard = false;
                for type_val in ad_types {
                    if let Some(s) = type_val.as_str() {
                        if s == "*" {
                            wildcard = true;
                        } else if let Ok(ad_type) = s.parse::<AdType>() {
                            types.push(ad_type);
                        }
                    }
                }
                subs.subscribe(&types, wildcard);
                let response = WsMessage {
                    id: msg.id,
                    msg_type: WsMessageType::Response,
                    timestamp: chrono::Utc::now(),
                    payload: serde_json::json!({
                        "subscribed": types.iter().map(|t| t.as_str()).collect::<Vec<_>>(),
                        "count": subs.count(),
                        "wildcard": subs.is_subscribed_all(),
                    }),
                };
                return serde_json::to_string(&response).ok();
            }
            "unsubscribe" => {
                let mut types = Vec::new();
                for type_val in ad_types {
                    if let Some(s) = type_val.as_str()
                        && let Ok(ad_type) = s.parse::<AdType>()
                    {
                        types.push(ad_type);
                    }
                }
                subs.unsubscribe(&types);
                let response = WsMessage {
                    id: msg.id,
                    msg_type: WsMessageType::Response,
                    timestamp: chrono::Utc::now(),
                    payload: serde_json::json!({
                        "unsubscribed": types.iter().map(|t| t.as_str()).collect::<Vec<_>>(),
                        "remaining_count": subs.count(),
                    }),
                };
                return serde_json::to_string(&response).ok();
            }
            _ => {}
        }
    }

    // Unknown command
    let err = WsMessage {
        id: msg.id,
        msg_type: WsMessageType::Error,
        timestamp: chrono::Utc::now(),
        payload: serde_json::json!({
            "code": 404,
            "message": "unknown command"
        }),
    };
    serde_json::to_string(&err).ok()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_command_updates_subscriptions() {
        let mut subs = SubscriptionManager::new();
        let text = serde_json::json!({
            "id": "req-1",
            "type": "command",
            "timestamp": chrono::Utc::now(),
            "payload": {
                "command": "subscribe",
                "ad_types": ["inline_content_ad"]
            }
        })
        .to_string();

        let response = handle_text_message(&text, &mut subs);
        assert!(response.is_some());
        assert!(subs.matches(AdType::InlineContentAd));
        assert!(!subs.matches(AdType::NotificationAd));
    }

    #[test]
    fn wildcard_subscribe_matches_all() {
        let mut subs = SubscriptionManager::new();
        let text = serde_json::json!({
            "id": "req-1",
            "type": "command",
            "timestamp": chrono::Utc::now(),
            "payload": {
                "command": "subscribe",
                "ad_types": ["*"]
            }
        })
        .to_string();

        handle_text_message(&text, &mut subs);
        assert!(subs.matches(AdType::SearchResultAd));
    }

    #[test]
    fn malformed_json_returns_error_message() {
        let mut subs = SubscriptionManager::new();
        let response = handle_text_message("not json", &mut subs);
        let Some(response) = response else {
            panic!("expected an error response");
        };
        assert!(response.contains("malformed JSON"));
    }
}
