//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` streams serving lifecycle events
//! (served, viewed, clicked, dismissed, opportunity, no-opportunity)
//! filtered by ad type subscription.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
