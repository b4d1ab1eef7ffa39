//! # adserve-gateway
//!
//! REST API and WebSocket gateway for an ad-serving eligibility and
//! auction engine.
//!
//! This crate decides which creative, if any, to show for a placement
//! request: candidates are loaded from an embedded SQLite catalog,
//! filtered through a chain of exclusion rules, scored against the
//! user's interest segments, and chosen by a score-weighted random
//! draw. Every lifecycle event (served, viewed, clicked, dismissed) is
//! recorded in an append-only event log that feeds the rules and the
//! earnings statement.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── AdServingService (service/)
//!     │      ├── Exclusion rules (eligibility/)
//!     │      └── Scoring + sampling (predictor/)
//!     ├── EventBus (domain/)
//!     │
//!     └── SQLite Persistence (persistence/)
//!            ad_events · transactions · creative_ads
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod eligibility;
pub mod error;
pub mod persistence;
pub mod predictor;
pub mod service;
pub mod ws;
