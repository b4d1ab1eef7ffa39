//! Domain layer: core ad-serving types and the event system.
//!
//! This module contains the server-side domain model including placement
//! identity, ad and confirmation type enums, creative catalog entries,
//! the ad event and transaction records, the user model consumed by
//! scoring, and the event bus for broadcasting serving lifecycle events.

pub mod ad_event;
pub mod ad_type;
pub mod confirmation_type;
pub mod creative_ad;
pub mod event_bus;
pub mod placement_id;
pub mod serving_event;
pub mod transaction;
pub mod user_model;

pub use ad_event::AdEvent;
pub use ad_type::AdType;
pub use confirmation_type::ConfirmationType;
pub use creative_ad::CreativeAd;
pub use event_bus::EventBus;
pub use placement_id::PlacementId;
pub use serving_event::ServingEvent;
pub use transaction::Transaction;
pub use user_model::UserModel;
