//! Data Transfer Objects for REST request/response serialization.
//!
//! Enum-typed domain fields (ad type, event type) cross the wire as
//! their snake_case string form and are validated at the handler
//! boundary.

pub mod catalog_dto;
pub mod event_dto;
pub mod serve_dto;
pub mod statement_dto;

pub use catalog_dto::*;
pub use event_dto::*;
pub use serve_dto::*;
pub use statement_dto::*;
