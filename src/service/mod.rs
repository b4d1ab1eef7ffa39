//! Service layer: serving orchestration and read-path aggregation.
//!
//! [`AdServingService`] coordinates the serving pipeline (catalog query,
//! exclusion filtering, scoring, sampling, event recording) and emits
//! lifecycle events through the [`crate::domain::EventBus`]. Collaborator
//! seams (browsing history, account deposits) are injected at
//! construction so the pipeline tests run without global state.

pub mod collaborators;
pub mod history;
pub mod serving;
pub mod statement;

pub use collaborators::{AccountDepositor, BrowsingHistoryProvider, LedgerDepositor, NoBrowsingHistory};
pub use history::{AdInteractionLog, InteractionEntry};
pub use serving::{AdServingService, ServeOutcome, ServingParams};
pub use statement::Statement;
