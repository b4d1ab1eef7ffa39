//! Type-safe placement identifier.
//!
//! [`PlacementId`] is a newtype wrapper around [`uuid::Uuid`] (v4) providing
//! type safety so that placement identifiers cannot be confused with the
//! string-typed creative, campaign, and advertiser IDs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a single ad placement.
///
/// Wraps a UUID v4. Generated once when the serving pipeline chooses a
/// creative, and immutable thereafter. Every lifecycle event (served,
/// viewed, clicked, dismissed) for that placement carries the same ID;
/// insertion order within a placement defines the event sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlacementId(uuid::Uuid);

impl PlacementId {
    /// Creates a new random `PlacementId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates a `PlacementId` from an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for PlacementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlacementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<uuid::Uuid> for PlacementId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}

impl From<PlacementId> for uuid::Uuid {
    fn from(id: PlacementId) -> Self {
        id.0
    }
}

impl std::str::FromStr for PlacementId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}
