//! Geo subdivision targeting rule.

use crate::domain::CreativeAd;

use super::ExclusionRule;

/// Excludes creatives whose geo targets do not cover the current
/// subdivision.
///
/// Creatives with no geo targets are served everywhere.
#[derive(Debug)]
pub struct SubdivisionRule {
    subdivision_code: String,
}

impl SubdivisionRule {
    /// Creates the rule for the current subdivision code (e.g. `US-CA`).
    #[must_use]
    pub fn new(subdivision_code: impl Into<String>) -> Self {
        Self {
            subdivision_code: subdivision_code.into(),
        }
    }
}

impl ExclusionRule for SubdivisionRule {
    fn name(&self) -> &'static str {
        "subdivision_targeting"
    }

    fn should_exclude(&self, candidate: &CreativeAd) -> bool {
        if candidate.geo_targets.is_empty() {
            return false;
        }
        !candidate
            .geo_targets
            .iter()
            .any(|target| target == &self.subdivision_code)
    }
}
