//! Last-served exclusion rule.

use crate::domain::CreativeAd;

use super::ExclusionRule;

/// Excludes the creative instance served most recently, so back-to-back
/// requests never show the same asset twice in a row.
///
/// The last-served state is a single shared field on the orchestrator;
/// its value is snapshotted into this rule when the rule chain is built.
#[derive(Debug)]
pub struct LastServedRule {
    last_creative_instance_id: Option<String>,
}

impl LastServedRule {
    /// Creates the rule from the last-served snapshot.
    #[must_use]
    pub const fn new(last_creative_instance_id: Option<String>) -> Self {
        Self {
            last_creative_instance_id,
        }
    }
}

impl ExclusionRule for LastServedRule {
    fn name(&self) -> &'static str {
        "last_served"
    }

    fn should_exclude(&self, candidate: &CreativeAd) -> bool {
        self.last_creative_instance_id
            .as_deref()
            .is_some_and(|last| last == candidate.creative_instance_id)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::eligibility::test_support::make_creative;

    #[test]
    fn last_served_instance_is_excluded() {
        let rule = LastServedRule::new(Some("ci-1".to_string()));
        assert!(rule.should_exclude(&make_creative("ci-1", "cs-1", "ca-1")));
        assert!(!rule.should_exclude(&make_creative("ci-2", "cs-1", "ca-1")));
    }

    #[test]
    fn no_history_excludes_nothing() {
        let rule = LastServedRule::new(None);
        assert!(!rule.should_exclude(&make_creative("ci-1", "cs-1", "ca-1")));
    }
}
