//! Anti-targeting exclusion rule.
//!
//! Advertisers can list sites whose visitors must not see a creative
//! set (e.g. a competitor's own customers). The resource maps creative
//! set IDs to site lists; the rule excludes sets whose list intersects
//! the user's browsing history.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use crate::domain::CreativeAd;
use crate::error::ServingError;

use super::ExclusionRule;

/// Anti-targeting site lists keyed by creative set ID.
///
/// Loaded once at startup (optionally from a JSON file) and shared
/// read-only across serving requests.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct AntiTargetingResource {
    sites_by_creative_set: HashMap<String, Vec<String>>,
}

impl AntiTargetingResource {
    /// Creates a resource from explicit entries.
    #[must_use]
    pub fn from_entries(sites_by_creative_set: HashMap<String, Vec<String>>) -> Self {
        Self {
            sites_by_creative_set,
        }
    }

    /// Loads a resource from a JSON file shaped as
    /// `{"creative-set-id": ["site-a.example", ...], ...}`.
    ///
    /// # Errors
    ///
    /// Returns [`ServingError::Internal`] if the file cannot be read or
    /// parsed.
    pub fn from_json_file(path: &str) -> Result<Self, ServingError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ServingError::Internal(format!("anti-targeting file {path}: {e}")))?;
        serde_json::from_str(&raw)
            .map_err(|e| ServingError::Internal(format!("anti-targeting file {path}: {e}")))
    }

    /// Returns the creative sets whose site lists intersect the given
    /// browsing history.
    #[must_use]
    pub fn matching_creative_sets(&self, browsing_history: &[String]) -> HashSet<String> {
        let visited: HashSet<&str> = browsing_history.iter().map(String::as_str).collect();
        self.sites_by_creative_set
            .iter()
            .filter(|(_, sites)| sites.iter().any(|site| visited.contains(site.as_str())))
            .map(|(set_id, _)| set_id.clone())
            .collect()
    }
}

/// Excludes creative sets anti-targeted against the user's history.
#[derive(Debug)]
pub struct AntiTargetingRule {
    flagged_sets: HashSet<String>,
}

impl AntiTargetingRule {
    /// Builds the rule by intersecting the resource with the browsing
    /// history fetched for this serving request.
    #[must_use]
    pub fn new(resource: &AntiTargetingResource, browsing_history: &[String]) -> Self {
        Self {
            flagged_sets: resource.matching_creative_sets(browsing_history),
        }
    }
}

impl ExclusionRule for AntiTargetingRule {
    fn name(&self) -> &'static str {
        "anti_targeting"
    }

    fn should_exclude(&self, candidate: &CreativeAd) -> bool {
        self.flagged_sets.contains(&candidate.creative_set_id)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::eligibility::test_support::make_creative;

    fn make_resource() -> AntiTargetingResource {
        let mut entries = HashMap::new();
        entries.insert(
            "cs-1".to_string(),
            vec!["rival.example".to_string(), "other.example".to_string()],
        );
        AntiTargetingResource::from_entries(entries)
    }

    #[test]
    fn visited_anti_targeted_site_excludes_the_set() {
        let resource = make_resource();
        let history = vec!["rival.example".to_string()];
        let rule = AntiTargetingRule::new(&resource, &history);

        assert!(rule.should_exclude(&make_creative("ci-1", "cs-1", "ca-1")));
        assert!(!rule.should_exclude(&make_creative("ci-2", "cs-2", "ca-1")));
    }

    #[test]
    fn unvisited_history_excludes_nothing() {
        let resource = make_resource();
        let history = vec!["unrelated.example".to_string()];
        let rule = AntiTargetingRule::new(&resource, &history);
        assert!(!rule.should_exclude(&make_creative("ci-1", "cs-1", "ca-1")));
    }

    #[test]
    fn empty_resource_excludes_nothing() {
        let resource = AntiTargetingResource::default();
        let rule = AntiTargetingRule::new(&resource, &["rival.example".to_string()]);
        assert!(!rule.should_exclude(&make_creative("ci-1", "cs-1", "ca-1")));
    }
}
