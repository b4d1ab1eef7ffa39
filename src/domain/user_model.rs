//! User model consumed by scoring and the exclusion rules.

use serde::{Deserialize, Serialize};

/// Per-serve snapshot of the user's targeting inputs.
///
/// Built fresh for every serving request from the caller-supplied
/// interest segments and the browsing history fetched from the host.
/// Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserModel {
    /// Interest segments, most specific first.
    pub segments: Vec<String>,
    /// Recently visited hosts, bounded by the configured max count and
    /// days-ago window.
    pub browsing_history: Vec<String>,
}

impl UserModel {
    /// Creates a user model from segments and browsing history.
    #[must_use]
    pub const fn new(segments: Vec<String>, browsing_history: Vec<String>) -> Self {
        Self {
            segments,
            browsing_history,
        }
    }

    /// Whether any interest segment matches `segment` exactly
    /// (case-insensitive).
    #[must_use]
    pub fn matches_segment(&self, segment: &str) -> bool {
        self.segments.iter().any(|s| s.eq_ignore_ascii_case(segment))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn segment_match_is_case_insensitive() {
        let model = UserModel::new(vec!["Travel".to_string()], vec![]);
        assert!(model.matches_segment("travel"));
        assert!(!model.matches_segment("food & drink"));
    }

    #[test]
    fn default_is_empty() {
        let model = UserModel::default();
        assert!(model.segments.is_empty());
        assert!(model.browsing_history.is_empty());
    }
}
