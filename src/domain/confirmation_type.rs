//! Ad lifecycle confirmation type enum.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The ad lifecycle event kind.
///
/// `Served` is only ever produced internally by the serving pipeline;
/// all other kinds arrive through the event trigger endpoint after the
/// host has displayed the ad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationType {
    /// The pipeline chose a creative and recorded the placement.
    Served,
    /// The ad was rendered and seen.
    Viewed,
    /// The ad was clicked.
    Clicked,
    /// The ad was explicitly dismissed.
    Dismissed,
    /// The click-through landed on the target page.
    Landed,
    /// A conversion was attributed to the placement.
    Conversion,
}

impl ConfirmationType {
    /// Returns the snake_case string used in storage and over the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Served => "served",
            Self::Viewed => "viewed",
            Self::Clicked => "clicked",
            Self::Dismissed => "dismissed",
            Self::Landed => "landed",
            Self::Conversion => "conversion",
        }
    }

    /// Whether this confirmation credits the user's account ledger.
    #[must_use]
    pub const fn is_deposit_worthy(&self) -> bool {
        matches!(self, Self::Viewed | Self::Clicked)
    }
}

impl fmt::Display for ConfirmationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfirmationType {
    type Err = crate::error::ServingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "served" => Ok(Self::Served),
            "viewed" => Ok(Self::Viewed),
            "clicked" => Ok(Self::Clicked),
            "dismissed" => Ok(Self::Dismissed),
            "landed" => Ok(Self::Landed),
            "conversion" => Ok(Self::Conversion),
            other => Err(crate::error::ServingError::InvalidRequest(format!(
                "unknown confirmation type: {other}"
            ))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn string_round_trip() {
        for kind in [
            ConfirmationType::Served,
            ConfirmationType::Viewed,
            ConfirmationType::Clicked,
            ConfirmationType::Dismissed,
            ConfirmationType::Landed,
            ConfirmationType::Conversion,
        ] {
            let parsed: Result<ConfirmationType, _> = kind.as_str().parse();
            let Ok(parsed) = parsed else {
                panic!("round trip failed for {kind}");
            };
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn only_viewed_and_clicked_deposit() {
        assert!(ConfirmationType::Viewed.is_deposit_worthy());
        assert!(ConfirmationType::Clicked.is_deposit_worthy());
        assert!(!ConfirmationType::Served.is_deposit_worthy());
        assert!(!ConfirmationType::Dismissed.is_deposit_worthy());
    }
}
