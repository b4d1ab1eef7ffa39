//! Statement and summary DTOs.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::AdType;
use crate::service::Statement;

/// Response body for `GET /statement`.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatementResponse {
    /// Sum of transaction values in the previous calendar month.
    pub earnings_last_month: f64,
    /// Sum of transaction values in the current calendar month.
    pub earnings_this_month: f64,
    /// When the previous month's earnings are paid out.
    pub next_payment_date: DateTime<Utc>,
    /// Viewed confirmations counted in the current calendar month.
    pub ads_received_this_month: u64,
}

impl From<Statement> for StatementResponse {
    fn from(statement: Statement) -> Self {
        Self {
            earnings_last_month: statement.earnings_last_month,
            earnings_this_month: statement.earnings_this_month,
            next_payment_date: statement.next_payment_date,
            ads_received_this_month: statement.ads_received_this_month,
        }
    }
}

/// Query parameters for `GET /summary`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct SummaryParams {
    /// Start of the range (inclusive, RFC 3339).
    pub from: DateTime<Utc>,
    /// End of the range (inclusive, RFC 3339).
    pub to: DateTime<Utc>,
}

/// Response body for `GET /summary`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SummaryResponse {
    /// Viewed confirmations per ad type within the range.
    pub counts: BTreeMap<String, u64>,
}

impl SummaryResponse {
    /// Builds the response from the aggregated counts.
    #[must_use]
    pub fn from_counts(counts: BTreeMap<AdType, u64>) -> Self {
        Self {
            counts: counts
                .into_iter()
                .map(|(ad_type, count)| (ad_type.as_str().to_string(), count))
                .collect(),
        }
    }
}
