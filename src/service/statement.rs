//! Earnings statement and ads-received aggregation over the transaction
//! ledger.
//!
//! Pure functions over an in-memory transaction slice; callers fetch the
//! ledger from storage first. Month boundaries are calendar months in
//! UTC.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::Serialize;

use crate::domain::{AdType, ConfirmationType, Transaction};

/// Monthly earnings statement derived from the transaction ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    /// Sum of transaction values in the previous calendar month.
    pub earnings_last_month: f64,
    /// Sum of transaction values in the current calendar month.
    pub earnings_this_month: f64,
    /// When the previous month's earnings are paid out.
    pub next_payment_date: DateTime<Utc>,
    /// Viewed confirmations counted in the current calendar month.
    pub ads_received_this_month: u64,
}

/// Counts viewed confirmations per ad type within `[from, to]`.
///
/// Bounds are inclusive on both ends. Only `viewed` transactions count;
/// clicks and other confirmation types are receipts for the same
/// impression, not additional ads received.
#[must_use]
pub fn ads_summary_for_date_range(
    transactions: &[Transaction],
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> BTreeMap<AdType, u64> {
    let mut summary = BTreeMap::new();
    for transaction in transactions {
        if transaction.confirmation_type == ConfirmationType::Viewed
            && transaction.created_at >= from
            && transaction.created_at <= to
        {
            *summary.entry(transaction.ad_type).or_default() += 1;
        }
    }
    summary
}

/// Builds the earnings statement for the calendar month containing `now`.
#[must_use]
pub fn build_statement(transactions: &[Transaction], now: DateTime<Utc>) -> Statement {
    let this_month_start = start_of_month(now.year(), now.month(), now);
    let (last_year, last_month) = previous_month(now.year(), now.month());
    let last_month_start = start_of_month(last_year, last_month, now);
    let (next_year, next_month) = following_month(now.year(), now.month());
    let next_month_start = start_of_month(next_year, next_month, now);

    let mut earnings_last_month = 0.0;
    let mut earnings_this_month = 0.0;
    let mut ads_received_this_month = 0;

    for transaction in transactions {
        let at = transaction.created_at;
        if at >= last_month_start && at < this_month_start {
            earnings_last_month += transaction.value;
        } else if at >= this_month_start && at < next_month_start {
            earnings_this_month += transaction.value;
            if transaction.confirmation_type == ConfirmationType::Viewed {
                ads_received_this_month += 1;
            }
        }
    }

    // Payouts run on the 5th of the following month.
    let next_payment_date = Utc
        .with_ymd_and_hms(next_year, next_month, 5, 0, 0, 0)
        .single()
        .unwrap_or(now);

    Statement {
        earnings_last_month,
        earnings_this_month,
        next_payment_date,
        ads_received_this_month,
    }
}

/// Midnight UTC on the first of the given month. UTC has no ambiguous
/// local times, so `single()` cannot fail; `fallback` satisfies the type.
fn start_of_month(year: i32, month: u32, fallback: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .unwrap_or(fallback)
}

const fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

const fn following_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn make_transaction(
        id: &str,
        created_at: DateTime<Utc>,
        ad_type: AdType,
        confirmation_type: ConfirmationType,
        value: f64,
    ) -> Transaction {
        Transaction {
            id: id.to_string(),
            created_at,
            creative_instance_id: format!("ci-{id}"),
            creative_set_id: "cs-1".to_string(),
            campaign_id: "ca-1".to_string(),
            advertiser_id: "ad-1".to_string(),
            segment: "travel".to_string(),
            ad_type,
            confirmation_type,
            reconciled_at: None,
            value,
        }
    }

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        let Some(ts) = Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).single() else {
            panic!("bad test date");
        };
        ts
    }

    #[test]
    fn summary_counts_viewed_within_inclusive_bounds() {
        let transactions = vec![
            // Before the range.
            make_transaction(
                "t1",
                at(2026, 5, 31),
                AdType::InlineContentAd,
                ConfirmationType::Viewed,
                0.01,
            ),
            // In range.
            make_transaction(
                "t2",
                at(2026, 6, 2),
                AdType::InlineContentAd,
                ConfirmationType::Viewed,
                0.01,
            ),
            make_transaction(
                "t3",
                at(2026, 6, 10),
                AdType::NotificationAd,
                ConfirmationType::Viewed,
                0.02,
            ),
            // In range but clicked, not viewed.
            make_transaction(
                "t4",
                at(2026, 6, 10),
                AdType::InlineContentAd,
                ConfirmationType::Clicked,
                0.05,
            ),
            // After the range.
            make_transaction(
                "t5",
                at(2026, 7, 1),
                AdType::NewTabPageAd,
                ConfirmationType::Viewed,
                0.01,
            ),
        ];
        let summary =
            ads_summary_for_date_range(&transactions, at(2026, 6, 1), at(2026, 6, 30));
        assert_eq!(summary.len(), 2);
        assert_eq!(summary.get(&AdType::InlineContentAd), Some(&1));
        assert_eq!(summary.get(&AdType::NotificationAd), Some(&1));
        assert_eq!(summary.get(&AdType::NewTabPageAd), None);
    }

    #[test]
    fn empty_ledger_yields_empty_summary() {
        let summary = ads_summary_for_date_range(&[], at(2026, 6, 1), at(2026, 6, 30));
        assert!(summary.is_empty());
    }

    #[test]
    fn statement_splits_months_and_counts_views() {
        let transactions = vec![
            make_transaction(
                "t1",
                at(2026, 5, 20),
                AdType::InlineContentAd,
                ConfirmationType::Viewed,
                0.03,
            ),
            make_transaction(
                "t2",
                at(2026, 6, 3),
                AdType::InlineContentAd,
                ConfirmationType::Viewed,
                0.01,
            ),
            make_transaction(
                "t3",
                at(2026, 6, 7),
                AdType::NotificationAd,
                ConfirmationType::Clicked,
                0.05,
            ),
            // Two months back, contributes to neither bucket.
            make_transaction(
                "t4",
                at(2026, 4, 15),
                AdType::InlineContentAd,
                ConfirmationType::Viewed,
                0.10,
            ),
        ];
        let statement = build_statement(&transactions, at(2026, 6, 15));
        assert!((statement.earnings_last_month - 0.03).abs() < f64::EPSILON);
        assert!((statement.earnings_this_month - 0.06).abs() < f64::EPSILON);
        assert_eq!(statement.ads_received_this_month, 1);
        assert_eq!(statement.next_payment_date, {
            let Some(ts) = Utc.with_ymd_and_hms(2026, 7, 5, 0, 0, 0).single() else {
                panic!("bad payment date");
            };
            ts
        });
    }

    #[test]
    fn statement_handles_year_boundaries() {
        let transactions = vec![make_transaction(
            "t1",
            at(2025, 12, 28),
            AdType::InlineContentAd,
            ConfirmationType::Viewed,
            0.02,
        )];
        let statement = build_statement(&transactions, at(2026, 1, 10));
        assert!((statement.earnings_last_month - 0.02).abs() < f64::EPSILON);
        assert!(statement.earnings_this_month.abs() < f64::EPSILON);
        let Some(expected) = Utc.with_ymd_and_hms(2026, 2, 5, 0, 0, 0).single() else {
            panic!("bad payment date");
        };
        assert_eq!(statement.next_payment_date, expected);
    }
}
