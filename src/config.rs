//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::collections::HashSet;
use std::net::SocketAddr;

use crate::domain::AdType;

/// Top-level serving configuration.
///
/// Loaded once at startup via [`ServingConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ServingConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// SQLite connection string.
    pub database_url: String,

    /// Maximum number of database connections in the pool.
    pub database_max_connections: u32,

    /// Ad events older than this many days are deleted by the expiry purge.
    pub ad_event_retention_days: u32,

    /// Seconds between automatic expired-event purges (0 = never).
    pub purge_interval_secs: u64,

    /// Maximum served events per campaign within the cap window.
    pub campaign_frequency_cap: usize,

    /// Maximum served events per advertiser within the cap window.
    pub advertiser_frequency_cap: usize,

    /// Rolling window in hours over which frequency caps are counted.
    pub frequency_cap_window_hours: u32,

    /// Maximum number of browsing history entries fetched per serve.
    pub browsing_history_max_count: usize,

    /// How far back browsing history is fetched, in days.
    pub browsing_history_days_ago: u32,

    /// Ad types the user has opted in to. Serving any other type
    /// terminates immediately with no ad and no opportunity recorded.
    pub opted_in_ad_types: HashSet<AdType>,

    /// Current geo subdivision code (e.g. `US-CA`). Creatives carrying
    /// geo targets are excluded unless one matches this code.
    pub subdivision_code: String,

    /// Optional path to a JSON anti-targeting site list, keyed by
    /// creative set ID.
    pub anti_targeting_path: Option<String>,

    /// Capacity of the EventBus broadcast channel.
    pub event_bus_capacity: usize,
}

impl ServingConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://adserve.db?mode=rwc".to_string());

        let database_max_connections = parse_env("DATABASE_MAX_CONNECTIONS", 5);

        let ad_event_retention_days = parse_env("AD_EVENT_RETENTION_DAYS", 90);
        let purge_interval_secs = parse_env("PURGE_INTERVAL_SECS", 3600);

        let campaign_frequency_cap = parse_env("CAMPAIGN_FREQUENCY_CAP", 5);
        let advertiser_frequency_cap = parse_env("ADVERTISER_FREQUENCY_CAP", 10);
        let frequency_cap_window_hours = parse_env("FREQUENCY_CAP_WINDOW_HOURS", 24);

        let browsing_history_max_count = parse_env("BROWSING_HISTORY_MAX_COUNT", 5000);
        let browsing_history_days_ago = parse_env("BROWSING_HISTORY_DAYS_AGO", 180);

        let opted_in_ad_types = parse_env_ad_types("OPTED_IN_AD_TYPES");

        let subdivision_code = std::env::var("SUBDIVISION_CODE").unwrap_or_default();
        let anti_targeting_path = std::env::var("ANTI_TARGETING_PATH").ok();

        let event_bus_capacity = parse_env("EVENT_BUS_CAPACITY", 10_000);

        Ok(Self {
            listen_addr,
            database_url,
            database_max_connections,
            ad_event_retention_days,
            purge_interval_secs,
            campaign_frequency_cap,
            advertiser_frequency_cap,
            frequency_cap_window_hours,
            browsing_history_max_count,
            browsing_history_days_ago,
            opted_in_ad_types,
            subdivision_code,
            anti_targeting_path,
            event_bus_capacity,
        })
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses a comma-separated list of ad types. Missing or empty values
/// opt in to every ad type; unknown entries are ignored.
fn parse_env_ad_types(key: &str) -> HashSet<AdType> {
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect(),
        _ => AdType::all().iter().copied().collect(),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn parse_env_falls_back_on_missing() {
        let value: u32 = parse_env("ADSERVE_TEST_MISSING_KEY", 42);
        assert_eq!(value, 42);
    }

    #[test]
    fn ad_types_default_to_all() {
        let types = parse_env_ad_types("ADSERVE_TEST_MISSING_AD_TYPES");
        assert_eq!(types.len(), AdType::all().len());
    }
}
