//! Serving orchestrator.
//!
//! [`AdServingService`] runs the full pipeline for a serving request:
//! opt-in gate, catalog query, exclusion rule chain, scoring, weighted
//! sampling, and ad event recording. It also handles externally
//! triggered confirmations (viewed, clicked, dismissed) and exposes the
//! read paths (statement, summary, interaction history) built on the
//! same storage.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::config::ServingConfig;
use crate::domain::{
    AdEvent, AdType, ConfirmationType, CreativeAd, EventBus, PlacementId, ServingEvent, UserModel,
};
use crate::eligibility::{
    AdvertiserCapRule, AlreadySeenRule, AntiTargetingResource, AntiTargetingRule, CampaignCapRule,
    DismissedRule, ExclusionRule, LastServedRule, SubdivisionRule, apply_exclusion_rules,
};
use crate::error::ServingError;
use crate::persistence::SqliteStore;
use crate::predictor::sampling::sample_ad_from_predictors;
use crate::predictor::{ScoringStrategy, SegmentScoring, build_predictor_map};

use super::collaborators::{
    AccountDepositor, BrowsingHistoryProvider, LedgerDepositor, NoBrowsingHistory,
};
use super::history::{AdInteractionLog, InteractionEntry};
use super::statement::{Statement, ads_summary_for_date_range, build_statement};

/// Tuning knobs for the serving pipeline, derived from configuration.
#[derive(Debug, Clone)]
pub struct ServingParams {
    /// Ad types the user has opted in to.
    pub opted_in_ad_types: HashSet<AdType>,
    /// Maximum served events per campaign within the cap window.
    pub campaign_frequency_cap: usize,
    /// Maximum served events per advertiser within the cap window.
    pub advertiser_frequency_cap: usize,
    /// Rolling window over which frequency caps are counted.
    pub frequency_cap_window: Duration,
    /// Maximum browsing history entries fetched per serve.
    pub browsing_history_max_count: usize,
    /// How far back browsing history is fetched, in days.
    pub browsing_history_days_ago: u32,
    /// Current geo subdivision code (empty when unknown).
    pub subdivision_code: String,
    /// Ad events older than this are removed by the expiry purge.
    pub ad_event_retention: Duration,
}

impl Default for ServingParams {
    fn default() -> Self {
        Self {
            opted_in_ad_types: AdType::all().iter().copied().collect(),
            campaign_frequency_cap: 5,
            advertiser_frequency_cap: 10,
            frequency_cap_window: Duration::hours(24),
            browsing_history_max_count: 5000,
            browsing_history_days_ago: 180,
            subdivision_code: String::new(),
            ad_event_retention: Duration::days(90),
        }
    }
}

impl From<&ServingConfig> for ServingParams {
    fn from(config: &ServingConfig) -> Self {
        Self {
            opted_in_ad_types: config.opted_in_ad_types.clone(),
            campaign_frequency_cap: config.campaign_frequency_cap,
            advertiser_frequency_cap: config.advertiser_frequency_cap,
            frequency_cap_window: Duration::hours(i64::from(config.frequency_cap_window_hours)),
            browsing_history_max_count: config.browsing_history_max_count,
            browsing_history_days_ago: config.browsing_history_days_ago,
            subdivision_code: config.subdivision_code.clone(),
            ad_event_retention: Duration::days(i64::from(config.ad_event_retention_days)),
        }
    }
}

/// Result of one serving request.
///
/// `ad == None` is a legitimate outcome, not an error. `had_opportunity`
/// distinguishes "catalog had no inventory at all" (false) from
/// "inventory existed but exclusion or sampling removed everything"
/// (true).
#[derive(Debug, Clone)]
pub struct ServeOutcome {
    /// Placement created when an ad was served.
    pub placement_id: Option<PlacementId>,
    /// Placement shape that was requested.
    pub dimensions: String,
    /// The chosen creative, if any.
    pub ad: Option<CreativeAd>,
    /// Whether eligible inventory existed for the request.
    pub had_opportunity: bool,
}

impl ServeOutcome {
    fn no_ad(dimensions: &str, had_opportunity: bool) -> Self {
        Self {
            placement_id: None,
            dimensions: dimensions.to_string(),
            ad: None,
            had_opportunity,
        }
    }
}

/// Coordinates the serving pipeline and confirmation handling.
#[derive(Debug)]
pub struct AdServingService {
    store: SqliteStore,
    event_bus: EventBus,
    params: ServingParams,
    scoring: Arc<dyn ScoringStrategy>,
    browsing: Arc<dyn BrowsingHistoryProvider>,
    depositor: Arc<dyn AccountDepositor>,
    anti_targeting: AntiTargetingResource,
    last_served: RwLock<Option<String>>,
    last_clicked: RwLock<Option<String>>,
    interactions: AdInteractionLog,
}

impl AdServingService {
    /// Creates a service with the default collaborators: segment
    /// scoring, no browsing history source, and a ledger depositor
    /// writing to `store`.
    #[must_use]
    pub fn new(store: SqliteStore, event_bus: EventBus, params: ServingParams) -> Self {
        let depositor = LedgerDepositor::new(store.clone());
        Self {
            store,
            event_bus,
            params,
            scoring: Arc::new(SegmentScoring),
            browsing: Arc::new(NoBrowsingHistory),
            depositor: Arc::new(depositor),
            anti_targeting: AntiTargetingResource::default(),
            last_served: RwLock::new(None),
            last_clicked: RwLock::new(None),
            interactions: AdInteractionLog::new(),
        }
    }

    /// Replaces the scoring strategy.
    #[must_use]
    pub fn with_scoring(mut self, scoring: Arc<dyn ScoringStrategy>) -> Self {
        self.scoring = scoring;
        self
    }

    /// Replaces the browsing history provider.
    #[must_use]
    pub fn with_browsing_history(mut self, browsing: Arc<dyn BrowsingHistoryProvider>) -> Self {
        self.browsing = browsing;
        self
    }

    /// Replaces the account depositor.
    #[must_use]
    pub fn with_depositor(mut self, depositor: Arc<dyn AccountDepositor>) -> Self {
        self.depositor = depositor;
        self
    }

    /// Installs an anti-targeting resource.
    #[must_use]
    pub fn with_anti_targeting(mut self, resource: AntiTargetingResource) -> Self {
        self.anti_targeting = resource;
        self
    }

    /// Returns the opted-in ad types, sorted for stable output.
    #[must_use]
    pub fn opted_in_ad_types(&self) -> Vec<AdType> {
        let mut types: Vec<AdType> = self.params.opted_in_ad_types.iter().copied().collect();
        types.sort();
        types
    }

    /// Runs the serving pipeline for one placement request.
    ///
    /// Requests for ad types the user has not opted in to terminate
    /// immediately: no ad, no opportunity, nothing published on the bus.
    ///
    /// # Errors
    ///
    /// Returns an error only on storage or collaborator failure; an
    /// empty or fully excluded catalog is reported through the outcome.
    pub async fn maybe_serve(
        &self,
        ad_type: AdType,
        dimensions: &str,
        segments: Vec<String>,
    ) -> Result<ServeOutcome, ServingError> {
        if !self.params.opted_in_ad_types.contains(&ad_type) {
            tracing::debug!(ad_type = ad_type.as_str(), "ad type not opted in");
            return Ok(ServeOutcome::no_ad(dimensions, false));
        }

        let ad_events = self.store.ad_events_for_type(ad_type).await?;
        let browsing_history = self
            .browsing
            .browsing_history(
                self.params.browsing_history_max_count,
                self.params.browsing_history_days_ago,
            )
            .await?;
        let candidates = self
            .store
            .creative_ads_for_dimensions(ad_type, dimensions)
            .await?;

        let now = Utc::now();
        if candidates.is_empty() {
            self.event_bus.publish(ServingEvent::NoOpportunity {
                ad_type,
                dimensions: dimensions.to_string(),
                had_opportunity: false,
                timestamp: now,
            });
            return Ok(ServeOutcome::no_ad(dimensions, false));
        }

        self.event_bus.publish(ServingEvent::Opportunity {
            ad_type,
            dimensions: dimensions.to_string(),
            timestamp: now,
        });

        let last_served = self.last_served.read().await.clone();
        let rules: Vec<Box<dyn ExclusionRule>> = vec![
            Box::new(AlreadySeenRule::new(&ad_events)),
            Box::new(DismissedRule::new(&ad_events)),
            Box::new(CampaignCapRule::new(
                &ad_events,
                now,
                self.params.frequency_cap_window,
                self.params.campaign_frequency_cap,
            )),
            Box::new(AdvertiserCapRule::new(
                &ad_events,
                now,
                self.params.frequency_cap_window,
                self.params.advertiser_frequency_cap,
            )),
            Box::new(AntiTargetingRule::new(
                &self.anti_targeting,
                &browsing_history,
            )),
            Box::new(SubdivisionRule::new(self.params.subdivision_code.clone())),
            Box::new(LastServedRule::new(last_served)),
        ];
        let eligible = apply_exclusion_rules(candidates, &rules);
        if eligible.is_empty() {
            self.event_bus.publish(ServingEvent::NoOpportunity {
                ad_type,
                dimensions: dimensions.to_string(),
                had_opportunity: true,
                timestamp: now,
            });
            return Ok(ServeOutcome::no_ad(dimensions, true));
        }

        let user_model = UserModel::new(segments, browsing_history);
        let predictors =
            build_predictor_map(&eligible, &user_model, &ad_events, self.scoring.as_ref());
        let Some(chosen) = sample_ad_from_predictors(&predictors) else {
            self.event_bus.publish(ServingEvent::NoOpportunity {
                ad_type,
                dimensions: dimensions.to_string(),
                had_opportunity: true,
                timestamp: now,
            });
            return Ok(ServeOutcome::no_ad(dimensions, true));
        };

        let placement_id = PlacementId::new();
        let served = AdEvent::for_creative(&chosen, placement_id, ConfirmationType::Served, now);
        self.store.record_ad_event(&served).await?;
        *self.last_served.write().await = Some(chosen.creative_instance_id.clone());

        self.event_bus.publish(ServingEvent::ServedAd {
            placement_id,
            creative_instance_id: chosen.creative_instance_id.clone(),
            ad_type,
            dimensions: dimensions.to_string(),
            timestamp: now,
        });
        tracing::info!(
            placement_id = %placement_id,
            creative_instance_id = %chosen.creative_instance_id,
            ad_type = ad_type.as_str(),
            "served ad"
        );

        Ok(ServeOutcome {
            placement_id: Some(placement_id),
            dimensions: dimensions.to_string(),
            ad: Some(chosen),
            had_opportunity: true,
        })
    }

    /// Records an externally triggered confirmation for a placement.
    ///
    /// The placement must carry a served event whose creative matches
    /// `creative_instance_id`; the recorded follow-up shares that
    /// event's creative lineage. Deposit-worthy confirmations also
    /// credit the account, where a deposit failure is logged but never
    /// fails the trigger.
    ///
    /// # Errors
    ///
    /// - [`ServingError::InvalidEventType`] when `confirmation_type` is
    ///   `served`, which only the pipeline itself may record.
    /// - [`ServingError::PlacementNotFound`] when no served event exists
    ///   for the placement.
    /// - [`ServingError::InvalidRequest`] when the creative does not
    ///   match the placement's served creative.
    pub async fn trigger_event(
        &self,
        placement_id: PlacementId,
        creative_instance_id: &str,
        confirmation_type: ConfirmationType,
    ) -> Result<AdEvent, ServingError> {
        if confirmation_type == ConfirmationType::Served {
            return Err(ServingError::InvalidEventType(
                confirmation_type.as_str().to_string(),
            ));
        }

        let served = self
            .store
            .served_ad_event(placement_id)
            .await?
            .ok_or_else(|| ServingError::PlacementNotFound(placement_id.into()))?;
        if served.creative_instance_id != creative_instance_id {
            return Err(ServingError::InvalidRequest(format!(
                "creative {creative_instance_id} was not served for placement {placement_id}"
            )));
        }

        let event = served.follow_up(confirmation_type, Utc::now());
        self.store.record_ad_event(&event).await?;
        tracing::info!(
            placement_id = %placement_id,
            creative_instance_id = %event.creative_instance_id,
            confirmation_type = confirmation_type.as_str(),
            "recorded confirmation"
        );

        if let Some(bus_event) = confirmation_bus_event(&event) {
            self.interactions
                .append(InteractionEntry {
                    placement_id,
                    creative_instance_id: event.creative_instance_id.clone(),
                    ad_type: event.ad_type,
                    confirmation_type,
                    created_at: event.created_at,
                })
                .await;
            self.event_bus.publish(bus_event);
        }

        if confirmation_type == ConfirmationType::Clicked {
            *self.last_clicked.write().await = Some(event.creative_instance_id.clone());
        }

        if confirmation_type.is_deposit_worthy() {
            self.deposit_for(&event, confirmation_type).await;
        }

        Ok(event)
    }

    /// Credits the account for a deposit-worthy confirmation. Failures
    /// are logged; the confirmation has already been recorded.
    async fn deposit_for(&self, event: &AdEvent, confirmation_type: ConfirmationType) {
        match self
            .store
            .creative_ad_for_instance(&event.creative_instance_id)
            .await
        {
            Ok(Some(creative)) => {
                if let Err(error) = self
                    .depositor
                    .deposit(
                        &event.creative_instance_id,
                        &creative.segment,
                        event.ad_type,
                        confirmation_type,
                    )
                    .await
                {
                    tracing::warn!(
                        creative_instance_id = %event.creative_instance_id,
                        error = %error,
                        "deposit failed"
                    );
                }
            }
            Ok(None) => {
                tracing::warn!(
                    creative_instance_id = %event.creative_instance_id,
                    "creative missing from catalog, deposit skipped"
                );
            }
            Err(error) => {
                tracing::warn!(
                    creative_instance_id = %event.creative_instance_id,
                    error = %error,
                    "catalog lookup failed, deposit skipped"
                );
            }
        }
    }

    /// Deletes ad events older than the configured retention.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub async fn purge_expired_ad_events(&self) -> Result<u64, ServingError> {
        let purged = self
            .store
            .purge_expired_ad_events(self.params.ad_event_retention)
            .await?;
        if purged > 0 {
            tracing::info!(purged, "purged expired ad events");
        }
        Ok(purged)
    }

    /// Deletes ad events of `ad_type` whose placement is not in
    /// `valid_placements`.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub async fn purge_orphaned_ad_events(
        &self,
        ad_type: AdType,
        valid_placements: &[PlacementId],
    ) -> Result<u64, ServingError> {
        let purged = self
            .store
            .purge_orphaned_ad_events(ad_type, valid_placements)
            .await?;
        if purged > 0 {
            tracing::info!(purged, ad_type = ad_type.as_str(), "purged orphaned ad events");
        }
        Ok(purged)
    }

    /// Replaces or inserts catalog creatives.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub async fn refresh_catalog(&self, creatives: &[CreativeAd]) -> Result<(), ServingError> {
        self.store.save_creative_ads(creatives).await?;
        tracing::info!(count = creatives.len(), "refreshed creative catalog");
        Ok(())
    }

    /// Lists catalog creatives matching an ad type and dimensions.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub async fn catalog_for_dimensions(
        &self,
        ad_type: AdType,
        dimensions: &str,
    ) -> Result<Vec<CreativeAd>, ServingError> {
        self.store
            .creative_ads_for_dimensions(ad_type, dimensions)
            .await
    }

    /// Builds the earnings statement for the current calendar month.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub async fn statement(&self) -> Result<Statement, ServingError> {
        let transactions = self.store.all_transactions().await?;
        Ok(build_statement(&transactions, Utc::now()))
    }

    /// Counts viewed confirmations per ad type within `[from, to]`.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub async fn ads_summary(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<std::collections::BTreeMap<AdType, u64>, ServingError> {
        let transactions = self.store.transactions_for_date_range(from, to).await?;
        Ok(ads_summary_for_date_range(&transactions, from, to))
    }

    /// Returns the recorded interaction history, oldest first.
    pub async fn interactions(&self) -> Vec<InteractionEntry> {
        self.interactions.entries().await
    }

    /// Returns the creative instance the user clicked most recently.
    pub async fn last_clicked(&self) -> Option<String> {
        self.last_clicked.read().await.clone()
    }
}

/// Maps a recorded confirmation to its bus event, if it is one of the
/// externally visible interactions.
fn confirmation_bus_event(event: &AdEvent) -> Option<ServingEvent> {
    match event.confirmation_type {
        ConfirmationType::Viewed => Some(ServingEvent::ViewedAd {
            placement_id: event.placement_id,
            creative_instance_id: event.creative_instance_id.clone(),
            ad_type: event.ad_type,
            timestamp: event.created_at,
        }),
        ConfirmationType::Clicked => Some(ServingEvent::ClickedAd {
            placement_id: event.placement_id,
            creative_instance_id: event.creative_instance_id.clone(),
            ad_type: event.ad_type,
            timestamp: event.created_at,
        }),
        ConfirmationType::Dismissed => Some(ServingEvent::DismissedAd {
            placement_id: event.placement_id,
            creative_instance_id: event.creative_instance_id.clone(),
            ad_type: event.ad_type,
            timestamp: event.created_at,
        }),
        ConfirmationType::Served | ConfirmationType::Landed | ConfirmationType::Conversion => None,
    }
}
