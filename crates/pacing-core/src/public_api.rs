//! Stable, public-facing entry points that wrap the internal services.
//!
//! External schedulers, transaction boundaries and the CLI call into
//! [`PacingApi`] instead of wiring ledgers and engines themselves.

use std::sync::Arc;

use chrono::NaiveDate;
use pacing_domain::{Brand, Campaign, DaypartingSchedule, SpendLog};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    dayparting::DaypartingEvaluator,
    error::{CoreError, Result},
    ledger::{BrandSummary, BudgetLedger},
    policy::{ActivationDecision, ActivationPolicy},
    reconcile::{CampaignChange, ChangeSummary, PassKind, ReconcileScope, ReconciliationEngine},
    reset::{ResetScheduler, ResetSummary},
    storage::PacingStore,
    time::Clock,
    DEFAULT_CONFLICT_RETRIES,
};

/// Combined result of the budget sweep followed by the dayparting pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCheck {
    pub budgets: ChangeSummary,
    pub dayparting: ChangeSummary,
}

impl StatusCheck {
    pub fn describe(&self) -> String {
        format!(
            "Budget check: {}; Dayparting check: {}",
            self.budgets.describe(),
            self.dayparting.describe()
        )
    }
}

/// Point-in-time view of one campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignPerformance {
    pub campaign_id: Uuid,
    pub name: String,
    pub brand: String,
    pub is_active: bool,
    pub should_be_active: bool,
    pub blocking_reasons: Vec<String>,
    pub spend_today: Decimal,
    pub total_spend: Decimal,
    pub has_dayparting: bool,
    pub in_dayparting_window: bool,
}

/// Facade over the ledger, the reconciliation engine and the reset scheduler.
#[derive(Clone)]
pub struct PacingApi {
    store: Arc<dyn PacingStore>,
    clock: Arc<dyn Clock>,
    ledger: BudgetLedger,
    engine: ReconciliationEngine,
    resets: ResetScheduler,
}

impl PacingApi {
    pub fn new(store: Arc<dyn PacingStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_max_retries(store, clock, DEFAULT_CONFLICT_RETRIES)
    }

    pub fn with_max_retries(
        store: Arc<dyn PacingStore>,
        clock: Arc<dyn Clock>,
        max_retries: u32,
    ) -> Self {
        let ledger = BudgetLedger::new(store.clone(), clock.clone()).with_max_retries(max_retries);
        let engine =
            ReconciliationEngine::new(store.clone(), clock.clone()).with_max_retries(max_retries);
        let resets =
            ResetScheduler::new(store.clone(), clock.clone(), ledger.clone(), engine.clone());
        Self {
            store,
            clock,
            ledger,
            engine,
            resets,
        }
    }

    pub fn store(&self) -> &Arc<dyn PacingStore> {
        &self.store
    }

    pub fn ledger(&self) -> &BudgetLedger {
        &self.ledger
    }

    pub fn engine(&self) -> &ReconciliationEngine {
        &self.engine
    }

    /// Creates a brand with zeroed accumulators.
    pub fn register_brand(
        &self,
        name: impl Into<String>,
        daily_budget: Decimal,
        monthly_budget: Decimal,
    ) -> Result<Brand> {
        let name = required_name(name.into(), "brand")?;
        if daily_budget < Decimal::ZERO || monthly_budget < Decimal::ZERO {
            return Err(CoreError::Validation(
                "budgets must not be negative".to_string(),
            ));
        }
        let brand = Brand::new_at(name, daily_budget, monthly_budget, self.clock.now());
        self.store.insert_brand(brand.clone())?;
        Ok(brand)
    }

    /// Creates an active, unscheduled campaign under `brand_id`.
    pub fn register_campaign(&self, brand_id: Uuid, name: impl Into<String>) -> Result<Campaign> {
        let name = required_name(name.into(), "campaign")?;
        let campaign = Campaign::new_at(name, brand_id, self.clock.now());
        self.store.insert_campaign(campaign.clone())?;
        Ok(campaign)
    }

    /// Attaches or replaces a campaign's dayparting window.
    pub fn set_dayparting(
        &self,
        campaign_id: Uuid,
        schedule: DaypartingSchedule,
    ) -> Result<Campaign> {
        DaypartingEvaluator::validate(&schedule)?;
        self.store
            .set_dayparting(campaign_id, Some(schedule), self.clock.now())
    }

    /// Removes a campaign's dayparting window so it may run at any time.
    pub fn clear_dayparting(&self, campaign_id: Uuid) -> Result<Campaign> {
        self.dayparting_schedule(campaign_id)?;
        self.store
            .set_dayparting(campaign_id, None, self.clock.now())
    }

    pub fn dayparting_schedule(&self, campaign_id: Uuid) -> Result<DaypartingSchedule> {
        self.store
            .campaign(campaign_id)?
            .dayparting
            .ok_or(CoreError::ScheduleNotFound(campaign_id))
    }

    pub fn record_spend(
        &self,
        campaign_id: Uuid,
        amount: Decimal,
        description: Option<String>,
    ) -> Result<SpendLog> {
        self.ledger.record_spend(campaign_id, amount, description)
    }

    pub fn enforce_budgets(&self) -> ChangeSummary {
        self.engine.enforce_budgets()
    }

    pub fn enforce_dayparting(&self) -> ChangeSummary {
        self.engine.enforce_dayparting()
    }

    pub fn reconcile(&self, scope: ReconcileScope) -> ChangeSummary {
        self.engine.reconcile(scope)
    }

    pub fn check_and_update_campaign_status(&self) -> StatusCheck {
        StatusCheck {
            budgets: self.engine.enforce_budgets(),
            dayparting: self.engine.enforce_dayparting(),
        }
    }

    /// Full-policy update of a single campaign; unlike a pass, lookup failures surface here.
    pub fn update_campaign_status(&self, campaign_id: Uuid) -> Result<Option<CampaignChange>> {
        self.engine.reconcile_campaign(campaign_id, PassKind::Full)
    }

    pub fn reset_daily_monthly(&self, as_of: NaiveDate) -> ResetSummary {
        self.resets.reset_all(as_of)
    }

    pub fn reset_today(&self) -> ResetSummary {
        self.resets.reset_today()
    }

    pub fn get_brand_summary(&self, brand_id: Uuid) -> Result<BrandSummary> {
        self.ledger.brand_summary(brand_id)
    }

    pub fn decide(&self, campaign_id: Uuid) -> Result<ActivationDecision> {
        let campaign = self.store.campaign(campaign_id)?;
        let brand = self.store.brand(campaign.brand_id)?;
        ActivationPolicy::decide(&brand, &campaign, self.clock.now())
    }

    pub fn should_campaign_be_active(&self, campaign_id: Uuid) -> Result<(bool, Vec<String>)> {
        let decision = self.decide(campaign_id)?;
        Ok((decision.should_be_active, decision.reason_labels()))
    }

    pub fn campaign_performance(&self, campaign_id: Uuid) -> Result<CampaignPerformance> {
        let campaign = self.store.campaign(campaign_id)?;
        let brand = self.store.brand(campaign.brand_id)?;
        let now = self.clock.now();
        let decision = ActivationPolicy::decide(&brand, &campaign, now)?;
        Ok(CampaignPerformance {
            campaign_id: campaign.id,
            name: campaign.name.clone(),
            brand: brand.name.clone(),
            is_active: campaign.is_active,
            should_be_active: decision.should_be_active,
            blocking_reasons: decision.reason_labels(),
            spend_today: self.ledger.campaign_spend_today(campaign.id)?,
            total_spend: self.ledger.campaign_total_spend(campaign.id)?,
            has_dayparting: campaign.has_dayparting(),
            in_dayparting_window: DaypartingEvaluator::is_campaign_in_window(&campaign, now)?,
        })
    }
}

fn required_name(name: String, kind: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{kind} name must not be empty")));
    }
    Ok(trimmed.to_string())
}
