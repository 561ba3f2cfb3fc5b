//! Spend recording and brand budget queries.

use std::sync::Arc;

use chrono::NaiveDate;
use pacing_domain::{Brand, SpendLog};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    error::{CoreError, Result},
    storage::{PacingStore, SpendPeriod},
    time::Clock,
    DEFAULT_CONFLICT_RETRIES,
};

/// Budget position of a brand at the time of the read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandSummary {
    pub brand_id: Uuid,
    pub name: String,
    pub daily_budget: Decimal,
    pub monthly_budget: Decimal,
    pub current_daily_spend: Decimal,
    pub current_monthly_spend: Decimal,
    pub daily_remaining: Decimal,
    pub monthly_remaining: Decimal,
    pub daily_exceeded: bool,
    pub monthly_exceeded: bool,
    pub active_campaigns: usize,
    pub total_campaigns: usize,
}

/// Owns the link between spend logs and brand accumulators.
#[derive(Clone)]
pub struct BudgetLedger {
    store: Arc<dyn PacingStore>,
    clock: Arc<dyn Clock>,
    max_retries: u32,
}

impl BudgetLedger {
    pub fn new(store: Arc<dyn PacingStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            max_retries: DEFAULT_CONFLICT_RETRIES,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Appends a spend log and raises both of the brand's accumulators by `amount`.
    ///
    /// The log and the accumulator update land together or not at all. A lost
    /// race against another writer on the same brand is retried with a fresh
    /// read up to the configured limit.
    pub fn record_spend(
        &self,
        campaign_id: Uuid,
        amount: Decimal,
        description: Option<String>,
    ) -> Result<SpendLog> {
        if amount <= Decimal::ZERO {
            return Err(CoreError::InvalidAmount(amount));
        }
        let campaign = self.store.campaign(campaign_id)?;

        let mut attempt = 0;
        loop {
            let brand = self.store.brand(campaign.brand_id)?;
            let log = SpendLog::new(
                campaign.id,
                brand.id,
                amount,
                self.clock.now(),
                description.clone(),
            );
            match self.store.commit_spend(log.clone(), brand.version) {
                Ok(updated) => {
                    info!(
                        campaign = %campaign.name,
                        brand = %updated.name,
                        %amount,
                        daily_spend = %updated.current_daily_spend,
                        monthly_spend = %updated.current_monthly_spend,
                        "Recorded spend"
                    );
                    return Ok(log);
                }
                Err(err) if err.is_conflict() && attempt < self.max_retries => {
                    attempt += 1;
                    debug!(brand = %brand.name, attempt, "Spend commit lost a race, retrying");
                }
                Err(err) => {
                    if err.is_conflict() {
                        warn!(brand = %brand.name, attempts = attempt + 1, "Spend commit retries exhausted");
                    }
                    return Err(err);
                }
            }
        }
    }

    pub fn is_daily_exceeded(&self, brand_id: Uuid) -> Result<bool> {
        Ok(self.store.brand(brand_id)?.is_daily_exceeded())
    }

    pub fn is_monthly_exceeded(&self, brand_id: Uuid) -> Result<bool> {
        Ok(self.store.brand(brand_id)?.is_monthly_exceeded())
    }

    pub fn reset_daily(&self, brand_id: Uuid) -> Result<Brand> {
        self.reset(brand_id, &[SpendPeriod::Daily])
    }

    pub fn reset_monthly(&self, brand_id: Uuid) -> Result<Brand> {
        self.reset(brand_id, &[SpendPeriod::Monthly])
    }

    pub(crate) fn reset(&self, brand_id: Uuid, periods: &[SpendPeriod]) -> Result<Brand> {
        let brand = self.store.reset_spend(brand_id, periods, self.clock.now())?;
        debug!(brand = %brand.name, ?periods, "Reset spend accumulators");
        Ok(brand)
    }

    pub fn brand_summary(&self, brand_id: Uuid) -> Result<BrandSummary> {
        let brand = self.store.brand(brand_id)?;
        let campaigns = self.store.campaigns_for_brand(brand_id)?;
        Ok(BrandSummary {
            brand_id: brand.id,
            name: brand.name.clone(),
            daily_budget: brand.daily_budget,
            monthly_budget: brand.monthly_budget,
            current_daily_spend: brand.current_daily_spend,
            current_monthly_spend: brand.current_monthly_spend,
            daily_remaining: brand.daily_remaining(),
            monthly_remaining: brand.monthly_remaining(),
            daily_exceeded: brand.is_daily_exceeded(),
            monthly_exceeded: brand.is_monthly_exceeded(),
            active_campaigns: campaigns.iter().filter(|c| c.is_active).count(),
            total_campaigns: campaigns.len(),
        })
    }

    /// Sum of the campaign's spend logged on `date` (UTC).
    pub fn campaign_spend_on(&self, campaign_id: Uuid, date: NaiveDate) -> Result<Decimal> {
        Ok(self
            .store
            .spend_logs_for_campaign(campaign_id)?
            .iter()
            .filter(|log| log.date() == date)
            .map(|log| log.amount)
            .sum())
    }

    pub fn campaign_spend_today(&self, campaign_id: Uuid) -> Result<Decimal> {
        self.campaign_spend_on(campaign_id, self.clock.today())
    }

    pub fn campaign_total_spend(&self, campaign_id: Uuid) -> Result<Decimal> {
        Ok(self
            .store
            .spend_logs_for_campaign(campaign_id)?
            .iter()
            .map(|log| log.amount)
            .sum())
    }
}
