use std::collections::HashSet;

use chrono::{DateTime, Utc};
use pacing_domain::{Brand, Campaign, DaypartingSchedule, SpendLog};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

/// Accumulator selector for spend resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpendPeriod {
    Daily,
    Monthly,
}

/// Abstraction over the shared brand/campaign state.
///
/// Reads hand out clones; the only writes are the atomic operations below, so
/// callers cannot mutate stored accumulators or activation flags directly.
pub trait PacingStore: Send + Sync {
    fn brand(&self, id: Uuid) -> Result<Brand>;
    fn brands(&self) -> Vec<Brand>;
    fn campaign(&self, id: Uuid) -> Result<Campaign>;
    fn campaigns(&self) -> Vec<Campaign>;
    fn campaigns_for_brand(&self, brand_id: Uuid) -> Result<Vec<Campaign>>;
    fn spend_logs_for_campaign(&self, campaign_id: Uuid) -> Result<Vec<SpendLog>>;

    /// Adds a brand. Names are unique.
    fn insert_brand(&self, brand: Brand) -> Result<()>;
    /// Adds a campaign to an existing brand. Names are unique per brand.
    fn insert_campaign(&self, campaign: Campaign) -> Result<()>;
    /// Attaches, replaces or removes a campaign's schedule.
    fn set_dayparting(
        &self,
        campaign_id: Uuid,
        schedule: Option<DaypartingSchedule>,
        at: DateTime<Utc>,
    ) -> Result<Campaign>;

    /// Appends `log` and adds its amount to the owning brand's accumulators as one
    /// unit. Fails with a conflict, touching nothing, when the brand is no longer
    /// at `expected_version`.
    fn commit_spend(&self, log: SpendLog, expected_version: u64) -> Result<Brand>;

    /// Zeroes the selected accumulators. Spend logs are left untouched.
    fn reset_spend(
        &self,
        brand_id: Uuid,
        periods: &[SpendPeriod],
        at: DateTime<Utc>,
    ) -> Result<Brand>;

    /// Sets `is_active` if the campaign is still at `expected_version` and its
    /// brand is still at `expected_brand_version`. Either mismatch is a conflict
    /// and leaves the campaign untouched.
    fn set_campaign_active(
        &self,
        campaign_id: Uuid,
        expected_version: u64,
        expected_brand_version: u64,
        active: bool,
        at: DateTime<Utc>,
    ) -> Result<Campaign>;

    fn snapshot(&self) -> StoreSnapshot;
}

/// Serializable image of a store's contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub brands: Vec<Brand>,
    #[serde(default)]
    pub campaigns: Vec<Campaign>,
    #[serde(default)]
    pub spend_logs: Vec<SpendLog>,
}

/// Detects dangling references and other anomalies within a snapshot.
pub fn snapshot_warnings(snapshot: &StoreSnapshot) -> Vec<String> {
    let brand_ids: HashSet<_> = snapshot.brands.iter().map(|b| b.id).collect();
    let campaign_ids: HashSet<_> = snapshot.campaigns.iter().map(|c| c.id).collect();
    let mut warnings = Vec::new();

    for brand in &snapshot.brands {
        if brand.daily_budget < Decimal::ZERO || brand.monthly_budget < Decimal::ZERO {
            warnings.push(format!("brand {} has a negative budget", brand.id));
        }
    }
    for campaign in &snapshot.campaigns {
        if !brand_ids.contains(&campaign.brand_id) {
            warnings.push(format!(
                "campaign {} references unknown brand {}",
                campaign.id, campaign.brand_id
            ));
        }
    }
    for log in &snapshot.spend_logs {
        if !campaign_ids.contains(&log.campaign_id) {
            warnings.push(format!(
                "spend log {} references unknown campaign {}",
                log.id, log.campaign_id
            ));
        }
        if !brand_ids.contains(&log.brand_id) {
            warnings.push(format!(
                "spend log {} references unknown brand {}",
                log.id, log.brand_id
            ));
        }
        if log.amount <= Decimal::ZERO {
            warnings.push(format!("spend log {} has non-positive amount {}", log.id, log.amount));
        }
    }
    warnings
}
