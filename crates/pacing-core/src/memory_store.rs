//! Thread-safe in-process implementation of [`PacingStore`].

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use pacing_domain::{Brand, Campaign, DaypartingSchedule, SpendLog};
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    error::{CoreError, Result},
    storage::{PacingStore, SpendPeriod, StoreSnapshot},
};

/// A brand together with its partition of the spend audit trail.
#[derive(Debug)]
struct BrandEntry {
    brand: Brand,
    logs: Vec<SpendLog>,
}

/// Keeps one lock per brand and one per campaign.
///
/// Map locks are only held long enough to clone an entry handle; entry locks are
/// never held while a map lock is being acquired.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    brands: RwLock<HashMap<Uuid, Arc<Mutex<BrandEntry>>>>,
    campaigns: RwLock<HashMap<Uuid, Arc<Mutex<Campaign>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from a snapshot, attaching every log to its brand.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Result<Self> {
        let mut brands: HashMap<Uuid, BrandEntry> = snapshot
            .brands
            .into_iter()
            .map(|brand| {
                (
                    brand.id,
                    BrandEntry {
                        brand,
                        logs: Vec::new(),
                    },
                )
            })
            .collect();

        let mut campaigns = HashMap::new();
        for campaign in snapshot.campaigns {
            if !brands.contains_key(&campaign.brand_id) {
                return Err(CoreError::Storage(format!(
                    "campaign {} references unknown brand {}",
                    campaign.id, campaign.brand_id
                )));
            }
            campaigns.insert(campaign.id, Arc::new(Mutex::new(campaign)));
        }

        for log in snapshot.spend_logs {
            let entry = brands.get_mut(&log.brand_id).ok_or_else(|| {
                CoreError::Storage(format!(
                    "spend log {} references unknown brand {}",
                    log.id, log.brand_id
                ))
            })?;
            entry.logs.push(log);
        }

        Ok(Self {
            brands: RwLock::new(
                brands
                    .into_iter()
                    .map(|(id, entry)| (id, Arc::new(Mutex::new(entry))))
                    .collect(),
            ),
            campaigns: RwLock::new(campaigns),
        })
    }

    fn brand_entry(&self, id: Uuid) -> Result<Arc<Mutex<BrandEntry>>> {
        self.brands
            .read()
            .get(&id)
            .cloned()
            .ok_or(CoreError::BrandNotFound(id))
    }

    fn campaign_entry(&self, id: Uuid) -> Result<Arc<Mutex<Campaign>>> {
        self.campaigns
            .read()
            .get(&id)
            .cloned()
            .ok_or(CoreError::CampaignNotFound(id))
    }

    fn brand_entries(&self) -> Vec<Arc<Mutex<BrandEntry>>> {
        self.brands.read().values().cloned().collect()
    }

    fn campaign_entries(&self) -> Vec<Arc<Mutex<Campaign>>> {
        self.campaigns.read().values().cloned().collect()
    }
}

impl PacingStore for InMemoryStore {
    fn brand(&self, id: Uuid) -> Result<Brand> {
        Ok(self.brand_entry(id)?.lock().brand.clone())
    }

    fn brands(&self) -> Vec<Brand> {
        let mut brands: Vec<Brand> = self
            .brand_entries()
            .iter()
            .map(|entry| entry.lock().brand.clone())
            .collect();
        brands.sort_by(|a, b| a.name.cmp(&b.name));
        brands
    }

    fn campaign(&self, id: Uuid) -> Result<Campaign> {
        Ok(self.campaign_entry(id)?.lock().clone())
    }

    fn campaigns(&self) -> Vec<Campaign> {
        let mut campaigns: Vec<Campaign> = self
            .campaign_entries()
            .iter()
            .map(|entry| entry.lock().clone())
            .collect();
        campaigns.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        campaigns
    }

    fn campaigns_for_brand(&self, brand_id: Uuid) -> Result<Vec<Campaign>> {
        self.brand_entry(brand_id)?;
        Ok(self
            .campaigns()
            .into_iter()
            .filter(|campaign| campaign.brand_id == brand_id)
            .collect())
    }

    fn spend_logs_for_campaign(&self, campaign_id: Uuid) -> Result<Vec<SpendLog>> {
        let brand_id = self.campaign(campaign_id)?.brand_id;
        let entry = self.brand_entry(brand_id)?;
        let logs = entry
            .lock()
            .logs
            .iter()
            .filter(|log| log.campaign_id == campaign_id)
            .cloned()
            .collect();
        Ok(logs)
    }

    fn insert_brand(&self, brand: Brand) -> Result<()> {
        let mut brands = self.brands.write();
        if brands.contains_key(&brand.id) {
            return Err(CoreError::Validation(format!(
                "brand {} already exists",
                brand.id
            )));
        }
        if brands
            .values()
            .any(|entry| entry.lock().brand.name == brand.name)
        {
            return Err(CoreError::Validation(format!(
                "brand name `{}` is already taken",
                brand.name
            )));
        }
        brands.insert(
            brand.id,
            Arc::new(Mutex::new(BrandEntry {
                brand,
                logs: Vec::new(),
            })),
        );
        Ok(())
    }

    fn insert_campaign(&self, campaign: Campaign) -> Result<()> {
        self.brand_entry(campaign.brand_id)?;
        let mut campaigns = self.campaigns.write();
        if campaigns.contains_key(&campaign.id) {
            return Err(CoreError::Validation(format!(
                "campaign {} already exists",
                campaign.id
            )));
        }
        let duplicate = campaigns.values().any(|entry| {
            let existing = entry.lock();
            existing.brand_id == campaign.brand_id && existing.name == campaign.name
        });
        if duplicate {
            return Err(CoreError::Validation(format!(
                "campaign name `{}` is already used by this brand",
                campaign.name
            )));
        }
        campaigns.insert(campaign.id, Arc::new(Mutex::new(campaign)));
        Ok(())
    }

    fn set_dayparting(
        &self,
        campaign_id: Uuid,
        schedule: Option<DaypartingSchedule>,
        at: DateTime<Utc>,
    ) -> Result<Campaign> {
        let entry = self.campaign_entry(campaign_id)?;
        let mut campaign = entry.lock();
        campaign.dayparting = schedule;
        // Any in-flight decision based on the old window must lose its compare-and-set.
        campaign.version += 1;
        campaign.updated_at = at;
        Ok(campaign.clone())
    }

    fn commit_spend(&self, log: SpendLog, expected_version: u64) -> Result<Brand> {
        if log.amount <= Decimal::ZERO {
            return Err(CoreError::InvalidAmount(log.amount));
        }
        let entry = self.brand_entry(log.brand_id)?;
        let mut entry = entry.lock();
        if entry.brand.version != expected_version {
            return Err(CoreError::ConcurrencyConflict(format!(
                "brand {} moved from version {} to {}",
                entry.brand.id, expected_version, entry.brand.version
            )));
        }
        entry.brand.apply_spend(log.amount, log.timestamp);
        entry.logs.push(log);
        Ok(entry.brand.clone())
    }

    fn reset_spend(
        &self,
        brand_id: Uuid,
        periods: &[SpendPeriod],
        at: DateTime<Utc>,
    ) -> Result<Brand> {
        let entry = self.brand_entry(brand_id)?;
        let mut entry = entry.lock();
        for period in periods {
            match period {
                SpendPeriod::Daily => entry.brand.clear_daily_spend(at),
                SpendPeriod::Monthly => entry.brand.clear_monthly_spend(at),
            }
        }
        Ok(entry.brand.clone())
    }

    fn set_campaign_active(
        &self,
        campaign_id: Uuid,
        expected_version: u64,
        expected_brand_version: u64,
        active: bool,
        at: DateTime<Utc>,
    ) -> Result<Campaign> {
        let campaign_entry = self.campaign_entry(campaign_id)?;
        let brand_id = campaign_entry.lock().brand_id;
        let brand_entry = self.brand_entry(brand_id)?;

        // Lock order: brand, then campaign.
        let brand = brand_entry.lock();
        let mut campaign = campaign_entry.lock();
        if brand.brand.version != expected_brand_version {
            return Err(CoreError::ConcurrencyConflict(format!(
                "brand {} moved from version {} to {}",
                brand.brand.id, expected_brand_version, brand.brand.version
            )));
        }
        if campaign.version != expected_version {
            return Err(CoreError::ConcurrencyConflict(format!(
                "campaign {} moved from version {} to {}",
                campaign.id, expected_version, campaign.version
            )));
        }
        campaign.transition(active, at);
        Ok(campaign.clone())
    }

    fn snapshot(&self) -> StoreSnapshot {
        let mut brands = Vec::new();
        let mut spend_logs = Vec::new();
        for entry in self.brand_entries() {
            let entry = entry.lock();
            brands.push(entry.brand.clone());
            spend_logs.extend(entry.logs.iter().cloned());
        }
        brands.sort_by(|a, b| a.name.cmp(&b.name));
        spend_logs.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        StoreSnapshot {
            brands,
            campaigns: self.campaigns(),
            spend_logs,
        }
    }
}
