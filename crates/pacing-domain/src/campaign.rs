//! Campaigns owned by a brand.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{common::*, schedule::DaypartingSchedule};

/// A campaign whose activation state follows its brand's budget and its own dayparting window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Campaign {
    pub id: Uuid,
    pub name: String,
    pub brand_id: Uuid,
    #[serde(default = "Campaign::default_active")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dayparting: Option<DaypartingSchedule>,
    #[serde(default)]
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    /// Creates an active campaign with no time constraint.
    pub fn new(name: impl Into<String>, brand_id: Uuid) -> Self {
        Self::new_at(name, brand_id, Utc::now())
    }

    pub fn new_at(name: impl Into<String>, brand_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            brand_id,
            is_active: true,
            dayparting: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_dayparting(mut self, schedule: DaypartingSchedule) -> Self {
        self.dayparting = Some(schedule);
        self
    }

    pub fn has_dayparting(&self) -> bool {
        self.dayparting.is_some()
    }

    /// Records an activation transition. Stores call this inside their compare-and-set.
    pub fn transition(&mut self, active: bool, at: DateTime<Utc>) {
        self.is_active = active;
        self.version += 1;
        self.updated_at = at;
    }

    fn default_active() -> bool {
        true
    }
}

impl Identifiable for Campaign {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Campaign {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Versioned for Campaign {
    fn version(&self) -> u64 {
        self.version
    }
}

/// Reference to a campaign used in pass reports, e.g. `Spring Sale (Acme)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CampaignLabel {
    pub campaign_id: Uuid,
    pub campaign: String,
    pub brand: String,
}

impl fmt::Display for CampaignLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.campaign, self.brand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_campaigns_start_active_without_schedule() {
        let campaign = Campaign::new("Launch", Uuid::new_v4());
        assert!(campaign.is_active);
        assert!(!campaign.has_dayparting());
        assert_eq!(campaign.version, 0);
    }

    #[test]
    fn new_at_stamps_given_instant() {
        let at = "2024-02-03T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let campaign = Campaign::new_at("Launch", Uuid::new_v4(), at);
        assert_eq!(campaign.created_at, at);
        assert_eq!(campaign.updated_at, at);
    }

    #[test]
    fn transition_bumps_version() {
        let mut campaign = Campaign::new("Launch", Uuid::new_v4());
        campaign.transition(false, Utc::now());
        assert!(!campaign.is_active);
        assert_eq!(campaign.version, 1);
    }

    #[test]
    fn label_formats_campaign_and_brand() {
        let label = CampaignLabel {
            campaign_id: Uuid::new_v4(),
            campaign: "Launch".into(),
            brand: "Acme".into(),
        };
        assert_eq!(label.to_string(), "Launch (Acme)");
    }
}
