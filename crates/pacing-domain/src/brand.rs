//! Advertiser brands and their spend accumulators.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::*;

/// An advertiser with daily and monthly spend limits shared by all its campaigns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Brand {
    pub id: Uuid,
    pub name: String,
    pub daily_budget: Decimal,
    pub monthly_budget: Decimal,
    #[serde(default)]
    pub current_daily_spend: Decimal,
    #[serde(default)]
    pub current_monthly_spend: Decimal,
    #[serde(default)]
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Brand {
    pub fn new(name: impl Into<String>, daily_budget: Decimal, monthly_budget: Decimal) -> Self {
        Self::new_at(name, daily_budget, monthly_budget, Utc::now())
    }

    /// Like [`Brand::new`], stamped with `now` instead of the system time.
    pub fn new_at(
        name: impl Into<String>,
        daily_budget: Decimal,
        monthly_budget: Decimal,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            daily_budget,
            monthly_budget,
            current_daily_spend: Decimal::ZERO,
            current_monthly_spend: Decimal::ZERO,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn daily_remaining(&self) -> Decimal {
        self.daily_budget - self.current_daily_spend
    }

    pub fn monthly_remaining(&self) -> Decimal {
        self.monthly_budget - self.current_monthly_spend
    }

    /// Spend equal to the budget counts as exceeded.
    pub fn is_daily_exceeded(&self) -> bool {
        self.current_daily_spend >= self.daily_budget
    }

    /// Spend equal to the budget counts as exceeded.
    pub fn is_monthly_exceeded(&self) -> bool {
        self.current_monthly_spend >= self.monthly_budget
    }

    pub fn is_budget_exceeded(&self) -> bool {
        self.is_daily_exceeded() || self.is_monthly_exceeded()
    }

    /// Adds `amount` to both accumulators and bumps the version.
    pub fn apply_spend(&mut self, amount: Decimal, at: DateTime<Utc>) {
        self.current_daily_spend += amount;
        self.current_monthly_spend += amount;
        self.touch(at);
    }

    pub fn clear_daily_spend(&mut self, at: DateTime<Utc>) {
        self.current_daily_spend = Decimal::ZERO;
        self.touch(at);
    }

    pub fn clear_monthly_spend(&mut self, at: DateTime<Utc>) {
        self.current_monthly_spend = Decimal::ZERO;
        self.touch(at);
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.version += 1;
        self.updated_at = at;
    }
}

impl Identifiable for Brand {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Brand {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Versioned for Brand {
    fn version(&self) -> u64 {
        self.version
    }
}
