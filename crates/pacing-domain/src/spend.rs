//! Append-only spend records.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::Identifiable;

/// One unit of spend against a campaign. Never updated or deleted once stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpendLog {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub brand_id: Uuid,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SpendLog {
    pub fn new(
        campaign_id: Uuid,
        brand_id: Uuid,
        amount: Decimal,
        timestamp: DateTime<Utc>,
        description: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            campaign_id,
            brand_id,
            amount,
            timestamp,
            description: description.filter(|text| !text.trim().is_empty()),
        }
    }

    /// UTC calendar date the spend was recorded on.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

impl Identifiable for SpendLog {
    fn id(&self) -> Uuid {
        self.id
    }
}
