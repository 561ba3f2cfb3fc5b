//! Daily and monthly accumulator resets.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    ledger::BudgetLedger,
    reconcile::{join_labels, CampaignChange, ReconciliationEngine, SkippedEntry},
    storage::{PacingStore, SpendPeriod},
    time::Clock,
};

/// Outcome of a reset run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetSummary {
    pub as_of: NaiveDate,
    pub daily_reset_brands: Vec<Uuid>,
    pub monthly_reset_brands: Vec<Uuid>,
    pub reactivated: Vec<CampaignChange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedEntry>,
}

impl ResetSummary {
    pub fn describe(&self) -> String {
        let mut parts = vec![format!(
            "Reset daily spends for {} brands",
            self.daily_reset_brands.len()
        )];
        if !self.monthly_reset_brands.is_empty() {
            parts.push(format!(
                "Reset monthly spends for {} brands",
                self.monthly_reset_brands.len()
            ));
        }
        if !self.reactivated.is_empty() {
            parts.push(format!(
                "Reactivated {} campaigns: {}",
                self.reactivated.len(),
                join_labels(&self.reactivated)
            ));
        }
        if !self.skipped.is_empty() {
            parts.push(format!("Skipped {} entries", self.skipped.len()));
        }
        parts.join("; ")
    }
}

/// Zeroes spend accumulators and reactivates campaigns the reset unblocked.
#[derive(Clone)]
pub struct ResetScheduler {
    store: Arc<dyn PacingStore>,
    clock: Arc<dyn Clock>,
    ledger: BudgetLedger,
    engine: ReconciliationEngine,
}

impl ResetScheduler {
    pub fn new(
        store: Arc<dyn PacingStore>,
        clock: Arc<dyn Clock>,
        ledger: BudgetLedger,
        engine: ReconciliationEngine,
    ) -> Self {
        Self {
            store,
            clock,
            ledger,
            engine,
        }
    }

    /// Resets every brand's daily spend, and monthly spend too when `as_of` is the
    /// first of a month, then runs the reactivation pass. Repeating the call for the
    /// same date is harmless.
    pub fn reset_all(&self, as_of: NaiveDate) -> ResetSummary {
        let monthly = as_of.day() == 1;
        let periods: &[SpendPeriod] = if monthly {
            &[SpendPeriod::Daily, SpendPeriod::Monthly]
        } else {
            &[SpendPeriod::Daily]
        };

        let mut summary = ResetSummary {
            as_of,
            daily_reset_brands: Vec::new(),
            monthly_reset_brands: Vec::new(),
            reactivated: Vec::new(),
            skipped: Vec::new(),
        };

        for brand in self.store.brands() {
            match self.ledger.reset(brand.id, periods) {
                Ok(_) => {
                    summary.daily_reset_brands.push(brand.id);
                    if monthly {
                        summary.monthly_reset_brands.push(brand.id);
                    }
                }
                Err(err) => {
                    warn!(brand = %brand.name, error = %err, "Skipping brand reset");
                    summary.skipped.push(SkippedEntry::new(brand.id, &err));
                }
            }
        }

        let reactivation = self.engine.reactivate_eligible();
        summary.reactivated = reactivation.activated;
        summary.skipped.extend(reactivation.skipped);

        info!(%as_of, outcome = %summary.describe(), "Spend reset complete");
        summary
    }

    pub fn reset_today(&self) -> ResetSummary {
        self.reset_all(self.clock.today())
    }
}
