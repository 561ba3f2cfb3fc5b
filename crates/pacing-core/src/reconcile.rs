//! Brings campaign activation state in line with the activation policy.

use std::{collections::HashSet, sync::Arc};

use pacing_domain::{Brand, Campaign, CampaignLabel};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    error::{CoreError, Result},
    policy::{ActivationDecision, ActivationPolicy, BlockReason},
    storage::PacingStore,
    time::Clock,
    DEFAULT_CONFLICT_RETRIES,
};

/// Which campaigns a full reconciliation visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileScope {
    All,
    Campaign(Uuid),
}

/// How a pass turns a decision into a target state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Apply the full policy in both directions.
    Full,
    /// Deactivate active campaigns of over-budget brands; never activates.
    BudgetSweep,
    /// Activate inactive campaigns the full policy allows; never deactivates.
    Reactivation,
}

impl PassKind {
    fn considers(&self, campaign: &Campaign) -> bool {
        match self {
            PassKind::Full => true,
            PassKind::BudgetSweep => campaign.is_active,
            PassKind::Reactivation => !campaign.is_active,
        }
    }

    fn decide(
        &self,
        brand: &Brand,
        campaign: &Campaign,
        clock: &dyn Clock,
    ) -> Result<ActivationDecision> {
        match self {
            PassKind::BudgetSweep => Ok(ActivationPolicy::decide_budget(brand)),
            PassKind::Full | PassKind::Reactivation => {
                ActivationPolicy::decide(brand, campaign, clock.now())
            }
        }
    }

    fn target(&self, campaign: &Campaign, decision: &ActivationDecision) -> bool {
        match self {
            PassKind::Full => decision.should_be_active,
            PassKind::BudgetSweep => !decision.is_budget_blocked() && campaign.is_active,
            PassKind::Reactivation => decision.should_be_active || campaign.is_active,
        }
    }
}

/// A single applied activation change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignChange {
    pub campaign: CampaignLabel,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<BlockReason>,
}

/// An entity a pass could not process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub id: Uuid,
    pub error: String,
}

impl SkippedEntry {
    pub fn new(id: Uuid, error: &CoreError) -> Self {
        Self {
            id,
            error: error.to_string(),
        }
    }
}

/// Transitions applied by one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub activated: Vec<CampaignChange>,
    pub deactivated: Vec<CampaignChange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedEntry>,
}

impl ChangeSummary {
    /// `true` when the pass changed nothing.
    pub fn is_empty(&self) -> bool {
        self.activated.is_empty() && self.deactivated.is_empty()
    }

    pub fn transitions(&self) -> usize {
        self.activated.len() + self.deactivated.len()
    }

    fn record(&mut self, change: CampaignChange) {
        if change.active {
            self.activated.push(change);
        } else {
            self.deactivated.push(change);
        }
    }

    /// Renders e.g. `Deactivated 1 campaigns: Launch (Acme)`.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if !self.activated.is_empty() {
            parts.push(format!(
                "Activated {} campaigns: {}",
                self.activated.len(),
                join_labels(&self.activated)
            ));
        }
        if !self.deactivated.is_empty() {
            parts.push(format!(
                "Deactivated {} campaigns: {}",
                self.deactivated.len(),
                join_labels(&self.deactivated)
            ));
        }
        if !self.skipped.is_empty() {
            parts.push(format!("Skipped {} campaigns", self.skipped.len()));
        }
        if parts.is_empty() {
            "No changes".to_string()
        } else {
            parts.join("; ")
        }
    }
}

pub(crate) fn join_labels(changes: &[CampaignChange]) -> String {
    changes
        .iter()
        .map(|change| change.campaign.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Applies activation transitions through the store's per-campaign compare-and-set.
#[derive(Clone)]
pub struct ReconciliationEngine {
    store: Arc<dyn PacingStore>,
    clock: Arc<dyn Clock>,
    max_retries: u32,
}

impl ReconciliationEngine {
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

    /// Full-policy reconciliation over `scope`. Re-running without an input change yields no transitions.
    pub fn reconcile(&self, scope: ReconcileScope) -> ChangeSummary {
        let ids = match scope {
            ReconcileScope::All => self.store.campaigns().into_iter().map(|c| c.id).collect(),
            ReconcileScope::Campaign(id) => vec![id],
        };
        self.run("reconcile", PassKind::Full, ids)
    }

    /// Deactivation-only sweep over campaigns of brands that are over budget.
    pub fn enforce_budgets(&self) -> ChangeSummary {
        let over_budget: HashSet<Uuid> = self
            .store
            .brands()
            .into_iter()
            .filter(Brand::is_budget_exceeded)
            .map(|brand| brand.id)
            .collect();
        let ids = self
            .store
            .campaigns()
            .into_iter()
            .filter(|c| c.is_active && over_budget.contains(&c.brand_id))
            .map(|c| c.id)
            .collect();
        self.run("budget sweep", PassKind::BudgetSweep, ids)
    }

    /// Full policy over every campaign that carries a schedule.
    pub fn enforce_dayparting(&self) -> ChangeSummary {
        let ids = self
            .store
            .campaigns()
            .into_iter()
            .filter(Campaign::has_dayparting)
            .map(|c| c.id)
            .collect();
        self.run("dayparting", PassKind::Full, ids)
    }

    /// Activates inactive campaigns that nothing blocks any more.
    pub fn reactivate_eligible(&self) -> ChangeSummary {
        let ids = self
            .store
            .campaigns()
            .into_iter()
            .filter(|c| !c.is_active)
            .map(|c| c.id)
            .collect();
        self.run("reactivation", PassKind::Reactivation, ids)
    }

    /// Read, decide and compare-and-set one campaign. `Ok(None)` means no change was needed.
    ///
    /// The write is conditional on both the campaign's and its brand's version, so a
    /// spend or reset landing after the read turns into a conflict. The campaign is
    /// then re-read and re-decided rather than overwritten.
    pub fn reconcile_campaign(&self, campaign_id: Uuid, kind: PassKind) -> Result<Option<CampaignChange>> {
        let mut attempt = 0;
        loop {
            let campaign = self.store.campaign(campaign_id)?;
            if !kind.considers(&campaign) {
                return Ok(None);
            }
            let brand = self.store.brand(campaign.brand_id)?;
            let decision = kind.decide(&brand, &campaign, self.clock.as_ref())?;
            let target = kind.target(&campaign, &decision);
            if target == campaign.is_active {
                debug!(campaign = %campaign.name, active = target, "No change needed");
                return Ok(None);
            }

            match self.store.set_campaign_active(
                campaign.id,
                campaign.version,
                brand.version,
                target,
                self.clock.now(),
            ) {
                Ok(updated) => {
                    let change = CampaignChange {
                        campaign: CampaignLabel {
                            campaign_id: updated.id,
                            campaign: updated.name.clone(),
                            brand: brand.name.clone(),
                        },
                        active: updated.is_active,
                        reasons: decision.reasons,
                    };
                    if change.active {
                        info!(campaign = %change.campaign, "Campaign activated (constraints cleared)");
                    } else {
                        info!(
                            campaign = %change.campaign,
                            reasons = ?change.reasons,
                            "Campaign paused"
                        );
                    }
                    return Ok(Some(change));
                }
                Err(err) if err.is_conflict() && attempt < self.max_retries => {
                    attempt += 1;
                    debug!(campaign = %campaign.name, attempt, "Activation write lost a race, retrying");
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn run(&self, pass: &str, kind: PassKind, ids: Vec<Uuid>) -> ChangeSummary {
        let mut summary = ChangeSummary::default();
        for id in ids {
            match self.reconcile_campaign(id, kind) {
                Ok(Some(change)) => summary.record(change),
                Ok(None) => {}
                Err(err) => {
                    warn!(%pass, campaign_id = %id, error = %err, "Skipping campaign");
                    summary.skipped.push(SkippedEntry::new(id, &err));
                }
            }
        }
        info!(%pass, outcome = %summary.describe(), "Pass complete");
        summary
    }
}
