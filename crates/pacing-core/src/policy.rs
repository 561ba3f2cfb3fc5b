//! Combines budget state and dayparting into an activation verdict.

use std::fmt;

use chrono::{DateTime, Utc};
use pacing_domain::{Brand, Campaign};
use serde::{Deserialize, Serialize};

use crate::{
    dayparting::DaypartingEvaluator,
    error::{CoreError, Result},
};

/// Why a campaign may not run. Variants are declared in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    DailyBudgetExceeded,
    MonthlyBudgetExceeded,
    OutsideDaypartingWindow,
}

impl BlockReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockReason::DailyBudgetExceeded => "daily budget exceeded",
            BlockReason::MonthlyBudgetExceeded => "monthly budget exceeded",
            BlockReason::OutsideDaypartingWindow => "outside dayparting window",
        }
    }

    pub fn is_budget(&self) -> bool {
        matches!(
            self,
            BlockReason::DailyBudgetExceeded | BlockReason::MonthlyBudgetExceeded
        )
    }
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict for a single campaign. Active exactly when `reasons` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationDecision {
    pub should_be_active: bool,
    pub reasons: Vec<BlockReason>,
}

impl ActivationDecision {
    pub fn from_reasons(reasons: Vec<BlockReason>) -> Self {
        Self {
            should_be_active: reasons.is_empty(),
            reasons,
        }
    }

    pub fn is_budget_blocked(&self) -> bool {
        self.reasons.iter().any(BlockReason::is_budget)
    }

    pub fn reason_labels(&self) -> Vec<String> {
        self.reasons.iter().map(ToString::to_string).collect()
    }
}

/// Stateless activation rules.
pub struct ActivationPolicy;

impl ActivationPolicy {
    /// Evaluates every constraint, reporting violations in priority order:
    /// daily budget, monthly budget, then the dayparting window.
    pub fn decide(
        brand: &Brand,
        campaign: &Campaign,
        now: DateTime<Utc>,
    ) -> Result<ActivationDecision> {
        if campaign.brand_id != brand.id {
            return Err(CoreError::Validation(format!(
                "campaign {} does not belong to brand {}",
                campaign.id, brand.id
            )));
        }
        let mut reasons = Self::budget_reasons(brand);
        if !DaypartingEvaluator::is_campaign_in_window(campaign, now)? {
            reasons.push(BlockReason::OutsideDaypartingWindow);
        }
        Ok(ActivationDecision::from_reasons(reasons))
    }

    /// Budget-only verdict; ignores dayparting entirely.
    pub fn decide_budget(brand: &Brand) -> ActivationDecision {
        ActivationDecision::from_reasons(Self::budget_reasons(brand))
    }

    fn budget_reasons(brand: &Brand) -> Vec<BlockReason> {
        let mut reasons = Vec::new();
        if brand.is_daily_exceeded() {
            reasons.push(BlockReason::DailyBudgetExceeded);
        }
        if brand.is_monthly_exceeded() {
            reasons.push(BlockReason::MonthlyBudgetExceeded);
        }
        reasons
    }
}
