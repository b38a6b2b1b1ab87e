//! Trading plan produced for a challenge account.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AccountConfig, RiskConfig, RiskTolerance};
use crate::error::{PlanError, Result};

/// Length of the challenge plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanTimeline {
    #[serde(rename = "30day")]
    ThirtyDays,
    #[serde(rename = "45day")]
    FortyFiveDays,
    #[serde(rename = "60day")]
    SixtyDays,
}

impl PlanTimeline {
    pub fn from_days(days: u32) -> Result<Self> {
        match days {
            30 => Ok(Self::ThirtyDays),
            45 => Ok(Self::FortyFiveDays),
            60 => Ok(Self::SixtyDays),
            other => Err(PlanError::invalid(format!(
                "choose a 30, 45 or 60 day timeline (got {})",
                other
            ))),
        }
    }

    pub fn days(&self) -> u32 {
        match self {
            PlanTimeline::ThirtyDays => 30,
            PlanTimeline::FortyFiveDays => 45,
            PlanTimeline::SixtyDays => 60,
        }
    }
}

/// One hypothetical trade in the plan sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedTrade {
    pub sequence_id: u32,

    /// Risk as % of account
    pub risk_pct: Decimal,

    /// Target as % of account
    pub target_pct: Decimal,

    pub timeframe_label: String,

    /// Expected profit in USD if the target is hit
    pub expected_return: Decimal,

    pub instrument_pairs: Vec<String>,
}

/// Day split between the two plan phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseTimeline {
    pub phase1_days: u32,
    pub phase2_days: u32,
    pub total_days: u32,
}

/// Dollar targets for the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanTargets {
    /// Sum of the planned trades' expected returns
    pub phase1_return: Decimal,

    /// Remaining profit after phase 1; negative when phase 1 overshoots
    pub phase2_return: Decimal,

    pub total_target: Decimal,

    pub monthly_earnings: Decimal,
}

/// Complete trading plan for a challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingPlan {
    pub trades: Vec<PlannedTrade>,
    pub timeline: PhaseTimeline,
    pub targets: PlanTargets,
}

impl TradingPlan {
    /// Whether phase 1 alone already exceeds the firm's profit target.
    pub fn phase1_overshoots(&self) -> bool {
        self.targets.phase2_return < Decimal::ZERO
    }

    /// Total risk taken across all planned trades, as % of account.
    pub fn cumulative_risk_pct(&self) -> Decimal {
        self.trades.iter().map(|t| t.risk_pct).sum()
    }
}

/// Downloadable plan document: the plan plus the inputs that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanExport {
    pub firm: String,
    pub firm_is_default: bool,
    pub account: AccountConfig,
    pub risk: RiskConfig,
    pub risk_tolerance: RiskTolerance,
    pub selected_timeline: PlanTimeline,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub plan: TradingPlan,
}
