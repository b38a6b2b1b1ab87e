//! Trading plan generation: a fixed five-trade sequence sized to the account.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, info};

use super::PlannerConfig;
use crate::error::{PlanError, Result};
use crate::models::{
    AccountConfig, PhaseTimeline, PlanTargets, PlanTimeline, PlannedTrade, PropFirmRules,
    RiskConfig, TradingPlan,
};

/// Longest phase 1 in days.
const MAX_PHASE1_DAYS: u32 = 15;

/// How a trade slot derives its risk from the tier parameters.
#[derive(Debug, Clone, Copy)]
enum RiskBase {
    Base,
    Max,
}

/// Policy for one slot in the sequence.
struct Slot {
    risk_base: RiskBase,
    risk_step: Decimal,
    multiplier_step: Decimal,
    timeframe: &'static str,
    pairs: [&'static str; 2],
}

const SLOTS: [Slot; 5] = [
    Slot {
        risk_base: RiskBase::Base,
        risk_step: dec!(0),
        multiplier_step: dec!(0),
        timeframe: "1-2 days",
        pairs: ["EUR/USD", "GBP/USD"],
    },
    Slot {
        risk_base: RiskBase::Base,
        risk_step: dec!(0.25),
        multiplier_step: dec!(0),
        timeframe: "2-3 days",
        pairs: ["USD/JPY", "XAU/USD"],
    },
    Slot {
        risk_base: RiskBase::Max,
        risk_step: dec!(0),
        multiplier_step: dec!(0),
        timeframe: "1-4 days",
        pairs: ["AUD/USD", "EUR/GBP"],
    },
    Slot {
        risk_base: RiskBase::Max,
        risk_step: dec!(0),
        multiplier_step: dec!(1),
        timeframe: "3-5 days",
        pairs: ["GBP/JPY", "USD/CAD"],
    },
    Slot {
        risk_base: RiskBase::Max,
        risk_step: dec!(0.5),
        multiplier_step: dec!(1.5),
        timeframe: "2-6 days",
        pairs: ["XAU/USD", "BTC/USD"],
    },
];

/// Builds trading plans from firm rules and the trader's settings.
#[derive(Debug, Clone, Default)]
pub struct PlanGenerator {
    config: PlannerConfig,
}

impl PlanGenerator {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    /// Generate a plan for `timeline_days` (30, 45 or 60).
    ///
    /// Deterministic: identical inputs give identical plans. Phase 2's
    /// return is the signed remainder of the target and goes negative when
    /// phase 1 alone overshoots it.
    pub fn generate(
        &self,
        firm: &PropFirmRules,
        account: &AccountConfig,
        risk: &RiskConfig,
        timeline_days: u32,
    ) -> Result<TradingPlan> {
        account.validate()?;
        risk.validate()?;
        let timeline = PlanTimeline::from_days(timeline_days)?;

        let tolerance = risk.tolerance();
        let params = self.config.risk_tiers.params(tolerance);
        let size = account.size;

        let trades = SLOTS
            .iter()
            .zip(1u32..)
            .map(|(slot, sequence_id)| {
                let anchor = match slot.risk_base {
                    RiskBase::Base => params.base_risk,
                    RiskBase::Max => params.max_risk,
                };
                let risk_pct = anchor + slot.risk_step;
                let multiplier = params.target_multiplier + slot.multiplier_step;
                let target_pct = risk_pct
                    .checked_mul(multiplier)
                    .ok_or_else(|| PlanError::out_of_range("trade target"))?;
                let expected_return = size
                    .checked_mul(target_pct)
                    .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
                    .ok_or_else(|| PlanError::out_of_range("expected return"))?;

                Ok(PlannedTrade {
                    sequence_id,
                    risk_pct,
                    target_pct,
                    timeframe_label: slot.timeframe.to_string(),
                    expected_return,
                    instrument_pairs: slot.pairs.iter().map(|p| p.to_string()).collect(),
                })
            })
            .collect::<Result<Vec<PlannedTrade>>>()?;

        let phase1_return = trades
            .iter()
            .try_fold(Decimal::ZERO, |acc, t| acc.checked_add(t.expected_return))
            .ok_or_else(|| PlanError::out_of_range("phase 1 return"))?;
        let total_target = size
            .checked_mul(firm.profit_target_pct)
            .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
            .ok_or_else(|| PlanError::out_of_range("profit target"))?;
        let phase2_return = total_target
            .checked_sub(phase1_return)
            .ok_or_else(|| PlanError::out_of_range("phase 2 return"))?;

        let days = timeline.days();
        let phase1_days = MAX_PHASE1_DAYS.min(days / 2);

        let monthly_earnings = match timeline {
            PlanTimeline::ThirtyDays => total_target,
            _ => total_target
                .checked_mul(Decimal::from(30))
                .and_then(|v| v.checked_div(Decimal::from(days)))
                .ok_or_else(|| PlanError::out_of_range("monthly earnings"))?,
        };

        if phase2_return < Decimal::ZERO {
            debug!(
                phase1 = %phase1_return,
                target = %total_target,
                "Phase 1 expected return exceeds the profit target"
            );
        }

        info!(
            firm = %firm.name,
            size = %size,
            tolerance = %tolerance,
            days = days,
            target = %total_target,
            "Trading plan generated"
        );

        Ok(TradingPlan {
            trades,
            timeline: PhaseTimeline {
                phase1_days,
                phase2_days: days - phase1_days,
                total_days: days,
            },
            targets: PlanTargets {
                phase1_return,
                phase2_return,
                total_target,
                monthly_earnings,
            },
        })
    }
}
