//! Planner configuration: risk tiers, instrument pip sizes, sizing constants.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Weekday;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{PlanError, Result};
use crate::models::RiskTolerance;

/// Risk parameters for one tolerance band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierParams {
    /// Risk % of the opening trade
    pub base_risk: Decimal,
    /// Risk % of the larger mid-plan trades
    pub max_risk: Decimal,
    /// Reward multiple applied to risk
    pub target_multiplier: Decimal,
}

/// Parameter triple per tolerance band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskTiers {
    pub conservative: TierParams,
    pub moderate: TierParams,
    pub aggressive: TierParams,
}

impl RiskTiers {
    pub fn params(&self, tolerance: RiskTolerance) -> TierParams {
        match tolerance {
            RiskTolerance::Conservative => self.conservative,
            RiskTolerance::Moderate => self.moderate,
            RiskTolerance::Aggressive => self.aggressive,
        }
    }
}

impl Default for RiskTiers {
    fn default() -> Self {
        Self {
            conservative: TierParams {
                base_risk: dec!(0.5),
                max_risk: dec!(1.0),
                target_multiplier: dec!(2),
            },
            moderate: TierParams {
                base_risk: dec!(1.0),
                max_risk: dec!(1.5),
                target_multiplier: dec!(2.5),
            },
            aggressive: TierParams {
                base_risk: dec!(1.5),
                max_risk: dec!(2.0),
                target_multiplier: dec!(3),
            },
        }
    }
}

/// Configuration for plan generation and rule checking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlannerConfig {
    pub risk_tiers: RiskTiers,

    /// Pip size keyed by quote currency (e.g. "JPY" -> 0.01)
    pub pip_sizes: BTreeMap<String, Decimal>,

    /// Pip size for quote currencies missing from `pip_sizes`
    pub default_pip_size: Decimal,

    /// Units in one standard lot
    pub standard_lot_units: Decimal,

    /// Dollars per pip for one standard lot
    pub standard_lot_pip_value: Decimal,

    /// Assumed cumulative profit, as % of account, for the consistency rule
    pub consistency_baseline_pct: Decimal,

    /// Share of the baseline a single result may not exceed (0.0 to 1.0)
    pub consistency_max_share: Decimal,

    /// Days on which holding a position counts as weekend holding
    pub weekend_days: Vec<Weekday>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        let mut pip_sizes = BTreeMap::new();
        pip_sizes.insert("JPY".to_string(), dec!(0.01));

        Self {
            risk_tiers: RiskTiers::default(),
            pip_sizes,
            default_pip_size: dec!(0.0001),
            standard_lot_units: dec!(100000),
            standard_lot_pip_value: dec!(10),
            consistency_baseline_pct: dec!(5),   // 5% of account
            consistency_max_share: dec!(0.5),    // half of the baseline
            weekend_days: vec![Weekday::Fri, Weekday::Sat, Weekday::Sun],
        }
    }
}

impl PlannerConfig {
    /// Load from a JSON file; absent fields keep their defaults.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PlanError::invalid(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| PlanError::invalid(format!("planner config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_pip_size <= Decimal::ZERO
            || self.pip_sizes.values().any(|p| *p <= Decimal::ZERO)
        {
            return Err(PlanError::invalid("pip sizes must be positive"));
        }
        if self.standard_lot_units <= Decimal::ZERO || self.standard_lot_pip_value <= Decimal::ZERO {
            return Err(PlanError::invalid("standard lot constants must be positive"));
        }
        for tier in [
            &self.risk_tiers.conservative,
            &self.risk_tiers.moderate,
            &self.risk_tiers.aggressive,
        ] {
            if tier.base_risk <= Decimal::ZERO || tier.max_risk < tier.base_risk + dec!(0.25) {
                return Err(PlanError::invalid(
                    "risk tiers need base risk > 0 and max risk >= base risk + 0.25",
                ));
            }
        }
        Ok(())
    }

    /// Pip size for a quote currency.
    pub fn pip_size_for_quote(&self, quote: &str) -> Decimal {
        self.pip_sizes
            .get(&quote.to_uppercase())
            .copied()
            .unwrap_or(self.default_pip_size)
    }
}
