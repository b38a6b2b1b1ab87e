//! Account and risk settings collected by the setup wizard.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{ChallengeType, PropFirmRules};
use crate::error::{PlanError, Result};

/// Challenge account the trader is running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountConfig {
    /// Account balance in USD
    pub size: Decimal,
    pub challenge_type: ChallengeType,
}

impl AccountConfig {
    pub fn new(size: Decimal, challenge_type: ChallengeType) -> Self {
        Self { size, challenge_type }
    }

    /// Reject non-positive sizes.
    pub fn validate(&self) -> Result<()> {
        if self.size <= Decimal::ZERO {
            return Err(PlanError::invalid(format!(
                "enter a positive account size (got {})",
                self.size
            )));
        }
        Ok(())
    }

    /// Validate against the firm the account belongs to.
    pub fn validate_for(&self, firm: &PropFirmRules) -> Result<()> {
        self.validate()?;
        if !firm.offers(self.challenge_type) {
            let offered: Vec<_> = firm.challenge_types.iter().map(|c| c.as_str()).collect();
            return Err(PlanError::invalid(format!(
                "{} does not offer a {} challenge (available: {})",
                firm.name,
                self.challenge_type,
                offered.join(", ")
            )));
        }
        Ok(())
    }
}

/// Per-trade risk settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskConfig {
    /// Percentage of the account risked on each trade
    pub risk_percentage_per_trade: Decimal,
    /// Reward targeted per unit of risk
    pub risk_reward_ratio: Decimal,
}

impl RiskConfig {
    pub fn new(risk_percentage_per_trade: Decimal, risk_reward_ratio: Decimal) -> Self {
        Self {
            risk_percentage_per_trade,
            risk_reward_ratio,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.risk_percentage_per_trade <= Decimal::ZERO {
            return Err(PlanError::invalid(format!(
                "enter a positive risk percentage per trade (got {})",
                self.risk_percentage_per_trade
            )));
        }
        if self.risk_reward_ratio <= Decimal::ZERO {
            return Err(PlanError::invalid(format!(
                "enter a positive risk:reward ratio (got {})",
                self.risk_reward_ratio
            )));
        }
        Ok(())
    }

    pub fn tolerance(&self) -> RiskTolerance {
        RiskTolerance::classify(self.risk_percentage_per_trade)
    }
}

/// Coarse risk appetite derived from the per-trade risk percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Conservative,
    Moderate,
    Aggressive,
}

impl RiskTolerance {
    /// Map a risk-per-trade percentage to a tolerance band.
    ///
    /// Boundaries are inclusive: 0.5 is conservative, 1.0 is moderate.
    pub fn classify(risk_pct: Decimal) -> Self {
        if risk_pct <= dec!(0.5) {
            Self::Conservative
        } else if risk_pct <= dec!(1.0) {
            Self::Moderate
        } else {
            Self::Aggressive
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTolerance::Conservative => "conservative",
            RiskTolerance::Moderate => "moderate",
            RiskTolerance::Aggressive => "aggressive",
        }
    }
}

impl fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
