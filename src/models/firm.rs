//! Prop-firm evaluation rules.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Evaluation structure a trader signs up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChallengeType {
    #[serde(rename = "1-step")]
    OneStep,
    #[serde(rename = "2-step")]
    TwoStep,
    #[serde(rename = "instant-funding")]
    InstantFunding,
}

impl ChallengeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeType::OneStep => "1-step",
            ChallengeType::TwoStep => "2-step",
            ChallengeType::InstantFunding => "instant-funding",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "1-step" | "one-step" | "1step" => Some(Self::OneStep),
            "2-step" | "two-step" | "2step" => Some(Self::TwoStep),
            "instant-funding" | "instant" => Some(Self::InstantFunding),
            _ => None,
        }
    }
}

impl fmt::Display for ChallengeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Constraints a prop firm enforces on a challenge account.
///
/// Percentages are expressed as whole numbers (5 means 5%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropFirmRules {
    /// Firm display name, also the lookup key
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Maximum permitted daily loss as % of account
    pub daily_loss_pct: Decimal,

    /// Maximum total drawdown as % of account
    pub max_drawdown_pct: Decimal,

    /// Profit required to pass, as % of account
    pub profit_target_pct: Decimal,

    pub min_trading_days: u32,

    /// Maximum position notional as % of account
    pub max_position_size_pct: Decimal,

    pub scaling_target_pct: Decimal,

    pub challenge_types: Vec<ChallengeType>,

    /// Purchasable account sizes, ascending
    pub account_sizes: Vec<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overnight_positions_allowed: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub news_trading_allowed: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekend_holding_allowed: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consistency_rule_enforced: Option<bool>,
}

impl PropFirmRules {
    /// Whether the firm offers the given challenge structure.
    pub fn offers(&self, challenge: ChallengeType) -> bool {
        self.challenge_types.contains(&challenge)
    }

    /// Dollar amount of a percentage rule for an account of `size`.
    pub fn dollars(pct: Decimal, size: Decimal) -> Decimal {
        size * pct / Decimal::ONE_HUNDRED
    }

    /// Check the table invariants: non-negative percentages and a
    /// non-empty, strictly ascending list of account sizes.
    pub fn validate(&self) -> Result<(), String> {
        let pcts = [
            ("dailyLossPct", self.daily_loss_pct),
            ("maxDrawdownPct", self.max_drawdown_pct),
            ("profitTargetPct", self.profit_target_pct),
            ("maxPositionSizePct", self.max_position_size_pct),
            ("scalingTargetPct", self.scaling_target_pct),
        ];
        for (field, value) in pcts {
            if value.is_sign_negative() && !value.is_zero() {
                return Err(format!("{}: {} must be non-negative, got {}", self.name, field, value));
            }
        }

        if self.account_sizes.is_empty() {
            return Err(format!("{}: accountSizes must not be empty", self.name));
        }
        if self.account_sizes.windows(2).any(|w| w[0] >= w[1]) {
            return Err(format!("{}: accountSizes must be ascending", self.name));
        }
        if self.account_sizes.iter().any(|s| *s <= Decimal::ZERO) {
            return Err(format!("{}: accountSizes must be positive", self.name));
        }

        if self.challenge_types.is_empty() {
            return Err(format!("{}: challengeTypes must not be empty", self.name));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample() -> PropFirmRules {
        PropFirmRules {
            name: "Sample".to_string(),
            description: String::new(),
            daily_loss_pct: dec!(5),
            max_drawdown_pct: dec!(10),
            profit_target_pct: dec!(8),
            min_trading_days: 5,
            max_position_size_pct: dec!(2),
            scaling_target_pct: dec!(8),
            challenge_types: vec![ChallengeType::OneStep, ChallengeType::TwoStep],
            account_sizes: vec![dec!(10000), dec!(25000)],
            overnight_positions_allowed: None,
            news_trading_allowed: None,
            weekend_holding_allowed: None,
            consistency_rule_enforced: None,
        }
    }

    #[test]
    fn test_validate_accepts_sane_rules() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unsorted_sizes() {
        let mut rules = sample();
        rules.account_sizes = vec![dec!(25000), dec!(10000)];
        assert!(rules.validate().unwrap_err().contains("ascending"));
    }

    #[test]
    fn test_validate_rejects_negative_percentage() {
        let mut rules = sample();
        rules.daily_loss_pct = dec!(-1);
        assert!(rules.validate().unwrap_err().contains("dailyLossPct"));
    }

    #[test]
    fn test_challenge_type_serde_matches_firm_data() {
        let json = serde_json::to_string(&ChallengeType::InstantFunding).unwrap();
        assert_eq!(json, "\"instant-funding\"");
        let parsed: ChallengeType = serde_json::from_str("\"1-step\"").unwrap();
        assert_eq!(parsed, ChallengeType::OneStep);
        assert_eq!(ChallengeType::parse("Two-Step"), Some(ChallengeType::TwoStep));
    }
}
