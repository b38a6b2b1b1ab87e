//! Trading signals and the outcome of checking them against firm rules.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a signal in the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalStatus {
    Active,
    Pending,
    Closed,
}

/// A trade idea offered by the signal feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalCandidate {
    /// Instrument, e.g. "EURUSD" or "EUR/USD"
    pub pair: String,

    pub entry_price: Decimal,

    pub stop_loss_price: Decimal,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit_price: Option<Decimal>,

    pub status: SignalStatus,

    /// Realized P&L in USD, known once the signal has played out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realized_pnl: Option<Decimal>,
}

impl SignalCandidate {
    pub fn new(pair: impl Into<String>, entry_price: Decimal, stop_loss_price: Decimal) -> Self {
        Self {
            pair: pair.into(),
            entry_price,
            stop_loss_price,
            take_profit_price: None,
            status: SignalStatus::Active,
            realized_pnl: None,
        }
    }
}

/// Which firm rule a violation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleKind {
    DailyLoss,
    MaxPositionSize,
    OvernightPositions,
    NewsTrading,
    WeekendHolding,
    Consistency,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::DailyLoss => "daily loss",
            RuleKind::MaxPositionSize => "max position size",
            RuleKind::OvernightPositions => "overnight positions",
            RuleKind::NewsTrading => "news trading",
            RuleKind::WeekendHolding => "weekend holding",
            RuleKind::Consistency => "consistency",
        }
    }
}

/// A single rule breach, with a message meant for the trader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleViolation {
    pub rule: RuleKind,
    pub message: String,
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.rule.as_str(), self.message)
    }
}

/// Result of checking one signal; recomputed on every evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleCheckResult {
    pub is_compliant: bool,
    pub violations: Vec<RuleViolation>,

    /// USD risked on the trade
    pub risk_amount: Decimal,
    pub pips_at_risk: Decimal,
    /// Dollars per pip
    pub position_size: Decimal,
    /// Notional value of the position in USD
    pub position_value: Decimal,
    /// Notional as % of account
    pub position_pct: Decimal,
}

impl RuleCheckResult {
    pub fn has(&self, rule: RuleKind) -> bool {
        self.violations.iter().any(|v| v.rule == rule)
    }
}
