//! Closed trade records used for performance analytics.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    #[serde(alias = "buy", alias = "BUY")]
    Buy,
    #[serde(alias = "sell", alias = "SELL")]
    Sell,
}

/// A finished trade from the trader's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosedTrade {
    /// Day the trade closed
    pub date: NaiveDate,

    pub pair: String,

    pub side: TradeSide,

    /// Signed result in pips
    pub pips: Decimal,

    /// Signed result in USD
    pub profit: Decimal,

    /// Reward-to-risk achieved (2.0 means 1:2)
    pub rsr: Decimal,
}

impl ClosedTrade {
    pub fn is_win(&self) -> bool {
        self.profit > Decimal::ZERO
    }
}
