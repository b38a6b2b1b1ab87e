//! Pip-based position sizing and risk:reward arithmetic.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use super::PlannerConfig;
use crate::error::{PlanError, Result};

/// Currency pair split into base and quote legs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instrument {
    pub symbol: String,
    pub base: String,
    pub quote: Option<String>,
}

impl Instrument {
    /// Normalize "EUR/USD", "eur_usd" or "EURUSD" to "EURUSD".
    ///
    /// Symbols shorter than six characters (indices, tickers) carry no
    /// quote currency.
    pub fn parse(pair: &str) -> Self {
        let symbol: String = pair
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if symbol.len() >= 6 {
            let split = symbol.len() - 3;
            Self {
                base: symbol[..split].to_string(),
                quote: Some(symbol[split..].to_string()),
                symbol,
            }
        } else {
            Self {
                base: symbol.clone(),
                quote: None,
                symbol,
            }
        }
    }
}

/// Derived sizing figures for one entry/stop pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSizing {
    /// USD risked
    pub risk_amount: Decimal,
    pub pip_size: Decimal,
    pub pips_at_risk: Decimal,
    /// Dollars per pip
    pub position_size: Decimal,
    /// Standard lots
    pub lots: Decimal,
    /// Notional in USD
    pub position_value: Decimal,
    /// Notional as % of account
    pub position_pct: Decimal,
}

/// Calculator for position sizes from account risk and stop distance.
#[derive(Debug, Clone)]
pub struct PositionSizer {
    config: PlannerConfig,
}

impl PositionSizer {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    /// Pip size looked up by the pair's quote currency.
    pub fn pip_size(&self, pair: &str) -> Decimal {
        match Instrument::parse(pair).quote {
            Some(quote) => self.config.pip_size_for_quote(&quote),
            None => self.config.default_pip_size,
        }
    }

    /// Stop distance in pips. Zero distance is a degenerate signal.
    pub fn pips_at_risk(&self, pair: &str, entry: Decimal, stop: Decimal) -> Result<Decimal> {
        let pips = (entry - stop)
            .abs()
            .checked_div(self.pip_size(pair))
            .ok_or_else(|| PlanError::out_of_range("pips at risk"))?;
        if pips.is_zero() {
            return Err(PlanError::DegenerateSignal {
                pair: pair.to_string(),
            });
        }
        Ok(pips)
    }

    /// Size a position so that hitting the stop loses `risk_pct` of `balance`.
    ///
    /// Assumes one dollar per pip per unit of size; a standard lot moves
    /// `standard_lot_pip_value` dollars per pip.
    pub fn size(
        &self,
        balance: Decimal,
        risk_pct: Decimal,
        pair: &str,
        entry: Decimal,
        stop: Decimal,
    ) -> Result<PositionSizing> {
        if balance <= Decimal::ZERO {
            return Err(PlanError::invalid(format!(
                "enter a positive account size (got {})",
                balance
            )));
        }
        if risk_pct <= Decimal::ZERO {
            return Err(PlanError::invalid(format!(
                "enter a positive risk percentage (got {})",
                risk_pct
            )));
        }

        let risk_amount = balance
            .checked_mul(risk_pct)
            .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
            .ok_or_else(|| PlanError::out_of_range("risk amount"))?;
        let pip_size = self.pip_size(pair);
        let pips_at_risk = self.pips_at_risk(pair, entry, stop)?;

        let position_size = risk_amount
            .checked_div(pips_at_risk)
            .ok_or_else(|| PlanError::out_of_range("position size"))?;
        let lots = position_size
            .checked_div(self.config.standard_lot_pip_value)
            .ok_or_else(|| PlanError::out_of_range("lot count"))?;
        let position_value = entry
            .checked_mul(lots)
            .and_then(|v| v.checked_mul(self.config.standard_lot_units))
            .ok_or_else(|| PlanError::out_of_range("position value"))?;
        let position_pct = position_value
            .checked_div(balance)
            .and_then(|v| v.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or_else(|| PlanError::out_of_range("position share of account"))?;

        debug!(
            pair = %pair,
            risk_amount = %risk_amount,
            pips = %pips_at_risk,
            size = %position_size,
            notional = %position_value,
            "Position sized"
        );

        Ok(PositionSizing {
            risk_amount,
            pip_size,
            pips_at_risk,
            position_size,
            lots,
            position_value,
            position_pct,
        })
    }

    /// Reward-to-risk multiple: |take profit - entry| / |entry - stop|.
    pub fn risk_reward(
        &self,
        pair: &str,
        entry: Decimal,
        stop: Decimal,
        take_profit: Decimal,
    ) -> Result<Decimal> {
        let risk = (entry - stop).abs();
        if risk.is_zero() {
            return Err(PlanError::DegenerateSignal {
                pair: pair.to_string(),
            });
        }
        (take_profit - entry)
            .abs()
            .checked_div(risk)
            .ok_or_else(|| PlanError::out_of_range("reward-to-risk"))
    }
}

impl Default for PositionSizer {
    fn default() -> Self {
        Self::new(PlannerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_instrument_parsing() {
        let eur = Instrument::parse("EUR/USD");
        assert_eq!(eur.symbol, "EURUSD");
        assert_eq!(eur.base, "EUR");
        assert_eq!(eur.quote.as_deref(), Some("USD"));

        let jpy = Instrument::parse("gbp_jpy");
        assert_eq!(jpy.quote.as_deref(), Some("JPY"));

        assert_eq!(Instrument::parse("US30").quote, None);
    }

    #[test]
    fn test_pip_size_by_quote_currency() {
        let sizer = PositionSizer::default();
        assert_eq!(sizer.pip_size("USDJPY"), dec!(0.01));
        assert_eq!(sizer.pip_size("EURUSD"), dec!(0.0001));
        // JPY as the base leg does not make the pip 0.01
        assert_eq!(sizer.pip_size("JPYUSD"), dec!(0.0001));
    }

    #[test]
    fn test_eurusd_sizing() {
        let sizer = PositionSizer::default();
        let sizing = sizer
            .size(dec!(10000), dec!(2), "EURUSD", dec!(1.0985), dec!(1.0965))
            .unwrap();

        assert_eq!(sizing.risk_amount, dec!(200));
        assert_eq!(sizing.pips_at_risk, dec!(20));
        assert_eq!(sizing.position_size, dec!(10));
        assert_eq!(sizing.lots, dec!(1));
        assert_eq!(sizing.position_value, dec!(109850));
        assert_eq!(sizing.position_pct, dec!(1098.5));
    }

    #[test]
    fn test_usdjpy_sizing() {
        let sizer = PositionSizer::default();
        let sizing = sizer
            .size(dec!(10000), dec!(1), "USDJPY", dec!(149.85), dec!(150.15))
            .unwrap();

        assert_eq!(sizing.pips_at_risk, dec!(30));
        assert_eq!(sizing.position_size.round_dp(2), dec!(3.33));
    }

    #[test]
    fn test_zero_stop_distance_is_degenerate() {
        let sizer = PositionSizer::default();
        let err = sizer
            .size(dec!(10000), dec!(1), "EURUSD", dec!(1.1), dec!(1.1))
            .unwrap_err();
        assert!(matches!(err, PlanError::DegenerateSignal { .. }));
    }

    #[test]
    fn test_non_positive_risk_is_rejected() {
        let sizer = PositionSizer::default();
        for risk in [dec!(0), dec!(-2)] {
            let err = sizer
                .size(dec!(10000), risk, "EURUSD", dec!(1.0985), dec!(1.0965))
                .unwrap_err();
            assert!(matches!(err, PlanError::InvalidInput(_)));
        }
    }

    #[test]
    fn test_oversized_position_is_an_error_not_a_panic() {
        let sizer = PositionSizer::default();
        let err = sizer
            .size(Decimal::MAX, dec!(1), "EURUSD", dec!(1.0985), dec!(1.0965))
            .unwrap_err();
        assert!(matches!(err, PlanError::InvalidInput(ref msg) if msg.contains("out of range")));
    }

    #[test]
    fn test_risk_reward() {
        let sizer = PositionSizer::default();
        let rr = sizer
            .risk_reward("EURUSD", dec!(1.0985), dec!(1.0965), dec!(1.1025))
            .unwrap();
        assert_eq!(rr, dec!(2));
    }
}
