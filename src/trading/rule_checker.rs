//! Rule-breach checks that gate copying a signal.
//!
//! Violations are returned as data for display; only degenerate input is an
//! error. The overnight and news checks flag every signal for firms that
//! prohibit them, since signals carry no holding period or news calendar.

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::{PlannerConfig, PositionSizer};
use crate::error::{PlanError, Result};
use crate::models::{
    AccountConfig, PropFirmRules, RiskConfig, RuleCheckResult, RuleKind, RuleViolation,
    SignalCandidate,
};

/// Checks signals against a firm's rules for a configured account.
#[derive(Debug, Clone, Default)]
pub struct RuleChecker {
    config: PlannerConfig,
    sizer: PositionSizer,
}

impl RuleChecker {
    pub fn new(config: PlannerConfig) -> Self {
        let sizer = PositionSizer::new(config.clone());
        Self { config, sizer }
    }

    /// Evaluate `signal` at time `now`.
    ///
    /// `now` only matters for the weekend-holding rule.
    pub fn check(
        &self,
        signal: &SignalCandidate,
        firm: &PropFirmRules,
        account: &AccountConfig,
        risk: &RiskConfig,
        now: DateTime<Utc>,
    ) -> Result<RuleCheckResult> {
        account.validate()?;
        risk.validate()?;

        let risk_pct = risk.risk_percentage_per_trade;
        let sizing = self.sizer.size(
            account.size,
            risk_pct,
            &signal.pair,
            signal.entry_price,
            signal.stop_loss_price,
        )?;

        let mut violations = Vec::new();
        let mut flag = |rule: RuleKind, message: String| {
            violations.push(RuleViolation { rule, message });
        };

        if risk_pct > firm.daily_loss_pct {
            flag(
                RuleKind::DailyLoss,
                format!(
                    "Risk per trade {}% exceeds the {}% daily loss limit",
                    risk_pct, firm.daily_loss_pct
                ),
            );
        }

        if sizing.position_pct > firm.max_position_size_pct {
            flag(
                RuleKind::MaxPositionSize,
                format!(
                    "Position of ${} is {}% of the account, above the {}% maximum",
                    sizing.position_value.round_dp(2),
                    sizing.position_pct.round_dp(1),
                    firm.max_position_size_pct
                ),
            );
        }

        if firm.overnight_positions_allowed == Some(false) {
            flag(
                RuleKind::OvernightPositions,
                format!("{} does not allow holding positions overnight", firm.name),
            );
        }

        if firm.news_trading_allowed == Some(false) {
            flag(
                RuleKind::NewsTrading,
                format!("{} does not allow trading around high-impact news", firm.name),
            );
        }

        if firm.weekend_holding_allowed == Some(false)
            && self.config.weekend_days.contains(&now.weekday())
        {
            flag(
                RuleKind::WeekendHolding,
                format!(
                    "{} does not allow holding over the weekend ({})",
                    firm.name,
                    now.weekday()
                ),
            );
        }

        if firm.consistency_rule_enforced == Some(true) {
            if let Some(pnl) = signal.realized_pnl {
                let baseline = account
                    .size
                    .checked_mul(self.config.consistency_baseline_pct)
                    .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
                    .ok_or_else(|| PlanError::out_of_range("consistency baseline"))?;
                let limit = baseline
                    .checked_mul(self.config.consistency_max_share)
                    .ok_or_else(|| PlanError::out_of_range("consistency limit"))?;
                if pnl > limit {
                    flag(
                        RuleKind::Consistency,
                        format!(
                            "Single result of ${} exceeds ${} ({}% of the ${} profit baseline)",
                            pnl.round_dp(2),
                            limit.round_dp(2),
                            self.config.consistency_max_share * Decimal::ONE_HUNDRED,
                            baseline.round_dp(2)
                        ),
                    );
                }
            }
        }

        let is_compliant = violations.is_empty();
        if is_compliant {
            debug!(pair = %signal.pair, firm = %firm.name, "Signal is compliant");
        } else {
            info!(
                pair = %signal.pair,
                firm = %firm.name,
                violations = violations.len(),
                "Signal breaches firm rules"
            );
        }

        Ok(RuleCheckResult {
            is_compliant,
            violations,
            risk_amount: sizing.risk_amount,
            pips_at_risk: sizing.pips_at_risk,
            position_size: sizing.position_size,
            position_value: sizing.position_value,
            position_pct: sizing.position_pct,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChallengeType;
    use crate::rules::RuleBook;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    // 2026-10-14 is a Wednesday, 2026-10-16 a Friday.
    fn wednesday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 14, 12, 0, 0).unwrap()
    }

    fn friday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    fn permissive(name: &str) -> PropFirmRules {
        let mut rules = RuleBook::builtin().lookup("FTMO").rules.clone();
        rules.name = name.to_string();
        rules.max_position_size_pct = dec!(100000);
        rules.overnight_positions_allowed = None;
        rules.news_trading_allowed = None;
        rules.weekend_holding_allowed = None;
        rules.consistency_rule_enforced = None;
        rules
    }

    fn account(size: Decimal) -> AccountConfig {
        AccountConfig::new(size, ChallengeType::TwoStep)
    }

    #[test]
    fn test_eurusd_breaches_ftmo_position_size() {
        let book = RuleBook::builtin();
        let ftmo = book.lookup("FTMO").rules;
        let signal = SignalCandidate::new("EURUSD", dec!(1.0985), dec!(1.0965));

        let result = RuleChecker::default()
            .check(&signal, ftmo, &account(dec!(10000)), &RiskConfig::new(dec!(2), dec!(2)), wednesday())
            .unwrap();

        assert_eq!(result.risk_amount, dec!(200));
        assert_eq!(result.pips_at_risk, dec!(20));
        assert_eq!(result.position_size, dec!(10));
        assert_eq!(result.position_value, dec!(109850));
        assert_eq!(result.position_pct, dec!(1098.5));
        assert!(result.has(RuleKind::MaxPositionSize));
        assert!(!result.has(RuleKind::DailyLoss));
        assert!(!result.is_compliant);
    }

    #[test]
    fn test_equal_entry_and_stop_is_degenerate() {
        let signal = SignalCandidate::new("EURUSD", dec!(1.0985), dec!(1.0985));
        let err = RuleChecker::default()
            .check(
                &signal,
                &permissive("Any"),
                &account(dec!(10000)),
                &RiskConfig::new(dec!(1), dec!(2)),
                wednesday(),
            )
            .unwrap_err();
        assert!(matches!(err, PlanError::DegenerateSignal { .. }));
    }

    #[test]
    fn test_rejects_non_positive_risk_settings() {
        let signal = SignalCandidate::new("EURUSD", dec!(1.0985), dec!(1.0965));
        let checker = RuleChecker::default();
        for risk in [
            RiskConfig::new(dec!(0), dec!(2)),
            RiskConfig::new(dec!(-2), dec!(2)),
            RiskConfig::new(dec!(1), dec!(-1)),
        ] {
            let err = checker
                .check(&signal, &permissive("Any"), &account(dec!(10000)), &risk, wednesday())
                .unwrap_err();
            assert!(matches!(err, PlanError::InvalidInput(_)));
        }
    }

    #[test]
    fn test_near_zero_stop_distance_overflow_is_an_error() {
        // One 1e-27 price step of stop distance blows the notional past Decimal::MAX.
        let signal = SignalCandidate::new(
            "EURUSD",
            dec!(1.0985),
            dec!(1.098499999999999999999999999),
        );
        let err = RuleChecker::default()
            .check(
                &signal,
                &permissive("Any"),
                &account(dec!(10000)),
                &RiskConfig::new(dec!(2), dec!(2)),
                wednesday(),
            )
            .unwrap_err();
        assert!(matches!(err, PlanError::InvalidInput(ref msg) if msg.contains("out of range")));
    }

    #[test]
    fn test_compliant_when_within_limits() {
        let signal = SignalCandidate::new("EURUSD", dec!(1.0985), dec!(1.0965));
        let result = RuleChecker::default()
            .check(
                &signal,
                &permissive("Open"),
                &account(dec!(10000)),
                &RiskConfig::new(dec!(1), dec!(2)),
                friday(),
            )
            .unwrap();
        assert!(result.is_compliant);
        assert!(result.violations.is_empty());
    }

    #[test]
    fn test_daily_loss_violation_is_monotonic_in_risk() {
        let checker = RuleChecker::default();
        let firm = permissive("Open");
        let signal = SignalCandidate::new("GBPUSD", dec!(1.2534), dec!(1.2554));

        let mut seen = false;
        let mut pct = dec!(0.5);
        while pct <= dec!(10) {
            let result = checker
                .check(&signal, &firm, &account(dec!(25000)), &RiskConfig::new(pct, dec!(2)), wednesday())
                .unwrap();
            if seen {
                assert!(result.has(RuleKind::DailyLoss), "violation vanished at {}%", pct);
            }
            seen |= result.has(RuleKind::DailyLoss);
            pct += dec!(0.5);
        }
        assert!(seen);
    }

    #[test]
    fn test_daily_loss_boundary_is_not_a_breach() {
        let firm = permissive("Open");
        let signal = SignalCandidate::new("EURUSD", dec!(1.0985), dec!(1.0965));
        let result = RuleChecker::default()
            .check(&signal, &firm, &account(dec!(10000)), &RiskConfig::new(dec!(5), dec!(2)), wednesday())
            .unwrap();
        assert!(!result.has(RuleKind::DailyLoss));
    }

    #[test]
    fn test_overnight_and_news_flag_unconditionally() {
        let mut firm = permissive("Strict");
        firm.overnight_positions_allowed = Some(false);
        firm.news_trading_allowed = Some(false);
        let signal = SignalCandidate::new("EURUSD", dec!(1.0985), dec!(1.0965));

        let result = RuleChecker::default()
            .check(&signal, &firm, &account(dec!(10000)), &RiskConfig::new(dec!(1), dec!(2)), wednesday())
            .unwrap();
        assert!(result.has(RuleKind::OvernightPositions));
        assert!(result.has(RuleKind::NewsTrading));
        assert_eq!(result.violations.len(), 2);
    }

    #[test]
    fn test_weekend_rule_depends_on_day() {
        let mut firm = permissive("NoWeekend");
        firm.weekend_holding_allowed = Some(false);
        let signal = SignalCandidate::new("EURUSD", dec!(1.0985), dec!(1.0965));
        let checker = RuleChecker::default();
        let risk = RiskConfig::new(dec!(1), dec!(2));

        let midweek = checker.check(&signal, &firm, &account(dec!(10000)), &risk, wednesday()).unwrap();
        assert!(!midweek.has(RuleKind::WeekendHolding));

        let end_of_week = checker.check(&signal, &firm, &account(dec!(10000)), &risk, friday()).unwrap();
        assert!(end_of_week.has(RuleKind::WeekendHolding));
    }

    #[test]
    fn test_consistency_rule_uses_half_of_five_percent_baseline() {
        let mut firm = permissive("Consistent");
        firm.consistency_rule_enforced = Some(true);
        let checker = RuleChecker::default();
        let risk = RiskConfig::new(dec!(1), dec!(2));

        // Baseline on $10,000 is $500, limit $250.
        let mut signal = SignalCandidate::new("EURUSD", dec!(1.0985), dec!(1.0965));
        signal.realized_pnl = Some(dec!(250));
        let at_limit = checker.check(&signal, &firm, &account(dec!(10000)), &risk, wednesday()).unwrap();
        assert!(!at_limit.has(RuleKind::Consistency));

        signal.realized_pnl = Some(dec!(250.01));
        let over = checker.check(&signal, &firm, &account(dec!(10000)), &risk, wednesday()).unwrap();
        assert!(over.has(RuleKind::Consistency));

        signal.realized_pnl = None;
        let open = checker.check(&signal, &firm, &account(dec!(10000)), &risk, wednesday()).unwrap();
        assert!(open.is_compliant);
    }
}
