//! Calculator for performance analytics: win rate, RSR, period changes, drawdown.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use statrs::statistics::Statistics;

use crate::models::{ClosedTrade, MonthlyStats, PairStats, PerformanceSummary, PeriodStats, TimeRange};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Number of pairs reported in the top-pairs table.
const TOP_PAIRS: usize = 5;

/// Calculator for trade-history analytics.
pub struct PerformanceCalculator;

impl PerformanceCalculator {
    /// Analyse `trades` over `range`, ending at `today`.
    ///
    /// The previous period is the equally long window right before the
    /// current one and only feeds the change figures.
    pub fn calculate(trades: &[ClosedTrade], range: TimeRange, today: NaiveDate) -> PerformanceSummary {
        let span = range.duration();
        let current_start = today - span;
        let previous_start = current_start - span;

        let mut current: Vec<&ClosedTrade> = trades
            .iter()
            .filter(|t| t.date >= current_start && t.date <= today)
            .collect();
        current.sort_by_key(|t| t.date);

        let previous: Vec<&ClosedTrade> = trades
            .iter()
            .filter(|t| t.date >= previous_start && t.date < current_start)
            .collect();

        let current_stats = Self::period_stats(&current);
        let previous_stats = Self::period_stats(&previous);

        let cur_profit = current_stats.total_profit.to_f64().unwrap_or(0.0);
        let prev_profit = previous_stats.total_profit.to_f64().unwrap_or(0.0);
        let profit_change = if prev_profit != 0.0 {
            (cur_profit - prev_profit) / prev_profit.abs() * 100.0
        } else {
            0.0
        };

        let trades_change = if previous_stats.total_trades > 0 {
            (current_stats.total_trades as f64 - previous_stats.total_trades as f64)
                / previous_stats.total_trades as f64
                * 100.0
        } else {
            0.0
        };

        PerformanceSummary {
            range,
            win_rate_change: current_stats.win_rate - previous_stats.win_rate,
            rsr_change: current_stats.avg_rsr - previous_stats.avg_rsr,
            profit_change,
            trades_change,
            monthly: Self::monthly(&current),
            top_pairs: Self::top_pairs(&current),
            profit_std_dev: Self::profit_std_dev(&current),
            max_drawdown: Self::max_drawdown(&current),
            current: current_stats,
            previous: previous_stats,
        }
    }

    /// Profit, count, win rate and average RSR for a set of trades.
    fn period_stats(trades: &[&ClosedTrade]) -> PeriodStats {
        if trades.is_empty() {
            return PeriodStats::default();
        }

        let total_trades = trades.len() as u32;
        let winning_trades = trades.iter().filter(|t| t.is_win()).count() as u32;
        let total_rsr: f64 = trades.iter().filter_map(|t| t.rsr.to_f64()).sum();

        PeriodStats {
            total_profit: trades.iter().map(|t| t.profit).sum(),
            total_trades,
            winning_trades,
            win_rate: winning_trades as f64 / total_trades as f64 * 100.0,
            avg_rsr: total_rsr / total_trades as f64,
        }
    }

    /// Per-month totals in calendar order, skipping empty months.
    fn monthly(trades: &[&ClosedTrade]) -> Vec<MonthlyStats> {
        let mut by_month: BTreeMap<u32, (Decimal, u32, u32)> = BTreeMap::new();
        for trade in trades {
            let entry = by_month.entry(trade.date.month0()).or_insert((Decimal::ZERO, 0, 0));
            entry.0 += trade.profit;
            entry.1 += 1;
            if trade.is_win() {
                entry.2 += 1;
            }
        }

        by_month
            .into_iter()
            .map(|(month0, (profit, count, wins))| MonthlyStats {
                month: MONTHS[month0 as usize].to_string(),
                profit,
                trades: count,
                win_rate: wins as f64 / count as f64 * 100.0,
            })
            .collect()
    }

    /// Best pairs by profit.
    fn top_pairs(trades: &[&ClosedTrade]) -> Vec<PairStats> {
        let mut by_pair: BTreeMap<&str, (u32, u32, Decimal, f64)> = BTreeMap::new();
        for trade in trades {
            let entry = by_pair.entry(trade.pair.as_str()).or_insert((0, 0, Decimal::ZERO, 0.0));
            entry.0 += 1;
            if trade.is_win() {
                entry.1 += 1;
            }
            entry.2 += trade.profit;
            entry.3 += trade.rsr.to_f64().unwrap_or(0.0);
        }

        let mut pairs: Vec<PairStats> = by_pair
            .into_iter()
            .map(|(pair, (count, wins, profit, total_rsr))| PairStats {
                pair: pair.to_string(),
                trades: count,
                win_rate: round1(wins as f64 / count as f64 * 100.0),
                profit: profit.round(),
                avg_rsr: round1(total_rsr / count as f64),
            })
            .collect();

        pairs.sort_by(|a, b| b.profit.cmp(&a.profit));
        pairs.truncate(TOP_PAIRS);
        pairs
    }

    /// Sample standard deviation of per-trade profit.
    fn profit_std_dev(trades: &[&ClosedTrade]) -> f64 {
        if trades.len() < 2 {
            return 0.0;
        }
        let profits: Vec<f64> = trades.iter().filter_map(|t| t.profit.to_f64()).collect();
        let std_dev = profits.std_dev();
        if std_dev.is_nan() {
            0.0
        } else {
            std_dev
        }
    }

    /// Largest drop of the cumulative profit curve from its running peak.
    fn max_drawdown(trades: &[&ClosedTrade]) -> Decimal {
        let mut equity = Decimal::ZERO;
        let mut peak = Decimal::ZERO;
        let mut max_dd = Decimal::ZERO;

        for trade in trades {
            equity += trade.profit;
            if equity > peak {
                peak = equity;
            }
            let dd = peak - equity;
            if dd > max_dd {
                max_dd = dd;
            }
        }

        max_dd
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TradeSide;
    use rust_decimal_macros::dec;

    fn trade(date: (i32, u32, u32), pair: &str, profit: Decimal, rsr: Decimal) -> ClosedTrade {
        ClosedTrade {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            pair: pair.to_string(),
            side: TradeSide::Buy,
            pips: profit / dec!(10),
            profit,
            rsr,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn history() -> Vec<ClosedTrade> {
        vec![
            // Current 30 days
            trade((2026, 10, 18), "EURUSD", dec!(200), dec!(2)),
            trade((2026, 10, 10), "EURUSD", dec!(-120), dec!(1)),
            trade((2026, 10, 2), "XAUUSD", dec!(400), dec!(3)),
            trade((2026, 9, 25), "GBPUSD", dec!(100), dec!(2)),
            // Previous 30 days
            trade((2026, 9, 10), "EURUSD", dec!(150), dec!(2)),
            trade((2026, 8, 25), "USDJPY", dec!(-50), dec!(1)),
            // Outside both windows
            trade((2026, 6, 1), "EURUSD", dec!(999), dec!(2)),
        ]
    }

    #[test]
    fn test_current_period_stats() {
        let summary = PerformanceCalculator::calculate(&history(), TimeRange::Month, today());

        assert_eq!(summary.current.total_trades, 4);
        assert_eq!(summary.current.winning_trades, 3);
        assert_eq!(summary.current.total_profit, dec!(580));
        assert!((summary.current.win_rate - 75.0).abs() < 1e-9);
        assert!((summary.current.avg_rsr - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_period_over_period_changes() {
        let summary = PerformanceCalculator::calculate(&history(), TimeRange::Month, today());

        assert_eq!(summary.previous.total_trades, 2);
        assert_eq!(summary.previous.total_profit, dec!(100));
        assert!((summary.profit_change - 480.0).abs() < 1e-9);
        assert!((summary.trades_change - 100.0).abs() < 1e-9);
        assert!((summary.win_rate_change - 25.0).abs() < 1e-9);
        assert!((summary.rsr_change - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_monthly_and_top_pairs() {
        let summary = PerformanceCalculator::calculate(&history(), TimeRange::Month, today());

        let months: Vec<_> = summary.monthly.iter().map(|m| (m.month.as_str(), m.trades)).collect();
        assert_eq!(months, vec![("Sep", 1), ("Oct", 3)]);

        assert_eq!(summary.top_pairs[0].pair, "XAUUSD");
        assert_eq!(summary.top_pairs[0].profit, dec!(400));
        let eur = summary.top_pairs.iter().find(|p| p.pair == "EURUSD").unwrap();
        assert_eq!(eur.trades, 2);
        assert!((eur.win_rate - 50.0).abs() < 1e-9);
        assert!((eur.avg_rsr - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_max_drawdown_follows_date_order() {
        // Chronological: +100, +400, -120, +200 -> peak 500, trough 380
        let summary = PerformanceCalculator::calculate(&history(), TimeRange::Month, today());
        assert_eq!(summary.max_drawdown, dec!(120));
        assert!(summary.profit_std_dev > 0.0);
    }

    #[test]
    fn test_trades_after_today_are_ignored() {
        let mut trades = history();
        trades.push(trade((2026, 10, 25), "EURUSD", dec!(5000), dec!(4)));

        let summary = PerformanceCalculator::calculate(&trades, TimeRange::Month, today());
        assert_eq!(summary.current.total_trades, 4);
        assert_eq!(summary.current.total_profit, dec!(580));
    }

    #[test]
    fn test_empty_history() {
        let summary = PerformanceCalculator::calculate(&[], TimeRange::Week, today());
        assert_eq!(summary.current.total_trades, 0);
        assert_eq!(summary.profit_change, 0.0);
        assert!(summary.monthly.is_empty());
        assert_eq!(summary.max_drawdown, Decimal::ZERO);
    }
}
