//! Performance analytics over a trader's closed trades.

use std::fmt;

use chrono::Duration;
use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Look-back window for analytics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum TimeRange {
    #[serde(rename = "7d")]
    #[value(name = "7d")]
    Week,
    #[default]
    #[serde(rename = "30d")]
    #[value(name = "30d")]
    Month,
    #[serde(rename = "90d")]
    #[value(name = "90d")]
    Quarter,
    #[serde(rename = "1y")]
    #[value(name = "1y")]
    Year,
}

impl TimeRange {
    pub fn duration(&self) -> Duration {
        match self {
            TimeRange::Week => Duration::days(7),
            TimeRange::Month => Duration::days(30),
            TimeRange::Quarter => Duration::days(90),
            TimeRange::Year => Duration::days(365),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::Week => "7d",
            TimeRange::Month => "30d",
            TimeRange::Quarter => "90d",
            TimeRange::Year => "1y",
        }
    }
}

/// Headline figures for one period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStats {
    pub total_profit: Decimal,
    pub total_trades: u32,
    pub winning_trades: u32,
    /// Win rate in percent (0-100)
    pub win_rate: f64,
    pub avg_rsr: f64,
}

/// Per-month aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStats {
    /// Short month name ("Jan")
    pub month: String,
    pub profit: Decimal,
    pub trades: u32,
    pub win_rate: f64,
}

/// Per-instrument aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairStats {
    pub pair: String,
    pub trades: u32,
    pub win_rate: f64,
    pub profit: Decimal,
    pub avg_rsr: f64,
}

/// Full analytics report for a time range.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub range: TimeRange,

    pub current: PeriodStats,
    pub previous: PeriodStats,

    // === Period-over-period changes ===
    /// Profit change in percent of |previous profit|
    pub profit_change: f64,
    /// Trade count change in percent
    pub trades_change: f64,
    /// Win rate delta in percentage points
    pub win_rate_change: f64,
    pub rsr_change: f64,

    // === Breakdowns ===
    pub monthly: Vec<MonthlyStats>,
    pub top_pairs: Vec<PairStats>,

    // === Risk ===
    /// Standard deviation of per-trade profit
    pub profit_std_dev: f64,
    /// Largest peak-to-trough drop of cumulative profit, in USD
    pub max_drawdown: Decimal,
}

impl fmt::Display for PerformanceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n{:=^60}", format!(" PERFORMANCE ({}) ", self.range.label()))?;
        writeln!(f)?;
        writeln!(f, "Total Profit:  ${:.2} ({:+.1}%)", self.current.total_profit, self.profit_change)?;
        writeln!(f, "Total Trades:  {} ({:+.1}%)", self.current.total_trades, self.trades_change)?;
        writeln!(f, "Win Rate:      {:.1}% ({:+.1} pts)", self.current.win_rate, self.win_rate_change)?;
        writeln!(f, "Avg RSR:       1:{:.2} ({:+.2})", self.current.avg_rsr, self.rsr_change)?;
        writeln!(f, "Profit StdDev: ${:.2}", self.profit_std_dev)?;
        writeln!(f, "Max Drawdown:  ${:.2}", self.max_drawdown)?;

        if !self.monthly.is_empty() {
            writeln!(f)?;
            writeln!(f, "--- Monthly ---")?;
            for m in &self.monthly {
                writeln!(f, "{:<5} {:>4} trades  {:>6.1}%  ${:.2}", m.month, m.trades, m.win_rate, m.profit)?;
            }
        }

        if !self.top_pairs.is_empty() {
            writeln!(f)?;
            writeln!(f, "--- Top Pairs ---")?;
            for p in &self.top_pairs {
                writeln!(
                    f,
                    "{:<8} {:>4} trades  {:>6.1}%  ${:.0}  1:{:.1}",
                    p.pair, p.trades, p.win_rate, p.profit, p.avg_rsr
                )?;
            }
        }
        write!(f, "{:=^60}", "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_range_labels_parse_strictly() {
        assert_eq!(TimeRange::from_str("7d", true), Ok(TimeRange::Week));
        assert_eq!(TimeRange::from_str("1y", true), Ok(TimeRange::Year));
        assert!(TimeRange::from_str("2w", true).is_err());
        assert_eq!(TimeRange::default().label(), "30d");
    }

    #[test]
    fn test_time_range_serde_uses_labels() {
        let json = serde_json::to_string(&TimeRange::Quarter).unwrap();
        assert_eq!(json, "\"90d\"");
    }
}
