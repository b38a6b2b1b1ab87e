//! Data models for firms, accounts, plans, signals, trades, and analytics.

mod account;
mod firm;
mod metrics;
mod plan;
mod signal;
mod trade;

pub use account::{AccountConfig, RiskConfig, RiskTolerance};
pub use firm::{ChallengeType, PropFirmRules};
pub use metrics::{MonthlyStats, PairStats, PerformanceSummary, PeriodStats, TimeRange};
pub use plan::{PhaseTimeline, PlanExport, PlanTargets, PlanTimeline, PlannedTrade, TradingPlan};
pub use signal::{RuleCheckResult, RuleKind, RuleViolation, SignalCandidate, SignalStatus};
pub use trade::{ClosedTrade, TradeSide};
