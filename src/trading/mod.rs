//! Trading logic: plan generation, position sizing, rule checks, setup session.

mod config;
mod plan_generator;
mod position_sizer;
mod rule_checker;
mod session;

pub use config::{PlannerConfig, RiskTiers, TierParams};
pub use plan_generator::PlanGenerator;
pub use position_sizer::{Instrument, PositionSizer, PositionSizing};
pub use rule_checker::RuleChecker;
pub use session::{SetupSession, SetupStep};
