//! Error types shared by the planner core.

use thiserror::Error;

/// Errors raised at the boundary of plan generation and rule checking.
///
/// Rule breaches found by the checker are not errors; they are returned as
/// data in a `RuleCheckResult`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// Malformed account size, timeline, risk setting or wizard state.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Entry and stop-loss coincide, so position size is undefined.
    #[error("degenerate signal on {pair}: entry equals stop loss")]
    DegenerateSignal { pair: String },

    /// A custom firm table broke one of its invariants.
    #[error("invalid rule table: {0}")]
    InvalidRuleTable(String),
}

impl PlanError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Arithmetic on `what` left the representable decimal range.
    pub fn out_of_range(what: &str) -> Self {
        Self::InvalidInput(format!("{} out of range", what))
    }
}

pub type Result<T> = std::result::Result<T, PlanError>;
