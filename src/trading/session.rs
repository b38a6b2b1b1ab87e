//! Setup wizard state: firm, account and risk selections plus the cached plan.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::{PlanGenerator, PlannerConfig, RuleChecker};
use crate::error::{PlanError, Result};
use crate::models::{
    AccountConfig, PlanExport, PlanTimeline, PropFirmRules, RiskConfig, RuleCheckResult,
    SignalCandidate, TradingPlan,
};
use crate::rules::RuleBook;

/// Next outstanding step of the setup wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStep {
    Firm,
    Account,
    Risk,
    Plan,
    Complete,
}

/// Selections made during setup, shared by the plan view and signal checks.
///
/// The plan is derived on demand and cached until an input changes.
#[derive(Debug, Clone)]
pub struct SetupSession {
    generator: PlanGenerator,
    checker: RuleChecker,
    firm: Option<PropFirmRules>,
    firm_is_default: bool,
    account: Option<AccountConfig>,
    risk: Option<RiskConfig>,
    cached_plan: Option<(PlanTimeline, TradingPlan)>,
}

impl SetupSession {
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            generator: PlanGenerator::new(config.clone()),
            checker: RuleChecker::new(config),
            firm: None,
            firm_is_default: false,
            account: None,
            risk: None,
            cached_plan: None,
        }
    }

    /// Select a firm by name. Returns true when the name was unknown and the
    /// table's default firm was selected instead.
    ///
    /// An account whose challenge type the new firm does not offer is cleared.
    pub fn select_firm(&mut self, book: &RuleBook, name: &str) -> bool {
        let found = book.lookup(name);
        let rules = found.rules.clone();

        if let Some(account) = &self.account {
            if !rules.offers(account.challenge_type) {
                debug!(
                    firm = %rules.name,
                    challenge = %account.challenge_type,
                    "Clearing account: challenge not offered by new firm"
                );
                self.account = None;
            }
        }

        info!(firm = %rules.name, is_default = found.is_default, "Prop firm selected");
        self.firm = Some(rules);
        self.firm_is_default = found.is_default;
        self.cached_plan = None;
        found.is_default
    }

    pub fn configure_account(&mut self, account: AccountConfig) -> Result<()> {
        let firm = self.require_firm()?;
        account.validate_for(firm)?;
        self.account = Some(account);
        self.cached_plan = None;
        Ok(())
    }

    pub fn configure_risk(&mut self, risk: RiskConfig) -> Result<()> {
        risk.validate()?;
        self.risk = Some(risk);
        self.cached_plan = None;
        Ok(())
    }

    /// Plan for `timeline_days`, reusing the cached plan when nothing changed.
    pub fn plan(&mut self, timeline_days: u32) -> Result<&TradingPlan> {
        let timeline = PlanTimeline::from_days(timeline_days)?;

        let stale = !matches!(&self.cached_plan, Some((cached, _)) if *cached == timeline);
        if stale {
            let (firm, account, risk) = self.inputs()?;
            let plan = self.generator.generate(firm, account, risk, timeline_days)?;
            self.cached_plan = Some((timeline, plan));
        }

        self.cached_plan
            .as_ref()
            .map(|(_, plan)| plan)
            .ok_or_else(|| PlanError::invalid("no plan generated"))
    }

    /// Downloadable document for the plan at `timeline_days`.
    pub fn export(&mut self, timeline_days: u32, now: DateTime<Utc>) -> Result<PlanExport> {
        let plan = self.plan(timeline_days)?.clone();
        let (firm, account, risk) = self.inputs()?;

        Ok(PlanExport {
            firm: firm.name.clone(),
            firm_is_default: self.firm_is_default,
            account: account.clone(),
            risk: risk.clone(),
            risk_tolerance: risk.tolerance(),
            selected_timeline: PlanTimeline::from_days(timeline_days)?,
            generated_at: now,
            plan,
        })
    }

    /// Check a feed signal against the configured firm and account.
    pub fn check_signal(
        &self,
        signal: &SignalCandidate,
        now: DateTime<Utc>,
    ) -> Result<RuleCheckResult> {
        let (firm, account, risk) = self.inputs()?;
        self.checker.check(signal, firm, account, risk, now)
    }

    pub fn next_step(&self) -> SetupStep {
        if self.firm.is_none() {
            SetupStep::Firm
        } else if self.account.is_none() {
            SetupStep::Account
        } else if self.risk.is_none() {
            SetupStep::Risk
        } else if self.cached_plan.is_none() {
            SetupStep::Plan
        } else {
            SetupStep::Complete
        }
    }

    /// Clear every selection.
    pub fn reset(&mut self) {
        self.firm = None;
        self.firm_is_default = false;
        self.account = None;
        self.risk = None;
        self.cached_plan = None;
    }

    pub fn firm(&self) -> Option<&PropFirmRules> {
        self.firm.as_ref()
    }

    pub fn firm_is_default(&self) -> bool {
        self.firm_is_default
    }

    fn require_firm(&self) -> Result<&PropFirmRules> {
        self.firm
            .as_ref()
            .ok_or_else(|| PlanError::invalid("select a prop firm first"))
    }

    fn inputs(&self) -> Result<(&PropFirmRules, &AccountConfig, &RiskConfig)> {
        let firm = self.require_firm()?;
        let account = self
            .account
            .as_ref()
            .ok_or_else(|| PlanError::invalid("configure the account first"))?;
        let risk = self
            .risk
            .as_ref()
            .ok_or_else(|| PlanError::invalid("configure risk settings first"))?;
        Ok((firm, account, risk))
    }
}

impl Default for SetupSession {
    fn default() -> Self {
        Self::new(PlannerConfig::default())
    }
}
