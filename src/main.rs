//! Prop-Firm Trading Planner
//!
//! Builds challenge trading plans sized to a prop firm's rules and checks
//! trade signals for rule breaches before they are copied.

mod alerts;
mod error;
mod metrics;
mod models;
mod rules;
mod trading;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::alerts::{format_quote, AlertBook, AlertRequest, LogNotifier, PriceAlert};
use crate::metrics::PerformanceCalculator;
use crate::models::{AccountConfig, ChallengeType, ClosedTrade, PropFirmRules, RiskConfig, SignalCandidate, TimeRange};
use crate::rules::{RuleBook, DEFAULT_FIRM};
use crate::trading::{PlannerConfig, PositionSizer, SetupSession};

/// Prop-firm challenge planner CLI.
#[derive(Parser)]
#[command(name = "propplan")]
#[command(about = "Plan prop-firm challenges and check signals against firm rules", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", env = "PROPPLAN_LOG_LEVEL", global = true)]
    log_level: String,

    /// Custom firm rule table (JSON)
    #[arg(long, env = "PROPPLAN_RULES", global = true)]
    rules: Option<PathBuf>,

    /// Planner configuration overrides (JSON)
    #[arg(long, env = "PROPPLAN_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List prop firms in the rule table
    Firms {
        /// Filter by name or description
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show a firm's rules
    Rules {
        /// Firm name (exact match)
        firm: String,

        /// Account size to express limits in dollars
        #[arg(short, long)]
        account: Option<Decimal>,
    },

    /// Generate a trading plan
    Plan {
        /// Firm name (exact match)
        #[arg(short, long, default_value = DEFAULT_FIRM)]
        firm: String,

        /// Account size in USD
        #[arg(short, long)]
        account: Decimal,

        /// Challenge type (1-step, 2-step, instant-funding)
        #[arg(short, long, default_value = "2-step")]
        challenge: String,

        /// Risk per trade in percent
        #[arg(short, long, default_value = "1")]
        risk: Decimal,

        /// Reward-to-risk ratio
        #[arg(long, default_value = "2")]
        rr: Decimal,

        /// Timeline in days (30, 45, 60)
        #[arg(short, long, default_value = "30")]
        timeline: u32,

        /// Print the plan export as JSON
        #[arg(long)]
        json: bool,

        /// Write the plan export JSON to a file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Check a signal against a firm's rules
    Check {
        /// Firm name (exact match)
        #[arg(short, long, default_value = DEFAULT_FIRM)]
        firm: String,

        /// Account size in USD
        #[arg(short, long)]
        account: Decimal,

        /// Challenge type (1-step, 2-step, instant-funding)
        #[arg(short, long, default_value = "2-step")]
        challenge: String,

        /// Risk per trade in percent
        #[arg(short, long, default_value = "1")]
        risk: Decimal,

        /// Reward-to-risk ratio
        #[arg(long, default_value = "2")]
        rr: Decimal,

        /// Instrument, e.g. EURUSD
        #[arg(short, long)]
        pair: String,

        /// Entry price
        #[arg(short, long)]
        entry: Decimal,

        /// Stop-loss price
        #[arg(short, long)]
        stop: Decimal,

        /// Take-profit price
        #[arg(long)]
        take_profit: Option<Decimal>,

        /// Realized P&L of a closed signal in USD
        #[arg(long)]
        pnl: Option<Decimal>,

        /// Evaluation time (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },

    /// Position size and reward-to-risk for a trade
    Size {
        /// Account balance in USD
        #[arg(short, long)]
        balance: Decimal,

        /// Risk per trade in percent
        #[arg(short, long, default_value = "1")]
        risk: Decimal,

        /// Instrument, e.g. EURUSD
        #[arg(short, long)]
        pair: String,

        /// Entry price
        #[arg(short, long)]
        entry: Decimal,

        /// Stop-loss price
        #[arg(short, long)]
        stop: Decimal,

        /// Take-profit price
        #[arg(short, long)]
        take_profit: Option<Decimal>,
    },

    /// Replay quote snapshots against a set of price alerts
    Alerts {
        /// Alert definitions (JSON array)
        #[arg(short, long)]
        alerts: PathBuf,

        /// Quote snapshots (JSON array of symbol -> price maps)
        #[arg(short, long)]
        quotes: PathBuf,
    },

    /// Performance analytics over closed trades
    Analytics {
        /// Closed trade history (JSON array)
        #[arg(short, long)]
        trades: PathBuf,

        /// Time range
        #[arg(short, long, value_enum, default_value_t = TimeRange::Month)]
        range: TimeRange,

        /// Last day of the range, defaults to today
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let book = load_rule_book(cli.rules.as_deref())?;
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Firms { search } => {
            let firms: Vec<&PropFirmRules> = match &search {
                Some(term) => book.search(term),
                None => book.firms().iter().collect(),
            };

            if firms.is_empty() {
                println!("No firms match. Use 'propplan firms' to list all.");
                return Ok(());
            }

            println!(
                "\n{:<26} {:>6} {:>6} {:>7} {:>6}  {:<30}",
                "FIRM", "DAILY", "MAXDD", "TARGET", "DAYS", "CHALLENGES"
            );
            println!("{}", "-".repeat(86));

            for firm in firms {
                let challenges: Vec<&str> = firm.challenge_types.iter().map(|c| c.as_str()).collect();
                println!(
                    "{:<26} {:>5}% {:>5}% {:>6}% {:>6}  {:<30}",
                    truncate(&firm.name, 24),
                    firm.daily_loss_pct,
                    firm.max_drawdown_pct,
                    firm.profit_target_pct,
                    firm.min_trading_days,
                    challenges.join(", ")
                );
            }
        }

        Commands::Rules { firm, account } => {
            let found = book.lookup(&firm);
            if found.is_default {
                println!("Unknown firm '{}', showing {} rules.", firm, found.rules.name);
            }
            print_rules(found.rules, account);
        }

        Commands::Plan {
            firm,
            account,
            challenge,
            risk,
            rr,
            timeline,
            json,
            out,
        } => {
            let mut session = SetupSession::new(config);
            configure_session(&mut session, &book, &firm, account, &challenge, risk, rr)?;

            let export = session.export(timeline, Utc::now())?;

            if json || out.is_some() {
                let doc = serde_json::to_string_pretty(&export)?;
                match out {
                    Some(path) => {
                        fs::write(&path, doc)
                            .with_context(|| format!("writing plan to {}", path.display()))?;
                        info!(path = %path.display(), "Plan exported");
                        println!("Plan written to {}", path.display());
                    }
                    None => println!("{}", doc),
                }
                return Ok(());
            }

            let plan = &export.plan;

            println!(
                "\n=== Trading Plan: {} ${} ({}) ===",
                export.firm, export.account.size, export.account.challenge_type
            );
            println!(
                "Risk Tolerance: {} ({}% per trade, 1:{})",
                export.risk_tolerance, export.risk.risk_percentage_per_trade, export.risk.risk_reward_ratio
            );

            println!(
                "\n{:<3} {:>6} {:>8} {:<10} {:>12}  {:<20}",
                "#", "RISK", "TARGET", "TIMEFRAME", "EXPECTED", "PAIRS"
            );
            println!("{}", "-".repeat(66));
            for trade in &plan.trades {
                println!(
                    "{:<3} {:>5}% {:>7}% {:<10} {:>12}  {:<20}",
                    trade.sequence_id,
                    trade.risk_pct,
                    trade.target_pct,
                    trade.timeframe_label,
                    format!("${:.2}", trade.expected_return),
                    trade.instrument_pairs.join(", ")
                );
            }

            println!("\n--- Timeline ---");
            println!("Phase 1:          {} days", plan.timeline.phase1_days);
            println!("Phase 2:          {} days", plan.timeline.phase2_days);
            println!("Total:            {} days", plan.timeline.total_days);

            println!("\n--- Targets ---");
            println!("Phase 1 Return:   ${:.2}", plan.targets.phase1_return);
            println!("Phase 2 Return:   ${:.2}", plan.targets.phase2_return);
            println!("Total Target:     ${:.2}", plan.targets.total_target);
            println!("Monthly Earnings: ${:.2}", plan.targets.monthly_earnings);
            println!("Cumulative Risk:  {}%", plan.cumulative_risk_pct());

            if plan.phase1_overshoots() {
                println!("\nNote: phase 1 expected return already exceeds the profit target.");
            }
        }

        Commands::Check {
            firm,
            account,
            challenge,
            risk,
            rr,
            pair,
            entry,
            stop,
            take_profit,
            pnl,
            at,
        } => {
            let mut session = SetupSession::new(config.clone());
            configure_session(&mut session, &book, &firm, account, &challenge, risk, rr)?;

            let mut signal = SignalCandidate::new(pair, entry, stop);
            signal.take_profit_price = take_profit;
            signal.realized_pnl = pnl;

            let result = session.check_signal(&signal, at.unwrap_or_else(Utc::now))?;
            let firm_name = session.firm().map(|f| f.name.as_str()).unwrap_or(DEFAULT_FIRM);

            println!("\n=== Signal Check: {} vs {} ===", signal.pair, firm_name);
            println!("Risk Amount:      ${:.2}", result.risk_amount);
            println!("Pips at Risk:     {:.1}", result.pips_at_risk);
            println!("Position Size:    {:.2}", result.position_size);
            println!("Position Value:   ${:.2}", result.position_value);
            println!("Position %:       {:.1}%", result.position_pct);

            if let Some(tp) = take_profit {
                let rsr = PositionSizer::new(config).risk_reward(&signal.pair, entry, stop, tp)?;
                println!("Reward:Risk:      1:{:.2}", rsr);
            }

            if result.is_compliant {
                println!("\nCompliant: no rule breaches.");
            } else {
                println!("\n--- Violations ({}) ---", result.violations.len());
                for violation in &result.violations {
                    println!("  {}", violation);
                }
            }
        }

        Commands::Size {
            balance,
            risk,
            pair,
            entry,
            stop,
            take_profit,
        } => {
            let sizer = PositionSizer::new(config);
            let sizing = sizer.size(balance, risk, &pair, entry, stop)?;

            println!("\n=== Position Size: {} ===", pair);
            println!("Risk Amount:      ${:.2}", sizing.risk_amount);
            println!("Pip Size:         {}", sizing.pip_size);
            println!("Pips at Risk:     {:.1}", sizing.pips_at_risk);
            println!("Position Size:    {:.2}", sizing.position_size);
            println!("Lots:             {:.2}", sizing.lots);
            println!("Position Value:   ${:.2}", sizing.position_value);
            println!("Position %:       {:.1}%", sizing.position_pct);

            if let Some(tp) = take_profit {
                let rsr = sizer.risk_reward(&pair, entry, stop, tp)?;
                println!("Reward:Risk:      1:{:.2}", rsr);
            }
        }

        Commands::Alerts { alerts, quotes } => {
            let requests: Vec<AlertRequest> = read_json(&alerts)?;
            let snapshots: Vec<BTreeMap<String, Decimal>> = read_json(&quotes)?;

            let mut alert_book = AlertBook::new();
            for request in requests {
                alert_book.create(request, Utc::now())?;
            }

            let notifier = LogNotifier;
            let mut fired = 0;
            for snapshot in &snapshots {
                fired += alert_book.evaluate(snapshot, Utc::now(), &notifier).len();
            }

            println!(
                "\n=== Alerts: {} armed, {} triggered ({} snapshots) ===",
                alert_book.armed().count(),
                fired,
                snapshots.len()
            );
            println!(
                "\n{:<8} {:<13} {:>12} {:>12}  {:<10}",
                "SYMBOL", "CONDITION", "LEVEL", "LAST", "STATE"
            );
            println!("{}", "-".repeat(60));

            for alert in alert_book.alerts() {
                println!("{}", alert_row(alert, alert_book.last_quote(&alert.symbol)));
            }

            let recent: Vec<_> = alert_book.recent_triggers().collect();
            if !recent.is_empty() {
                println!("\n--- Recent Triggers ---");
                for alert in recent {
                    let price = alert
                        .triggered_price
                        .map(|p| format_quote(&alert.symbol, p))
                        .unwrap_or_default();
                    println!(
                        "  {} {} {} (triggered at {})",
                        alert.symbol,
                        alert.condition.as_str(),
                        format_quote(&alert.symbol, alert.level),
                        price
                    );
                }
            }
        }

        Commands::Analytics {
            trades,
            range,
            today,
        } => {
            let history: Vec<ClosedTrade> = read_json(&trades)?;
            let today = today.unwrap_or_else(|| Utc::now().date_naive());

            info!(trades = history.len(), range = range.label(), "Running analytics");

            let summary = PerformanceCalculator::calculate(&history, range, today);
            println!("{}", summary);
        }

        Commands::Config => {
            println!("\n=== Risk Tiers ===\n");
            for (name, tier) in [
                ("Conservative", &config.risk_tiers.conservative),
                ("Moderate", &config.risk_tiers.moderate),
                ("Aggressive", &config.risk_tiers.aggressive),
            ] {
                println!(
                    "  {:<14} base {}%  max {}%  target x{}",
                    name, tier.base_risk, tier.max_risk, tier.target_multiplier
                );
            }

            println!("\n=== Position Sizing ===\n");
            println!("  Default Pip Size:     {}", config.default_pip_size);
            for (quote, pip) in &config.pip_sizes {
                println!("  Pip Size ({}):       {}", quote, pip);
            }
            println!("  Standard Lot Units:   {}", config.standard_lot_units);
            println!("  Lot Pip Value:        ${}", config.standard_lot_pip_value);

            println!("\n=== Rule Checks ===\n");
            println!("  Consistency Baseline: {}%", config.consistency_baseline_pct);
            println!("  Consistency Share:    {}%", config.consistency_max_share * Decimal::ONE_HUNDRED);
            let days: Vec<String> = config.weekend_days.iter().map(|d| d.to_string()).collect();
            println!("  Weekend Days:         {}", days.join(", "));

            println!("\n=== Rule Table ===\n");
            println!(
                "  Source:               {}",
                cli.rules
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "built-in".to_string())
            );
            println!("  Firms:                {}", book.firms().len());
            println!("  Default Firm:         {}", book.default_rules().name);
        }
    }

    Ok(())
}

/// One line of the alerts table.
fn alert_row(alert: &PriceAlert, last: Option<Decimal>) -> String {
    let last = last
        .map(|p| format_quote(&alert.symbol, p))
        .unwrap_or_else(|| "-".to_string());
    let state = if alert.triggered {
        "triggered"
    } else if alert.is_active {
        "armed"
    } else {
        "paused"
    };
    format!(
        "{:<8} {:<13} {:>12} {:>12}  {:<10}",
        alert.symbol,
        alert.condition.as_str(),
        format_quote(&alert.symbol, alert.level),
        last,
        state
    )
}

/// Apply firm, account and risk selections, reporting an unknown firm.
fn configure_session(
    session: &mut SetupSession,
    book: &RuleBook,
    firm: &str,
    account: Decimal,
    challenge: &str,
    risk: Decimal,
    rr: Decimal,
) -> Result<()> {
    if session.select_firm(book, firm) {
        let used = session.firm().map(|f| f.name.as_str()).unwrap_or(DEFAULT_FIRM);
        println!("Unknown firm '{}', using {} rules.", firm, used);
    }

    let challenge_type = ChallengeType::parse(challenge)
        .ok_or_else(|| anyhow::anyhow!("Unknown challenge type: {}", challenge))?;

    session.configure_account(AccountConfig::new(account, challenge_type))?;
    session.configure_risk(RiskConfig::new(risk, rr))?;
    Ok(())
}

fn print_rules(firm: &PropFirmRules, account: Option<Decimal>) {
    let limit = |pct: Decimal| match account {
        Some(size) => format!("{}% (${:.2})", pct, PropFirmRules::dollars(pct, size)),
        None => format!("{}%", pct),
    };
    let flag = |value: Option<bool>| match value {
        Some(true) => "Yes",
        Some(false) => "No",
        None => "-",
    };

    println!("\n=== {} ===", firm.name);
    if !firm.description.is_empty() {
        println!("{}", firm.description);
    }

    println!("\n--- Limits ---");
    println!("Daily Loss:         {}", limit(firm.daily_loss_pct));
    println!("Max Drawdown:       {}", limit(firm.max_drawdown_pct));
    println!("Profit Target:      {}", limit(firm.profit_target_pct));
    println!("Max Position Size:  {}", limit(firm.max_position_size_pct));
    println!("Scaling Target:     {}", limit(firm.scaling_target_pct));
    println!("Min Trading Days:   {}", firm.min_trading_days);

    println!("\n--- Conduct ---");
    println!("Overnight Holding:  {}", flag(firm.overnight_positions_allowed));
    println!("News Trading:       {}", flag(firm.news_trading_allowed));
    println!("Weekend Holding:    {}", flag(firm.weekend_holding_allowed));
    println!("Consistency Rule:   {}", flag(firm.consistency_rule_enforced));

    let challenges: Vec<&str> = firm.challenge_types.iter().map(|c| c.as_str()).collect();
    let sizes: Vec<String> = firm.account_sizes.iter().map(|s| format!("${}", s)).collect();
    println!("\n--- Offer ---");
    println!("Challenges:         {}", challenges.join(", "));
    println!("Account Sizes:      {}", sizes.join(", "));
}

fn load_rule_book(path: Option<&Path>) -> Result<RuleBook> {
    match path {
        Some(path) => RuleBook::from_path(path)
            .with_context(|| format!("loading rule table {}", path.display())),
        None => Ok(RuleBook::builtin()),
    }
}

fn load_config(path: Option<&Path>) -> Result<PlannerConfig> {
    match path {
        Some(path) => PlannerConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(PlannerConfig::default()),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

/// Truncate a string to max length.
fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}
