//! Built-in prop-firm rule table.

use rust_decimal::Decimal;

use crate::models::{ChallengeType, PropFirmRules};

use ChallengeType::{InstantFunding as IF, OneStep as S1, TwoStep as S2};

/// Name of the firm used when a lookup misses.
pub const DEFAULT_FIRM: &str = "FTMO";

/// Raw row: name, description, daily loss, max drawdown, profit target,
/// min trading days, max position size, scaling target, challenges, sizes.
type Row = (
    &'static str,
    &'static str,
    i64,
    i64,
    i64,
    u32,
    i64,
    i64,
    &'static [ChallengeType],
    &'static [i64],
);

const ROWS: &[Row] = &[
    ("FTMO", "Leading prop firm with 2-step evaluation",
        5, 10, 10, 10, 2, 10, &[S2, IF], &[10_000, 25_000, 50_000, 100_000, 200_000]),
    ("MyForexFunds", "Flexible evaluation with multiple account types",
        5, 12, 8, 5, 3, 8, &[S1, S2, IF], &[5_000, 10_000, 25_000, 50_000, 100_000, 200_000, 300_000]),
    ("The5%ers", "Unique scaling model with high-frequency trading",
        5, 4, 6, 6, 1, 6, &[S1, S2], &[4_000, 6_000, 10_000, 20_000, 40_000, 100_000]),
    ("FundedNext", "Fast-growing prop firm with competitive conditions",
        5, 10, 8, 5, 2, 8, &[S1, S2, IF], &[6_000, 15_000, 25_000, 50_000, 100_000, 200_000]),
    ("Apex Trader Funding", "Futures-focused prop firm with flexible rules",
        3, 6, 8, 10, 10, 8, &[S1, S2], &[25_000, 50_000, 100_000, 150_000, 250_000]),
    ("TopStep", "Established futures prop firm with proven track record",
        2, 4, 6, 8, 5, 6, &[S1, S2], &[50_000, 100_000, 150_000]),
    ("Lux Trading Firm", "Premium prop firm with high capital allocation",
        5, 10, 8, 4, 2, 8, &[S1, S2, IF], &[10_000, 25_000, 50_000, 100_000, 200_000, 500_000]),
    ("E8 Markets", "Innovative prop firm with trader-friendly conditions",
        5, 8, 8, 5, 2, 8, &[S1, S2], &[25_000, 50_000, 100_000, 200_000]),
    ("True Forex Funds", "Reliable prop firm with consistent payouts",
        5, 12, 10, 5, 2, 10, &[S2, IF], &[10_000, 25_000, 50_000, 100_000, 200_000]),
    ("Funded Trading Plus", "Growing prop firm with competitive profit splits",
        4, 8, 8, 5, 2, 8, &[S1, S2], &[10_000, 25_000, 50_000, 100_000]),
    ("Smart Prop Trader", "AI-powered evaluation with smart risk management",
        5, 10, 10, 4, 2, 10, &[S1, S2, IF], &[25_000, 50_000, 100_000, 200_000]),
    ("Surge Trader", "Fast evaluation process with quick payouts",
        3, 6, 6, 3, 2, 6, &[S1, S2], &[25_000, 50_000, 100_000, 200_000]),
    ("Goat Funded Trader", "Unique prop firm with flexible trading conditions",
        5, 8, 7, 5, 2, 7, &[S1, S2], &[10_000, 25_000, 50_000, 100_000]),
    ("Breakout Prop", "Breakout-focused prop firm with technical analysis",
        4, 8, 8, 5, 2, 8, &[S1, S2], &[25_000, 50_000, 100_000]),
    ("Skilled Funded Trader", "Education-focused prop firm with mentorship",
        5, 10, 8, 5, 2, 8, &[S1, S2], &[10_000, 25_000, 50_000, 100_000]),
    ("Bespoke Funding", "Customized funding solutions for professional traders",
        5, 12, 10, 10, 3, 10, &[S2, IF], &[25_000, 50_000, 100_000, 200_000, 500_000]),
    ("Audacity Capital", "Bold prop firm with aggressive scaling opportunities",
        4, 8, 8, 4, 2, 8, &[S1, S2], &[25_000, 50_000, 100_000, 200_000]),
    ("City Traders Imperium", "London-based prop firm with institutional approach",
        5, 10, 8, 5, 2, 8, &[S1, S2], &[10_000, 25_000, 50_000, 100_000]),
    ("Fidelcrest", "Reliable prop firm with consistent evaluation process",
        5, 10, 10, 10, 2, 10, &[S2], &[10_000, 25_000, 50_000, 100_000, 200_000]),
    ("Alpha Capital Group", "Professional prop firm with advanced risk management",
        5, 8, 8, 5, 2, 8, &[S1, S2], &[25_000, 50_000, 100_000, 200_000]),
    ("Instant Funding Prop", "Instant funding with no evaluation required",
        3, 6, 0, 0, 1, 0, &[IF], &[5_000, 10_000, 25_000, 50_000]),
    ("Traders Central", "Community-focused prop firm with social trading",
        5, 10, 8, 5, 2, 8, &[S1, S2], &[10_000, 25_000, 50_000, 100_000]),
    ("Maven Trading", "Educational prop firm with comprehensive training",
        4, 8, 8, 5, 2, 8, &[S1, S2], &[25_000, 50_000, 100_000]),
    ("Rocket21", "Fast-track prop firm with quick evaluation",
        5, 8, 6, 3, 2, 6, &[S1], &[10_000, 25_000, 50_000, 100_000]),
    ("OFP (Our Funded Prop)", "Established prop firm with traditional approach",
        5, 10, 10, 10, 2, 10, &[S2], &[10_000, 25_000, 50_000, 100_000, 200_000]),
];

fn from_row(row: &Row) -> PropFirmRules {
    let (name, description, daily, drawdown, target, days, max_pos, scaling, challenges, sizes) = *row;
    PropFirmRules {
        name: name.to_string(),
        description: description.to_string(),
        daily_loss_pct: Decimal::from(daily),
        max_drawdown_pct: Decimal::from(drawdown),
        profit_target_pct: Decimal::from(target),
        min_trading_days: days,
        max_position_size_pct: Decimal::from(max_pos),
        scaling_target_pct: Decimal::from(scaling),
        challenge_types: challenges.to_vec(),
        account_sizes: sizes.iter().copied().map(Decimal::from).collect(),
        overnight_positions_allowed: None,
        news_trading_allowed: None,
        weekend_holding_allowed: None,
        consistency_rule_enforced: None,
    }
}

/// Trading-conduct restrictions published by a handful of firms.
/// Firms left out publish none and are never flagged for them.
fn apply_conduct_flags(rules: &mut PropFirmRules) {
    match rules.name.as_str() {
        "FTMO" => {
            rules.overnight_positions_allowed = Some(true);
            rules.news_trading_allowed = Some(true);
            rules.weekend_holding_allowed = Some(false);
        }
        "Apex Trader Funding" => {
            rules.overnight_positions_allowed = Some(false);
            rules.consistency_rule_enforced = Some(true);
        }
        "TopStep" => {
            rules.overnight_positions_allowed = Some(false);
            rules.news_trading_allowed = Some(false);
        }
        "The5%ers" => {
            rules.news_trading_allowed = Some(false);
        }
        "Instant Funding Prop" => {
            rules.weekend_holding_allowed = Some(false);
            rules.consistency_rule_enforced = Some(true);
        }
        _ => {}
    }
}

/// All built-in firms in display order.
pub fn firms() -> Vec<PropFirmRules> {
    ROWS.iter()
        .map(|row| {
            let mut rules = from_row(row);
            apply_conduct_flags(&mut rules);
            rules
        })
        .collect()
}
