//! Prop-firm rule table: immutable firm-name lookup with a designated default.

mod builtin;

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PlanError, Result};
use crate::models::PropFirmRules;

pub use builtin::DEFAULT_FIRM;

/// Outcome of a firm lookup.
///
/// `is_default` is set when the name was not found and the table's default
/// rule set was substituted.
#[derive(Debug, Clone, Copy)]
pub struct FirmLookup<'a> {
    pub rules: &'a PropFirmRules,
    pub is_default: bool,
}

/// On-disk layout of a custom rule table.
#[derive(Debug, Serialize, Deserialize)]
struct RuleBookFile {
    default: String,
    firms: Vec<PropFirmRules>,
}

/// Read-only collection of firm rules, built once at startup.
#[derive(Debug, Clone)]
pub struct RuleBook {
    firms: Vec<PropFirmRules>,
    default_index: usize,
}

impl RuleBook {
    /// Table with the built-in firms; FTMO is the default.
    pub fn builtin() -> Self {
        let firms = builtin::firms();
        let default_index = firms
            .iter()
            .position(|f| f.name == DEFAULT_FIRM)
            .unwrap_or(0);
        Self { firms, default_index }
    }

    /// Build a table, checking every firm's invariants and the default.
    pub fn new(firms: Vec<PropFirmRules>, default: &str) -> Result<Self> {
        if firms.is_empty() {
            return Err(PlanError::InvalidRuleTable("table has no firms".to_string()));
        }

        let mut seen = HashSet::new();
        for firm in &firms {
            firm.validate().map_err(PlanError::InvalidRuleTable)?;
            if !seen.insert(firm.name.as_str()) {
                return Err(PlanError::InvalidRuleTable(format!(
                    "duplicate firm name: {}",
                    firm.name
                )));
            }
        }

        let default_index = firms.iter().position(|f| f.name == default).ok_or_else(|| {
            PlanError::InvalidRuleTable(format!("default firm {:?} is not in the table", default))
        })?;

        debug!(firms = firms.len(), default = %default, "Rule table loaded");
        Ok(Self { firms, default_index })
    }

    /// Parse a `{"default": ..., "firms": [...]}` document.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: RuleBookFile = serde_json::from_str(json)
            .map_err(|e| PlanError::InvalidRuleTable(e.to_string()))?;
        Self::new(file.firms, &file.default)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PlanError::InvalidRuleTable(format!("{}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Serialize the table in the same layout `from_json` reads.
    pub fn to_json(&self) -> Result<String> {
        let file = RuleBookFile {
            default: self.default_rules().name.clone(),
            firms: self.firms.clone(),
        };
        serde_json::to_string_pretty(&file).map_err(|e| PlanError::InvalidRuleTable(e.to_string()))
    }

    /// Exact, case-sensitive lookup with fallback to the default firm.
    pub fn lookup(&self, name: &str) -> FirmLookup<'_> {
        match self.firms.iter().find(|f| f.name == name) {
            Some(rules) => FirmLookup {
                rules,
                is_default: false,
            },
            None => {
                let rules = self.default_rules();
                warn!(
                    requested = %name,
                    fallback = %rules.name,
                    "Unknown prop firm, using default rules"
                );
                FirmLookup {
                    rules,
                    is_default: true,
                }
            }
        }
    }

    pub fn default_rules(&self) -> &PropFirmRules {
        &self.firms[self.default_index]
    }

    pub fn firms(&self) -> &[PropFirmRules] {
        &self.firms
    }

    /// Firms whose name or description contains `term`, ignoring case.
    pub fn search(&self, term: &str) -> Vec<&PropFirmRules> {
        let needle = term.to_lowercase();
        self.firms
            .iter()
            .filter(|f| {
                f.name.to_lowercase().contains(&needle)
                    || f.description.to_lowercase().contains(&needle)
            })
            .collect()
    }
}

impl Default for RuleBook {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_builtin_table_is_valid() {
        let book = RuleBook::builtin();
        let rebuilt = RuleBook::new(book.firms().to_vec(), DEFAULT_FIRM);
        assert!(rebuilt.is_ok());
        assert_eq!(book.default_rules().name, "FTMO");
    }

    #[test]
    fn test_lookup_exact_match() {
        let book = RuleBook::builtin();
        let found = book.lookup("The5%ers");
        assert!(!found.is_default);
        assert_eq!(found.rules.max_drawdown_pct, dec!(4));
        assert_eq!(found.rules.profit_target_pct, dec!(6));
    }

    #[test]
    fn test_lookup_unknown_firm_falls_back_to_default() {
        let book = RuleBook::builtin();
        let found = book.lookup("NotARealFirm");
        assert!(found.is_default);
        assert_eq!(found.rules.name, "FTMO");
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let book = RuleBook::builtin();
        assert!(book.lookup("ftmo").is_default);
        assert!(!book.lookup("FTMO").is_default);
    }

    #[test]
    fn test_search_matches_description() {
        let book = RuleBook::builtin();
        let futures: Vec<_> = book.search("FUTURES").iter().map(|f| f.name.as_str()).collect();
        assert_eq!(futures, vec!["Apex Trader Funding", "TopStep"]);
    }

    #[test]
    fn test_json_round_trip_keeps_default() {
        let book = RuleBook::builtin();
        let json = book.to_json().unwrap();
        let loaded = RuleBook::from_json(&json).unwrap();
        assert_eq!(loaded.firms().len(), book.firms().len());
        assert_eq!(loaded.default_rules().name, "FTMO");
    }

    #[test]
    fn test_custom_table_rejects_missing_default() {
        let json = r#"{
            "default": "Nobody",
            "firms": [{
                "name": "Solo", "dailyLossPct": "5", "maxDrawdownPct": "10",
                "profitTargetPct": "8", "minTradingDays": 5, "maxPositionSizePct": "2",
                "scalingTargetPct": "8", "challengeTypes": ["1-step"],
                "accountSizes": ["10000", "20000"]
            }]
        }"#;
        let err = RuleBook::from_json(json).unwrap_err();
        assert!(matches!(err, PlanError::InvalidRuleTable(_)));
    }

    #[test]
    fn test_custom_table_rejects_duplicate_names() {
        let mut firms = RuleBook::builtin().firms().to_vec();
        firms.push(firms[0].clone());
        assert!(RuleBook::new(firms, DEFAULT_FIRM).is_err());
    }
}
