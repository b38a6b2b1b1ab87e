//! Alert storage and evaluation against incoming quotes.

use std::collections::{BTreeMap, HashMap, VecDeque};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::Notifier;
use crate::error::{PlanError, Result};
use crate::trading::Instrument;

/// Triggered alerts kept for the recent-activity list.
const MAX_RECENT_TRIGGERS: usize = 5;

/// Price condition an alert waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCondition {
    Above,
    Below,
    CrossesUp,
    CrossesDown,
}

impl AlertCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertCondition::Above => "above",
            AlertCondition::Below => "below",
            AlertCondition::CrossesUp => "crosses_up",
            AlertCondition::CrossesDown => "crosses_down",
        }
    }

    /// Whether a move from `previous` to `price` meets the condition at `level`.
    ///
    /// Crossings need a previous quote; the first quote for a symbol never
    /// counts as a cross.
    fn holds(&self, previous: Option<Decimal>, price: Decimal, level: Decimal) -> bool {
        match self {
            AlertCondition::Above => price > level,
            AlertCondition::Below => price < level,
            AlertCondition::CrossesUp => previous.is_some_and(|p| p <= level) && price > level,
            AlertCondition::CrossesDown => previous.is_some_and(|p| p >= level) && price < level,
        }
    }
}

/// Channel a triggered alert is delivered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationMethod {
    Email,
    Push,
    Sms,
    Sound,
}

impl NotificationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationMethod::Email => "email",
            NotificationMethod::Push => "push",
            NotificationMethod::Sms => "sms",
            NotificationMethod::Sound => "sound",
        }
    }
}

fn default_methods() -> Vec<NotificationMethod> {
    vec![NotificationMethod::Push, NotificationMethod::Sound]
}

/// Parameters for a new alert.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRequest {
    pub symbol: String,
    pub condition: AlertCondition,
    pub level: Decimal,
    #[serde(default = "default_methods")]
    pub notification_methods: Vec<NotificationMethod>,
}

/// A stored price alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceAlert {
    pub id: Uuid,
    pub symbol: String,
    pub condition: AlertCondition,
    pub level: Decimal,
    pub notification_methods: Vec<NotificationMethod>,
    pub is_active: bool,
    pub triggered: bool,
    pub created_at: DateTime<Utc>,
    pub triggered_at: Option<DateTime<Utc>>,
    pub triggered_price: Option<Decimal>,
}

impl PriceAlert {
    /// Active and not yet triggered.
    pub fn is_armed(&self) -> bool {
        self.is_active && !self.triggered
    }
}

/// Format a quote the way the dashboard shows it: 3 decimals for JPY pairs,
/// 5 otherwise.
pub fn format_quote(symbol: &str, price: Decimal) -> String {
    if symbol.to_ascii_uppercase().contains("JPY") {
        format!("{:.3}", price)
    } else {
        format!("{:.5}", price)
    }
}

/// Collection of alerts plus the last quote seen per symbol.
#[derive(Debug, Clone, Default)]
pub struct AlertBook {
    alerts: Vec<PriceAlert>,
    last_quotes: HashMap<String, Decimal>,
    recent: VecDeque<PriceAlert>,
}

impl AlertBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an alert. The level must be positive.
    pub fn create(&mut self, request: AlertRequest, now: DateTime<Utc>) -> Result<Uuid> {
        if request.level <= Decimal::ZERO {
            return Err(PlanError::invalid(format!(
                "alert level must be positive, got {}",
                request.level
            )));
        }

        let symbol = Instrument::parse(&request.symbol).symbol;
        if symbol.is_empty() {
            return Err(PlanError::invalid("alert symbol is empty"));
        }

        let methods = if request.notification_methods.is_empty() {
            default_methods()
        } else {
            request.notification_methods
        };

        let id = Uuid::new_v4();
        debug!(id = %id, symbol = %symbol, condition = request.condition.as_str(), level = %request.level, "Alert created");

        self.alerts.push(PriceAlert {
            id,
            symbol,
            condition: request.condition,
            level: request.level,
            notification_methods: methods,
            is_active: true,
            triggered: false,
            created_at: now,
            triggered_at: None,
            triggered_price: None,
        });
        Ok(id)
    }

    /// Remove an alert. Returns false if no alert has that id.
    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.alerts.len();
        self.alerts.retain(|a| a.id != id);
        self.alerts.len() != before
    }

    /// Flip an alert's active flag, returning the new state.
    pub fn toggle(&mut self, id: Uuid) -> Option<bool> {
        let alert = self.alerts.iter_mut().find(|a| a.id == id)?;
        alert.is_active = !alert.is_active;
        Some(alert.is_active)
    }

    /// Re-arm a triggered alert.
    pub fn reset(&mut self, id: Uuid) -> bool {
        match self.alerts.iter_mut().find(|a| a.id == id) {
            Some(alert) => {
                alert.triggered = false;
                alert.triggered_at = None;
                alert.triggered_price = None;
                true
            }
            None => false,
        }
    }

    /// Check every armed alert against `quotes` and notify the ones that fire.
    ///
    /// Returns the alerts triggered by this batch. Quotes are remembered as
    /// the reference for the next batch's crossing checks.
    pub fn evaluate(
        &mut self,
        quotes: &BTreeMap<String, Decimal>,
        now: DateTime<Utc>,
        notifier: &dyn Notifier,
    ) -> Vec<PriceAlert> {
        let quotes: HashMap<String, Decimal> = quotes
            .iter()
            .map(|(symbol, price)| (Instrument::parse(symbol).symbol, *price))
            .collect();

        let mut fired = Vec::new();
        for alert in self.alerts.iter_mut().filter(|a| a.is_armed()) {
            let Some(&price) = quotes.get(&alert.symbol) else {
                continue;
            };
            let previous = self.last_quotes.get(&alert.symbol).copied();

            if !alert.condition.holds(previous, price, alert.level) {
                continue;
            }

            alert.triggered = true;
            alert.triggered_at = Some(now);
            alert.triggered_price = Some(price);

            for method in &alert.notification_methods {
                notifier.notify(*method, alert);
            }

            self.recent.push_front(alert.clone());
            self.recent.truncate(MAX_RECENT_TRIGGERS);
            fired.push(alert.clone());
        }

        self.last_quotes.extend(quotes);
        fired
    }

    pub fn get(&self, id: Uuid) -> Option<&PriceAlert> {
        self.alerts.iter().find(|a| a.id == id)
    }

    pub fn alerts(&self) -> &[PriceAlert] {
        &self.alerts
    }

    pub fn armed(&self) -> impl Iterator<Item = &PriceAlert> {
        self.alerts.iter().filter(|a| a.is_armed())
    }

    pub fn triggered(&self) -> impl Iterator<Item = &PriceAlert> {
        self.alerts.iter().filter(|a| a.triggered)
    }

    /// Most recent triggers first.
    pub fn recent_triggers(&self) -> impl Iterator<Item = &PriceAlert> {
        self.recent.iter()
    }

    pub fn last_quote(&self, symbol: &str) -> Option<Decimal> {
        self.last_quotes.get(&Instrument::parse(symbol).symbol).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<(NotificationMethod, String)>>,
    }

    impl Notifier for Recorder {
        fn notify(&self, method: NotificationMethod, alert: &PriceAlert) {
            self.calls.borrow_mut().push((method, alert.symbol.clone()));
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 14, 30, 0).unwrap()
    }

    fn request(symbol: &str, condition: AlertCondition, level: Decimal) -> AlertRequest {
        AlertRequest {
            symbol: symbol.to_string(),
            condition,
            level,
            notification_methods: default_methods(),
        }
    }

    fn quotes(pairs: &[(&str, Decimal)]) -> BTreeMap<String, Decimal> {
        pairs.iter().map(|(s, p)| (s.to_string(), *p)).collect()
    }

    #[test]
    fn test_create_rejects_non_positive_level() {
        let mut book = AlertBook::new();
        let err = book
            .create(request("EURUSD", AlertCondition::Above, dec!(0)), now())
            .unwrap_err();
        assert!(matches!(err, PlanError::InvalidInput(_)));
        assert!(book.alerts().is_empty());
    }

    #[test]
    fn test_above_is_strict_and_fires_once() {
        let mut book = AlertBook::new();
        let id = book
            .create(request("EUR/USD", AlertCondition::Above, dec!(1.0900)), now())
            .unwrap();
        let recorder = Recorder::default();

        let fired = book.evaluate(&quotes(&[("EURUSD", dec!(1.0900))]), now(), &recorder);
        assert!(fired.is_empty());

        let fired = book.evaluate(&quotes(&[("EURUSD", dec!(1.0901))]), now(), &recorder);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].triggered_price, Some(dec!(1.0901)));
        assert_eq!(recorder.calls.borrow().len(), 2);

        let fired = book.evaluate(&quotes(&[("EURUSD", dec!(1.0950))]), now(), &recorder);
        assert!(fired.is_empty());
        assert!(book.get(id).unwrap().triggered);
    }

    #[test]
    fn test_crossing_needs_previous_quote() {
        let mut book = AlertBook::new();
        book.create(request("USDJPY", AlertCondition::CrossesDown, dec!(149.50)), now())
            .unwrap();
        let recorder = Recorder::default();

        // First quote is already below: no cross observed.
        assert!(book.evaluate(&quotes(&[("USDJPY", dec!(149.20))]), now(), &recorder).is_empty());
        assert!(book.evaluate(&quotes(&[("USDJPY", dec!(149.10))]), now(), &recorder).is_empty());

        book.evaluate(&quotes(&[("USDJPY", dec!(149.60))]), now(), &recorder);
        let fired = book.evaluate(&quotes(&[("USDJPY", dec!(149.40))]), now(), &recorder);
        assert_eq!(fired.len(), 1);
        assert_eq!(book.last_quote("USD/JPY"), Some(dec!(149.40)));
    }

    #[test]
    fn test_inactive_alert_is_skipped_until_toggled() {
        let mut book = AlertBook::new();
        let id = book
            .create(request("XAUUSD", AlertCondition::Below, dec!(2000)), now())
            .unwrap();
        assert_eq!(book.toggle(id), Some(false));

        let recorder = Recorder::default();
        assert!(book.evaluate(&quotes(&[("XAUUSD", dec!(1990))]), now(), &recorder).is_empty());

        assert_eq!(book.toggle(id), Some(true));
        assert_eq!(book.evaluate(&quotes(&[("XAUUSD", dec!(1990))]), now(), &recorder).len(), 1);
    }

    #[test]
    fn test_reset_rearms_and_delete_removes() {
        let mut book = AlertBook::new();
        let id = book
            .create(request("GBPUSD", AlertCondition::Above, dec!(1.2700)), now())
            .unwrap();
        let recorder = Recorder::default();
        book.evaluate(&quotes(&[("GBPUSD", dec!(1.2750))]), now(), &recorder);
        assert_eq!(book.triggered().count(), 1);

        assert!(book.reset(id));
        assert_eq!(book.armed().count(), 1);
        assert_eq!(book.get(id).unwrap().triggered_at, None);

        assert!(book.delete(id));
        assert!(!book.delete(id));
        assert!(!book.reset(id));
        assert_eq!(book.toggle(id), None);
    }

    #[test]
    fn test_recent_triggers_keep_latest_five() {
        let mut book = AlertBook::new();
        for i in 1..=7 {
            book.create(request("BTCUSD", AlertCondition::Above, Decimal::from(i * 1000)), now())
                .unwrap();
        }
        let recorder = Recorder::default();
        let fired = book.evaluate(&quotes(&[("BTCUSD", dec!(45000))]), now(), &recorder);
        assert_eq!(fired.len(), 7);

        let recent: Vec<Decimal> = book.recent_triggers().map(|a| a.level).collect();
        assert_eq!(recent, vec![dec!(7000), dec!(6000), dec!(5000), dec!(4000), dec!(3000)]);
    }

    #[test]
    fn test_format_quote_precision() {
        assert_eq!(format_quote("USDJPY", dec!(149.5)), "149.500");
        assert_eq!(format_quote("EURUSD", dec!(1.085)), "1.08500");
    }

    #[test]
    fn test_request_defaults_notification_methods() {
        let json = r#"{"symbol":"AUDUSD","condition":"crosses_up","level":"0.6700"}"#;
        let req: AlertRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.condition, AlertCondition::CrossesUp);
        assert_eq!(req.notification_methods, default_methods());
    }
}
