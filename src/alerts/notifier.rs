//! Delivery of triggered alerts.

use tracing::info;

use super::book::{format_quote, NotificationMethod, PriceAlert};

/// Sink for triggered alerts. Called once per method on the alert.
pub trait Notifier {
    fn notify(&self, method: NotificationMethod, alert: &PriceAlert);
}

/// Emits each notification as a tracing event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, method: NotificationMethod, alert: &PriceAlert) {
        let price = alert
            .triggered_price
            .map(|p| format_quote(&alert.symbol, p))
            .unwrap_or_default();

        info!(
            id = %alert.id,
            method = method.as_str(),
            symbol = %alert.symbol,
            condition = alert.condition.as_str(),
            level = %alert.level,
            price = %price,
            "Price alert triggered"
        );
    }
}
