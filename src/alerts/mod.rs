//! Price alerts: conditions on instrument quotes with pluggable notification.

mod book;
mod notifier;

pub use book::{
    format_quote, AlertBook, AlertCondition, AlertRequest, NotificationMethod, PriceAlert,
};
pub use notifier::{LogNotifier, Notifier};
