//! Alert evaluation against the latest prices.
//!
//! Each alert is a two-state machine, `untriggered` and `triggered`. A pass
//! moves it to `triggered` when its asset's price satisfies the condition
//! and back to `untriggered` when it no longer does, with no dead-band in
//! between. Only the `untriggered -> triggered` edge produces a
//! [`Notification`]. Assets missing from the records leave their alerts
//! untouched.

use crate::format::format_amount;
use crate::state::{Alert, AssetRecord, Notification, NotificationLevel};
use chrono::Utc;
use std::collections::HashMap;
use uuid::Uuid;

/// Result of one evaluation pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Evaluation {
    /// Every alert, in input order, with its updated triggered flag.
    pub alerts: Vec<Alert>,
    /// One notification per alert that fired in this pass, in alert order.
    pub notifications: Vec<Notification>,
}

impl Evaluation {
    /// Whether any alert fired.
    pub fn fired(&self) -> bool {
        !self.notifications.is_empty()
    }
}

/// Re-evaluate `alerts` against `records`.
pub fn evaluate(records: &[AssetRecord], alerts: &[Alert]) -> Evaluation {
    // First record wins when an id repeats.
    let mut prices: HashMap<&str, &AssetRecord> = HashMap::with_capacity(records.len());
    for record in records {
        prices.entry(record.id.as_str()).or_insert(record);
    }
    let mut notifications = Vec::new();

    let alerts = alerts
        .iter()
        .map(|alert| {
            let Some(record) = prices.get(alert.asset_id.as_str()) else {
                return alert.clone();
            };

            let met = alert.condition.is_met(record.current_price, alert.target_price);
            if met && !alert.triggered {
                notifications.push(notification_for(alert, record));
            }

            Alert {
                triggered: met,
                ..alert.clone()
            }
        })
        .collect();

    Evaluation {
        alerts,
        notifications,
    }
}

fn notification_for(alert: &Alert, record: &AssetRecord) -> Notification {
    Notification {
        id: Uuid::new_v4(),
        alert_id: alert.id,
        asset_id: record.id.clone(),
        asset_name: record.name.clone(),
        asset_symbol: record.symbol.clone(),
        title: format!("Price Alert: {}", record.name),
        message: format!(
            "{} ({}) is now {} ${}",
            record.id,
            record.symbol.to_uppercase(),
            alert.condition,
            format_amount(alert.target_price)
        ),
        created_at: Utc::now(),
        level: NotificationLevel::Success,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AlertCondition;
    use crate::state::fixtures::asset;
    use pretty_assertions::assert_eq;

    fn alert(asset_id: &str, condition: AlertCondition, target: f64) -> Alert {
        Alert::new(asset_id, asset_id, asset_id, target, condition)
    }

    #[test]
    fn test_bitcoin_above_fires_once() {
        let records = vec![asset("bitcoin", "btc", "Bitcoin", 64_230.0)];
        let alerts = vec![alert("bitcoin", AlertCondition::Above, 60_000.0)];

        let pass = evaluate(&records, &alerts);
        assert!(pass.alerts[0].triggered);
        assert_eq!(pass.notifications.len(), 1);
        assert!(pass.notifications[0].message.contains("bitcoin"));
        assert_eq!(pass.notifications[0].message, "bitcoin (BTC) is now above $60,000");
        assert_eq!(pass.notifications[0].title, "Price Alert: Bitcoin");
        assert_eq!(pass.notifications[0].alert_id, alerts[0].id);
    }

    #[test]
    fn test_still_satisfied_does_not_refire() {
        let records = vec![asset("bitcoin", "btc", "Bitcoin", 64_230.0)];
        let alerts = vec![alert("bitcoin", AlertCondition::Above, 60_000.0)];

        let first = evaluate(&records, &alerts);
        let second = evaluate(&records, &first.alerts);
        assert!(second.alerts[0].triggered);
        assert!(second.notifications.is_empty());
    }

    #[test]
    fn test_untrigger_is_silent_then_refires() {
        let alerts = vec![alert("eth", AlertCondition::Below, 3_000.0)];

        let low = vec![asset("eth", "eth", "Ethereum", 2_900.0)];
        let high = vec![asset("eth", "eth", "Ethereum", 3_100.0)];

        let pass1 = evaluate(&low, &alerts);
        assert_eq!(pass1.notifications.len(), 1);

        let pass2 = evaluate(&high, &pass1.alerts);
        assert!(!pass2.alerts[0].triggered);
        assert!(pass2.notifications.is_empty());

        let pass3 = evaluate(&low, &pass2.alerts);
        assert!(pass3.alerts[0].triggered);
        assert_eq!(pass3.notifications.len(), 1);
    }

    #[test]
    fn test_absent_asset_keeps_state() {
        let records = vec![asset("solana", "sol", "Solana", 145.0)];
        let mut triggered = alert("bitcoin", AlertCondition::Above, 1.0);
        triggered.triggered = true;
        let untriggered = alert("dogecoin", AlertCondition::Below, 1.0);
        let alerts = vec![triggered.clone(), untriggered.clone()];

        let pass = evaluate(&records, &alerts);
        assert_eq!(pass.alerts, vec![triggered, untriggered]);
        assert!(!pass.fired());
    }

    #[test]
    fn test_equal_price_is_not_met() {
        let records = vec![asset("bnb", "bnb", "BNB", 590.0)];
        let alerts = vec![
            alert("bnb", AlertCondition::Above, 590.0),
            alert("bnb", AlertCondition::Below, 590.0),
        ];
        let pass = evaluate(&records, &alerts);
        assert!(pass.alerts.iter().all(|a| !a.triggered));
        assert!(pass.notifications.is_empty());
    }

    #[test]
    fn test_duplicate_id_uses_first_record() {
        let records = vec![
            asset("bitcoin", "btc", "Bitcoin", 50_000.0),
            asset("bitcoin", "btc", "Bitcoin", 70_000.0),
        ];
        let alerts = vec![alert("bitcoin", AlertCondition::Above, 60_000.0)];

        let pass = evaluate(&records, &alerts);
        assert!(!pass.alerts[0].triggered);
        assert!(pass.notifications.is_empty());
    }

    #[test]
    fn test_multiple_alerts_fire_in_order() {
        let records = vec![
            asset("a", "a", "A", 10.0),
            asset("b", "b", "B", 10.0),
        ];
        let alerts = vec![
            alert("b", AlertCondition::Above, 5.0),
            alert("a", AlertCondition::Below, 20.0),
        ];
        let pass = evaluate(&records, &alerts);
        let fired: Vec<_> = pass.notifications.iter().map(|n| n.asset_id.as_str()).collect();
        assert_eq!(fired, vec!["b", "a"]);
    }
}
