//! Price alerts and the notification log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// Direction an alert watches for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertCondition {
    #[default]
    Above,
    Below,
}

impl AlertCondition {
    /// Whether `price` satisfies the condition against `target`.
    pub fn is_met(self, price: f64, target: f64) -> bool {
        match self {
            Self::Above => price > target,
            Self::Below => price < target,
        }
    }
}

impl std::fmt::Display for AlertCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Above => write!(f, "above"),
            Self::Below => write!(f, "below"),
        }
    }
}

impl std::str::FromStr for AlertCondition {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "above" | ">" => Ok(Self::Above),
            "below" | "<" => Ok(Self::Below),
            other => Err(crate::Error::invalid_input(format!(
                "unknown alert condition '{}'",
                other
            ))),
        }
    }
}

/// A user-defined price threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    /// Asset the alert watches.
    pub asset_id: String,
    /// Display name captured at creation.
    pub asset_name: String,
    /// Symbol captured at creation.
    pub asset_symbol: String,
    pub target_price: f64,
    pub condition: AlertCondition,
    /// Whether the condition held on the last evaluation that saw the asset.
    pub triggered: bool,
    pub created_at: DateTime<Utc>,
}

impl Alert {
    /// Create an untriggered alert.
    pub fn new(
        asset_id: impl Into<String>,
        asset_name: impl Into<String>,
        asset_symbol: impl Into<String>,
        target_price: f64,
        condition: AlertCondition,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            asset_id: asset_id.into(),
            asset_name: asset_name.into(),
            asset_symbol: asset_symbol.into(),
            target_price,
            condition,
            triggered: false,
            created_at: Utc::now(),
        }
    }
}

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationLevel {
    Success,
}

/// A message produced when an alert fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    /// Alert that produced this notification.
    pub alert_id: Uuid,
    pub asset_id: String,
    pub asset_name: String,
    pub asset_symbol: String,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub level: NotificationLevel,
}

/// Alerts plus the newest-first notification log.
#[derive(Debug, Default)]
pub struct AlertState {
    /// Active alerts in creation order.
    pub alerts: Vec<Alert>,
    /// Notifications, newest first.
    pub notifications: VecDeque<Notification>,
    /// Log bound; 0 keeps everything.
    pub max_notifications: usize,
}

impl AlertState {
    /// Create with a notification bound.
    pub fn with_capacity(max_notifications: usize) -> Self {
        Self {
            max_notifications,
            ..Default::default()
        }
    }

    /// Prepend a batch of notifications, keeping batch order at the front.
    pub fn push_notifications(&mut self, batch: Vec<Notification>) {
        for notification in batch.into_iter().rev() {
            self.notifications.push_front(notification);
        }
        if self.max_notifications > 0 {
            self.notifications.truncate(self.max_notifications);
        }
    }

    /// Remove an alert. Returns whether it existed.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.alerts.len();
        self.alerts.retain(|a| a.id != id);
        self.alerts.len() != before
    }

    /// Alerts currently triggered.
    pub fn triggered(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter().filter(|a| a.triggered)
    }
}
