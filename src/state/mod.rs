//! State management for Cryptoton.
//!
//! Holds the visible snapshot, alerts, notification log and view state,
//! updated through a single `reduce` entry point.

mod alert_state;
mod market_state;
mod view_state;

pub use alert_state::{Alert, AlertCondition, AlertState, Notification, NotificationLevel};
pub use market_state::{AcceptOutcome, AssetRecord, MarketState, Provenance, Snapshot};
pub use view_state::{SortConfig, SortDirection, SortKey, ViewState};

#[cfg(test)]
pub(crate) use market_state::tests as fixtures;

use crate::api::Category;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Actions that can be dispatched to modify state.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // View
    SetCategory(Category),
    SetPage(u32),
    NextPage,
    PrevPage,
    SetFilter(String),
    SetSort(SortKey),

    // Data refresh
    RefreshNow,

    // Holdings
    SetHoldings { asset_id: String, raw: String },

    // Alerts
    AddAlert {
        asset_id: String,
        target_price: String,
        condition: AlertCondition,
    },
    RemoveAlert(Uuid),
    ClearNotifications,

    // Output
    ShowView,

    // Quit
    Quit,
}

/// The global state store.
#[derive(Debug)]
pub struct Store {
    /// Market data.
    pub markets: MarketState,
    /// Alerts and notifications.
    pub alerts: AlertState,
    /// Active view.
    pub view: ViewState,
    /// Whether the run loop should stop.
    pub should_quit: bool,
    /// Action sender for dispatching actions.
    action_tx: mpsc::UnboundedSender<Action>,
}

impl Store {
    /// Create a new store with the given action sender.
    pub fn new(action_tx: mpsc::UnboundedSender<Action>, max_notifications: usize) -> Self {
        Self {
            markets: MarketState::default(),
            alerts: AlertState::with_capacity(max_notifications),
            view: ViewState::new(),
            should_quit: false,
            action_tx,
        }
    }

    /// Sender for dispatching actions from other tasks.
    pub fn sender(&self) -> mpsc::UnboundedSender<Action> {
        self.action_tx.clone()
    }

    /// Apply an action that only touches view-local state.
    ///
    /// Actions with side effects (fetching, timers, persistence) are handled
    /// by the `App` before or instead of reaching here. Returns whether the
    /// action changed the fetch descriptor.
    pub fn reduce(&mut self, action: Action) -> bool {
        match action {
            Action::SetCategory(category) => self.view.set_category(category),
            Action::SetPage(page) => self.view.set_page(page),
            Action::NextPage => self.view.set_page(self.view.page.saturating_add(1)),
            Action::PrevPage => self.view.set_page(self.view.page.saturating_sub(1)),
            Action::SetFilter(text) => {
                self.view.filter = text;
                false
            }
            Action::SetSort(key) => {
                self.view.sort.toggle(key);
                false
            }
            Action::RemoveAlert(id) => {
                self.alerts.remove(id);
                false
            }
            Action::ClearNotifications => {
                self.alerts.notifications.clear();
                false
            }
            Action::Quit => {
                self.should_quit = true;
                false
            }
            Action::RefreshNow
            | Action::SetHoldings { .. }
            | Action::AddAlert { .. }
            | Action::ShowView => false,
        }
    }
}
