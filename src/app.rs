//! Main application module.
//!
//! This module contains the `App` struct that wires the fetcher, scheduler,
//! alert evaluation, holdings and view state together and exposes them to
//! a presentation layer.

use crate::api::{Category, CoinGeckoClient, MarketDataProvider, SyntheticMarket};
use crate::config::Config;
use crate::engine::{self, PollingScheduler, SchedulerEvent, SnapshotFetcher};
use crate::error::Result;
use crate::format::{format_currency, format_percentage, parse_number};
use crate::state::{
    AcceptOutcome, Action, Alert, AlertCondition, AssetRecord, Notification, Provenance,
    Snapshot, SortKey, Store, ViewState,
};
use crate::storage::{BlobStore, FileBlobStore, HoldingsStore};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// The main application.
pub struct App {
    /// Application store.
    store: Store,
    /// Snapshot fetcher shared with fetch tasks.
    fetcher: Arc<SnapshotFetcher>,
    /// Refresh timers.
    scheduler: PollingScheduler,
    /// Persisted holdings.
    holdings: HoldingsStore,
    /// Action receiver.
    action_rx: mpsc::UnboundedReceiver<Action>,
    /// Timer event receiver.
    scheduler_rx: mpsc::UnboundedReceiver<SchedulerEvent>,
    /// Completed fetches.
    snapshot_tx: mpsc::UnboundedSender<Snapshot>,
    snapshot_rx: mpsc::UnboundedReceiver<Snapshot>,
}

impl App {
    /// Create an application over explicit collaborators.
    pub fn new(
        config: &Config,
        provider: Arc<dyn MarketDataProvider>,
        blob: Box<dyn BlobStore>,
    ) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let (scheduler_tx, scheduler_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = mpsc::unbounded_channel();

        let fetcher = SnapshotFetcher::new(provider, SyntheticMarket::new(&config.demo));

        Self {
            store: Store::new(action_tx, config.alerts.max_notifications),
            fetcher: Arc::new(fetcher),
            scheduler: PollingScheduler::new(&config.polling, scheduler_tx),
            holdings: HoldingsStore::open(blob, config.storage.holdings_key.clone()),
            action_rx,
            scheduler_rx,
            snapshot_tx,
            snapshot_rx,
        }
    }

    /// Create an application talking to CoinGecko and persisting holdings
    /// in the configured data directory.
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = CoinGeckoClient::new(config.api.clone())?;
        let blob = FileBlobStore::new(config.storage.resolve_data_dir()?);
        Ok(Self::new(config, Arc::new(provider), Box::new(blob)))
    }

    /// Sender for dispatching actions into the run loop.
    pub fn action_sender(&self) -> mpsc::UnboundedSender<Action> {
        self.store.sender()
    }

    /// Arm the timers for the current view and fetch immediately.
    pub fn start(&mut self) {
        self.rearm_and_fetch();
    }

    /// Run the event loop until `Quit` or ctrl-c.
    pub async fn run(&mut self) -> Result<()> {
        if !self.scheduler.is_armed() {
            self.start();
        }

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    self.store.reduce(Action::Quit);
                }
                processed = self.step() => {
                    if !processed {
                        break;
                    }
                }
            }

            if self.store.should_quit {
                break;
            }
        }

        self.scheduler.cancel();
        Ok(())
    }

    /// Wait for and handle one event. Returns `false` once every source
    /// is closed.
    pub async fn step(&mut self) -> bool {
        tokio::select! {
            Some(action) = self.action_rx.recv() => self.handle_action(action),
            Some(event) = self.scheduler_rx.recv() => self.handle_scheduler_event(event),
            Some(snapshot) = self.snapshot_rx.recv() => {
                self.apply_snapshot(snapshot);
            }
            else => return false,
        }
        true
    }

    /// Handle an action.
    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::RefreshNow => self.refresh_now(),
            Action::SetCategory(category) => self.set_category(category),
            Action::SetPage(page) => self.set_page(page),
            Action::NextPage => self.set_page(self.store.view.page.saturating_add(1)),
            Action::PrevPage => self.set_page(self.store.view.page.saturating_sub(1)),
            Action::SetHoldings { asset_id, raw } => {
                self.set_holdings(&asset_id, &raw);
            }
            Action::AddAlert {
                asset_id,
                target_price,
                condition,
            } => {
                self.add_alert(&asset_id, &target_price, condition);
            }
            Action::ShowView => println!("{}", self.view_report(20)),
            other => {
                // Let the store handle the action
                self.store.reduce(other);
            }
        }
    }

    /// Apply a timer event, fetching when the fetch timer fired.
    pub fn handle_scheduler_event(&mut self, event: SchedulerEvent) {
        if let Some(request) = self.scheduler.handle(event) {
            self.spawn_fetch(request);
        }
    }

    // Entry points

    /// Fetch immediately and restart both timers.
    pub fn refresh_now(&mut self) {
        info!("Manual refresh");
        self.rearm_and_fetch();
    }

    /// Switch category; a change resets the page and restarts polling.
    pub fn set_category(&mut self, category: Category) {
        if self.store.reduce(Action::SetCategory(category)) {
            info!(category = %category, "Category changed");
            self.rearm_and_fetch();
        }
    }

    /// Switch page of the paginated view; a change restarts polling.
    pub fn set_page(&mut self, page: u32) {
        if self.store.reduce(Action::SetPage(page)) {
            info!(page = self.store.view.page, "Page changed");
            self.rearm_and_fetch();
        }
    }

    /// Set the free-text filter.
    pub fn set_filter(&mut self, text: impl Into<String>) {
        self.store.reduce(Action::SetFilter(text.into()));
    }

    /// Select or toggle the sort key.
    pub fn set_sort(&mut self, key: SortKey) {
        self.store.reduce(Action::SetSort(key));
    }

    /// Set a held quantity from raw input. Returns the stored quantity.
    pub fn set_holdings(&mut self, asset_id: &str, raw: &str) -> f64 {
        match self.holdings.set(asset_id, raw) {
            Ok(quantity) => {
                debug!(asset = asset_id, quantity, "Holdings updated");
                quantity
            }
            Err(e) => {
                warn!(asset = asset_id, "Failed to persist holdings: {}", e);
                self.holdings.get(asset_id)
            }
        }
    }

    /// Create an alert for an asset in the visible snapshot and evaluate it
    /// right away.
    ///
    /// Unknown assets and non-numeric prices are ignored.
    pub fn add_alert(
        &mut self,
        asset_id: &str,
        target_price: &str,
        condition: AlertCondition,
    ) -> Option<Uuid> {
        let Some(record) = self.store.markets.find(asset_id) else {
            debug!(asset = asset_id, "Ignoring alert for unknown asset");
            return None;
        };

        let Some(target) = parse_number(target_price) else {
            debug!(asset = asset_id, target_price, "Ignoring alert without a numeric price");
            return None;
        };

        let alert = Alert::new(&record.id, &record.name, &record.symbol, target, condition);
        let id = alert.id;
        info!(asset = asset_id, %condition, target, "Alert created");

        self.store.alerts.alerts.push(alert);
        self.evaluate_alerts();
        Some(id)
    }

    /// Delete an alert. Returns whether it existed.
    pub fn remove_alert(&mut self, id: Uuid) -> bool {
        let existed = self.store.alerts.alerts.iter().any(|a| a.id == id);
        self.store.reduce(Action::RemoveAlert(id));
        existed
    }

    /// Empty the notification log.
    pub fn clear_notifications(&mut self) {
        self.store.reduce(Action::ClearNotifications);
    }

    // Fetch pipeline

    fn rearm_and_fetch(&mut self) {
        let request = self.store.view.request();
        self.scheduler.reconfigure(request.clone());
        self.spawn_fetch(request);
    }

    fn spawn_fetch(&mut self, request: crate::api::FetchRequest) {
        let ticket = self.fetcher.begin(request);
        self.store.markets.in_flight += 1;

        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.snapshot_tx.clone();
        tokio::spawn(async move {
            let snapshot = fetcher.fetch(ticket).await;
            let _ = tx.send(snapshot);
        });
    }

    /// Offer a completed fetch. Applied snapshots are evaluated against the
    /// alerts immediately.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) -> AcceptOutcome {
        self.store.markets.in_flight = self.store.markets.in_flight.saturating_sub(1);

        let active = self.store.view.request();
        let (sequence, provenance, records) =
            (snapshot.sequence, snapshot.provenance, snapshot.len());
        let outcome = self.store.markets.accept(snapshot, &active);

        if outcome == AcceptOutcome::Applied {
            info!(
                category = %active.category,
                page = active.page,
                sequence,
                records,
                %provenance,
                holdings_value = %format_currency(self.total_holdings_value()),
                "Snapshot applied"
            );
            self.evaluate_alerts();
        }

        outcome
    }

    fn evaluate_alerts(&mut self) {
        let evaluation = engine::evaluate(self.store.markets.records(), &self.store.alerts.alerts);

        for notification in &evaluation.notifications {
            info!(asset = %notification.asset_id, "{}", notification.message);
        }

        self.store.alerts.alerts = evaluation.alerts;
        self.store.alerts.push_notifications(evaluation.notifications);
    }

    // Presentation accessors

    /// The visible snapshot.
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.store.markets.snapshot.as_ref()
    }

    /// Live or synthetic, once a snapshot exists.
    pub fn provenance(&self) -> Option<Provenance> {
        self.store.markets.provenance()
    }

    /// When the visible snapshot was fetched.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.store.markets.last_updated()
    }

    /// Whether a fetch is outstanding.
    pub fn is_loading(&self) -> bool {
        self.store.markets.is_loading()
    }

    /// Alerts in creation order.
    pub fn alerts(&self) -> &[Alert] {
        &self.store.alerts.alerts
    }

    /// Notification log, newest first.
    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.store.alerts.notifications.iter()
    }

    /// Current view state.
    pub fn view(&self) -> &ViewState {
        &self.store.view
    }

    /// Filtered and sorted records of the visible snapshot.
    pub fn visible(&self) -> Vec<&AssetRecord> {
        engine::sort_and_filter(
            self.store.markets.records(),
            &self.holdings,
            &self.store.view.filter,
            self.store.view.sort,
        )
    }

    /// Seconds until the next scheduled refresh.
    pub fn countdown(&self) -> u64 {
        self.scheduler.countdown()
    }

    /// Held quantity of an asset.
    pub fn holding(&self, asset_id: &str) -> f64 {
        self.holdings.get(asset_id)
    }

    /// Value of the held quantity at the visible snapshot's price.
    pub fn holding_value(&self, asset_id: &str) -> Option<f64> {
        self.store
            .markets
            .find(asset_id)
            .map(|r| r.value_of(self.holdings.get(asset_id)))
    }

    /// Total value of holdings priced in the visible snapshot.
    pub fn total_holdings_value(&self) -> f64 {
        self.store
            .markets
            .records()
            .iter()
            .map(|r| r.value_of(self.holdings.get(&r.id)))
            .sum()
    }

    /// Whether the run loop has been asked to stop.
    pub fn should_quit(&self) -> bool {
        self.store.should_quit
    }

    /// Plain-text rendering of the visible view, limited to `limit` rows.
    pub fn view_report(&self, limit: usize) -> String {
        let view = &self.store.view;
        let status = match self.provenance() {
            Some(provenance) => provenance.to_string(),
            None => "Loading".to_string(),
        };
        let updated = self
            .last_updated()
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());

        let mut lines = vec![format!(
            "[{}] {} page {} | sort {} {:?} | filter '{}' | next update {}s | last updated {}",
            status,
            view.category.label(),
            view.page,
            view.sort.key,
            view.sort.direction,
            view.filter,
            self.countdown(),
            updated,
        )];

        for record in self.visible().into_iter().take(limit) {
            let quantity = self.holdings.get(&record.id);
            let value = if record.value_of(quantity) > 0.0 {
                format_currency(record.value_of(quantity))
            } else {
                "-".to_string()
            };
            lines.push(format!(
                "{:<20} {:<6} {:>16} {:>9} {:>9} {:>22} {:>10} {:>14}",
                record.name,
                record.symbol.to_uppercase(),
                format_currency(record.current_price),
                format_percentage(record.price_change_percentage_1h),
                format_percentage(record.price_change_percentage_24h),
                format_currency(record.market_cap),
                quantity,
                value,
            ));
        }

        lines.push(format!(
            "holdings value {}",
            format_currency(self.total_holdings_value())
        ));

        if !self.alerts().is_empty() {
            lines.push(format!(
                "alerts {} ({} triggered)",
                self.alerts().len(),
                self.store.alerts.triggered().count()
            ));
        }

        for alert in self.alerts() {
            lines.push(format!(
                "alert {} {} {} {}{}",
                alert.id,
                alert.asset_symbol.to_uppercase(),
                alert.condition,
                format_currency(alert.target_price),
                if alert.triggered { " (triggered)" } else { "" },
            ));
        }

        for notification in self.notifications().take(5) {
            lines.push(format!(
                "{} {}: {}",
                notification.created_at.format("%H:%M:%S"),
                notification.title,
                notification.message
            ));
        }

        lines.join("\n")
    }
}
