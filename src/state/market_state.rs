//! Market snapshot state.

use crate::api::FetchRequest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where a snapshot's records came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    #[default]
    Live,
    Synthetic,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Live => write!(f, "Connected"),
            Self::Synthetic => write!(f, "Demo Mode"),
        }
    }
}

/// A priced asset as returned by one fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Identifier, unique within a snapshot.
    pub id: String,
    /// Ticker symbol (lowercase as delivered upstream).
    pub symbol: String,
    /// Display name.
    pub name: String,
    /// Image URL.
    pub image: String,
    /// Current price.
    pub current_price: f64,
    /// Market capitalization.
    pub market_cap: f64,
    /// Percentage change over the last hour.
    pub price_change_percentage_1h: Option<f64>,
    /// Percentage change over the last 24 hours.
    pub price_change_percentage_24h: Option<f64>,
    /// Recent price history, most recent last.
    pub sparkline: Vec<f64>,
}

impl AssetRecord {
    /// Value of `quantity` units at the current price.
    pub fn value_of(&self, quantity: f64) -> f64 {
        quantity * self.current_price
    }

    /// Whether the name or symbol contains `needle_lower` (already lowercased).
    pub fn matches(&self, needle_lower: &str) -> bool {
        needle_lower.is_empty()
            || self.name.to_lowercase().contains(needle_lower)
            || self.symbol.to_lowercase().contains(needle_lower)
    }
}

/// One complete fetch result for the active view.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Records in upstream (or post-processed) order.
    pub records: Vec<AssetRecord>,
    /// Live or synthetic.
    pub provenance: Provenance,
    /// When the fetch completed.
    pub fetched_at: DateTime<Utc>,
    /// Descriptor the snapshot was fetched for.
    pub request: FetchRequest,
    /// Fetch sequence number.
    pub sequence: u64,
}

impl Snapshot {
    /// Look up a record by id.
    pub fn find(&self, id: &str) -> Option<&AssetRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Whether the snapshot came from demo data.
    pub fn is_synthetic(&self) -> bool {
        self.provenance == Provenance::Synthetic
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the snapshot has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Outcome of offering a completed snapshot to the market state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptOutcome {
    /// The snapshot replaced the visible one.
    Applied,
    /// A newer fetch has already been applied.
    Superseded,
    /// The snapshot was fetched for a view that is no longer active.
    StaleView,
}

/// State for market data.
#[derive(Debug, Default)]
pub struct MarketState {
    /// The visible snapshot, if any fetch has completed.
    pub snapshot: Option<Snapshot>,
    /// Highest sequence number applied so far.
    pub last_applied_sequence: u64,
    /// Number of fetches in flight.
    pub in_flight: usize,
}

impl MarketState {
    /// Offer a completed snapshot. Only the newest fetch for the active
    /// view is applied; anything else is dropped.
    pub fn accept(&mut self, snapshot: Snapshot, active: &FetchRequest) -> AcceptOutcome {
        if snapshot.sequence <= self.last_applied_sequence {
            debug!(
                sequence = snapshot.sequence,
                applied = self.last_applied_sequence,
                "Discarding superseded snapshot"
            );
            return AcceptOutcome::Superseded;
        }

        if snapshot.request != *active {
            debug!(
                sequence = snapshot.sequence,
                category = %snapshot.request.category,
                page = snapshot.request.page,
                "Discarding snapshot for inactive view"
            );
            return AcceptOutcome::StaleView;
        }

        self.last_applied_sequence = snapshot.sequence;
        self.snapshot = Some(snapshot);
        AcceptOutcome::Applied
    }

    /// Records of the visible snapshot.
    pub fn records(&self) -> &[AssetRecord] {
        self.snapshot
            .as_ref()
            .map(|s| s.records.as_slice())
            .unwrap_or_default()
    }

    /// Look up a record in the visible snapshot.
    pub fn find(&self, id: &str) -> Option<&AssetRecord> {
        self.snapshot.as_ref().and_then(|s| s.find(id))
    }

    /// Provenance of the visible snapshot.
    pub fn provenance(&self) -> Option<Provenance> {
        self.snapshot.as_ref().map(|s| s.provenance)
    }

    /// Completion time of the visible snapshot.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.snapshot.as_ref().map(|s| s.fetched_at)
    }

    /// Whether any fetch is outstanding.
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::{Category, build_request};

    pub(crate) fn asset(id: &str, symbol: &str, name: &str, price: f64) -> AssetRecord {
        AssetRecord {
            id: id.to_string(),
            symbol: symbol.to_string(),
            name: name.to_string(),
            image: String::new(),
            current_price: price,
            market_cap: price * 1_000.0,
            price_change_percentage_1h: None,
            price_change_percentage_24h: None,
            sparkline: vec![price; 3],
        }
    }

    pub(crate) fn snapshot(request: FetchRequest, sequence: u64, records: Vec<AssetRecord>) -> Snapshot {
        Snapshot {
            records,
            provenance: Provenance::Live,
            fetched_at: Utc::now(),
            request,
            sequence,
        }
    }

    #[test]
    fn test_accept_applies_newest() {
        let request = build_request(Category::All, 1);
        let mut state = MarketState::default();

        let first = snapshot(request.clone(), 1, vec![asset("a", "a", "A", 1.0)]);
        assert_eq!(state.accept(first, &request), AcceptOutcome::Applied);

        let second = snapshot(request.clone(), 2, vec![asset("b", "b", "B", 2.0)]);
        assert_eq!(state.accept(second, &request), AcceptOutcome::Applied);
        assert!(state.find("b").is_some());
        assert!(state.find("a").is_none());
    }

    #[test]
    fn test_accept_discards_out_of_order_completion() {
        let request = build_request(Category::All, 1);
        let mut state = MarketState::default();

        let newer = snapshot(request.clone(), 5, vec![asset("new", "n", "New", 1.0)]);
        let older = snapshot(request.clone(), 4, vec![asset("old", "o", "Old", 1.0)]);

        assert_eq!(state.accept(newer, &request), AcceptOutcome::Applied);
        assert_eq!(state.accept(older, &request), AcceptOutcome::Superseded);
        assert!(state.find("new").is_some());
        assert_eq!(state.last_applied_sequence, 5);
    }

    #[test]
    fn test_accept_discards_stale_view() {
        let all = build_request(Category::All, 1);
        let gainers = build_request(Category::Gainers, 1);
        let mut state = MarketState::default();

        let stale = snapshot(all, 1, vec![asset("a", "a", "A", 1.0)]);
        assert_eq!(state.accept(stale, &gainers), AcceptOutcome::StaleView);
        assert!(state.snapshot.is_none());
        assert_eq!(state.last_applied_sequence, 0);
    }

    #[test]
    fn test_matches_name_or_symbol() {
        let btc = asset("bitcoin", "btc", "Bitcoin", 1.0);
        assert!(btc.matches(""));
        assert!(btc.matches("bit"));
        assert!(btc.matches("bt"));
        assert!(!btc.matches("eth"));
    }
}
