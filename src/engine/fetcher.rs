//! Snapshot fetching with synthetic fallback.

use super::sort::compare_records;
use crate::api::{Category, FetchRequest, MarketDataProvider, SyntheticMarket};
use crate::state::{AssetRecord, Provenance, Snapshot, SortConfig, SortDirection, SortKey};
use crate::storage::EmptyHoldings;
use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// A fetch that has been issued but not yet completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    /// Monotonically increasing per fetcher, starting at 1.
    pub sequence: u64,
    pub request: FetchRequest,
}

/// Turns fetch descriptors into snapshots, never failing.
pub struct SnapshotFetcher {
    provider: Arc<dyn MarketDataProvider>,
    synthetic: SyntheticMarket,
    sequence: AtomicU64,
}

impl SnapshotFetcher {
    /// Create a fetcher over `provider`, falling back to `synthetic`.
    pub fn new(provider: Arc<dyn MarketDataProvider>, synthetic: SyntheticMarket) -> Self {
        Self {
            provider,
            synthetic,
            sequence: AtomicU64::new(0),
        }
    }

    /// Allocate the next sequence number for `request`.
    pub fn begin(&self, request: FetchRequest) -> FetchTicket {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        FetchTicket { sequence, request }
    }

    /// Fetch the snapshot for `ticket`.
    ///
    /// Upstream failures (transport, status, payload, timeout) are answered
    /// with synthetic records tagged [`Provenance::Synthetic`].
    pub async fn fetch(&self, ticket: FetchTicket) -> Snapshot {
        let (mut records, provenance) = match self.provider.fetch_markets(&ticket.request).await {
            Ok(records) => (records, Provenance::Live),
            Err(e) => {
                warn!(
                    category = %ticket.request.category,
                    page = ticket.request.page,
                    "API failed, switching to demo mode: {}",
                    e
                );
                (self.synthetic.generate(&ticket.request), Provenance::Synthetic)
            }
        };

        apply_category_order(ticket.request.category, &mut records);

        debug!(
            sequence = ticket.sequence,
            records = records.len(),
            %provenance,
            "Fetch completed"
        );

        Snapshot {
            records,
            provenance,
            fetched_at: Utc::now(),
            request: ticket.request,
            sequence: ticket.sequence,
        }
    }

    /// Allocate a ticket and fetch it.
    pub async fn fetch_now(&self, request: FetchRequest) -> Snapshot {
        let ticket = self.begin(request);
        self.fetch(ticket).await
    }
}

/// Gainers list by 24h change descending, losers ascending.
pub fn apply_category_order(category: Category, records: &mut [AssetRecord]) {
    let direction = match category {
        Category::Gainers => SortDirection::Descending,
        Category::Losers => SortDirection::Ascending,
        _ => return,
    };
    let sort = SortConfig {
        key: SortKey::Change24h,
        direction,
    };
    records.sort_by(|a, b| compare_records(a, b, &EmptyHoldings, sort));
}
