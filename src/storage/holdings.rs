//! Persisted asset-id to held-quantity mapping.

use super::BlobStore;
use crate::error::Result;
use crate::format::parse_number;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Total lookup of held quantity; unlisted assets hold 0.
pub trait Holdings {
    fn quantity_of(&self, asset_id: &str) -> f64;
}

impl Holdings for HashMap<String, f64> {
    fn quantity_of(&self, asset_id: &str) -> f64 {
        self.get(asset_id).copied().unwrap_or(0.0)
    }
}

/// Holdings with nothing held.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyHoldings;

impl Holdings for EmptyHoldings {
    fn quantity_of(&self, _asset_id: &str) -> f64 {
        0.0
    }
}

/// Parse a user-entered quantity.
///
/// The leading number is used and trailing text ignored. Input without a
/// leading finite number becomes 0; negative values are kept.
pub fn parse_quantity(raw: &str) -> f64 {
    parse_number(raw).unwrap_or(0.0)
}

/// Holdings backed by a sparse map persisted as a single blob.
pub struct HoldingsStore {
    quantities: HashMap<String, f64>,
    blob: Box<dyn BlobStore>,
    key: String,
}

impl HoldingsStore {
    /// Open the store, loading whatever is persisted under `key`.
    ///
    /// An unreadable or malformed blob is logged and treated as empty.
    pub fn open(blob: Box<dyn BlobStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let quantities = match blob.load(&key) {
            Ok(Some(bytes)) => match serde_json::from_slice::<HashMap<String, f64>>(&bytes) {
                Ok(map) => map,
                Err(e) => {
                    warn!(key = %key, "Ignoring malformed holdings blob: {}", e);
                    HashMap::new()
                }
            },
            Ok(None) => HashMap::new(),
            Err(e) => {
                warn!(key = %key, "Failed to load holdings: {}", e);
                HashMap::new()
            }
        };

        debug!(key = %key, entries = quantities.len(), "Holdings loaded");
        Self {
            quantities,
            blob,
            key,
        }
    }

    /// Held quantity of `asset_id` (0 when unlisted).
    pub fn get(&self, asset_id: &str) -> f64 {
        self.quantity_of(asset_id)
    }

    /// Set the quantity from raw user input and persist.
    ///
    /// Returns the stored quantity. The in-memory value is updated even when
    /// persisting fails.
    pub fn set(&mut self, asset_id: &str, raw: &str) -> Result<f64> {
        let quantity = parse_quantity(raw);
        self.set_quantity(asset_id, quantity)?;
        Ok(quantity)
    }

    /// Set an already-parsed quantity and persist.
    pub fn set_quantity(&mut self, asset_id: &str, quantity: f64) -> Result<()> {
        if quantity == 0.0 {
            self.quantities.remove(asset_id);
        } else {
            self.quantities.insert(asset_id.to_string(), quantity);
        }
        self.persist()
    }

    /// Number of assets with a non-zero quantity.
    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    /// Whether nothing is held.
    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    fn persist(&self) -> Result<()> {
        // Sorted keys keep the blob stable across writes.
        let ordered: BTreeMap<&String, &f64> = self.quantities.iter().collect();
        let bytes = serde_json::to_vec(&ordered)?;
        self.blob.save(&self.key, &bytes)
    }
}

impl Holdings for HoldingsStore {
    fn quantity_of(&self, asset_id: &str) -> f64 {
        self.quantities.quantity_of(asset_id)
    }
}

impl std::fmt::Debug for HoldingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HoldingsStore")
            .field("key", &self.key)
            .field("quantities", &self.quantities)
            .finish()
    }
}
