//! Deterministic demo data used when the upstream provider is unavailable.

use super::FetchRequest;
use crate::config::DemoConfig;
use crate::state::AssetRecord;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Fixed head of the demo catalog: id, symbol, name, price, market cap.
const SEED_CATALOG: [(&str, &str, &str, f64, f64); 10] = [
    ("bitcoin", "btc", "Bitcoin", 64_230.0, 1_200_000_000_000.0),
    ("ethereum", "eth", "Ethereum", 3_450.0, 400_000_000_000.0),
    ("solana", "sol", "Solana", 145.0, 65_000_000_000.0),
    ("bnb", "bnb", "BNB", 590.0, 87_000_000_000.0),
    ("ripple", "xrp", "XRP", 0.62, 34_000_000_000.0),
    ("dogecoin", "doge", "Dogecoin", 0.16, 23_000_000_000.0),
    ("cardano", "ada", "Cardano", 0.45, 16_000_000_000.0),
    ("avalanche", "avax", "Avalanche", 35.0, 13_000_000_000.0),
    ("shiba-inu", "shib", "Shiba Inu", 0.000_025, 14_000_000_000.0),
    ("polkadot", "dot", "Polkadot", 7.20, 10_000_000_000.0),
];

/// Generates synthetic snapshots from the seed catalog.
///
/// The catalog continues past the seed entries with generated alt coins, so
/// any page of any size can be filled. Identical requests produce identical
/// records.
#[derive(Debug, Clone)]
pub struct SyntheticMarket {
    seed: u64,
    sparkline_len: usize,
}

impl SyntheticMarket {
    /// Create a generator from demo settings.
    pub fn new(config: &DemoConfig) -> Self {
        Self {
            seed: config.seed,
            sparkline_len: config.sparkline_len.max(2),
        }
    }

    /// Records for the page described by `request`.
    pub fn generate(&self, request: &FetchRequest) -> Vec<AssetRecord> {
        let mut rng = StdRng::seed_from_u64(self.seed_for(request));
        let start = request.offset();
        let count = request.per_page.max(1) as usize;

        (start..start + count)
            .map(|position| self.record_at(position, &mut rng))
            .collect()
    }

    fn seed_for(&self, request: &FetchRequest) -> u64 {
        self.seed.wrapping_mul(0x9e37_79b9_7f4a_7c15)
            ^ ((request.category as u64) << 32)
            ^ u64::from(request.page)
    }

    fn record_at(&self, position: usize, rng: &mut StdRng) -> AssetRecord {
        let (id, symbol, name, price, cap) = match SEED_CATALOG.get(position) {
            Some(&(id, symbol, name, price, cap)) => {
                (id.to_string(), symbol.to_string(), name.to_string(), price, cap)
            }
            None => {
                let n = position - SEED_CATALOG.len();
                (
                    format!("coin-{}", n),
                    format!("alt{}", n),
                    format!("AltCoin {}", n + 1),
                    rng.gen_range(0.01..100.0),
                    rng.gen_range(1_000_000.0..1_000_000_000.0),
                )
            }
        };

        let change_24h = rng.gen_range(0.0..10.0) * if rng.gen_bool(0.6) { 1.0 } else { -1.0 };
        let change_1h = rng.gen_range(0.0..2.0) * if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        let sparkline = (0..self.sparkline_len)
            .map(|_| price * rng.gen_range(0.9..1.1))
            .collect();

        AssetRecord {
            image: format!(
                "https://ui-avatars.com/api/?name={}&background=random&color=fff&size=64",
                name.replace(' ', "+")
            ),
            id,
            symbol,
            name,
            current_price: price,
            market_cap: cap,
            price_change_percentage_1h: Some(change_1h),
            price_change_percentage_24h: Some(change_24h),
            sparkline,
        }
    }
}
