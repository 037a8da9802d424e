//! Wire format of the markets endpoint and its conversion to domain records.

use crate::state::AssetRecord;
use serde::Deserialize;

/// One entry of the `coins/markets` response.
#[derive(Debug, Clone, Deserialize)]
pub struct CoinMarket {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_1h_in_currency: Option<f64>,
    #[serde(default)]
    pub sparkline_in_7d: Option<Sparkline>,
}

/// Sparkline block of a market entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Sparkline {
    #[serde(default)]
    pub price: Vec<Option<f64>>,
}

/// Converts API responses to internal state types.
pub struct DataConverter;

impl DataConverter {
    /// Convert a wire market entry to an `AssetRecord`.
    ///
    /// Missing prices and caps become zero; missing change figures stay absent.
    pub fn convert_market(market: CoinMarket) -> AssetRecord {
        let sparkline = market
            .sparkline_in_7d
            .map(|s| s.price.into_iter().flatten().collect())
            .unwrap_or_default();

        AssetRecord {
            id: market.id,
            symbol: market.symbol,
            name: market.name,
            image: market.image.unwrap_or_default(),
            current_price: market.current_price.unwrap_or(0.0).max(0.0),
            market_cap: market.market_cap.unwrap_or(0.0),
            price_change_percentage_1h: market.price_change_percentage_1h_in_currency,
            price_change_percentage_24h: market.price_change_percentage_24h,
            sparkline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_convert_full_entry() {
        let json = r#"{
            "id": "bitcoin",
            "symbol": "btc",
            "name": "Bitcoin",
            "image": "https://img.test/btc.png",
            "current_price": 64230.5,
            "market_cap": 1200000000000,
            "total_volume": 1,
            "price_change_percentage_24h": -1.25,
            "price_change_percentage_1h_in_currency": 0.4,
            "sparkline_in_7d": { "price": [1.0, 2.0, null, 3.0] }
        }"#;
        let market: CoinMarket = serde_json::from_str(json).unwrap();
        let record = DataConverter::convert_market(market);

        assert_eq!(record.id, "bitcoin");
        assert_eq!(record.current_price, 64230.5);
        assert_eq!(record.price_change_percentage_24h, Some(-1.25));
        assert_eq!(record.price_change_percentage_1h, Some(0.4));
        assert_eq!(record.sparkline, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_convert_sparse_entry() {
        let json = r#"{
            "id": "newcoin",
            "symbol": "new",
            "name": "New Coin",
            "current_price": null,
            "market_cap": null,
            "price_change_percentage_24h": null
        }"#;
        let market: CoinMarket = serde_json::from_str(json).unwrap();
        let record = DataConverter::convert_market(market);

        assert_eq!(record.current_price, 0.0);
        assert_eq!(record.market_cap, 0.0);
        assert_eq!(record.price_change_percentage_24h, None);
        assert!(record.sparkline.is_empty());
        assert!(record.image.is_empty());
    }
}
