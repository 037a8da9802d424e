//! Upstream market data integration.
//!
//! This module provides the provider seam, the CoinGecko HTTP client, the
//! view query builder and the synthetic demo catalog.

mod client;
mod converter;
mod query;
mod synthetic;

pub use client::{CoinGeckoClient, MarketDataProvider};
#[cfg(test)]
pub use client::MockMarketDataProvider;
pub use converter::{CoinMarket, DataConverter};
pub use query::{
    ALL_PAGE_SIZE, CATEGORY_PAGE_SIZE, Category, FetchRequest, MarketOrder, build_request,
};
pub use synthetic::SyntheticMarket;
