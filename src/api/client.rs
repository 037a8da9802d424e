//! Market data provider seam and its CoinGecko implementation.

use super::{DataConverter, FetchRequest};
use crate::api::converter::CoinMarket;
use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::state::AssetRecord;
use async_trait::async_trait;
use tracing::debug;

/// Source of asset records for one fetch descriptor.
///
/// Any error returned here is treated as an upstream failure and answered
/// with synthetic data by the fetcher.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch one page of one category.
    async fn fetch_markets(&self, request: &FetchRequest) -> Result<Vec<AssetRecord>>;
}

/// HTTP client for the CoinGecko `coins/markets` endpoint.
pub struct CoinGeckoClient {
    config: ApiConfig,
    http: reqwest::Client,
}

impl CoinGeckoClient {
    /// Create a new client. The configured timeout bounds every request.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { config, http })
    }

    fn markets_url(&self) -> String {
        format!("{}/coins/markets", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl MarketDataProvider for CoinGeckoClient {
    async fn fetch_markets(&self, request: &FetchRequest) -> Result<Vec<AssetRecord>> {
        debug!(
            category = %request.category,
            page = request.page,
            per_page = request.per_page,
            "Requesting markets"
        );

        let response = self
            .http
            .get(self.markets_url())
            .query(&[("vs_currency", self.config.vs_currency.as_str())])
            .query(&request.query_pairs())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UpstreamStatus(status.as_u16()));
        }

        let body = response.bytes().await?;
        let markets: Vec<CoinMarket> = serde_json::from_slice(&body)?;

        Ok(markets
            .into_iter()
            .map(DataConverter::convert_market)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markets_url_trims_slash() {
        let config = ApiConfig {
            base_url: "https://example.test/api/v3/".to_string(),
            ..Default::default()
        };
        let client = CoinGeckoClient::new(config).unwrap();
        assert_eq!(client.markets_url(), "https://example.test/api/v3/coins/markets");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let config = ApiConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_secs: 2,
            ..Default::default()
        };
        let client = CoinGeckoClient::new(config).unwrap();
        let request = crate::api::build_request(crate::api::Category::All, 1);

        let err = client.fetch_markets(&request).await.unwrap_err();
        assert!(matches!(err, crate::Error::Http(_)), "{}", err);
    }
}
