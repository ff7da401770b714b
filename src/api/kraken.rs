use crate::api::http_client::ResilientClient;
use crate::error::{LtpError, Result};
use tracing::debug;

/// Only the most recent trade is needed.
pub const TRADE_SEARCH_SIZE: u32 = 1;

#[derive(Clone)]
pub struct KrakenClient {
    http: ResilientClient,
    trades_url: String,
}

impl KrakenClient {
    pub fn new(http: ResilientClient, trades_url: impl Into<String>) -> Self {
        Self {
            http,
            trades_url: trades_url.into(),
        }
    }

    pub fn trades_url_for(&self, code: &str) -> String {
        format!("{}?pair={}&count={}", self.trades_url, code, TRADE_SEARCH_SIZE)
    }

    /// Raw trades body for a Kraken pair code.
    pub async fn fetch_trades(&self, code: &str) -> Result<String> {
        let url = self.trades_url_for(code);
        debug!("Fetching last trade from Kraken: {}", url);

        let response = self.http.get(&url).await?;
        if !response.is_success() {
            return Err(LtpError::DependencyError(format!(
                "Kraken endpoint returned status code {}",
                response.status
            )));
        }

        Ok(response.body)
    }
}
