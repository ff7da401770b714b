use crate::api::KrakenClient;
use crate::error::Result;
use crate::models::{PriceResult, TradeRecord};
use crate::pairs::PairTranslator;
use crate::transform::TradeTransformer;
use std::sync::Arc;
use tracing::{info, warn};

/// Resolves last traded prices for canonical pairs, one upstream call per
/// requested pair, in request order.
#[derive(Clone)]
pub struct PriceFeedService {
    translator: Arc<PairTranslator>,
    kraken: KrakenClient,
    transformer: TradeTransformer,
}

impl PriceFeedService {
    pub fn new(translator: Arc<PairTranslator>, kraken: KrakenClient) -> Self {
        let transformer = TradeTransformer::new(translator.clone());
        Self {
            translator,
            kraken,
            transformer,
        }
    }

    pub async fn last_trade(&self, pair: &str) -> Result<TradeRecord> {
        let code = self.translator.to_upstream_code(pair)?;
        let body = self.kraken.fetch_trades(code).await?;
        self.transformer.transform(&body, code)
    }

    /// Stops at the first failing pair; no partial results are returned.
    pub async fn fetch_prices(&self, pairs: &[String]) -> Result<Vec<PriceResult>> {
        let mut prices = Vec::with_capacity(pairs.len());
        for pair in pairs {
            match self.last_trade(pair).await {
                Ok(trade) => {
                    info!("[KRAKEN] {} last trade: {}", trade.pair, trade.price);
                    prices.push(PriceResult::from(trade));
                }
                Err(e) => {
                    warn!("Failed to fetch last trade for {}: {}", pair, e);
                    return Err(e);
                }
            }
        }
        Ok(prices)
    }
}
