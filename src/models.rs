use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    #[serde(rename = "b")]
    Buy,
    #[serde(rename = "s")]
    Sell,
}

impl Side {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "b" => Some(Side::Buy),
            "s" => Some(Side::Sell),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OrderType {
    #[serde(rename = "m")]
    Market,
    #[serde(rename = "l")]
    Limit,
}

impl OrderType {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "m" => Some(OrderType::Market),
            "l" => Some(OrderType::Limit),
            _ => None,
        }
    }
}

/// One executed trade as reported upstream, keyed by canonical pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRecord {
    pub pair: String,
    pub price: String,
    pub volume: String,
    pub timestamp: DateTime<Utc>,
    pub side: Side,
    pub order_type: OrderType,
    pub misc: String,
    pub trade_id: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceResult {
    pub pair: String,
    pub amount: String,
}

impl From<TradeRecord> for PriceResult {
    fn from(trade: TradeRecord) -> Self {
        Self {
            pair: trade.pair,
            amount: trade.price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LastTradePrices {
    pub ltp: Vec<PriceResult>,
}
