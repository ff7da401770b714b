use crate::error::{LtpError, Result};
use crate::models::{OrderType, Side, TradeRecord};
use crate::pairs::PairTranslator;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error};

const UPSTREAM_ERROR_BANNER: &str = "We received the following errors from Kraken services";
const LOG_PREVIEW_BYTES: usize = 512;

#[derive(Debug, Deserialize)]
struct TradesEnvelope {
    #[serde(default)]
    error: Option<Vec<String>>,
    #[serde(default)]
    result: Option<Map<String, Value>>,
}

impl TradesEnvelope {
    fn last_cursor(&self) -> Option<&str> {
        self.result
            .as_ref()
            .and_then(|result| result.get("last"))
            .and_then(Value::as_str)
    }
}

/// Turns a Kraken `Trades` body into the most recent [`TradeRecord`].
#[derive(Debug, Clone)]
pub struct TradeTransformer {
    translator: Arc<PairTranslator>,
}

impl TradeTransformer {
    pub fn new(translator: Arc<PairTranslator>) -> Self {
        Self { translator }
    }

    pub fn transform(&self, body: &str, code: &str) -> Result<TradeRecord> {
        let envelope: TradesEnvelope = serde_json::from_str(body).map_err(|e| {
            error!("Kraken raw response: {}", log_preview(body));
            LtpError::InvalidTrade(format!("Trade response could not be decoded: {}", e))
        })?;

        let errors = envelope.error.as_deref().unwrap_or_default();
        if !errors.is_empty() {
            return Err(LtpError::UpstreamReported(merge_error_messages(errors)));
        }
        debug!("Kraken trades cursor for {}: {:?}", code, envelope.last_cursor());

        let trades = envelope
            .result
            .as_ref()
            .and_then(|result| result.get(code))
            .ok_or_else(|| LtpError::InvalidTrade("no such key".to_string()))?;

        let trade = trades
            .as_array()
            .and_then(|trades| trades.last())
            .and_then(Value::as_array)
            .ok_or_else(|| invalid("Trade"))?;

        let pair = self.translator.to_canonical_pair(code)?.to_string();
        map_trade(pair, trade)
    }
}

/// At most `LOG_PREVIEW_BYTES` of `body`, cut on a char boundary.
fn log_preview(body: &str) -> &str {
    if body.len() <= LOG_PREVIEW_BYTES {
        return body;
    }
    let mut end = LOG_PREVIEW_BYTES;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

fn merge_error_messages(errors: &[String]) -> String {
    let mut message = String::from(UPSTREAM_ERROR_BANNER);
    message.push('\n');
    for err in errors {
        message.push_str(err);
        message.push('\n');
    }
    message
}

fn map_trade(pair: String, trade: &[Value]) -> Result<TradeRecord> {
    let price = string_at(trade, 0, "Price")?;
    let volume = string_at(trade, 1, "Volume")?;
    let timestamp = trade
        .get(2)
        .and_then(Value::as_f64)
        .and_then(timestamp_to_datetime)
        .ok_or_else(|| invalid("Timestamp"))?;
    let side =
        Side::from_code(&string_at(trade, 3, "Buy/Sell")?).ok_or_else(|| invalid("Buy/Sell"))?;
    let order_type = OrderType::from_code(&string_at(trade, 4, "Market/Limit")?)
        .ok_or_else(|| invalid("Market/Limit"))?;
    let misc = string_at(trade, 5, "Miscellaneous")?;
    let trade_id = trade
        .get(6)
        .and_then(Value::as_u64)
        .ok_or_else(|| invalid("Trade ID"))?;

    Ok(TradeRecord {
        pair,
        price,
        volume,
        timestamp,
        side,
        order_type,
        misc,
        trade_id,
    })
}

fn string_at(trade: &[Value], index: usize, field: &str) -> Result<String> {
    trade
        .get(index)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| invalid(field))
}

fn invalid(field: &str) -> LtpError {
    LtpError::InvalidTrade(format!("{} could not be mapped", field))
}

/// Fractional epoch seconds to an instant, keeping sub-second precision.
pub fn timestamp_to_datetime(timestamp: f64) -> Option<DateTime<Utc>> {
    if !timestamp.is_finite() {
        return None;
    }
    let mut seconds = timestamp.floor();
    let mut nanos = ((timestamp - seconds) * 1e9).round();
    if nanos >= 1e9 {
        seconds += 1.0;
        nanos -= 1e9;
    }
    if seconds < i64::MIN as f64 || seconds > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp(seconds as i64, nanos as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    const USD_TRADES: &str = r#"{
        "error": [],
        "result": {
            "XXBTZUSD": [
                ["30243.40000", "0.34507674", 1688669597.8277369, "b", "m", "", 61044952]
            ],
            "last": "1688671969993150842"
        }
    }"#;

    fn transformer() -> TradeTransformer {
        TradeTransformer::new(Arc::new(PairTranslator::new()))
    }

    fn invalid_message(body: &str, code: &str) -> String {
        match transformer().transform(body, code) {
            Err(LtpError::InvalidTrade(msg)) => msg,
            other => panic!("expected InvalidTrade, got {:?}", other),
        }
    }

    #[test]
    fn maps_last_trade() {
        let trade = transformer().transform(USD_TRADES, "XXBTZUSD").unwrap();

        assert_eq!(trade.pair, "BTC/USD");
        assert_eq!(trade.price, "30243.40000");
        assert_eq!(trade.volume, "0.34507674");
        assert_eq!(trade.side, Side::Buy);
        assert_eq!(trade.order_type, OrderType::Market);
        assert_eq!(trade.misc, "");
        assert_eq!(trade.trade_id, 61044952);
        assert_eq!(trade.timestamp.timestamp(), 1688669597);
        let nanos = trade.timestamp.nanosecond() as i64;
        assert!((nanos - 827_736_900).abs() < 1_000, "nanos = {}", nanos);
        assert_eq!(Some(trade.timestamp), timestamp_to_datetime(1688669597.8277369));
    }

    #[test]
    fn only_most_recent_entry_is_used() {
        let body = r#"{"error":[],"result":{"XBTCHF":[
            ["1.0","1.0",1688669500.5,"s","l","",1],
            ["2.0","3.0",1688669600.25,"b","m","x",2]
        ]}}"#;
        let trade = transformer().transform(body, "XBTCHF").unwrap();

        assert_eq!(trade.pair, "BTC/CHF");
        assert_eq!(trade.price, "2.0");
        assert_eq!(trade.misc, "x");
        assert_eq!(trade.trade_id, 2);
        assert_eq!(trade.timestamp.nanosecond(), 250_000_000);
    }

    #[test]
    fn upstream_errors_are_merged_under_banner() {
        let body = r#"{"error":["Some error","EGeneral:Too many requests"],"result":{}}"#;
        match transformer().transform(body, "XXBTZUSD") {
            Err(LtpError::UpstreamReported(msg)) => {
                assert!(msg.starts_with(UPSTREAM_ERROR_BANNER));
                assert!(msg.contains("Some error\n"));
                assert!(msg.contains("EGeneral:Too many requests\n"));
            }
            other => panic!("expected UpstreamReported, got {:?}", other),
        }
    }

    #[test]
    fn missing_key() {
        assert_eq!(invalid_message(USD_TRADES, "XXBTZEUR"), "no such key");
        assert_eq!(invalid_message(r#"{"error":[]}"#, "XXBTZUSD"), "no such key");
    }

    #[test]
    fn names_first_mistyped_field() {
        let cases = [
            (r#"[30243.4,"0.3",1688669597.8,"b","m","",1]"#, "Price could not be mapped"),
            (r#"["30243.4",0.3,1688669597.8,"b","m","",1]"#, "Volume could not be mapped"),
            (r#"["30243.4","0.3","1688669597.8","b","m","",1]"#, "Timestamp could not be mapped"),
            (r#"["30243.4","0.3",1688669597.8,1,"m","",1]"#, "Buy/Sell could not be mapped"),
            (r#"["30243.4","0.3",1688669597.8,"x","m","",1]"#, "Buy/Sell could not be mapped"),
            (r#"["30243.4","0.3",1688669597.8,"b","q","",1]"#, "Market/Limit could not be mapped"),
            (
                r#"["30243.4","0.3",1688669597.8,"b","m",null,1]"#,
                "Miscellaneous could not be mapped",
            ),
            (r#"["30243.4","0.3",1688669597.8,"b","m","","1"]"#, "Trade ID could not be mapped"),
            (r#"["30243.4","0.3",1688669597.8,"b","m",""]"#, "Trade ID could not be mapped"),
            (r#"[1,0.3]"#, "Price could not be mapped"),
        ];
        for (trade, expected) in cases {
            let body = format!(r#"{{"error":[],"result":{{"XXBTZUSD":[{}]}}}}"#, trade);
            assert_eq!(invalid_message(&body, "XXBTZUSD"), expected, "trade {}", trade);
        }
    }

    #[test]
    fn ill_shaped_trade_lists() {
        for trades in [r#"[]"#, r#""XXBTZUSD""#, r#"["not-an-array"]"#] {
            let body = format!(r#"{{"error":[],"result":{{"XXBTZUSD":{}}}}}"#, trades);
            assert_eq!(invalid_message(&body, "XXBTZUSD"), "Trade could not be mapped");
        }
    }

    #[test]
    fn undecodable_body() {
        let msg = invalid_message("<html>bad gateway</html>", "XXBTZUSD");
        assert!(msg.starts_with("Trade response could not be decoded"));
    }

    #[test]
    fn logged_body_is_bounded() {
        let short = "<html>bad gateway</html>";
        assert_eq!(log_preview(short), short);

        let page = "x".repeat(10_000);
        assert_eq!(log_preview(&page).len(), LOG_PREVIEW_BYTES);

        let multibyte = "é".repeat(LOG_PREVIEW_BYTES);
        let preview = log_preview(&multibyte);
        assert!(preview.len() <= LOG_PREVIEW_BYTES);
        assert!(preview.chars().all(|c| c == 'é'));
    }

    #[test]
    fn known_key_without_canonical_pair() {
        let body = r#"{"error":[],"result":{"XETHZUSD":[["1","1",1.0,"b","m","",1]]}}"#;
        assert!(matches!(
            transformer().transform(body, "XETHZUSD"),
            Err(LtpError::UnsupportedPair(_))
        ));
    }

    #[test]
    fn timestamp_rounding_carries_into_next_second() {
        let instant = timestamp_to_datetime(10.9999999999).unwrap();
        assert_eq!(instant.timestamp(), 11);
        assert_eq!(instant.nanosecond(), 0);

        let before_epoch = timestamp_to_datetime(-1.5).unwrap();
        assert_eq!(before_epoch.timestamp(), -2);
        assert_eq!(before_epoch.nanosecond(), 500_000_000);

        assert!(timestamp_to_datetime(f64::NAN).is_none());
    }
}
