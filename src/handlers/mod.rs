use crate::api::{KrakenClient, ReqwestTransport, ResilientClient, Transport};
use crate::config::Config;
use crate::error::{LtpError, Result};
use crate::models::LastTradePrices;
use crate::pairs::PairTranslator;
use crate::price_feed::PriceFeedService;
use axum::{
    extract::{RawQuery, State},
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use url::form_urlencoded;

pub struct AppState {
    pub price_feed: PriceFeedService,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(&config.http)?);
        Ok(Self::with_transport(config, transport))
    }

    pub fn with_transport(config: &Config, transport: Arc<dyn Transport>) -> Self {
        let http = ResilientClient::new(transport, &config.http);
        let kraken = KrakenClient::new(http, config.kraken_trades_url.clone());
        let translator = Arc::new(PairTranslator::new());
        Self {
            price_feed: PriceFeedService::new(translator, kraken),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/ltp", get(get_last_trade_prices))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn get_last_trade_prices(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Result<Json<LastTradePrices>> {
    let pairs = parse_pairs(query.as_deref())?;
    let ltp = state.price_feed.fetch_prices(&pairs).await?;
    info!("Served last trade prices for {} pair(s)", ltp.len());
    Ok(Json(LastTradePrices { ltp }))
}

/// Collects `pairs` from repeated parameters and/or comma-separated values.
pub fn parse_pairs(query: Option<&str>) -> Result<Vec<String>> {
    let mut pairs = Vec::new();
    for (key, value) in form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
        if key != "pairs" {
            continue;
        }
        for pair in value.split(',') {
            let pair = pair.trim();
            if pair.is_empty() {
                return Err(LtpError::Validation(
                    "'pairs' param must not contain empty values".to_string(),
                ));
            }
            pairs.push(pair.to_string());
        }
    }

    if pairs.is_empty() {
        return Err(LtpError::Validation("'pairs' param is required".to_string()));
    }
    Ok(pairs)
}
