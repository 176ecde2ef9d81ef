// Gdax (Coinbase exchange) public REST payloads; numbers come as strings.
use serde::Deserialize;

use crate::market_data::normaliser::Numeric;

#[derive(Debug, Deserialize)]
pub struct GdaxProduct {
    pub id: String,             // e.g. "BTC-USD"
    pub base_currency: String,  // traded coin
    pub quote_currency: String, // pricing coin
    #[serde(default)]
    pub trading_disabled: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct GdaxTicker {
    pub ask: Numeric,
    pub bid: Numeric,
    pub price: Numeric,
    #[serde(default)]
    pub time: Option<String>, // ISO-8601
}

#[derive(Debug, Deserialize)]
pub struct GdaxBook {
    pub bids: Vec<GdaxLevel>,
    pub asks: Vec<GdaxLevel>,
}

// [price, size, num_orders] at level 2, [price, size, order_id] at level 3
pub type GdaxLevel = Vec<Numeric>;
