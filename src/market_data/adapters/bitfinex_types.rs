// Bitfinex v1 public REST payloads; numbers come as strings.
use serde::Deserialize;

use crate::market_data::normaliser::Numeric;

#[derive(Debug, Deserialize)]
pub struct BitfinexTickerSummary {
    pub pair: String, // e.g. "BTCUSD": traded coin first
}

#[derive(Debug, Deserialize)]
pub struct BitfinexTicker {
    pub ask: Numeric,
    pub bid: Numeric,
    pub last_price: Numeric,
    pub timestamp: Numeric, // epoch seconds
}

#[derive(Debug, Deserialize)]
pub struct BitfinexBook {
    #[serde(default)]
    pub bids: Vec<BitfinexLevel>,
    #[serde(default)]
    pub asks: Vec<BitfinexLevel>,
}

#[derive(Debug, Deserialize)]
pub struct BitfinexLevel {
    pub price: Numeric,
    pub amount: Numeric,
    pub timestamp: Numeric,
}
