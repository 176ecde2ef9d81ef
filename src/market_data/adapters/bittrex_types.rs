// Bittrex v1.1 public API payloads (inside the `{success, message, result}` envelope)
use serde::Deserialize;

use crate::market_data::normaliser::Numeric;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BittrexMarket {
    pub market_currency: String, // traded coin, e.g. "LTC"
    pub base_currency: String,   // e.g. "BTC"
    pub market_name: String,     // e.g. "BTC-LTC"
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BittrexTicker {
    pub bid: Numeric,
    pub ask: Numeric,
    pub last: Numeric,
}

#[derive(Debug, Deserialize)]
pub struct BittrexBook {
    // either side comes back as null when empty
    #[serde(default)]
    pub buy: Option<Vec<BittrexLevel>>,
    #[serde(default)]
    pub sell: Option<Vec<BittrexLevel>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BittrexLevel {
    pub quantity: Numeric,
    pub rate: Numeric,
}
