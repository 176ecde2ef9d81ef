use serde_json::Value;

use super::bittrex_types::{BittrexBook, BittrexLevel, BittrexMarket, BittrexTicker};
use super::{BookLevels, Endpoint, ExchangeSpec};
use crate::engine::types::{Coin, Market, OrderBookEntry, Side, Ticker};
use crate::market_data::exchange::Exchange;
use crate::market_data::normaliser::NormaliseError;
use crate::market_data::source::{DepthParam, RestRequest, SourceRequest};

/// Bittrex: every answer is wrapped in a `success`/`result` envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bittrex;

impl ExchangeSpec for Bittrex {
    type MarketRecord = BittrexMarket;
    type TickerRecord = BittrexTicker;
    type BookRecord = BittrexBook;
    type LevelRecord = BittrexLevel;

    fn exchange(&self) -> Exchange {
        Exchange::Bittrex
    }

    fn request(&self, request: SourceRequest<'_>) -> RestRequest {
        match request {
            SourceRequest::Markets => RestRequest::new("/public/getmarkets"),
            SourceRequest::Ticker(name) => RestRequest::new("/public/getticker").query("market", name),
            SourceRequest::OrderBook(name, _) => RestRequest::new("/public/getorderbook")
                .query("market", name)
                .query("type", "both"),
        }
    }

    // No depth knob upstream; the executor cuts the full book.
    fn depth_param(&self, _depth: usize) -> DepthParam {
        DepthParam::Full
    }

    fn validate(&self, _endpoint: Endpoint, response: &Value) -> bool {
        response.get("success").and_then(Value::as_bool) == Some(true)
    }

    fn content(&self, _endpoint: Endpoint, response: Value) -> Value {
        match response {
            Value::Object(mut envelope) => envelope.remove("result").unwrap_or(Value::Null),
            other => other,
        }
    }

    fn is_usable(&self, record: &BittrexMarket) -> bool {
        record.is_active
    }

    fn build_market(&self, record: BittrexMarket) -> Option<Market> {
        Some(Market::with_names(
            Coin::new(&record.base_currency),
            Coin::new(&record.market_currency),
            &record.market_name,
            self.exchange().display_name(),
        ))
    }

    fn build_ticker(&self, market: &Market, record: BittrexTicker) -> Result<Ticker, NormaliseError> {
        Ok(Ticker::new(market.clone(), record.ask.to_f64()?, record.bid.to_f64()?, record.last.to_f64()?, None))
    }

    fn book_levels(&self, record: BittrexBook) -> Result<BookLevels<BittrexLevel>, NormaliseError> {
        Ok(BookLevels {
            bids: record.buy.unwrap_or_default(),
            asks: record.sell.unwrap_or_default(),
            timestamp: None,
        })
    }

    fn build_entry(&self, side: Side, level: &BittrexLevel) -> Result<OrderBookEntry, NormaliseError> {
        Ok(OrderBookEntry::new(side, level.quantity.to_f64()?, level.rate.to_f64()?))
    }
}
