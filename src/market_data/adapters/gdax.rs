use serde_json::Value;

use super::gdax_types::{GdaxBook, GdaxLevel, GdaxProduct, GdaxTicker};
use super::{BookLevels, Endpoint, ExchangeSpec};
use crate::engine::types::{Coin, Market, OrderBookEntry, Side, Ticker};
use crate::market_data::exchange::Exchange;
use crate::market_data::normaliser::{iso_to_epoch_seconds, NormaliseError};
use crate::market_data::source::{DepthParam, RestRequest, SourceRequest};

/// Level 2 returns the top 50 aggregated levels; anything deeper needs level 3.
const LEVEL_TWO_DEPTH: usize = 50;

#[derive(Debug, Clone, Copy, Default)]
pub struct Gdax;

impl ExchangeSpec for Gdax {
    type MarketRecord = GdaxProduct;
    type TickerRecord = GdaxTicker;
    type BookRecord = GdaxBook;
    type LevelRecord = GdaxLevel;

    fn exchange(&self) -> Exchange {
        Exchange::Gdax
    }

    fn request(&self, request: SourceRequest<'_>) -> RestRequest {
        match request {
            SourceRequest::Markets => RestRequest::new("/products"),
            SourceRequest::Ticker(id) => RestRequest::new(format!("/products/{}/ticker", id)),
            SourceRequest::OrderBook(id, depth) => {
                let level = match depth {
                    DepthParam::Level(level) => level,
                    _ => 2,
                };
                RestRequest::new(format!("/products/{}/book", id)).query("level", level)
            }
        }
    }

    fn depth_param(&self, depth: usize) -> DepthParam {
        if depth > LEVEL_TWO_DEPTH { DepthParam::Level(3) } else { DepthParam::Level(2) }
    }

    fn validate(&self, endpoint: Endpoint, response: &Value) -> bool {
        match endpoint {
            Endpoint::Markets => response.is_array(),
            // errors come back as {"message": "..."}
            Endpoint::Ticker | Endpoint::OrderBook => response.is_object() && response.get("message").is_none(),
        }
    }

    fn is_usable(&self, record: &GdaxProduct) -> bool {
        !record.trading_disabled.unwrap_or(false)
    }

    fn build_market(&self, record: GdaxProduct) -> Option<Market> {
        Some(Market::with_names(
            Coin::new(&record.quote_currency),
            Coin::new(&record.base_currency),
            &record.id,
            self.exchange().display_name(),
        ))
    }

    fn build_ticker(&self, market: &Market, record: GdaxTicker) -> Result<Ticker, NormaliseError> {
        let timestamp = record.time.as_deref().map(iso_to_epoch_seconds).transpose()?;
        Ok(Ticker::new(
            market.clone(),
            record.ask.to_f64()?,
            record.bid.to_f64()?,
            record.price.to_f64()?,
            timestamp,
        ))
    }

    fn book_levels(&self, record: GdaxBook) -> Result<BookLevels<GdaxLevel>, NormaliseError> {
        Ok(BookLevels { bids: record.bids, asks: record.asks, timestamp: None })
    }

    fn build_entry(&self, side: Side, level: &GdaxLevel) -> Result<OrderBookEntry, NormaliseError> {
        let rate = level.first().ok_or(NormaliseError::MissingField("price"))?.to_f64()?;
        let quantity = level.get(1).ok_or(NormaliseError::MissingField("size"))?.to_f64()?;
        Ok(OrderBookEntry::new(side, quantity, rate))
    }
}
