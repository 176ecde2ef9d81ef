use serde_json::Value;

use super::bitfinex_types::{BitfinexBook, BitfinexLevel, BitfinexTicker, BitfinexTickerSummary};
use super::{BookLevels, Endpoint, ExchangeSpec};
use crate::engine::types::{Coin, Market, OrderBookEntry, Side, Ticker};
use crate::market_data::exchange::Exchange;
use crate::market_data::normaliser::{epoch_seconds, NormaliseError};
use crate::market_data::source::{DepthParam, RestRequest, SourceRequest};

// Pairs are two 3-letter codes glued together.
const CODE_LEN: usize = 3;

#[derive(Debug, Clone, Copy, Default)]
pub struct Bitfinex;

impl ExchangeSpec for Bitfinex {
    type MarketRecord = BitfinexTickerSummary;
    type TickerRecord = BitfinexTicker;
    type BookRecord = BitfinexBook;
    type LevelRecord = BitfinexLevel;

    fn exchange(&self) -> Exchange {
        Exchange::Bitfinex
    }

    fn request(&self, request: SourceRequest<'_>) -> RestRequest {
        match request {
            SourceRequest::Markets => RestRequest::new("/tickers"),
            SourceRequest::Ticker(pair) => RestRequest::new(format!("/pubticker/{}", pair)),
            SourceRequest::OrderBook(pair, depth) => {
                let mut request = RestRequest::new(format!("/book/{}", pair));
                if let Some(limit) = depth.limit() {
                    request = request.query("limit_bids", limit).query("limit_asks", limit);
                }
                request
            }
        }
    }

    fn depth_param(&self, depth: usize) -> DepthParam {
        DepthParam::Limit(depth)
    }

    fn validate(&self, endpoint: Endpoint, response: &Value) -> bool {
        match endpoint {
            Endpoint::Markets => response.is_array(),
            Endpoint::Ticker | Endpoint::OrderBook => response.is_object() && response.get("message").is_none(),
        }
    }

    fn build_market(&self, record: BitfinexTickerSummary) -> Option<Market> {
        let pair = record.pair;
        let traded = pair.get(..CODE_LEN)?;
        let base = pair.get(CODE_LEN..).filter(|b| b.len() >= CODE_LEN)?;
        Some(Market::with_names(Coin::new(base), Coin::new(traded), &pair, self.exchange().display_name()))
    }

    fn build_ticker(&self, market: &Market, record: BitfinexTicker) -> Result<Ticker, NormaliseError> {
        Ok(Ticker::new(
            market.clone(),
            record.ask.to_f64()?,
            record.bid.to_f64()?,
            record.last_price.to_f64()?,
            Some(epoch_seconds(&record.timestamp)?),
        ))
    }

    // No book-level timestamp upstream; the freshest side entry stands in for it.
    fn book_levels(&self, record: BitfinexBook) -> Result<BookLevels<BitfinexLevel>, NormaliseError> {
        let timestamp = record
            .bids
            .first()
            .or_else(|| record.asks.first())
            .map(|level| epoch_seconds(&level.timestamp))
            .transpose()?;
        Ok(BookLevels { bids: record.bids, asks: record.asks, timestamp })
    }

    fn build_entry(&self, side: Side, level: &BitfinexLevel) -> Result<OrderBookEntry, NormaliseError> {
        Ok(OrderBookEntry::new(side, level.amount.to_f64()?, level.price.to_f64()?))
    }
}
