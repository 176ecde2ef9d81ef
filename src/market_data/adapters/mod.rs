// Shared adapter pipeline: resolve -> call -> validate -> map.
// Each exchange only supplies an `ExchangeSpec` with its mapping rules.

use std::collections::HashMap;

use metrics::counter;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::engine::types::{Market, OrderBook, OrderBookEntry, Side, Ticker};
use crate::market_data::error::{MappingError, MarketDataError, MarketDataResult, SourceError};
use crate::market_data::exchange::Exchange;
use crate::market_data::normaliser::NormaliseError;
use crate::market_data::source::{DepthParam, MarketSource, RestRequest, SourceRequest};

pub mod bitfinex;
pub mod bitfinex_types;
pub mod bittrex;
pub mod bittrex_types;
pub mod gdax;
pub mod gdax_types;

pub use bitfinex::Bitfinex;
pub use bittrex::Bittrex;
pub use gdax::Gdax;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Markets,
    Ticker,
    OrderBook,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Markets => "markets",
            Endpoint::Ticker => "ticker",
            Endpoint::OrderBook => "order_book",
        }
    }
}

/// Raw book levels split by side, in exchange order.
pub struct BookLevels<L> {
    pub bids: Vec<L>,
    pub asks: Vec<L>,
    pub timestamp: Option<f64>,
}

/// Everything that differs between exchanges.
pub trait ExchangeSpec: Send + Sync + 'static {
    type MarketRecord: DeserializeOwned + Send;
    type TickerRecord: DeserializeOwned + Send;
    type BookRecord: DeserializeOwned + Send;
    type LevelRecord: Send + Sync;

    fn exchange(&self) -> Exchange;

    /// REST call for a request against this exchange.
    fn request(&self, request: SourceRequest<'_>) -> RestRequest;

    /// Native order book query parameter for a requested depth.
    fn depth_param(&self, depth: usize) -> DepthParam;

    /// Does the raw response look like a successful answer?
    fn validate(&self, endpoint: Endpoint, response: &Value) -> bool;

    /// Payload inside the response envelope.
    fn content(&self, _endpoint: Endpoint, response: Value) -> Value {
        response
    }

    fn is_usable(&self, _record: &Self::MarketRecord) -> bool {
        true
    }

    fn build_market(&self, record: Self::MarketRecord) -> Option<Market>;

    fn build_ticker(&self, market: &Market, record: Self::TickerRecord) -> Result<Ticker, NormaliseError>;

    fn book_levels(&self, record: Self::BookRecord) -> Result<BookLevels<Self::LevelRecord>, NormaliseError>;

    fn build_entry(&self, side: Side, level: &Self::LevelRecord) -> Result<OrderBookEntry, NormaliseError>;
}

/// Capabilities every exchange adapter exposes, whatever the exchange.
#[async_trait::async_trait]
pub trait VenueAdapter: Send + Sync {
    fn exchange(&self) -> Exchange;

    /// Cached market -> native name map, optionally filtered.
    fn get_markets(&self, filter: Option<&(dyn Fn(&Market) -> bool + Sync)>) -> HashMap<Market, String>;

    /// Cache-owned copy of the market, carrying the exchange-native names.
    fn resolve_market(&self, market: &Market) -> Option<Market>;

    /// `Ok(None)` when the exchange does not list the market.
    async fn get_ticker(&self, market: &Market) -> MarketDataResult<Option<Ticker>>;

    /// `Ok(None)` when the exchange does not list the market.
    async fn get_order_book(&self, market: &Market, depth: usize) -> MarketDataResult<Option<OrderBook>>;
}

/// Generic adapter driver. Only exists once its market list is cached.
pub struct Adapter<E, S> {
    spec: E,
    source: S,
    market_names: HashMap<Market, String>,
    markets: HashMap<String, Market>,
}

impl<E: ExchangeSpec, S: MarketSource> Adapter<E, S> {
    #[instrument(skip_all, fields(exchange = %spec.exchange()))]
    pub async fn connect(spec: E, source: S) -> MarketDataResult<Self> {
        let mut adapter = Self { spec, source, market_names: HashMap::new(), markets: HashMap::new() };
        let exchange = adapter.spec.exchange();
        if let Err(reason) = adapter.cache_markets().await {
            counter!("walls_adapter_init_failures_total", "exchange" => exchange.as_str()).increment(1);
            return Err(MarketDataError::AdapterInit { exchange, reason });
        }
        info!(markets = adapter.markets.len(), "market list cached");
        Ok(adapter)
    }

    async fn cache_markets(&mut self) -> Result<(), MappingError> {
        let response = self.source.fetch_market_list().await;
        let content = self.accept(Endpoint::Markets, response)?;
        let records: Vec<Value> = serde_json::from_value(content)?;

        for raw in records {
            let record: E::MarketRecord = match serde_json::from_value(raw) {
                Ok(record) => record,
                Err(e) => {
                    warn!(error = %e, "skipping malformed market entry");
                    continue;
                }
            };
            if !self.spec.is_usable(&record) {
                continue;
            }
            let Some(market) = self.spec.build_market(record) else {
                debug!("skipping market the exchange names ambiguously");
                continue;
            };
            self.market_names.insert(market.clone(), market.market_name.clone());
            self.markets.insert(market.market_name.clone(), market);
        }
        Ok(())
    }

    // Count the call, then check the envelope and unwrap the payload.
    fn accept(&self, endpoint: Endpoint, response: Result<Value, SourceError>) -> Result<Value, MappingError> {
        let exchange = self.spec.exchange().as_str();
        counter!("walls_upstream_requests_total", "exchange" => exchange, "endpoint" => endpoint.as_str())
            .increment(1);

        let result = match response {
            Ok(body) if self.spec.validate(endpoint, &body) => Ok(self.spec.content(endpoint, body)),
            Ok(_) => Err(MappingError::Invalid),
            Err(e) => Err(MappingError::Source(e)),
        };
        if let Err(e) = &result {
            counter!("walls_upstream_failures_total", "exchange" => exchange, "endpoint" => endpoint.as_str())
                .increment(1);
            warn!(exchange, endpoint = endpoint.as_str(), error = %e, "upstream call rejected");
        }
        result
    }

    fn map_ticker(&self, market: &Market, content: Value) -> Result<Ticker, MappingError> {
        let record: E::TickerRecord = serde_json::from_value(content)?;
        Ok(self.spec.build_ticker(market, record)?)
    }

    fn map_book(&self, market: &Market, content: Value, depth: DepthParam) -> Result<OrderBook, MappingError> {
        let record: E::BookRecord = serde_json::from_value(content)?;
        let levels = self.spec.book_levels(record)?;
        let entries = |side: Side, raw: &[E::LevelRecord]| {
            raw.iter().map(|level| self.spec.build_entry(side, level)).collect::<Result<Vec<_>, _>>()
        };
        let bids = entries(Side::Bids, &levels.bids)?;
        let asks = entries(Side::Asks, &levels.asks)?;

        let mut book = OrderBook::new(market.clone(), bids, asks, levels.timestamp);
        book.truncated = depth.limit().is_some_and(|n| book.bids.len() >= n || book.asks.len() >= n);
        Ok(book)
    }
}

#[async_trait::async_trait]
impl<E: ExchangeSpec, S: MarketSource> VenueAdapter for Adapter<E, S> {
    fn exchange(&self) -> Exchange {
        self.spec.exchange()
    }

    fn get_markets(&self, filter: Option<&(dyn Fn(&Market) -> bool + Sync)>) -> HashMap<Market, String> {
        self.market_names
            .iter()
            .filter(|(market, _)| filter.map_or(true, |keep| keep(market)))
            .map(|(market, name)| (market.clone(), name.clone()))
            .collect()
    }

    fn resolve_market(&self, market: &Market) -> Option<Market> {
        let name = self.market_names.get(market)?;
        self.markets.get(name).cloned()
    }

    #[instrument(skip_all, fields(exchange = %self.spec.exchange(), market = %market))]
    async fn get_ticker(&self, market: &Market) -> MarketDataResult<Option<Ticker>> {
        let Some(market) = self.resolve_market(market) else {
            debug!("market not listed");
            return Ok(None);
        };
        let response = self.source.fetch_ticker(&market.market_name).await;
        let ticker = self
            .accept(Endpoint::Ticker, response)
            .and_then(|content| self.map_ticker(&market, content))
            .map_err(|reason| MarketDataError::TickerFetch {
                exchange: self.spec.exchange(),
                market: market.market_name.clone(),
                reason,
            })?;
        Ok(Some(ticker))
    }

    #[instrument(skip_all, fields(exchange = %self.spec.exchange(), market = %market, depth = depth))]
    async fn get_order_book(&self, market: &Market, depth: usize) -> MarketDataResult<Option<OrderBook>> {
        let Some(market) = self.resolve_market(market) else {
            debug!("market not listed");
            return Ok(None);
        };
        let depth_param = self.spec.depth_param(depth);
        let response = self.source.fetch_order_book(&market.market_name, depth_param).await;
        let book = self
            .accept(Endpoint::OrderBook, response)
            .and_then(|content| self.map_book(&market, content, depth_param))
            .map_err(|reason| MarketDataError::OrderBookFetch {
                exchange: self.spec.exchange(),
                market: market.market_name.clone(),
                reason,
            })?;
        debug!(bids = book.bids.len(), asks = book.asks.len(), truncated = book.truncated, "order book mapped");
        Ok(Some(book))
    }
}
