// Routes (exchange, market) queries to the live adapter for that exchange.

use std::collections::HashMap;
use std::time::Duration;

use futures::future::join_all;
use metrics::counter;
use tracing::{debug, error, info, instrument};

use crate::config::ExchangeSettings;
use crate::engine::types::{Market, OrderBook, Ticker};
use crate::market_data::adapters::{Adapter, Bitfinex, Bittrex, ExchangeSpec, Gdax, VenueAdapter};
use crate::market_data::error::{MarketDataError, MarketDataResult};
use crate::market_data::exchange::Exchange;
use crate::market_data::source::RestSource;

#[derive(Debug, Clone, PartialEq)]
pub struct TickerQuery {
    pub exchange: Exchange,
    pub market: Market,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBookQuery {
    pub exchange: Exchange,
    pub market: Market,
    pub depth: usize,
}

pub struct QueryExecutor {
    adapters: HashMap<Exchange, Box<dyn VenueAdapter>>,
}

impl QueryExecutor {
    pub fn new(adapters: Vec<Box<dyn VenueAdapter>>) -> Self {
        let adapters = adapters.into_iter().map(|a| (a.exchange(), a)).collect();
        Self { adapters }
    }

    /// Bring up one REST adapter per configured exchange, concurrently.
    #[instrument(skip_all)]
    pub async fn connect(settings: &[ExchangeSettings]) -> Self {
        let results = join_all(settings.iter().map(connect_exchange)).await;
        let executor = Self::from_results(results);
        info!(live = executor.adapters.len(), configured = settings.len(), "exchanges initialised");
        executor
    }

    /// Keep the adapters that initialised; an exchange that failed is logged and left out.
    pub fn from_results(results: Vec<MarketDataResult<Box<dyn VenueAdapter>>>) -> Self {
        let mut adapters = Vec::new();
        for result in results {
            match result {
                Ok(adapter) => adapters.push(adapter),
                Err(e) => error!(error = %e, "exchange unavailable"),
            }
        }
        Self::new(adapters)
    }

    pub fn exchanges(&self) -> Vec<Exchange> {
        let mut live: Vec<Exchange> = self.adapters.keys().copied().collect();
        live.sort_by_key(|e| e.as_str());
        live
    }

    pub fn adapter(&self, exchange: Exchange) -> MarketDataResult<&dyn VenueAdapter> {
        self.adapters
            .get(&exchange)
            .map(|a| &**a)
            .ok_or(MarketDataError::ExchangeUnavailable(exchange))
    }

    pub async fn get_ticker(&self, query: &TickerQuery) -> MarketDataResult<Option<Ticker>> {
        self.adapter(query.exchange)?.get_ticker(&query.market).await
    }

    /// With `cut`, the book is re-truncated to `depth` per side whatever the exchange sent.
    pub async fn get_order_book(&self, query: &OrderBookQuery, cut: bool) -> MarketDataResult<Option<OrderBook>> {
        let book = self.adapter(query.exchange)?.get_order_book(&query.market, query.depth).await?;
        Ok(book.map(|b| if cut { b.cut(query.depth) } else { b }))
    }

    /// Cut order book plus ticker, fetched together. `None` if either is not listed.
    #[instrument(skip_all, fields(exchange = %book_query.exchange, market = %book_query.market))]
    pub async fn get_snapshot(
        &self,
        book_query: &OrderBookQuery,
        ticker_query: &TickerQuery,
    ) -> MarketDataResult<Option<(OrderBook, Ticker)>> {
        let (book, ticker) = tokio::try_join!(self.get_order_book(book_query, true), self.get_ticker(ticker_query))?;
        match (book, ticker) {
            (Some(book), Some(ticker)) => Ok(Some((book, ticker))),
            _ => {
                debug!("market not listed");
                Ok(None)
            }
        }
    }
}

pub async fn connect_exchange(settings: &ExchangeSettings) -> MarketDataResult<Box<dyn VenueAdapter>> {
    let base_url = settings.base_url.as_deref().unwrap_or(settings.exchange.default_base_url());
    let timeout = Duration::from_secs(settings.timeout_secs);
    match settings.exchange {
        Exchange::Bittrex => connect_rest(Bittrex, base_url, timeout).await,
        Exchange::Gdax => connect_rest(Gdax, base_url, timeout).await,
        Exchange::Bitfinex => connect_rest(Bitfinex, base_url, timeout).await,
    }
}

async fn connect_rest<E>(spec: E, base_url: &str, timeout: Duration) -> MarketDataResult<Box<dyn VenueAdapter>>
where
    E: ExchangeSpec + Copy,
{
    let exchange = spec.exchange();
    let source = RestSource::new(spec, base_url, timeout).map_err(|e| {
        counter!("walls_adapter_init_failures_total", "exchange" => exchange.as_str()).increment(1);
        MarketDataError::AdapterInit { exchange, reason: e.into() }
    })?;
    let adapter = Adapter::connect(spec, source).await?;
    Ok(Box::new(adapter))
}
