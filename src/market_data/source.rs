// Network boundary: raw JSON in, nothing canonical yet.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, trace};

use crate::market_data::adapters::ExchangeSpec;
use crate::market_data::error::SourceError;

/// How an exchange expresses "how much of the book".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthParam {
    /// Whole book, depth ignored upstream.
    Full,
    /// Exchange detail level (1 = best, 2 = top 50 aggregated, 3 = full non-aggregated).
    Level(u8),
    /// Straight entry limit per side.
    Limit(usize),
}

impl DepthParam {
    /// Entries per side the exchange will return at most, if it caps them.
    pub fn limit(&self) -> Option<usize> {
        match self {
            DepthParam::Full | DepthParam::Level(3) => None,
            DepthParam::Level(1) => Some(1),
            DepthParam::Level(_) => Some(50),
            DepthParam::Limit(n) => Some(*n),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceRequest<'a> {
    Markets,
    Ticker(&'a str),
    OrderBook(&'a str, DepthParam),
}

/// GET path + query string relative to an exchange base url.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestRequest {
    pub path: String,
    pub query: Vec<(&'static str, String)>,
}

impl RestRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), query: Vec::new() }
    }

    pub fn query(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }
}

#[async_trait::async_trait]
pub trait MarketSource: Send + Sync {
    async fn fetch_market_list(&self) -> Result<Value, SourceError>;
    async fn fetch_ticker(&self, market_name: &str) -> Result<Value, SourceError>;
    async fn fetch_order_book(&self, market_name: &str, depth: DepthParam) -> Result<Value, SourceError>;
}

#[async_trait::async_trait]
impl<T: MarketSource + ?Sized> MarketSource for Arc<T> {
    async fn fetch_market_list(&self) -> Result<Value, SourceError> {
        (**self).fetch_market_list().await
    }

    async fn fetch_ticker(&self, market_name: &str) -> Result<Value, SourceError> {
        (**self).fetch_ticker(market_name).await
    }

    async fn fetch_order_book(&self, market_name: &str, depth: DepthParam) -> Result<Value, SourceError> {
        (**self).fetch_order_book(market_name, depth).await
    }
}

/// Public REST API of one exchange.
pub struct RestSource<E> {
    spec: E,
    base_url: String,
    http: reqwest::Client,
}

impl<E: ExchangeSpec> RestSource<E> {
    pub fn new(spec: E, base_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| SourceError::Transport { url: base_url.clone(), source })?;
        Ok(Self { spec, base_url, http })
    }

    async fn get(&self, request: RestRequest) -> Result<Value, SourceError> {
        let url = format!("{}{}", self.base_url, request.path);
        debug!(exchange = %self.spec.exchange(), %url, query = ?request.query, "GET");

        let response = self
            .http
            .get(&url)
            .query(&request.query)
            .send()
            .await
            .map_err(|source| SourceError::Transport { url: url.clone(), source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status { url, status: status.as_u16() });
        }
        let body = response
            .json::<Value>()
            .await
            .map_err(|source| SourceError::Body { url: url.clone(), source })?;
        trace!(%url, "response decoded");
        Ok(body)
    }
}

#[async_trait::async_trait]
impl<E: ExchangeSpec> MarketSource for RestSource<E> {
    async fn fetch_market_list(&self) -> Result<Value, SourceError> {
        self.get(self.spec.request(SourceRequest::Markets)).await
    }

    async fn fetch_ticker(&self, market_name: &str) -> Result<Value, SourceError> {
        self.get(self.spec.request(SourceRequest::Ticker(market_name))).await
    }

    async fn fetch_order_book(&self, market_name: &str, depth: DepthParam) -> Result<Value, SourceError> {
        self.get(self.spec.request(SourceRequest::OrderBook(market_name, depth))).await
    }
}

#[cfg(any(test, feature = "fixtures"))]
pub use fixture::FixtureSource;

#[cfg(any(test, feature = "fixtures"))]
mod fixture {
    use std::collections::HashMap;

    use parking_lot::Mutex;
    use serde_json::Value;

    use super::{DepthParam, MarketSource};
    use crate::market_data::error::SourceError;

    /// Canned responses keyed by native market name, for tests and the `fixtures` feature.
    #[derive(Debug, Default)]
    pub struct FixtureSource {
        markets: Option<Value>,
        tickers: HashMap<String, Value>,
        books: HashMap<String, Value>,
        depth_requests: Mutex<Vec<DepthParam>>,
    }

    impl FixtureSource {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_markets(mut self, response: Value) -> Self {
            self.markets = Some(response);
            self
        }

        pub fn with_ticker(mut self, market_name: &str, response: Value) -> Self {
            self.tickers.insert(market_name.to_string(), response);
            self
        }

        pub fn with_book(mut self, market_name: &str, response: Value) -> Self {
            self.books.insert(market_name.to_string(), response);
            self
        }

        /// Depth parameters seen by `fetch_order_book`, oldest first.
        pub fn depth_requests(&self) -> Vec<DepthParam> {
            self.depth_requests.lock().clone()
        }
    }

    #[async_trait::async_trait]
    impl MarketSource for FixtureSource {
        async fn fetch_market_list(&self) -> Result<Value, SourceError> {
            self.markets.clone().ok_or_else(|| SourceError::Missing("market list".into()))
        }

        async fn fetch_ticker(&self, market_name: &str) -> Result<Value, SourceError> {
            self.tickers
                .get(market_name)
                .cloned()
                .ok_or_else(|| SourceError::Missing(format!("ticker {}", market_name)))
        }

        async fn fetch_order_book(&self, market_name: &str, depth: DepthParam) -> Result<Value, SourceError> {
            self.depth_requests.lock().push(depth);
            self.books
                .get(market_name)
                .cloned()
                .ok_or_else(|| SourceError::Missing(format!("order book {}", market_name)))
        }
    }
}
