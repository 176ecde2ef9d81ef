use thiserror::Error;

use crate::market_data::exchange::Exchange;
use crate::market_data::normaliser::NormaliseError;

/// Failures of the network collaborator behind an adapter.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("{url} returned a body that is not JSON: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("no canned response for {0}")]
    Missing(String),
}

/// Why a response could not be turned into canonical entities.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("response failed validation")]
    Invalid,

    #[error("unexpected payload shape: {0}")]
    Shape(#[from] serde_json::Error),

    #[error(transparent)]
    Normalise(#[from] NormaliseError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("unable to init {exchange} client: {reason}")]
    AdapterInit {
        exchange: Exchange,
        #[source]
        reason: MappingError,
    },

    #[error("unable to get ticker {market} from {exchange}: {reason}")]
    TickerFetch {
        exchange: Exchange,
        market: String,
        #[source]
        reason: MappingError,
    },

    #[error("unable to get order book {market} from {exchange}: {reason}")]
    OrderBookFetch {
        exchange: Exchange,
        market: String,
        #[source]
        reason: MappingError,
    },

    #[error("{0} is not available")]
    ExchangeUnavailable(Exchange),
}

pub type MarketDataResult<T> = Result<T, MarketDataError>;
