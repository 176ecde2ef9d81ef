use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exchange {
    Bittrex,
    Gdax,
    Bitfinex,
}

impl Exchange {
    pub const ALL: [Exchange; 3] = [Exchange::Gdax, Exchange::Bitfinex, Exchange::Bittrex];

    /// Name used in commands and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Exchange::Bittrex => "BITTREX",
            Exchange::Gdax => "GDAX",
            Exchange::Bitfinex => "BITFINEX",
        }
    }

    /// Name stamped on markets and shown in reports.
    pub fn display_name(&self) -> &'static str {
        match self {
            Exchange::Bittrex => "Bittrex",
            Exchange::Gdax => "Gdax",
            Exchange::Bitfinex => "Bitfinex",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Exchange::Bittrex => "https://bittrex.com/api/v1.1",
            Exchange::Gdax => "https://api.exchange.coinbase.com",
            Exchange::Bitfinex => "https://api.bitfinex.com/v1",
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown exchange: {0}")]
pub struct UnknownExchange(pub String);

impl FromStr for Exchange {
    type Err = UnknownExchange;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Exchange::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownExchange(s.to_string()))
    }
}
