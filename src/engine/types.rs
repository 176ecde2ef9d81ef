use std::fmt;
use std::hash::{Hash, Hasher};

// Exchange codes that mean the same currency for our purposes.
const COIN_SYNONYMS: &[(&str, &str)] = &[("USDT", "USD")];

const COIN_SYMBOLS: &[(&str, &str)] = &[("USD", "$"), ("BTC", "฿"), ("ETH", "Ξ"), ("LTC", "Ł")];

/// Canonical currency code, e.g. `"usdt"` -> `"USD"`.
pub fn canonicalize(code: &str) -> String {
    let upper = code.trim().to_uppercase();
    COIN_SYNONYMS
        .iter()
        .find(|(alias, _)| *alias == upper)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(upper)
}

/// A currency. Equality and hashing only look at the canonical code.
#[derive(Debug, Clone)]
pub struct Coin {
    code: String,
    symbol: String,
}

impl Coin {
    pub fn new(code: &str) -> Self {
        let code = canonicalize(code);
        let symbol = COIN_SYMBOLS
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, s)| s.to_string())
            .unwrap_or_else(|| code.clone());
        Self { code, symbol }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn is_usd(&self) -> bool {
        self.code == "USD"
    }
}

impl PartialEq for Coin {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for Coin {}

impl Hash for Coin {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code.hash(state);
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}

/// A trading pair. Direction-agnostic: `Market(A, B) == Market(B, A)`.
///
/// `market_name` and `exchange_name` are exchange-native labels filled in when
/// an adapter builds the market; caller-built markets leave them empty.
#[derive(Debug, Clone)]
pub struct Market {
    pub base: Coin,
    pub traded: Coin,
    pub market_name: String,
    pub exchange_name: String,
}

impl Market {
    /// Caller-side market with no exchange-native labels.
    pub fn new(base: Coin, traded: Coin) -> Self {
        Self { base, traded, market_name: String::new(), exchange_name: String::new() }
    }

    pub fn with_names(base: Coin, traded: Coin, market_name: &str, exchange_name: &str) -> Self {
        Self {
            base,
            traded,
            market_name: market_name.to_string(),
            exchange_name: exchange_name.to_string(),
        }
    }

    pub fn is_usd(&self) -> bool {
        self.base.is_usd() || self.traded.is_usd()
    }

    fn ordered_codes(&self) -> (&str, &str) {
        let (a, b) = (self.base.code(), self.traded.code());
        if a <= b { (a, b) } else { (b, a) }
    }
}

impl PartialEq for Market {
    fn eq(&self, other: &Self) -> bool {
        (self.base == other.base && self.traded == other.traded)
            || (self.base == other.traded && self.traded == other.base)
    }
}

impl Eq for Market {}

impl Hash for Market {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // hash the pair in code order so both directions land in the same bucket
        let (lo, hi) = self.ordered_codes();
        lo.hash(state);
        hi.hash(state);
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.base, self.traded)?;
        if !self.market_name.is_empty() {
            write!(f, " as {} at {}", self.market_name, self.exchange_name)?;
        }
        Ok(())
    }
}

fn reciprocal(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { 1.0 / value }
}

/// Current time as fractional epoch seconds.
pub fn now_epoch_seconds() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// Ask/bid/last snapshot. `r_*` fields hold the prices of the opposite quoting direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticker {
    pub market: Market,
    pub ask: f64,
    pub bid: f64,
    pub last: f64,
    pub r_ask: f64,
    pub r_bid: f64,
    pub r_last: f64,
    pub timestamp: f64,
}

impl Ticker {
    pub fn new(market: Market, ask: f64, bid: f64, last: f64, timestamp: Option<f64>) -> Self {
        Self::build(market, ask, bid, last, timestamp, false)
    }

    /// Ticker for an exchange quoting the pair in the opposite direction:
    /// the given prices become the `r_*` fields and their reciprocals the primary ones.
    pub fn reversed(market: Market, ask: f64, bid: f64, last: f64, timestamp: Option<f64>) -> Self {
        Self::build(market, ask, bid, last, timestamp, true)
    }

    fn build(market: Market, ask: f64, bid: f64, last: f64, timestamp: Option<f64>, reversed: bool) -> Self {
        let timestamp = timestamp.unwrap_or_else(now_epoch_seconds);
        let (given, inverse) = ((ask, bid, last), (reciprocal(ask), reciprocal(bid), reciprocal(last)));
        let (primary, r) = if reversed { (inverse, given) } else { (given, inverse) };
        Self {
            market,
            ask: primary.0,
            bid: primary.1,
            last: primary.2,
            r_ask: r.0,
            r_bid: r.1,
            r_last: r.2,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Bids,
    Asks,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Bids => "bids",
            Side::Asks => "asks",
        }
    }
}

/// One resting order. `base_quantity` is `quantity * rate`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBookEntry {
    pub side: Side,
    pub quantity: f64,
    pub rate: f64,
    pub base_quantity: f64,
}

impl OrderBookEntry {
    pub fn new(side: Side, quantity: f64, rate: f64) -> Self {
        Self { side, quantity, rate, base_quantity: quantity * rate }
    }
}

/// Bid and ask lists in the order the exchange returned them.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBook {
    pub market: Market,
    pub bids: Vec<OrderBookEntry>,
    pub asks: Vec<OrderBookEntry>,
    /// Capture time in epoch seconds; `None` means "now".
    pub timestamp: Option<f64>,
    /// True when the upstream depth (or a `cut`) may have dropped entries.
    pub truncated: bool,
}

impl OrderBook {
    pub fn new(market: Market, bids: Vec<OrderBookEntry>, asks: Vec<OrderBookEntry>, timestamp: Option<f64>) -> Self {
        Self { market, bids, asks, timestamp, truncated: false }
    }

    pub fn side(&self, side: Side) -> &[OrderBookEntry] {
        match side {
            Side::Bids => &self.bids,
            Side::Asks => &self.asks,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    /// Copy keeping at most `n` entries per side.
    pub fn cut(&self, n: usize) -> OrderBook {
        let dropped = self.bids.len() > n || self.asks.len() > n;
        OrderBook {
            market: self.market.clone(),
            bids: self.bids.iter().take(n).cloned().collect(),
            asks: self.asks.iter().take(n).cloned().collect(),
            timestamp: self.timestamp,
            truncated: self.truncated || dropped,
        }
    }
}
