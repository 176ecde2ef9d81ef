// Turns a `walls ...` chat-style command into executor queries.

use thiserror::Error;

use crate::engine::types::{Coin, Market};
use crate::market_data::exchange::Exchange;
use crate::market_data::executor::{OrderBookQuery, TickerQuery};

pub const MIN_DEPTH: usize = 10;
pub const MAX_DEPTH: usize = 500;

pub const HELP_TEXT: &str = "\
walls <coin|BASE-TRADED> [depth] [exchange]

  coin       BTC, ETH and LTC are quoted in USD, anything else in BTC
  BASE-TRADED explicit market, e.g. BTC-DOGE or USD-ETH
  depth      order book depth, 10 to 500 (default 50)
  exchange   GDAX, BITFINEX or BITTREX (default depends on the market)

examples: walls btc | walls doge 100 | walls usd-eth 60 bitfinex";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("no market given, try `walls help`")]
    Empty,

    #[error("malformed market {0:?}, expected BASE-TRADED")]
    BadMarket(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum WallCommand {
    Help,
    Query { book: OrderBookQuery, ticker: TickerQuery },
}

#[derive(Debug, Clone)]
pub struct CommandInterpreter {
    default_depth: usize,
}

impl Default for CommandInterpreter {
    fn default() -> Self {
        Self::new(50)
    }
}

impl CommandInterpreter {
    pub fn new(default_depth: usize) -> Self {
        Self { default_depth: default_depth.clamp(MIN_DEPTH, MAX_DEPTH) }
    }

    /// Parse a command line. A leading `walls` / `!walls` is optional.
    pub fn parse(&self, line: &str) -> Result<WallCommand, CommandError> {
        let tokens: Vec<String> = line.split_whitespace().map(str::to_uppercase).collect();
        let params = match tokens.first().map(String::as_str) {
            Some("WALLS" | "!WALLS") => &tokens[1..],
            _ => &tokens[..],
        };
        let Some((first, rest)) = params.split_first() else {
            return Err(CommandError::Empty);
        };
        if first == "HELP" {
            return Ok(WallCommand::Help);
        }

        let market = parse_market(first)?;
        let depth = self.depth(rest);
        let exchange = rest
            .iter()
            .find_map(|p| p.parse::<Exchange>().ok())
            .unwrap_or_else(|| default_exchange(&market));

        Ok(WallCommand::Query {
            book: OrderBookQuery { exchange, market: market.clone(), depth },
            ticker: TickerQuery { exchange, market },
        })
    }

    // First integer parameter wins.
    fn depth(&self, params: &[String]) -> usize {
        params
            .iter()
            .find_map(|p| p.parse::<i64>().ok())
            .map(|d| d.clamp(MIN_DEPTH as i64, MAX_DEPTH as i64) as usize)
            .unwrap_or(self.default_depth)
    }
}

fn parse_market(token: &str) -> Result<Market, CommandError> {
    if let Some((base, traded)) = token.split_once('-') {
        if base.is_empty() || traded.is_empty() || traded.contains('-') {
            return Err(CommandError::BadMarket(token.to_string()));
        }
        return Ok(Market::new(Coin::new(base), Coin::new(traded)));
    }
    let base = match token {
        "BTC" | "ETH" | "LTC" => "USD",
        _ => "BTC",
    };
    Ok(Market::new(Coin::new(base), Coin::new(token)))
}

/// Exchange used when the command names none.
pub fn default_exchange(market: &Market) -> Exchange {
    let usd = Coin::new("USD");
    if market == &Market::new(usd.clone(), Coin::new("BTC")) {
        Exchange::Bitfinex
    } else if market == &Market::new(usd.clone(), Coin::new("ETH")) || market == &Market::new(usd, Coin::new("LTC")) {
        Exchange::Gdax
    } else {
        Exchange::Bittrex
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(line: &str) -> (OrderBookQuery, TickerQuery) {
        match CommandInterpreter::default().parse(line).unwrap() {
            WallCommand::Query { book, ticker } => (book, ticker),
            WallCommand::Help => panic!("unexpected help for {line:?}"),
        }
    }

    fn market(base: &str, traded: &str) -> Market {
        Market::new(Coin::new(base), Coin::new(traded))
    }

    #[test]
    fn test_help() {
        let interpreter = CommandInterpreter::default();
        assert_eq!(interpreter.parse("walls help"), Ok(WallCommand::Help));
        assert_eq!(interpreter.parse("HELP"), Ok(WallCommand::Help));
    }

    #[test]
    fn test_empty_command() {
        let interpreter = CommandInterpreter::default();
        assert_eq!(interpreter.parse(""), Err(CommandError::Empty));
        assert_eq!(interpreter.parse("!walls   "), Err(CommandError::Empty));
    }

    #[test]
    fn test_bare_coin_markets() {
        let (book, _) = query("walls btC");
        assert_eq!(book.market, market("USD", "BTC"));
        assert_eq!(book.exchange, Exchange::Bitfinex);
        assert_eq!(book.depth, 50);

        let (book, _) = query("eth");
        assert_eq!(book.market, market("USD", "ETH"));
        assert_eq!(book.exchange, Exchange::Gdax);

        let (book, ticker) = query("doge");
        assert_eq!(book.market, market("BTC", "DOGE"));
        assert_eq!(book.exchange, Exchange::Bittrex);
        assert_eq!(ticker.market, book.market);
    }

    #[test]
    fn test_explicit_market_either_direction() {
        let (book, _) = query("btc-usd");
        assert_eq!(book.market, market("USD", "BTC"));
        assert_eq!(book.exchange, Exchange::Bitfinex);
        assert_eq!(book.market.base.code(), "BTC");

        let (book, _) = query("usdt-ltc");
        assert_eq!(book.exchange, Exchange::Gdax);
    }

    #[test]
    fn test_depth_is_clamped() {
        assert_eq!(query("doge 125").0.depth, 125);
        assert_eq!(query("btc 5").0.depth, MIN_DEPTH);
        assert_eq!(query("btc 9000").0.depth, MAX_DEPTH);
        assert_eq!(query("btc -3").0.depth, MIN_DEPTH);
        assert_eq!(query("btc 66 77").0.depth, 66);
    }

    #[test]
    fn test_exchange_override() {
        let (book, ticker) = query("ltc bitfinex 60");
        assert_eq!(book.exchange, Exchange::Bitfinex);
        assert_eq!(ticker.exchange, Exchange::Bitfinex);
        assert_eq!(book.depth, 60);
        assert_eq!(query("doge gdax").0.exchange, Exchange::Gdax);
    }

    #[test]
    fn test_malformed_market() {
        let interpreter = CommandInterpreter::default();
        assert!(matches!(interpreter.parse("walls btc-"), Err(CommandError::BadMarket(_))));
        assert!(matches!(interpreter.parse("a-b-c"), Err(CommandError::BadMarket(_))));
    }
}
