// Command line in, wall report text out.

use thiserror::Error;
use tracing::{info, instrument};

use crate::command::{CommandError, CommandInterpreter, WallCommand, HELP_TEXT};
use crate::engine::report;
use crate::engine::walls::{compute_walls, WallConfig, WallError};
use crate::market_data::error::MarketDataError;
use crate::market_data::executor::QueryExecutor;

#[derive(Debug, Error)]
pub enum CalculatorError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    MarketData(#[from] MarketDataError),
}

pub struct WallCalculator {
    executor: QueryExecutor,
    interpreter: CommandInterpreter,
    config: WallConfig,
}

impl WallCalculator {
    pub fn new(executor: QueryExecutor, interpreter: CommandInterpreter, config: WallConfig) -> Self {
        Self { executor, interpreter, config }
    }

    pub fn executor(&self) -> &QueryExecutor {
        &self.executor
    }

    /// Answer one `walls ...` command with the text to show the user.
    #[instrument(skip(self))]
    pub async fn walls(&self, line: &str) -> Result<String, CalculatorError> {
        let (book_query, ticker_query) = match self.interpreter.parse(line)? {
            WallCommand::Help => return Ok(format!("```\n{}\n```", HELP_TEXT)),
            WallCommand::Query { book, ticker } => (book, ticker),
        };

        let Some((book, ticker)) = self.executor.get_snapshot(&book_query, &ticker_query).await? else {
            return Ok(format!("{} is not listed on {}", book_query.market, book_query.exchange));
        };

        match compute_walls(&book, &ticker, &self.config) {
            Ok(model) => {
                info!(walls = model.walls.len(), "wall report ready");
                Ok(report::render(&model))
            }
            Err(WallError::NoData { market }) => {
                Ok(format!("no order book data for {} on {}", market, book_query.exchange))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::adapters::{Adapter, Bitfinex, Bittrex};
    use crate::market_data::exchange::Exchange;
    use crate::market_data::source::FixtureSource;
    use serde_json::json;

    fn envelope(result: serde_json::Value) -> serde_json::Value {
        json!({"success": true, "message": "", "result": result})
    }

    async fn calculator() -> WallCalculator {
        let markets = envelope(json!([
            {"MarketCurrency": "DOGE", "BaseCurrency": "BTC", "MarketName": "BTC-DOGE", "IsActive": true},
            {"MarketCurrency": "NEO", "BaseCurrency": "BTC", "MarketName": "BTC-NEO", "IsActive": true},
        ]));
        let ticker = envelope(json!({"Bid": 0.0000005, "Ask": 0.0000006, "Last": 0.00000055}));
        let book = envelope(json!({
            "buy": [{"Quantity": 1000.0, "Rate": 0.0000005}, {"Quantity": 10.0, "Rate": 0.0000004}],
            "sell": [{"Quantity": 500.0, "Rate": 0.0000006}],
        }));
        let source = FixtureSource::new()
            .with_markets(markets)
            .with_ticker("BTC-DOGE", ticker.clone())
            .with_book("BTC-DOGE", book)
            .with_ticker("BTC-NEO", ticker)
            .with_book("BTC-NEO", envelope(json!({"buy": [], "sell": []})));
        let adapter = Adapter::connect(Bittrex, source).await.unwrap();
        WallCalculator::new(
            QueryExecutor::new(vec![Box::new(adapter)]),
            CommandInterpreter::default(),
            WallConfig::default(),
        )
    }

    // Bitfinex BTCUSD book, 200 levels a side of 1.0 with one 500 bid deep in the book.
    async fn deep_bitfinex() -> WallCalculator {
        let level = |price: f64, amount: f64| {
            json!({"price": price.to_string(), "amount": amount.to_string(), "timestamp": "1.0"})
        };
        let bids: Vec<serde_json::Value> = (0..200)
            .map(|i| level(6500.0 - i as f64, if i == 120 { 500.0 } else { 1.0 }))
            .collect();
        let asks: Vec<serde_json::Value> = (0..200).map(|i| level(6501.0 + i as f64, 1.0)).collect();
        let source = FixtureSource::new()
            .with_markets(json!([{"pair": "BTCUSD"}]))
            .with_ticker(
                "BTCUSD",
                json!({"ask": "6501", "bid": "6500", "last_price": "6500.5", "timestamp": "2.0"}),
            )
            .with_book("BTCUSD", json!({"bids": bids, "asks": asks}));
        let adapter = Adapter::connect(Bitfinex, source).await.unwrap();
        WallCalculator::new(
            QueryExecutor::new(vec![Box::new(adapter)]),
            CommandInterpreter::default(),
            WallConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_requested_depth_reaches_the_report() {
        let text = deep_bitfinex().await.walls("walls btc 200 bitfinex").await.unwrap();
        assert!(text.contains("[BTCUSD] In 200 Bids"));
        assert!(text.contains("[BTCUSD] In 200 Asks"));
        assert!(text.contains("  $  6380.00  -        500.00 BTC "));
        assert!(text.contains("Total Resistance / Support : 200.00 BTC / 699.00 BTC"));
    }

    #[tokio::test]
    async fn test_help() {
        let text = calculator().await.walls("walls help").await.unwrap();
        assert!(text.starts_with("```"));
        assert!(text.contains("walls <coin|BASE-TRADED>"));
    }

    #[tokio::test]
    async fn test_report_for_listed_market() {
        let text = calculator().await.walls("walls doge").await.unwrap();
        assert!(text.contains("[Wall report from Bittrex]"));
        assert!(text.contains("BTC-DOGE"));
    }

    #[tokio::test]
    async fn test_unlisted_market() {
        let text = calculator().await.walls("walls xrp").await.unwrap();
        assert_eq!(text, "BTC-XRP is not listed on Bittrex");
    }

    #[tokio::test]
    async fn test_empty_book_is_reported() {
        let text = calculator().await.walls("walls neo").await.unwrap();
        assert!(text.starts_with("no order book data"));
    }

    #[tokio::test]
    async fn test_errors_surface() {
        let calculator = calculator().await;
        assert!(matches!(calculator.walls("walls").await, Err(CalculatorError::Command(CommandError::Empty))));
        assert!(matches!(
            calculator.walls("walls eth").await,
            Err(CalculatorError::MarketData(MarketDataError::ExchangeUnavailable(Exchange::Gdax)))
        ));
    }
}
