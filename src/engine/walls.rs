//! Wall detection: finds the resting orders that hold an outsized share of the book.

use std::cmp::Reverse;

use itertools::Itertools;
use ordered_float::OrderedFloat;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::engine::types::{OrderBook, OrderBookEntry, Ticker};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WallConfig {
    /// Entries per side taken from the top of the book.
    pub top_book_limit: usize,
    /// Smallest share of total volume that still counts as a wall.
    pub wall_min_volume: f64,
    /// Once the reported walls cover more than this share, stop.
    pub wall_max_total_volume: f64,
    /// Largest entries considered as candidates.
    pub wall_max_count: usize,
}

impl Default for WallConfig {
    fn default() -> Self {
        // the query depth (at most 500) decides how much of the book is analysed
        Self { top_book_limit: 500, wall_min_volume: 0.04, wall_max_total_volume: 0.75, wall_max_count: 10 }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum WallError {
    #[error("no order book data for {market}")]
    NoData { market: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct WallEntry {
    pub entry: OrderBookEntry,
    /// Fraction of the total book volume.
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WallModel {
    pub book: OrderBook,
    pub ticker: Ticker,
    pub is_usd: bool,
    pub bid_volume: f64,
    pub ask_volume: f64,
    pub total_volume: f64,
    pub bid_volume_base: f64,
    pub ask_volume_base: f64,
    /// `100 * ask_volume / bid_volume`; `None` when there is no bid volume.
    pub resistance: Option<f64>,
    /// Selected walls, highest rate first.
    pub walls: Vec<WallEntry>,
}

/// Percentage of ask volume relative to bid volume.
pub fn resistance(ask_volume: f64, bid_volume: f64) -> Option<f64> {
    if bid_volume > 0.0 { Some(100.0 * ask_volume / bid_volume) } else { None }
}

/// Pick walls out of the largest entries, in descending quantity order.
///
/// Stops at the first candidate below `wall_min_volume`, and right after the
/// cumulative size first exceeds `wall_max_total_volume`.
pub fn select_walls<'a, I>(entries: I, total_volume: f64, config: &WallConfig) -> Vec<WallEntry>
where
    I: IntoIterator<Item = &'a OrderBookEntry>,
{
    let candidates = entries
        .into_iter()
        .sorted_by_key(|e| Reverse(OrderedFloat(e.quantity)))
        .take(config.wall_max_count);

    let mut walls = Vec::new();
    let mut covered = 0.0;
    for entry in candidates {
        let size = entry.quantity / total_volume;
        if size < config.wall_min_volume {
            break;
        }
        covered += size;
        walls.push(WallEntry { entry: entry.clone(), size });
        if covered > config.wall_max_total_volume {
            break;
        }
    }

    walls.sort_by_key(|w| Reverse(OrderedFloat(w.entry.rate)));
    walls
}

#[instrument(skip_all, fields(market = %book.market))]
pub fn compute_walls(book: &OrderBook, ticker: &Ticker, config: &WallConfig) -> Result<WallModel, WallError> {
    let book = book.cut(config.top_book_limit);
    let no_data = || WallError::NoData { market: book.market.to_string() };

    if book.is_empty() {
        debug!("empty book, nothing to analyse");
        return Err(no_data());
    }

    let bid_volume: f64 = book.bids.iter().map(|e| e.quantity).sum();
    let ask_volume: f64 = book.asks.iter().map(|e| e.quantity).sum();
    let total_volume = bid_volume + ask_volume;
    if total_volume <= 0.0 {
        debug!("book has entries but no volume");
        return Err(no_data());
    }

    let walls = select_walls(book.bids.iter().chain(book.asks.iter()), total_volume, config);
    debug!(bid_volume, ask_volume, walls = walls.len(), "walls computed");

    Ok(WallModel {
        is_usd: book.market.is_usd(),
        bid_volume,
        ask_volume,
        total_volume,
        bid_volume_base: bid_volume * ticker.last,
        ask_volume_base: ask_volume * ticker.last,
        resistance: resistance(ask_volume, bid_volume),
        walls,
        ticker: ticker.clone(),
        book,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::{Coin, Market, Side};

    fn market() -> Market {
        Market::with_names(Coin::new("USD"), Coin::new("BTC"), "BTC-USD", "Gdax")
    }

    fn book(bids: &[(f64, f64)], asks: &[(f64, f64)]) -> OrderBook {
        let side = |s: Side, levels: &[(f64, f64)]| {
            levels.iter().map(|&(q, r)| OrderBookEntry::new(s, q, r)).collect::<Vec<_>>()
        };
        OrderBook::new(market(), side(Side::Bids, bids), side(Side::Asks, asks), None)
    }

    fn ticker(last: f64) -> Ticker {
        Ticker::new(market(), last, last, last, Some(0.0))
    }

    #[test]
    fn test_dominant_entry_crosses_the_cap() {
        let book = book(&[(10.0, 100.0), (1.0, 99.0)], &[(1.0, 101.0)]);
        let model = compute_walls(&book, &ticker(100.0), &WallConfig::default()).unwrap();

        assert_eq!(model.total_volume, 12.0);
        assert_eq!(model.walls.len(), 1);
        assert_eq!(model.walls[0].entry.quantity, 10.0);
        assert!((model.walls[0].size - 10.0 / 12.0).abs() < 1e-12);
        assert!(model.is_usd);
    }

    #[test]
    fn test_volumes_and_resistance() {
        let book = book(&[(4.0, 10.0), (4.0, 9.0)], &[(2.0, 11.0)]);
        let model = compute_walls(&book, &ticker(10.0), &WallConfig::default()).unwrap();

        assert_eq!(model.bid_volume, 8.0);
        assert_eq!(model.ask_volume, 2.0);
        assert_eq!(model.bid_volume_base, 80.0);
        assert_eq!(model.ask_volume_base, 20.0);
        assert_eq!(model.resistance, Some(100.0 * 2.0 / 8.0));
    }

    #[test]
    fn test_walls_sorted_by_rate_across_sides() {
        let book = book(&[(3.0, 10.0), (3.0, 8.0)], &[(3.0, 12.0), (3.0, 11.0)]);
        let config = WallConfig { wall_max_total_volume: 1.0, ..WallConfig::default() };
        let model = compute_walls(&book, &ticker(10.0), &config).unwrap();

        let rates: Vec<f64> = model.walls.iter().map(|w| w.entry.rate).collect();
        assert_eq!(rates, vec![12.0, 11.0, 10.0, 8.0]);
    }

    #[test]
    fn test_stops_at_first_small_entry() {
        let entries = vec![
            OrderBookEntry::new(Side::Bids, 5.0, 1.0),
            OrderBookEntry::new(Side::Bids, 50.0, 2.0),
            OrderBookEntry::new(Side::Asks, 15.0, 3.0),
            OrderBookEntry::new(Side::Asks, 30.0, 4.0),
        ];
        let config = WallConfig { wall_min_volume: 0.1, wall_max_total_volume: 1.0, ..WallConfig::default() };
        let walls = select_walls(&entries, 100.0, &config);

        let quantities: Vec<f64> = walls.iter().map(|w| w.entry.quantity).collect();
        // the 5.0 entry stops the walk; survivors come back ordered by rate
        assert_eq!(quantities, vec![30.0, 15.0, 50.0]);
        assert!(walls.iter().all(|w| w.size >= 0.1));
    }

    #[test]
    fn test_candidate_count_is_capped() {
        let bids: Vec<(f64, f64)> = (0..20).map(|i| (1.0, 100.0 - i as f64)).collect();
        let book = book(&bids, &[]);
        let config = WallConfig { wall_max_count: 3, wall_min_volume: 0.01, ..WallConfig::default() };
        let model = compute_walls(&book, &ticker(100.0), &config).unwrap();
        assert_eq!(model.walls.len(), 3);
    }

    #[test]
    fn test_empty_book_is_no_data() {
        let result = compute_walls(&book(&[], &[]), &ticker(1.0), &WallConfig::default());
        assert!(matches!(result, Err(WallError::NoData { .. })));
    }

    #[test]
    fn test_zero_volume_is_no_data() {
        let result = compute_walls(&book(&[(0.0, 1.0)], &[]), &ticker(1.0), &WallConfig::default());
        assert!(matches!(result, Err(WallError::NoData { .. })));
    }

    #[test]
    fn test_single_sided_books() {
        let only_bids = compute_walls(&book(&[(1.0, 1.0)], &[]), &ticker(1.0), &WallConfig::default()).unwrap();
        assert_eq!(only_bids.resistance, Some(0.0));

        let only_asks = compute_walls(&book(&[], &[(1.0, 1.0)]), &ticker(1.0), &WallConfig::default()).unwrap();
        assert_eq!(only_asks.resistance, None);
    }

    #[test]
    fn test_top_book_limit_applies_per_side() {
        let book = book(&[(1.0, 10.0), (1.0, 9.0), (100.0, 8.0)], &[(1.0, 11.0)]);
        let config = WallConfig { top_book_limit: 2, ..WallConfig::default() };
        let model = compute_walls(&book, &ticker(10.0), &config).unwrap();
        assert_eq!(model.bid_volume, 2.0);
        assert_eq!(model.book.bids.len(), 2);
    }
}
