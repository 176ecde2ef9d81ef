// Text rendering of a WallModel, laid out for a monospace chat block.

use std::fmt;

use crate::engine::types::Side;
use crate::engine::walls::WallModel;

const STRIKE_LINE: &str = "======================================================";
const BAR: &str = "█";

fn bar(size: f64) -> String {
    BAR.repeat((size * 100.0).floor().max(0.0) as usize)
}

fn side_title(side: Side, count: usize) -> String {
    match side {
        Side::Asks => format!("In {} Asks", count),
        Side::Bids => format!("In {} Bids", count),
    }
}

/// Report view over a model; `render` is its `to_string`.
pub struct WallReport<'a>(pub &'a WallModel);

impl fmt::Display for WallReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let model = self.0;
        let market = &model.book.market;
        let symbol = market.base.symbol();

        writeln!(f, "```")?;
        writeln!(f, "[Wall report from {}]\n", market.exchange_name)?;
        writeln!(f, "[Last Price]\n{}", STRIKE_LINE)?;
        if model.is_usd {
            writeln!(f, "  {} {:.2}", symbol, model.ticker.last)?;
        } else {
            writeln!(f, "  {} {:.8}", symbol, model.ticker.last)?;
        }

        for side in [Side::Asks, Side::Bids] {
            let title = side_title(side, model.book.side(side).len());
            writeln!(f, "\n[{}] {}\n{}", model.ticker.market.market_name, title, STRIKE_LINE)?;

            for wall in model.walls.iter().filter(|w| w.entry.side == side) {
                let entry = &wall.entry;
                if model.is_usd {
                    writeln!(
                        f,
                        "  {} {:8.2}  -  {:12.2} {} {}",
                        symbol,
                        entry.rate,
                        entry.quantity,
                        market.traded.code(),
                        bar(wall.size)
                    )?;
                } else {
                    writeln!(
                        f,
                        "  {} {:8.8}  -  {:8.2} {} {}",
                        symbol,
                        entry.rate,
                        entry.base_quantity,
                        market.base.code(),
                        bar(wall.size)
                    )?;
                }
            }
            writeln!(f)?;
        }

        let (ask, bid, coin) = if model.is_usd {
            (model.ask_volume, model.bid_volume, market.traded.code())
        } else {
            (model.ask_volume_base, model.bid_volume_base, market.base.code())
        };
        let resistance = match model.resistance {
            Some(r) => format!("{:.2}%", r),
            None => "n/a".to_string(),
        };
        writeln!(
            f,
            "====> Summary : Total Resistance / Support : {:.2} {} / {:.2} {} === {} Resistance",
            ask, coin, bid, coin, resistance
        )?;
        write!(f, "```")
    }
}

pub fn render(model: &WallModel) -> String {
    WallReport(model).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::{Coin, Market, OrderBook, OrderBookEntry, Ticker};
    use crate::engine::walls::{compute_walls, WallConfig};

    fn model(base: &str, traded: &str, last: f64) -> WallModel {
        let market = Market::with_names(Coin::new(base), Coin::new(traded), "NATIVE", "Bittrex");
        let book = OrderBook::new(
            market.clone(),
            vec![OrderBookEntry::new(Side::Bids, 10.0, 0.5), OrderBookEntry::new(Side::Bids, 1.0, 0.4)],
            vec![OrderBookEntry::new(Side::Asks, 1.0, 0.6)],
            None,
        );
        let ticker = Ticker::new(market, 0.6, 0.5, last, Some(0.0));
        compute_walls(&book, &ticker, &WallConfig::default()).unwrap()
    }

    #[test]
    fn test_usd_report_uses_two_decimals() {
        let text = render(&model("USD", "BTC", 6500.123));
        assert!(text.starts_with("```\n[Wall report from Bittrex]"));
        assert!(text.contains("  $ 6500.12\n"));
        assert!(text.contains("[NATIVE] In 1 Asks"));
        assert!(text.contains("[NATIVE] In 2 Bids"));
        assert!(text.contains("  $     0.50  -         10.00 BTC "));
        assert!(text.contains("=== 9.09% Resistance"));
        assert!(text.ends_with("```"));
    }

    #[test]
    fn test_non_usd_report_uses_base_currency() {
        let text = render(&model("BTC", "DOGE", 0.00000042));
        assert!(text.contains("  ฿ 0.00000042\n"));
        assert!(text.contains("  ฿ 0.50000000  -      5.00 BTC "));
        assert!(text.contains("Total Resistance / Support : 0.00 BTC / 0.00 BTC"));
    }

    #[test]
    fn test_bar_length_follows_size() {
        let text = render(&model("USD", "BTC", 1.0));
        // the 10/12 wall gets 83 blocks
        assert!(text.contains(&format!("BTC {}\n", "█".repeat(83))));
    }

    #[test]
    fn test_undefined_resistance() {
        let mut m = model("USD", "BTC", 1.0);
        m.resistance = None;
        assert!(render(&m).contains("=== n/a Resistance"));
    }

    #[test]
    fn test_report_writes_through_any_formatter() {
        let m = model("BTC", "DOGE", 0.00000042);
        let padded = format!(">{}<", WallReport(&m));
        assert_eq!(padded, format!(">{}<", render(&m)));
        assert_eq!(render(&m).matches(STRIKE_LINE).count(), 3);
    }
}
