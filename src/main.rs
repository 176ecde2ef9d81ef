use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use tracing::error;

use walls_rs::calculator::WallCalculator;
use walls_rs::command::{CommandInterpreter, HELP_TEXT};
use walls_rs::config::AppConfig;
use walls_rs::market_data::executor::QueryExecutor;
use walls_rs::telemetry;

/// Order book wall reports for GDAX, Bitfinex and Bittrex.
#[derive(Debug, Parser)]
#[command(name = "walls", version)]
struct Cli {
    /// TOML config file (defaults to ./walls.toml when present)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// One-shot query, e.g. `walls btc 100 gdax`. Interactive prompt when omitted.
    query: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok(); // load .env

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    telemetry::init_tracing(&config.log_filter);
    telemetry::init_metrics()?;

    let executor = QueryExecutor::connect(&config.exchanges).await;
    if executor.exchanges().is_empty() {
        bail!("no exchange could be reached");
    }
    let live: Vec<&str> = executor.exchanges().iter().map(|e| e.display_name()).collect();
    let calculator = WallCalculator::new(executor, CommandInterpreter::new(config.default_depth), config.walls);

    if !cli.query.is_empty() {
        println!("{}", calculator.walls(&cli.query.join(" ")).await?);
        return Ok(());
    }

    println!("Connected to {}", live.join(", "));
    loop {
        print!("\nWALLS> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let command = input.trim();

        match command.to_lowercase().as_str() {
            "" => continue,
            "help" | "h" => {
                println!("{}", HELP_TEXT);
                println!("\n  quit, q        - Exit");
            }
            "quit" | "q" | "exit" => {
                println!("Goodbye!");
                break;
            }
            _ => match calculator.walls(command).await {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    error!(error = %e, "query failed");
                    println!("❌ {}", e);
                }
            },
        }
    }

    Ok(())
}
