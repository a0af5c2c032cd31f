// src/bin/test_stocks.rs
// Run with: cargo run --bin test_stocks -- IBM MSFT AAPL
use dotenv::dotenv;
use log::info;
use reqwest::Client;
use std::env;

use macro_series_dashboard::config::Config;
use macro_series_dashboard::services::stocks::{correlation_matrix, fetch_stock_series, StockQuery};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env()?;
    let mut symbols: Vec<String> = env::args().skip(1).collect();
    if symbols.is_empty() {
        symbols = vec!["IBM".to_string(), "MSFT".to_string()];
    }

    let query = StockQuery::daily(symbols, config.alpha_vantage_api_key.clone());
    let series = fetch_stock_series(&Client::new(), &query).await?;
    for s in &series {
        info!("{}: {} bars, last refreshed {:?}", s.symbol, s.bars.len(), s.metadata.get("3. Last Refreshed"));
    }

    let matrix = correlation_matrix(&series);
    for (symbol, row) in matrix.symbols.iter().zip(&matrix.values) {
        let cells: Vec<String> = row.iter().map(|v| format!("{:>7.3}", v)).collect();
        println!("{:<6} {}", symbol, cells.join(" "));
    }
    Ok(())
}
