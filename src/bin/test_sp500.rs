// src/bin/test_sp500.rs
use log::{error, info};
use reqwest::Client;

use macro_series_dashboard::services::sp500::{fetch_sp500_constituents, sector_counts};

#[tokio::main]
async fn main() -> Result<(), macro_series_dashboard::BoxError> {
    env_logger::init();

    info!("Testing S&P 500 constituents scrape...");
    let table = match fetch_sp500_constituents(&Client::new()).await {
        Ok(table) => table,
        Err(e) => {
            error!("ERROR: Failed to scrape constituents: {}", e);
            return Err(e.into());
        }
    };

    info!("SUCCESS: {} constituents, headers {:?}", table.rows.len(), table.headers);
    for (sector, count) in sector_counts(&table)? {
        println!("{:<28} {}", sector, count);
    }
    Ok(())
}
