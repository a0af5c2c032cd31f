// src/bin/test_mortgage.rs
// Run with: cargo run --bin test_mortgage
use dotenv::dotenv;
use log::info;
use reqwest::Client;

use macro_series_dashboard::config::Config;
use macro_series_dashboard::models::Cadence;
use macro_series_dashboard::services::boe::fetch_mortgage_rates;
use macro_series_dashboard::services::charts::series_bar_chart;
use macro_series_dashboard::services::resample::resample;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env()?;
    info!("Testing IADB mortgage rate fetch...");

    let client = Client::new();
    let table = fetch_mortgage_rates(&client, &config.mortgage_window, &config.mortgage_series).await?;
    let yearly = resample(&table, Cadence::Yearly, None)?;

    for record in yearly.records() {
        println!("{} {:?}", record.date, record.values);
    }
    println!("{}", serde_json::to_string_pretty(&series_bar_chart("Mortgage rates", &yearly))?);
    Ok(())
}
