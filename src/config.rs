// src/config.rs
use chrono::NaiveDate;
use log::{info, warn};
use std::env;
use std::path::PathBuf;

use crate::error::{Result, SeriesError};
use crate::models::Window;
use crate::services::boe::DEFAULT_MORTGAGE_SERIES;

/// Runtime settings, read once at startup and passed to the call sites.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub alpha_vantage_api_key: String,
    pub data_dir: PathBuf,
    pub cpih_csv: PathBuf,
    pub boe_rates_csv: PathBuf,
    pub mortgage_window: Window,
    pub mortgage_series: Vec<String>,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| {
        warn!("${} not set, defaulting to {}", name, default);
        default.to_string()
    })
}

fn date_var(name: &str, default: &str) -> Result<NaiveDate> {
    let raw = var_or(name, default);
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|e| SeriesError::invalid_argument(format!("{} '{}': {}", name, raw, e)))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let port_str = var_or("PORT", "3030");
        let port = port_str
            .parse::<u16>()
            .map_err(|e| SeriesError::invalid_argument(format!("PORT '{}': {}", port_str, e)))?;

        let data_dir = PathBuf::from(var_or("DATA_DIR", "data"));
        let cpih_csv = PathBuf::from(var_or("CPIH_CSV", "cpih.csv"));
        let boe_rates_csv = PathBuf::from(var_or("BOE_RATES_CSV", "BoE_interest_rates.csv"));

        let mortgage_window = Window::new(
            date_var("MORTGAGE_START", "2000-01-01")?,
            date_var("MORTGAGE_END", "2018-10-01")?,
        )?;
        let mortgage_series = var_or("MORTGAGE_SERIES", &DEFAULT_MORTGAGE_SERIES.join(","))
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let config = Config {
            port,
            alpha_vantage_api_key: var_or("ALPHA_VANTAGE_API_KEY", "yourkey"),
            data_dir,
            cpih_csv,
            boe_rates_csv,
            mortgage_window,
            mortgage_series,
        };
        info!(
            "Config loaded: port {}, data dir {}, mortgage series {:?}",
            config.port,
            config.data_dir.display(),
            config.mortgage_series
        );
        Ok(config)
    }
}
