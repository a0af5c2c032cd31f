// src/handlers/series.rs
use chrono::NaiveDate;
use log::{error, info};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use crate::config::Config;
use crate::error::SeriesError;
use crate::models::{Cadence, TimeSeriesTable, Window};
use crate::services::boe::fetch_mortgage_rates;
use crate::services::loader::{boe_rate_series, cpih_series};

#[derive(Debug, Default, Deserialize)]
pub struct SeriesQuery {
    pub cadence: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl SeriesQuery {
    fn cadence(&self) -> Result<Cadence, SeriesError> {
        match &self.cadence {
            Some(raw) => raw.parse(),
            None => Ok(Cadence::None),
        }
    }

    fn window(&self) -> Result<Option<Window>, SeriesError> {
        Window::from_bounds(self.start, self.end)
    }
}

fn reject(context: &str, err: SeriesError) -> Rejection {
    error!("{} failed: {}", context, err);
    warp::reject::custom(ApiError::from(err))
}

fn records_reply(table: &TimeSeriesTable) -> Json {
    warp::reply::json(&table.records())
}

pub async fn get_cpih(config: Arc<Config>, query: SeriesQuery) -> Result<Json, Rejection> {
    info!("Handling request for CPIH series: {:?}", query);
    let cadence = query.cadence().map_err(|e| reject("CPIH", e))?;
    let window = query.window().map_err(|e| reject("CPIH", e))?;

    let table = cpih_series(&config.cpih_csv, cadence, window.as_ref())
        .map_err(|e| reject("CPIH", e))?;
    Ok(records_reply(&table))
}

pub async fn get_boe_rate(config: Arc<Config>, query: SeriesQuery) -> Result<Json, Rejection> {
    info!("Handling request for BoE bank rate series: {:?}", query);
    let cadence = query.cadence().map_err(|e| reject("BoE rate", e))?;
    let window = query.window().map_err(|e| reject("BoE rate", e))?;

    let table = boe_rate_series(&config.boe_rates_csv, cadence, window.as_ref())
        .map_err(|e| reject("BoE rate", e))?;
    Ok(records_reply(&table))
}

pub async fn get_mortgage_rates(config: Arc<Config>, query: SeriesQuery) -> Result<Json, Rejection> {
    info!("Handling request for mortgage rates: {:?}", query);
    let window = query
        .window()
        .map_err(|e| reject("Mortgage rates", e))?
        .unwrap_or(config.mortgage_window);

    let client = Client::new();
    let table = fetch_mortgage_rates(&client, &window, &config.mortgage_series)
        .await
        .map_err(|e| reject("Mortgage rates", e))?;
    Ok(records_reply(&table))
}
