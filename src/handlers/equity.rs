// src/handlers/equity.rs
use log::{error, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use crate::config::Config;
use crate::services::charts::ChartSpec;
use crate::services::sp500::{fetch_sp500_constituents, sector_pie};
use crate::services::stocks::{
    correlation_heatmap, correlation_matrix, fetch_stock_series, CorrelationMatrix, StockQuery,
};

#[derive(Debug, Deserialize)]
pub struct CorrelationQuery {
    pub symbols: String,
}

#[derive(Serialize)]
struct CorrelationResponse {
    matrix: CorrelationMatrix,
    chart: ChartSpec,
}

pub async fn get_sector_chart() -> Result<Json, Rejection> {
    info!("Handling request for S&P 500 sector distribution");
    let client = Client::new();
    let chart = fetch_sp500_constituents(&client)
        .await
        .and_then(|table| sector_pie(&table))
        .map_err(|e| {
            error!("Failed to build sector chart: {}", e);
            warp::reject::custom(ApiError::from(e))
        })?;
    Ok(warp::reply::json(&chart))
}

pub async fn get_correlation(config: Arc<Config>, query: CorrelationQuery) -> Result<Json, Rejection> {
    let symbols: Vec<String> = query
        .symbols
        .split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect();
    info!("Handling request for correlation of {:?}", symbols);
    if symbols.len() < 2 {
        return Err(warp::reject::custom(ApiError::bad_request(
            "at least two symbols are required",
        )));
    }

    let client = Client::new();
    let stock_query = StockQuery::daily(symbols, config.alpha_vantage_api_key.clone());
    let series = fetch_stock_series(&client, &stock_query).await.map_err(|e| {
        error!("Failed to fetch stock series: {}", e);
        warp::reject::custom(ApiError::from(e))
    })?;

    let matrix = correlation_matrix(&series);
    let chart = correlation_heatmap(&matrix);
    Ok(warp::reply::json(&CorrelationResponse { matrix, chart }))
}
