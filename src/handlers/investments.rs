// src/handlers/investments.rs
use log::{error, info};
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use crate::config::Config;
use crate::services::investments::{investment_chart, load_investments};

pub async fn get_investment_chart(file: String, config: Arc<Config>) -> Result<Json, Rejection> {
    info!("Handling request for investment chart from {}", file);
    let lots = load_investments(&config.data_dir, &file).map_err(|e| {
        error!("Failed to load investments: {}", e);
        warp::reject::custom(ApiError::from(e))
    })?;
    Ok(warp::reply::json(&investment_chart(&lots)))
}
