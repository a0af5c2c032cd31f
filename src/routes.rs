// src/routes.rs
use log::info;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reject::Rejection;
use warp::{Filter, Reply};

use crate::config::Config;
use crate::handlers::equity::{get_correlation, get_sector_chart, CorrelationQuery};
use crate::handlers::error::ApiError;
use crate::handlers::investments::get_investment_chart;
use crate::handlers::series::{get_boe_rate, get_cpih, get_mortgage_rates, SeriesQuery};

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (code, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not Found".to_string())
    } else if let Some(api_error) = err.find::<ApiError>() {
        (api_error.status, api_error.message.clone())
    } else if let Some(invalid) = err.find::<warp::reject::InvalidQuery>() {
        (StatusCode::BAD_REQUEST, invalid.to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed".to_string())
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

pub fn routes(config: Arc<Config>) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let config_filter = warp::any().map(move || config.clone());

    let cpih_route = warp::path!("api" / "v1" / "series" / "cpih")
        .and(warp::get())
        .and(config_filter.clone())
        .and(warp::query::<SeriesQuery>())
        .and_then(get_cpih);

    let boe_rate_route = warp::path!("api" / "v1" / "series" / "boe_rate")
        .and(warp::get())
        .and(config_filter.clone())
        .and(warp::query::<SeriesQuery>())
        .and_then(get_boe_rate);

    let mortgage_route = warp::path!("api" / "v1" / "series" / "mortgage")
        .and(warp::get())
        .and(config_filter.clone())
        .and(warp::query::<SeriesQuery>())
        .and_then(get_mortgage_rates);

    let sectors_route = warp::path!("api" / "v1" / "charts" / "sectors")
        .and(warp::get())
        .and_then(get_sector_chart);

    let investments_route = warp::path!("api" / "v1" / "charts" / "investments" / String)
        .and(warp::get())
        .and(config_filter.clone())
        .and_then(get_investment_chart);

    let correlation_route = warp::path!("api" / "v1" / "stocks" / "correlation")
        .and(warp::get())
        .and(config_filter.clone())
        .and(warp::query::<CorrelationQuery>())
        .and_then(get_correlation);

    info!("All routes configured successfully.");

    cpih_route
        .or(boe_rate_route)
        .or(mortgage_route)
        .or(sectors_route)
        .or(investments_route)
        .or(correlation_route)
        .recover(handle_rejection)
}
