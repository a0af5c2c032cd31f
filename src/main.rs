use log::{error, info};
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use warp::Filter;

use macro_series_dashboard::config::Config;
use macro_series_dashboard::routes;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize the logger
    env_logger::init();
    info!("Logger initialized. Starting the application...");

    let config = match Config::from_env() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    info!("Will bind to: {}", addr);

    // Set up CORS
    let cors = warp::cors()
        .allow_any_origin()
        .allow_header("content-type")
        .allow_methods(vec!["GET"]);

    let api = routes::routes(config).with(cors);
    info!("Routes configured successfully with CORS.");

    info!("Starting server on {}", addr);
    warp::serve(api).run(addr).await;
    ExitCode::SUCCESS
}
