// src/handlers/error.rs
use std::fmt;
use warp::http::StatusCode;
use warp::reject::Reject;

use crate::error::SeriesError;

#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, message)
    }
}

impl From<SeriesError> for ApiError {
    fn from(err: SeriesError) -> Self {
        let status = match &err {
            SeriesError::Parse(_) | SeriesError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            SeriesError::NotFound(_) => StatusCode::NOT_FOUND,
            SeriesError::Upstream(_) => StatusCode::BAD_GATEWAY,
            SeriesError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError::new(status, err.to_string())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.status)
    }
}

impl std::error::Error for ApiError {}
impl Reject for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_errors_map_to_statuses() {
        assert_eq!(ApiError::from(SeriesError::invalid_argument("x")).status, StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(SeriesError::not_found("x")).status, StatusCode::NOT_FOUND);
        assert_eq!(ApiError::from(SeriesError::upstream("x")).status, StatusCode::BAD_GATEWAY);
    }
}
