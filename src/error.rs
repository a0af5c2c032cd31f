// src/error.rs
use std::fmt;

/// Errors raised while loading, parsing and reshaping series.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesError {
    /// A date or number did not match the expected format.
    Parse(String),
    /// Unsupported cadence, malformed window or similar caller mistake.
    InvalidArgument(String),
    /// Missing file, column, table or payload key.
    NotFound(String),
    /// Local I/O failure other than a missing path.
    Io(String),
    /// Transport failure or unexpected response from a remote source.
    Upstream(String),
}

impl SeriesError {
    pub fn parse(message: impl Into<String>) -> Self {
        SeriesError::Parse(message.into())
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        SeriesError::InvalidArgument(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        SeriesError::NotFound(message.into())
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        SeriesError::Upstream(message.into())
    }
}

impl fmt::Display for SeriesError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SeriesError::Parse(msg) => write!(f, "parse error: {}", msg),
            SeriesError::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            SeriesError::NotFound(msg) => write!(f, "not found: {}", msg),
            SeriesError::Io(msg) => write!(f, "io error: {}", msg),
            SeriesError::Upstream(msg) => write!(f, "upstream error: {}", msg),
        }
    }
}

impl std::error::Error for SeriesError {}

impl From<std::io::Error> for SeriesError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            SeriesError::NotFound(err.to_string())
        } else {
            SeriesError::Io(err.to_string())
        }
    }
}

impl From<csv::Error> for SeriesError {
    fn from(err: csv::Error) -> Self {
        match err.kind() {
            csv::ErrorKind::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
                SeriesError::NotFound(err.to_string())
            }
            csv::ErrorKind::Io(_) => SeriesError::Io(err.to_string()),
            _ => SeriesError::Parse(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for SeriesError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            SeriesError::Io(err.to_string())
        } else {
            SeriesError::Parse(err.to_string())
        }
    }
}

impl From<reqwest::Error> for SeriesError {
    fn from(err: reqwest::Error) -> Self {
        SeriesError::Upstream(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SeriesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_maps_to_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        assert!(matches!(SeriesError::from(io), SeriesError::NotFound(_)));
    }

    #[test]
    fn display_includes_kind() {
        let err = SeriesError::invalid_argument("cadence 'biweekly'");
        assert_eq!(err.to_string(), "invalid argument: cadence 'biweekly'");
    }
}
