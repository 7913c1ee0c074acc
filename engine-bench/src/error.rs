use std::fmt;
use std::io;

#[derive(Debug)]
pub enum Error {
    Sampler(resource_sampler::Error),
    DataFusion(String),
    DuckDb(String),
    Polars(String),
    Arrow(String),
    Http(String),
    Io(io::Error),
    Json(String),
    InvalidArgument(String),
    Internal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Sampler(e) => write!(f, "Sampler error: {}", e),
            Error::DataFusion(msg) => write!(f, "DataFusion error: {}", msg),
            Error::DuckDb(msg) => write!(f, "DuckDB error: {}", msg),
            Error::Polars(msg) => write!(f, "Polars error: {}", msg),
            Error::Arrow(msg) => write!(f, "Arrow error: {}", msg),
            Error::Http(msg) => write!(f, "HTTP error: {}", msg),
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Json(msg) => write!(f, "JSON error: {}", msg),
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<resource_sampler::Error> for Error {
    fn from(err: resource_sampler::Error) -> Self {
        Error::Sampler(err)
    }
}

impl From<datafusion::error::DataFusionError> for Error {
    fn from(err: datafusion::error::DataFusionError) -> Self {
        Error::DataFusion(err.to_string())
    }
}

impl From<datafusion::arrow::error::ArrowError> for Error {
    fn from(err: datafusion::arrow::error::ArrowError) -> Self {
        Error::Arrow(err.to_string())
    }
}

impl From<datafusion::parquet::errors::ParquetError> for Error {
    fn from(err: datafusion::parquet::errors::ParquetError) -> Self {
        Error::Arrow(err.to_string())
    }
}

impl From<duckdb::Error> for Error {
    fn from(err: duckdb::Error) -> Self {
        Error::DuckDb(err.to_string())
    }
}

impl From<polars::error::PolarsError> for Error {
    fn from(err: polars::error::PolarsError) -> Self {
        Error::Polars(err.to_string())
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::Internal(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err.to_string())
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Internal(format!("background task failed: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
