use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClaimsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("serde json error: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("dataset not found: {0:?}")]
    DatasetMissing(PathBuf),
    #[error("unknown claim status: {0}")]
    UnknownStatus(String),
    #[error("invalid query plan: {0}")]
    InvalidPlan(String),
    #[error("other: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ClaimsError>;
