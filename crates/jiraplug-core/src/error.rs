//! Error types for core operations

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),

    #[error("The config cannot be loaded. Error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
