use crate::services::TradingError;
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Trading(#[from] TradingError),
}

pub type Result<T> = std::result::Result<T, AppError>;
