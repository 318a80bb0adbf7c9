//! Error types for gamma exposure analysis

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GexError {
    #[error("Data error: {0}")]
    Data(String),

    /// The quote provider could not supply a usable snapshot.
    #[error("No data available: {0}")]
    NoData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type GexResult<T> = Result<T, GexError>;

impl GexError {
    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }

    pub fn no_data(msg: impl Into<String>) -> Self {
        Self::NoData(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True when the failure means "nothing to compute", as opposed to a bug or bad input.
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData(_))
    }
}
