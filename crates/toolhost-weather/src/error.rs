//! Error types for weather operations

use thiserror::Error;

/// Weather lookup errors
#[derive(Debug, Error)]
pub enum WeatherError {
    /// City is not in the supported table
    #[error("Unsupported city: {0}")]
    UnknownCity(String),

    /// Open-Meteo answered with an error status
    #[error("Open-Meteo error (HTTP {status}): {reason}")]
    Api { status: u16, reason: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Payload was missing fields or had inconsistent lengths
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// Result type alias for weather operations
pub type Result<T> = std::result::Result<T, WeatherError>;

impl From<WeatherError> for toolhost_core::Error {
    fn from(err: WeatherError) -> Self {
        toolhost_core::Error::ProcessingFailed(err.to_string())
    }
}
