use std::time::Duration;
use thiserror::Error;

/// Transport-level failures when talking to Scryfall
#[derive(Debug, Error)]
pub enum ScryfallError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// Failed to parse JSON response
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// Scryfall answered with an error object
    #[error("{code}: {details}")]
    Api {
        status: u16,
        code: String,
        details: String,
    },
    /// HTTP error status code without a usable error body
    #[error("HTTP error: {0}")]
    HttpStatus(reqwest::StatusCode),
    /// HTTP 429, the caller should wait `retry_after` and try again
    #[error("Rate limited by Scryfall, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },
}

impl ScryfallError {
    /// True for Scryfall's "no cards matched" answer to a search
    pub fn is_not_found(&self) -> bool {
        match self {
            ScryfallError::Api { code, .. } => code == "not_found",
            ScryfallError::HttpStatus(status) => *status == reqwest::StatusCode::NOT_FOUND,
            _ => false,
        }
    }
}
