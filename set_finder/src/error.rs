use mtg_common::ScryfallError;
use std::fmt;

/// Unified error type for lookups, storage and I/O
#[derive(Debug)]
pub enum AppError {
    /// Scryfall request failed (network, parse, error body, rate limit)
    Scryfall(ScryfallError),
    /// File I/O error
    Io(std::io::Error),
    /// Local database operation failed
    Database(rusqlite::Error),
    /// CSV export failed
    Csv(csv::Error),
    /// JSON (de)serialization of stored data failed
    Json(serde_json::Error),
    /// Operation needs a signed-in user
    NotSignedIn,
    /// Row does not exist or belongs to another user
    NotFound { kind: &'static str, id: String },
    /// User input rejected before anything was written
    Validation(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Scryfall(e) => write!(f, "Scryfall error: {}", e),
            AppError::Io(e) => write!(f, "I/O error: {}", e),
            AppError::Database(e) => write!(f, "Database error: {}", e),
            AppError::Csv(e) => write!(f, "CSV error: {}", e),
            AppError::Json(e) => write!(f, "JSON error: {}", e),
            AppError::NotSignedIn => write!(f, "Please sign in first"),
            AppError::NotFound { kind, id } => write!(f, "No {} with id {}", kind, id),
            AppError::Validation(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Scryfall(e) => Some(e),
            AppError::Io(e) => Some(e),
            AppError::Database(e) => Some(e),
            AppError::Csv(e) => Some(e),
            AppError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ScryfallError> for AppError {
    fn from(err: ScryfallError) -> Self {
        AppError::Scryfall(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err)
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Database(err)
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Csv(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Json(err)
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
