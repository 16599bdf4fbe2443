//! Error types for the currency converter.

/// Repository-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Entity not found")]
    NotFound,
}

/// Cache backend failures.
///
/// These never reach a caller of the conversion pipeline: the rate cache
/// downgrades them to a miss or a failed write.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(String),
}

/// Outcome kinds of a conversion request.
///
/// Carries the offending code and rate as fields so callers can branch on
/// the kind instead of parsing a message.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("Currency code {code} is not valid")]
    InvalidCurrency { code: String, rate: Option<f64> },

    #[error("Currency {code} does not exist")]
    CodeNotFound { code: String },

    #[error("Exchange rates provider unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Repository(#[from] RepoError),
}

impl ConversionError {
    pub fn invalid(code: impl Into<String>) -> Self {
        ConversionError::InvalidCurrency {
            code: code.into(),
            rate: None,
        }
    }

    pub fn invalid_rate(code: impl Into<String>, rate: f64) -> Self {
        ConversionError::InvalidCurrency {
            code: code.into(),
            rate: Some(rate),
        }
    }

    pub fn not_found(code: impl Into<String>) -> Self {
        ConversionError::CodeNotFound { code: code.into() }
    }
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ConversionError> for AppError {
    fn from(err: ConversionError) -> Self {
        match err {
            e @ ConversionError::InvalidCurrency { .. } => AppError::BadRequest(e.to_string()),
            e @ ConversionError::CodeNotFound { .. } => AppError::NotFound(e.to_string()),
            ConversionError::Unavailable(_) => AppError::ServiceUnavailable(
                "Exchange Rates API currently unavailable, try again later".into(),
            ),
            ConversionError::Repository(e) => AppError::from(e),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".into()),
            RepoError::Database(e) => AppError::Internal(e),
        }
    }
}
