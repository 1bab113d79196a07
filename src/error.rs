use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

/// Message fragments the provider uses when a request exceeds its cost limits.
const SIZE_LIMIT_MARKERS: [&str; 3] = ["403", "too large", "cost limit"];

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Request rejected as too large: {0}")]
    SizeLimit(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Invalid timestamp '{value}' at row {row}")]
    InvalidTimestamp { row: usize, value: String },

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}

impl ProcessingError {
    /// True when the provider refused the request because of its size, which
    /// is the signal to retry month by month.
    pub fn is_size_limit(&self) -> bool {
        match self {
            ProcessingError::SizeLimit(_) => true,
            ProcessingError::Provider(message) => {
                SIZE_LIMIT_MARKERS.iter().any(|marker| message.contains(marker))
            }
            ProcessingError::Http(e) => e
                .status()
                .is_some_and(|status| status == reqwest::StatusCode::FORBIDDEN),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_limit_classification() {
        assert!(ProcessingError::SizeLimit("cost".into()).is_size_limit());
        assert!(ProcessingError::Provider("403 Client Error: Forbidden".into()).is_size_limit());
        assert!(ProcessingError::Provider("request is too large".into()).is_size_limit());
        assert!(ProcessingError::Provider("cost limit exceeded".into()).is_size_limit());
        assert!(!ProcessingError::Provider("500 Internal Server Error".into()).is_size_limit());
        assert!(!ProcessingError::Config("no key".into()).is_size_limit());
    }
}
