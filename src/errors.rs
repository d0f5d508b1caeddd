use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error while accessing a file or resource: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0} Not found")]
    NotFound(String),

    #[error("Duplicate contact: {0}")]
    Duplicate(String),

    #[error("Unrecognized command: '{0}'")]
    ParseCommand(String),

    #[error("Invalid number format: {0}")]
    ParseInt(#[from] std::num::ParseIntError),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unsupported format: {0}")]
    Format(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),
}

impl AppError {
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, AppError::Duplicate(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }
}
