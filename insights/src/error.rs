use thiserror::Error;

/// Every way a query can fail, from input validation to the upstream model.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Question must be 1–250 characters")]
    InvalidQuestion,

    #[error("PDF file is required")]
    MissingFile,

    #[error("Only PDF files are allowed")]
    UnsupportedMediaType,

    #[error("File too large — max 10MB")]
    FileTooLarge,

    #[error("Failed to extract text from PDF: {0}")]
    Extraction(String),

    /// Message reported by the completion API, passed through verbatim.
    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Transport(String),
}

impl QueryError {
    /// Input problems the caller can fix, as opposed to server-side faults.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            QueryError::InvalidQuestion
                | QueryError::MissingFile
                | QueryError::UnsupportedMediaType
                | QueryError::FileTooLarge
        )
    }
}

pub type QueryResult<T> = Result<T, QueryError>;
