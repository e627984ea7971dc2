use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookAnalysisError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Unsupported file '{filename}': only .txt files are accepted")]
    UnsupportedFile { filename: String },

    #[error("Validation failed: {reason}")]
    Validation { reason: String },

    #[error("{operation} is already in progress")]
    Busy { operation: String },

    #[error("Backend returned HTTP {status}: {detail}")]
    HttpStatus { status: u16, detail: String },

    #[error("Invalid backend response: {reason}")]
    InvalidResponse { reason: String },

    #[error("Export error: {reason}")]
    Export { reason: String },

    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

impl BookAnalysisError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Local precondition failures. These never reach the backend.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::Busy { .. } | Self::UnsupportedFile { .. }
        )
    }

    /// Failures of a remote collaborator call.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::HttpStatus { .. } | Self::InvalidResponse { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, BookAnalysisError>;
