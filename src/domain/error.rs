use serde::{Deserialize, Serialize};
use std::fmt;

/// Why an ingestion adapter refused to produce source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IngestionFailure {
    UnsupportedFileType(String),
    PdfUnreadable(String),
    MissingAuthToken,
    TicketFetch { status: u16, body: String },
    TicketTransport(String),
    TicketMalformed(String),
}

impl IngestionFailure {
    pub fn reason_code(&self) -> &'static str {
        match self {
            IngestionFailure::UnsupportedFileType(_) => "unsupported_file_type",
            IngestionFailure::PdfUnreadable(_) => "pdf_unreadable",
            IngestionFailure::MissingAuthToken => "missing_auth_token",
            IngestionFailure::TicketFetch { .. } => "ticket_fetch_failed",
            IngestionFailure::TicketTransport(_) => "ticket_transport_failed",
            IngestionFailure::TicketMalformed(_) => "ticket_malformed",
        }
    }
}

impl fmt::Display for IngestionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestionFailure::UnsupportedFileType(name) => {
                write!(f, "Only PDF files are supported (got {})", name)
            }
            IngestionFailure::PdfUnreadable(msg) => write!(f, "Failed to load PDF: {}", msg),
            IngestionFailure::MissingAuthToken => {
                write!(f, "Jira token not configured in Admin Settings")
            }
            IngestionFailure::TicketFetch { status, body } => {
                write!(f, "Jira API error {} {}", status, body)
            }
            IngestionFailure::TicketTransport(msg) => write!(f, "Jira request failed: {}", msg),
            IngestionFailure::TicketMalformed(msg) => {
                write!(f, "Jira response could not be read: {}", msg)
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub enum AppError {
    Internal(String),
    NotFound(String),
    ValidationError(String),
    Unauthorized(String),
    Ingestion(IngestionFailure),
    LLMError(String),
    ConfigError(String),
    IoError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Ingestion(failure) => write!(f, "Ingestion error: {}", failure),
            AppError::LLMError(msg) => write!(f, "LLM error: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            AppError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

impl From<IngestionFailure> for AppError {
    fn from(failure: IngestionFailure) -> Self {
        AppError::Ingestion(failure)
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
