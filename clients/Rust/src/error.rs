use thiserror::Error;

/// Result type for optimization API client operations
pub type Result<T> = std::result::Result<T, OptimizerError>;

/// Message shown to the shopper when the backend gives nothing better
/// ("An error occurred while searching for stores. Please try again.")
pub const GENERIC_ERROR_MESSAGE: &str = "אירעה שגיאה בחיפוש החנויות. נסה שוב.";

/// Errors that can occur when using the optimization API client
#[derive(Error, Debug)]
pub enum OptimizerError {
    /// Location or items are missing, so no request was sent
    #[error("Missing preconditions: {0}")]
    MissingPreconditions(String),

    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// No response within the client-side bound
    #[error("Request timed out")]
    Timeout,

    /// API returned a non-2xx response
    #[error("API error ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Backend {
        status: u16,
        message: Option<String>,
    },

    /// Response body could not be parsed or failed shape validation
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Invalid URL provided
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid request configuration
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Coarse classification of [`OptimizerError`] used by the view layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingPreconditions,
    NetworkFailure,
    BackendError,
    Timeout,
    MalformedResponse,
    InvalidRequest,
}

impl OptimizerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OptimizerError::MissingPreconditions(_) => ErrorKind::MissingPreconditions,
            OptimizerError::Network(e) if e.is_timeout() => ErrorKind::Timeout,
            OptimizerError::Network(_) => ErrorKind::NetworkFailure,
            OptimizerError::Timeout => ErrorKind::Timeout,
            OptimizerError::Backend { .. } => ErrorKind::BackendError,
            OptimizerError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            OptimizerError::InvalidUrl(_) | OptimizerError::InvalidRequest(_) => {
                ErrorKind::InvalidRequest
            }
        }
    }

    /// Whether re-issuing the same trigger may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::NetworkFailure | ErrorKind::Timeout | ErrorKind::BackendError
        )
    }

    /// Text suitable for the error banner.
    ///
    /// Only a backend-provided message is passed through; everything else
    /// collapses to [`GENERIC_ERROR_MESSAGE`].
    pub fn user_message(&self) -> String {
        match self {
            OptimizerError::Backend {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            OptimizerError::MissingPreconditions(details) => details.clone(),
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}
