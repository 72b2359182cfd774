//! Error types for CGI handlers and the runner.
//!
//! - [`CgiError`]: raised by handler logic; recoverable with
//!   [`CgiContext::protect`](crate::CgiContext::protect)
//! - [`RunError`]: ends the invocation

use http::StatusCode;

/// An error raised while a handler runs.
///
/// Each variant maps to an HTTP status via [`status_code`](Self::status_code),
/// which [`handle_errors`](crate::handle_errors) uses for the error page.
#[derive(Debug, thiserror::Error)]
pub enum CgiError {
    /// An embedded I/O action failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The handler chose an explicit response status.
    #[error("{status}: {message}")]
    Status { status: StatusCode, message: String },

    /// A required input field was not submitted.
    #[error("missing input {0:?}")]
    MissingInput(String),

    /// An input field could not be interpreted.
    #[error("invalid input {name:?}: {message}")]
    InvalidInput { name: String, message: String },

    /// Any other failure.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl CgiError {
    /// Create an error carrying an explicit status.
    pub fn status<S: Into<String>>(status: StatusCode, message: S) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::status(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::status(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::status(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Wrap an arbitrary error.
    pub fn other<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Other(err.into())
    }

    /// The HTTP status this error is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Status { status, .. } => *status,
            Self::MissingInput(_) | Self::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            Self::Io(_) | Self::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// An error that ends the invocation before a response is written.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// Reading the request body from the input stream failed.
    #[error("failed to read request body: {0}")]
    ReadBody(#[source] std::io::Error),

    /// Writing the formatted response failed.
    #[error("failed to write response: {0}")]
    WriteResponse(#[source] std::io::Error),

    /// The request body is larger than the configured limit.
    #[error("request body of {size} bytes exceeds limit of {max} bytes")]
    BodyTooLarge { size: usize, max: usize },

    /// The handler returned an error it did not recover from.
    #[error("handler failed: {0}")]
    Handler(#[from] CgiError),
}
