//! Header value parse errors.

/// Errors produced while parsing structured header values such as
/// `Content-Type` or `Content-Disposition`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HeaderParseError {
    /// The header value was empty or contained only whitespace.
    #[error("empty header value")]
    Empty,

    /// A media type without the `/subtype` half.
    #[error("missing subtype in media type {0:?}")]
    MissingSubtype(String),

    /// A token contained characters outside the RFC 2045 token set.
    #[error("invalid token {0:?}")]
    InvalidToken(String),

    /// A `;`-separated parameter without `=`.
    #[error("malformed parameter {0:?}")]
    MalformedParameter(String),

    /// A quoted-string that never closes.
    #[error("unterminated quoted string in parameter {0:?}")]
    UnterminatedQuote(String),
}
