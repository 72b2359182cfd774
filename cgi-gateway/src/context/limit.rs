//! Request body size limits.
//!
//! The body is buffered in memory before decoding, so a limit bounds the
//! memory one invocation can consume. By default no limit is applied and the
//! body is bounded only by `CONTENT_LENGTH`.

/// Configuration for request body size limits.
///
/// # Example
///
/// ```rust
/// use cgi_gateway::BodyLimits;
///
/// let limits = BodyLimits::new().max_body_bytes(4 * 1024 * 1024);
/// assert!(limits.check_size(1024).is_ok());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BodyLimits {
    max_body_bytes: Option<usize>,
}

impl BodyLimits {
    /// Create limits with no restrictions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum accepted body size in bytes.
    pub fn max_body_bytes(mut self, max: usize) -> Self {
        self.max_body_bytes = Some(max);
        self
    }

    /// Returns the maximum body size, or `None` if unlimited.
    pub fn get_max_body_bytes(&self) -> Option<usize> {
        self.max_body_bytes
    }

    /// Check a body size against the configured limit.
    ///
    /// Returns `Err(max)` when `size` exceeds it.
    pub fn check_size(&self, size: usize) -> Result<(), usize> {
        match self.max_body_bytes {
            Some(max) if size > max => Err(max),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_no_limits() {
        let limits = BodyLimits::default();
        assert_eq!(limits.get_max_body_bytes(), None);
        assert!(limits.check_size(usize::MAX).is_ok());
    }

    #[test]
    fn test_check_size_within_limit() {
        let limits = BodyLimits::new().max_body_bytes(1024);
        assert!(limits.check_size(512).is_ok());
        assert!(limits.check_size(1024).is_ok());
    }

    #[test]
    fn test_check_size_exceeds_limit() {
        let limits = BodyLimits::new().max_body_bytes(1024);
        assert_eq!(limits.check_size(1025), Err(1024));
    }
}
