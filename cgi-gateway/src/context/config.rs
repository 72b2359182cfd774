//! Invocation configuration - static settings for the runner.
//!
//! Set once before the request is processed.

use crate::context::BodyLimits;

/// Settings applied by [`CgiRunner`](crate::CgiRunner) to one invocation.
///
/// # Example
///
/// ```rust
/// use cgi_gateway::CgiConfig;
///
/// let config = CgiConfig::new().max_body_bytes(1024 * 1024);
/// assert_eq!(config.get_limits().get_max_body_bytes(), Some(1024 * 1024));
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CgiConfig {
    limits: BodyLimits,
}

impl CgiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the body limits.
    pub fn limits(mut self, limits: BodyLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Shorthand for `limits(BodyLimits::new().max_body_bytes(max))`.
    pub fn max_body_bytes(mut self, max: usize) -> Self {
        self.limits = self.limits.max_body_bytes(max);
        self
    }

    pub fn get_limits(&self) -> BodyLimits {
        self.limits
    }
}
