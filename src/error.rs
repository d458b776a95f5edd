//! Unified error handling for nobot.
//!
//! Errors raised by platform calls. None of these escape message handling:
//! callers log them, count them and carry on.

use thiserror::Error;

// ============================================================================
// Platform Errors (collaborator calls)
// ============================================================================

/// Errors returned by a [`Platform`](crate::platform::Platform) adapter.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("{call} rejected by platform: {reason}")]
    Rejected { call: &'static str, reason: String },

    #[error("{call} timed out")]
    Timeout { call: &'static str },

    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),

    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl PlatformError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Rejected { .. } => "rejected",
            Self::Timeout { .. } => "timeout",
            Self::Unsupported(_) => "unsupported",
            Self::InvalidId(_) => "invalid_id",
        }
    }
}

/// Result type for platform calls.
pub type PlatformResult = Result<(), PlatformError>;
