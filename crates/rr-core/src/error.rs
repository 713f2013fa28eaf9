//! Base error type.
//!
//! `rr-sim` wraps `CoreError` when a run configuration is rejected.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("invalid configuration: {field} {reason}")]
    InvalidConfig {
        field:  &'static str,
        reason: &'static str,
    },
}

/// Shorthand result type for `rr-core`.
pub type CoreResult<T> = Result<T, CoreError>;
