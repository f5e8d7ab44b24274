//! Core error types for stylable-core and cross-module error handling
//!
//! Rule violations found in a stylesheet are *diagnostics*, not errors: they are
//! collected and returned alongside the resolved model. `CoreError` covers the
//! remaining hard failures: invalid host configuration and duplicate module
//! registrations. Failed mixin calls are also carried as `CoreError::Mixin`
//! until the applier turns them into diagnostics.
//!
//! # Error Philosophy
//!
//! - Use `thiserror` for structured error handling (no `anyhow` bloat)
//! - Provide detailed context for debugging and user feedback
//! - Include suggestions for common error scenarios
//!
//! # Examples
//!
//! ```rust
//! use stylable_core::utils::errors::{CoreError, ErrorCategory};
//!
//! let err = CoreError::config("extra property must not be empty");
//! assert_eq!(err.category(), ErrorCategory::Configuration);
//! assert!(err.suggestion().is_some());
//! ```

use core::fmt;
use thiserror::Error;

/// Main error type for stylable-core operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Module registration or lookup failure
    #[error("Resolve error for \"{path}\": {message}")]
    Resolve {
        /// Import request that failed
        path: String,
        /// Failure description
        message: String,
    },

    /// Mixin implementation failure
    #[error("Mixin \"{name}\" failed: {message}")]
    Mixin {
        /// Mixin export name
        name: String,
        /// Error text reported by the mixin
        message: String,
    },

    /// Invalid processing configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CoreError {
    /// Create resolve error for an import request
    pub fn resolve<T: fmt::Display>(path: &str, message: T) -> Self {
        Self::Resolve {
            path: path.to_string(),
            message: message.to_string(),
        }
    }

    /// Create mixin error for a named mixin
    pub fn mixin<T: fmt::Display>(name: &str, message: T) -> Self {
        Self::Mixin {
            name: name.to_string(),
            message: message.to_string(),
        }
    }

    /// Create configuration error
    pub fn config<T: fmt::Display>(message: T) -> Self {
        Self::Config(message.to_string())
    }

    /// Get error category for filtering and grouping
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Resolve { .. } => ErrorCategory::Resolution,
            Self::Mixin { .. } => ErrorCategory::Mixin,
            Self::Config(_) => ErrorCategory::Configuration,
        }
    }

    /// Get a suggestion for resolving the error, if one applies
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Resolve { .. } => {
                Some("Register each import path once and check its spelling")
            }
            Self::Mixin { .. } => Some("Check the arguments passed to the mixin"),
            Self::Config(_) => Some("Property and pseudo-element names must be non-empty identifiers"),
        }
    }
}

/// Error category for filtering and user interface organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Module registration and lookup problems
    Resolution,
    /// Host mixin failures
    Mixin,
    /// Host configuration mistakes
    Configuration,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolution => write!(f, "resolution"),
            Self::Mixin => write!(f, "mixin"),
            Self::Configuration => write!(f, "configuration"),
        }
    }
}

/// Result type alias using `CoreError`
pub type Result<T> = core::result::Result<T, CoreError>;
