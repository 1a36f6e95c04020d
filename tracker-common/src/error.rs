//! Error classification shared across the tracker crates
//!
//! Each crate owns its own `thiserror` enum. This module only provides the
//! vocabulary used to classify those errors: the [`ErrorKind`] a caller maps to
//! a transport status, and the [`ErrorSeverity`] used to pick a log level.

use std::fmt;

/// What went wrong, from the caller's point of view.
///
/// Every error produced by the field type system or the schema engine maps to
/// exactly one kind. Callers inspect the kind to decide how to respond; none of
/// them are retried by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A malformed type or schema: invalid kind, invalid nesting, empty enum
    /// values, an inheritance cycle. Fatal to the operation that produced it.
    Configuration,
    /// A submitted value or parameter does not fit the schema.
    BadParameter,
    /// A referenced work item type or category does not exist.
    NotFound,
    /// A schema change would invalidate data typed against the current definition.
    Conflict,
    /// I/O or serialization failure in a collaborator.
    Internal,
}

impl ErrorKind {
    /// Stable lowercase name, suitable for structured log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::BadParameter => "bad_parameter",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Internal => "internal",
        }
    }

    /// Whether the error is caused by the request rather than by the system.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::BadParameter | ErrorKind::NotFound | ErrorKind::Conflict
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity levels for error classification
///
/// - **Warning**: potential issue, the operation can proceed.
/// - **Error**: the operation failed, the system continues.
/// - **Critical**: the system is misconfigured and needs attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Potential issue but operation can proceed
    Warning,
    /// Operation failed but system can continue
    Error,
    /// System cannot continue, requires immediate attention
    Critical,
}

impl From<ErrorKind> for ErrorSeverity {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Configuration | ErrorKind::Internal => ErrorSeverity::Critical,
            ErrorKind::BadParameter | ErrorKind::NotFound | ErrorKind::Conflict => {
                ErrorSeverity::Error
            }
        }
    }
}

/// Trait for error types that have severity levels
///
/// ```rust
/// use tracker_common::{ErrorSeverity, Severity};
///
/// #[derive(Debug)]
/// enum MyError {
///     Corrupted,
///     Missing,
/// }
///
/// impl Severity for MyError {
///     fn severity(&self) -> ErrorSeverity {
///         match self {
///             MyError::Corrupted => ErrorSeverity::Critical,
///             MyError::Missing => ErrorSeverity::Error,
///         }
///     }
/// }
///
/// assert_eq!(MyError::Corrupted.severity(), ErrorSeverity::Critical);
/// ```
pub trait Severity {
    /// Get the severity level of this error
    fn severity(&self) -> ErrorSeverity;
}
