//! Engine error taxonomy.

use std::fmt;

use thiserror::Error;

use lifecycle_core::error::{AppError, ErrorKind};

use crate::hooks::definitions::HookError;

/// Why a lifecycle point was rejected during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidPointReason {
    /// The target type never declared any lifecycle point.
    NoLifecyclePoints,
    /// The target type exists but does not declare this point.
    PointNotDefined,
}

impl fmt::Display for InvalidPointReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoLifecyclePoints => write!(f, "type has no lifecycle points"),
            Self::PointNotDefined => write!(f, "point not defined"),
        }
    }
}

/// Errors raised by declaration, registration and dispatch.
///
/// `InvalidLifecyclePoint` and `MissingArguments` are always raised before
/// any hook runs. `HookExecutionFailure` means a Critical hook failed and
/// the remaining hooks of that dispatch were skipped.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Unknown target type or undeclared point.
    #[error("Invalid lifecycle point '{point}' on '{target}': {reason}")]
    InvalidLifecyclePoint {
        target: String,
        point: String,
        reason: InvalidPointReason,
    },

    /// Fewer positional values than declared parameters.
    #[error("LifeCycle '{point}' of '{target}' expects arguments: {}", .missing.join(", "))]
    MissingArguments {
        target: String,
        point: String,
        missing: Vec<String>,
    },

    /// A Critical hook failed.
    #[error("Hook '{hook}' failed during '{point}' of '{target}'")]
    HookExecutionFailure {
        hook: String,
        point: String,
        target: String,
        #[source]
        source: HookError,
    },

    /// A point was re-declared with a different parameter list.
    #[error(
        "Lifecycle point '{point}' of '{target}' is already declared with ({}), refusing ({})",
        .existing.join(", "),
        .requested.join(", ")
    )]
    ConflictingDeclaration {
        target: String,
        point: String,
        existing: Vec<String>,
        requested: Vec<String>,
    },

    /// A hook was registered under a point other than the one it declares.
    #[error("Hook '{hook}' declares lifecycle '{declared}' but was registered for '{requested}'")]
    HookPointMismatch {
        hook: String,
        declared: String,
        requested: String,
    },
}

impl LifecycleError {
    /// Whether this error was raised before any hook executed.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::HookExecutionFailure { .. })
    }

    /// The handler error of the hook that aborted the dispatch, if any.
    pub fn hook_error(&self) -> Option<&HookError> {
        match self {
            Self::HookExecutionFailure { source, .. } => Some(source),
            _ => None,
        }
    }

    /// The id of the hook that aborted the dispatch, if any.
    pub fn failed_hook(&self) -> Option<&str> {
        match self {
            Self::HookExecutionFailure { hook, .. } => Some(hook),
            _ => None,
        }
    }
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        let kind = match &err {
            LifecycleError::HookExecutionFailure { .. } => ErrorKind::Hook,
            LifecycleError::MissingArguments { .. }
            | LifecycleError::ConflictingDeclaration { .. }
            | LifecycleError::HookPointMismatch { .. } => ErrorKind::Validation,
            LifecycleError::InvalidLifecyclePoint { .. } => ErrorKind::Lifecycle,
        };
        AppError::with_source(kind, err.to_string(), err)
    }
}
