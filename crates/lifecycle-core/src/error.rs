//! The error type every crate in the workspace converges on.
//!
//! Lower layers keep their own precise errors (`LifecycleError` in
//! `lifecycle-hooks`, `redis::RedisError` in the cache backend) and convert
//! at the boundary, so callers only ever branch on [`ErrorKind`].

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NotFound,
    Validation,
    Internal,
    Cache,
    Configuration,
    /// A call named a target or point that was never declared.
    Lifecycle,
    /// A critical hook failed and aborted its dispatch.
    Hook,
    Serialization,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Validation => "VALIDATION",
            Self::Internal => "INTERNAL",
            Self::Cache => "CACHE",
            Self::Configuration => "CONFIGURATION",
            Self::Lifecycle => "LIFECYCLE",
            Self::Hook => "HOOK",
            Self::Serialization => "SERIALIZATION",
        }
    }

    /// Process exit status used by the binaries.
    ///
    /// Configuration problems map to `EX_CONFIG` (78) and a bad invocation to
    /// `EX_USAGE` (64); an aborted dispatch gets its own code so scripts can
    /// tell it apart from a crash.
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Configuration => 78,
            Self::Validation | Self::NotFound | Self::Lifecycle => 64,
            Self::Hook => 3,
            Self::Cache => 2,
            Self::Internal | Self::Serialization => 1,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type BoxedCause = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    #[source]
    pub source: Option<BoxedCause>,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            source: Some(Box::new(source)),
            ..Self::new(kind, message)
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cache, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    pub fn lifecycle(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Lifecycle, message)
    }
}

// The boxed cause is not `Clone`; a clone keeps kind and message only.
impl Clone for AppError {
    fn clone(&self) -> Self {
        Self::new(self.kind, self.message.clone())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        let message = format!("JSON error at line {} column {}: {err}", err.line(), err.column());
        Self::with_source(ErrorKind::Serialization, message, err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound,
            _ => ErrorKind::Internal,
        };
        Self::with_source(kind, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(ErrorKind::Configuration, format!("Configuration error: {err}"), err)
    }
}
