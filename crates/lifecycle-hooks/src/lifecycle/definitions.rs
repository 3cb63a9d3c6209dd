//! Lifecycle point contract types.

use std::fmt;
use std::sync::Arc;

/// A declared lifecycle point and its ordered parameter contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecyclePointDef {
    /// Target type identifier.
    pub target: String,
    /// Point name, unique within its target.
    pub name: String,
    /// Parameter names in positional order.
    pub parameters: Arc<[String]>,
}

impl LifecyclePointDef {
    /// Creates a point definition.
    pub fn new<I, S>(target: impl Into<String>, name: impl Into<String>, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            target: target.into(),
            name: name.into(),
            parameters: parameters.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of positional values a dispatch must supply.
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

/// `(target, point)` pair used to key registrations and cached resolutions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointKey {
    pub target: String,
    pub point: String,
}

impl PointKey {
    pub fn new(target: impl Into<String>, point: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            point: point.into(),
        }
    }
}

impl fmt::Display for PointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.target, self.point)
    }
}
