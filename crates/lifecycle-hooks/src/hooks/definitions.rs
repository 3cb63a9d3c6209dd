//! Hook severity, descriptors, errors and the per-dispatch argument bag.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use lifecycle_core::error::AppError;

/// How a hook failure affects the rest of the dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Failure aborts the dispatch and propagates to the caller.
    Critical,
    /// Failure is logged and the next hook runs.
    #[default]
    Optional,
}

impl Severity {
    /// Returns the string name of this severity.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Optional => "optional",
        }
    }

    /// Whether a failure at this severity aborts the dispatch.
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Critical)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "critical" => Ok(Self::Critical),
            "optional" => Ok(Self::Optional),
            other => Err(format!("Unknown severity: '{other}'")),
        }
    }
}

/// Static metadata of a hook, captured once at registration time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookDescriptor {
    /// Hook identifier, matched against kernel order entries.
    pub id: String,
    /// Lifecycle point the hook is bound to.
    pub lifecycle: String,
    /// Failure policy.
    pub severity: Severity,
}

impl HookDescriptor {
    /// Creates a new descriptor.
    pub fn new(id: impl Into<String>, lifecycle: impl Into<String>, severity: Severity) -> Self {
        Self {
            id: id.into(),
            lifecycle: lifecycle.into(),
            severity,
        }
    }
}

/// Error returned by a hook handler.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HookError {
    /// Human-readable failure message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl HookError {
    /// Creates a hook error with a message only.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a hook error wrapping an underlying cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<AppError> for HookError {
    fn from(err: AppError) -> Self {
        Self::with_source(err.message.clone(), err)
    }
}

impl From<serde_json::Error> for HookError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(format!("Invalid argument value: {err}"), err)
    }
}

/// Named, mutable view over a dispatch call's positional arguments.
///
/// Each slot borrows the caller's value, so every write a hook makes is
/// visible to the next hook and to the caller once the dispatch returns.
/// Only the declared parameters are bound; extra positional values stay
/// untouched.
#[derive(Debug)]
pub struct ArgumentBag<'a> {
    slots: Vec<(&'a str, &'a mut Value)>,
}

impl<'a> ArgumentBag<'a> {
    /// Binds `names[i]` to `values[i]` for every declared name.
    ///
    /// Callers check `values.len() >= names.len()` beforehand; surplus
    /// values are left unbound.
    pub fn bind(names: &'a [String], values: &'a mut [Value]) -> Self {
        let slots = names
            .iter()
            .map(String::as_str)
            .zip(values.iter_mut())
            .collect();
        Self { slots }
    }

    /// Number of bound parameters.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no parameter is bound.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Parameter names in declared order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.slots.iter().map(|(name, _)| *name)
    }

    /// Whether `name` is a bound parameter.
    pub fn contains(&self, name: &str) -> bool {
        self.slots.iter().any(|(n, _)| *n == name)
    }

    /// Current value of a parameter.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.slots
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| &**v)
    }

    /// Mutable access to a parameter's slot.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.slots
            .iter_mut()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| &mut **v)
    }

    /// Gets a parameter as `f64`.
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    /// Gets a parameter as `i64`.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    /// Gets a parameter as a string slice.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Gets a parameter as `bool`.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// Gets a numeric parameter, failing the hook if it is absent or not a number.
    pub fn require_f64(&self, name: &str) -> Result<f64, HookError> {
        self.get_f64(name)
            .ok_or_else(|| HookError::new(format!("Argument '{name}' must be a number")))
    }

    /// Gets an integer parameter, failing the hook if it is absent or not an integer.
    pub fn require_i64(&self, name: &str) -> Result<i64, HookError> {
        self.get_i64(name)
            .ok_or_else(|| HookError::new(format!("Argument '{name}' must be an integer")))
    }

    /// Overwrites a parameter's value.
    ///
    /// Only declared parameters can be written.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), HookError> {
        match self.get_mut(name) {
            Some(slot) => {
                *slot = value.into();
                Ok(())
            }
            None => Err(HookError::new(format!("Unknown argument '{name}'"))),
        }
    }

    /// Copy of the current values keyed by parameter name.
    pub fn snapshot(&self) -> Map<String, Value> {
        self.slots
            .iter()
            .map(|(name, value)| ((*name).to_string(), (**value).clone()))
            .collect()
    }
}
