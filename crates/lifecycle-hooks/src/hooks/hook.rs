//! The hook capability and a closure-backed implementation.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::definitions::{ArgumentBag, HookDescriptor, HookError, Severity};

/// A unit of extension logic bound to exactly one lifecycle point.
///
/// `id`, `lifecycle` and `severity` are read once when the hook is
/// registered or instantiated; the engine never asks again during a
/// dispatch.
#[async_trait]
pub trait Hook: Send + Sync + fmt::Debug {
    /// Hook identifier, matched against kernel order entries.
    fn id(&self) -> &str;

    /// Lifecycle point this hook handles.
    fn lifecycle(&self) -> &str;

    /// Failure policy (defaults to Optional).
    fn severity(&self) -> Severity {
        Severity::Optional
    }

    /// Handles one invocation, reading and mutating the shared arguments.
    async fn handle(&self, args: &mut ArgumentBag<'_>) -> Result<(), HookError>;

    /// Snapshot of this hook's static metadata.
    fn descriptor(&self) -> HookDescriptor {
        HookDescriptor::new(self.id(), self.lifecycle(), self.severity())
    }
}

type HandlerFn = dyn Fn(&mut ArgumentBag<'_>) -> Result<(), HookError> + Send + Sync;

/// Hook backed by a synchronous closure.
///
/// Handy for hooks that only inspect or rewrite arguments.
#[derive(Clone)]
pub struct FnHook {
    descriptor: HookDescriptor,
    handler: Arc<HandlerFn>,
}

impl FnHook {
    /// Creates a closure-backed hook.
    pub fn new<F>(
        id: impl Into<String>,
        lifecycle: impl Into<String>,
        severity: Severity,
        handler: F,
    ) -> Self
    where
        F: Fn(&mut ArgumentBag<'_>) -> Result<(), HookError> + Send + Sync + 'static,
    {
        Self {
            descriptor: HookDescriptor::new(id, lifecycle, severity),
            handler: Arc::new(handler),
        }
    }

    /// Creates a Critical closure-backed hook.
    pub fn critical<F>(id: impl Into<String>, lifecycle: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut ArgumentBag<'_>) -> Result<(), HookError> + Send + Sync + 'static,
    {
        Self::new(id, lifecycle, Severity::Critical, handler)
    }

    /// Creates an Optional closure-backed hook.
    pub fn optional<F>(id: impl Into<String>, lifecycle: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut ArgumentBag<'_>) -> Result<(), HookError> + Send + Sync + 'static,
    {
        Self::new(id, lifecycle, Severity::Optional, handler)
    }

    /// Wraps the hook for registration.
    pub fn into_arc(self) -> Arc<dyn Hook> {
        Arc::new(self)
    }
}

impl fmt::Debug for FnHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHook")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Hook for FnHook {
    fn id(&self) -> &str {
        &self.descriptor.id
    }

    fn lifecycle(&self) -> &str {
        &self.descriptor.lifecycle
    }

    fn severity(&self) -> Severity {
        self.descriptor.severity
    }

    async fn handle(&self, args: &mut ArgumentBag<'_>) -> Result<(), HookError> {
        (self.handler)(args)
    }
}
