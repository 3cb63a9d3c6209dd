//! Test doubles for hooks.
//!
//! Enabled with the `testing` feature. Doubles can be registered directly,
//! or installed over a resolved hook with [`spy_on`] and
//! [`LifecycleManager::replace_hook`], which also reaches discovered hooks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::hooks::definitions::{ArgumentBag, HookError, Severity};
use crate::hooks::hook::{FnHook, Hook};
use crate::manager::LifecycleManager;

type Handler = dyn Fn(&mut ArgumentBag<'_>) -> Result<(), HookError> + Send + Sync;

/// Shared log of hook ids in execution order.
#[derive(Debug, Clone, Default)]
pub struct SequenceRecorder {
    inner: Arc<Mutex<Vec<String>>>,
}

impl SequenceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `id` to the sequence.
    pub fn record(&self, id: &str) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(id.to_string());
    }

    /// Ids recorded so far.
    pub fn sequence(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// A hook that records its id and succeeds.
    pub fn hook(&self, id: &str, point: &str, severity: Severity) -> Arc<dyn Hook> {
        let recorder = self.clone();
        let name = id.to_string();
        FnHook::new(id, point, severity, move |_| {
            recorder.record(&name);
            Ok(())
        })
        .into_arc()
    }

    /// A hook that records its id and fails with `message`.
    pub fn failing_hook(&self, id: &str, point: &str, severity: Severity, message: &str) -> Arc<dyn Hook> {
        let recorder = self.clone();
        let name = id.to_string();
        let message = message.to_string();
        FnHook::new(id, point, severity, move |_| {
            recorder.record(&name);
            Err(HookError::new(message.clone()))
        })
        .into_arc()
    }

    /// A hook that records its id and then runs `handler`.
    pub fn wrap<F>(&self, id: &str, point: &str, severity: Severity, handler: F) -> Arc<dyn Hook>
    where
        F: Fn(&mut ArgumentBag<'_>) -> Result<(), HookError> + Send + Sync + 'static,
    {
        let recorder = self.clone();
        let name = id.to_string();
        FnHook::new(id, point, severity, move |args| {
            recorder.record(&name);
            handler(args)
        })
        .into_arc()
    }
}

/// Decorator recording the arguments of every execution of a hook.
///
/// Snapshots are taken after the inner hook returns, whatever its result.
#[derive(Debug)]
pub struct HookSpy {
    inner: Arc<dyn Hook>,
    executions: Mutex<Vec<Map<String, Value>>>,
}

impl HookSpy {
    pub fn new(inner: Arc<dyn Hook>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            executions: Mutex::new(Vec::new()),
        })
    }

    /// Number of executions.
    pub fn times(&self) -> usize {
        self.executions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn was_executed(&self) -> bool {
        self.times() > 0
    }

    /// Arguments as the latest execution left them.
    pub fn last_args(&self) -> Option<Map<String, Value>> {
        self.executions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// Arguments of every execution, oldest first.
    pub fn executions(&self) -> Vec<Map<String, Value>> {
        self.executions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Hook for HookSpy {
    fn id(&self) -> &str {
        self.inner.id()
    }

    fn lifecycle(&self) -> &str {
        self.inner.lifecycle()
    }

    fn severity(&self) -> Severity {
        self.inner.severity()
    }

    async fn handle(&self, args: &mut ArgumentBag<'_>) -> Result<(), HookError> {
        let result = self.inner.handle(args).await;
        self.executions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(args.snapshot());
        result
    }
}

/// Wraps the hook `(target, point)` resolves as `hook_id` in a [`HookSpy`]
/// and runs the spy in its place.
///
/// Returns `None` when no such hook resolves. Undo with
/// [`LifecycleManager::restore_hook`].
pub async fn spy_on(manager: &LifecycleManager, target: &str, point: &str, hook_id: &str) -> Option<Arc<HookSpy>> {
    let hooks = manager.catalog().resolve(target, point).await;
    let resolved = hooks.iter().find(|h| h.descriptor.id == hook_id)?;
    let spy = HookSpy::new(Arc::clone(&resolved.hook));
    manager.replace_hook(hook_id, spy.clone()).await;
    Some(spy)
}

enum Behaviour {
    Succeed,
    Fail(String),
    Custom(Arc<Handler>),
}

/// Configurable hook counting its invocations.
pub struct MockHook {
    id: String,
    lifecycle: String,
    severity: Severity,
    behaviour: Behaviour,
    calls: AtomicUsize,
}

impl MockHook {
    /// An Optional hook that succeeds without touching the arguments.
    pub fn new(id: &str, point: &str) -> Self {
        Self {
            id: id.to_string(),
            lifecycle: point.to_string(),
            severity: Severity::Optional,
            behaviour: Behaviour::Succeed,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn critical(self) -> Self {
        self.with_severity(Severity::Critical)
    }

    /// Always fails with `message`.
    pub fn failing(mut self, message: &str) -> Self {
        self.behaviour = Behaviour::Fail(message.to_string());
        self
    }

    /// Runs `handler` on each invocation.
    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut ArgumentBag<'_>) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.behaviour = Behaviour::Custom(Arc::new(handler));
        self
    }

    /// Wraps the mock for registration while keeping a handle for assertions.
    pub fn build(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Number of invocations so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for MockHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockHook")
            .field("id", &self.id)
            .field("lifecycle", &self.lifecycle)
            .field("severity", &self.severity)
            .field("calls", &self.calls())
            .finish()
    }
}

#[async_trait]
impl Hook for MockHook {
    fn id(&self) -> &str {
        &self.id
    }

    fn lifecycle(&self) -> &str {
        &self.lifecycle
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    async fn handle(&self, args: &mut ArgumentBag<'_>) -> Result<(), HookError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behaviour {
            Behaviour::Succeed => Ok(()),
            Behaviour::Fail(message) => Err(HookError::new(message.clone())),
            Behaviour::Custom(handler) => handler(args),
        }
    }
}
