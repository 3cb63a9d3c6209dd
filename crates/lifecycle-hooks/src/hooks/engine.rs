//! Execution engine: validates a call, binds the arguments and drives the
//! hooks one at a time.
//!
//! Failure policy:
//! - a Critical hook failure aborts the dispatch and reaches the caller as
//!   [`LifecycleError::HookExecutionFailure`];
//! - an Optional hook failure is logged and the next hook runs.
//!
//! Mutations made before an abort (including partial writes by the failing
//! hook) are not rolled back.
//!
//! Three dispatch-time switches sit between resolution and invocation. None
//! of them touches the resolution cache:
//! - disabled ids and the severity filter skip a resolved hook;
//! - an override runs another hook instance in a resolved hook's slot, which
//!   is how discovered hooks get spied on or mocked.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, warn};

use lifecycle_core::config::LifecycleConfig;

use crate::error::LifecycleError;
use crate::lifecycle::LifecycleRegistry;

use super::catalog::HookCatalog;
use super::definitions::{ArgumentBag, HookDescriptor, Severity};
use super::hook::Hook;
use super::trace::{ExecutionTrace, HookOutcome, TraceEntry, TracedRun};

/// Engine switches.
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    /// Emit an error event for each suppressed Optional failure.
    pub log_failures: bool,
    /// Keep the trace of every dispatch as [`ExecutionEngine::last_trace`].
    pub debug: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            log_failures: true,
            debug: false,
        }
    }
}

impl From<&LifecycleConfig> for EngineOptions {
    fn from(config: &LifecycleConfig) -> Self {
        Self {
            log_failures: config.error_handling.log_failures,
            debug: config.debug,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct DisabledHooks {
    all: bool,
    ids: HashSet<String>,
    only_severity: Option<Severity>,
}

impl DisabledHooks {
    fn contains(&self, id: &str) -> bool {
        self.all || self.ids.contains(id)
    }

    fn skips(&self, descriptor: &HookDescriptor) -> bool {
        self.contains(&descriptor.id)
            || self
                .only_severity
                .is_some_and(|severity| severity != descriptor.severity)
    }
}

/// Replacement instances keyed by the id of the hook they stand in for,
/// with the severity read when they were installed.
type Overrides = HashMap<String, (Arc<dyn Hook>, Severity)>;

/// Runs lifecycle points.
#[derive(Debug)]
pub struct ExecutionEngine {
    registry: Arc<LifecycleRegistry>,
    catalog: Arc<HookCatalog>,
    options: EngineOptions,
    disabled: RwLock<DisabledHooks>,
    overrides: RwLock<Overrides>,
    last_trace: Mutex<Option<ExecutionTrace>>,
}

impl ExecutionEngine {
    /// Creates an engine over a registry and a catalog.
    pub fn new(registry: Arc<LifecycleRegistry>, catalog: Arc<HookCatalog>, options: EngineOptions) -> Self {
        Self {
            registry,
            catalog,
            options,
            disabled: RwLock::new(DisabledHooks::default()),
            overrides: RwLock::new(HashMap::new()),
            last_trace: Mutex::new(None),
        }
    }

    /// Engine switches in effect.
    pub fn options(&self) -> EngineOptions {
        self.options
    }

    /// Runs every hook of `(target, point)` against `args`.
    ///
    /// `args` are bound positionally to the point's declared parameters;
    /// hook writes land directly in `args`. Values beyond the declared
    /// parameters are left untouched.
    pub async fn run(&self, target: &str, point: &str, args: &mut [Value]) -> Result<(), LifecycleError> {
        if self.options.debug {
            let TracedRun { result, trace } = self.run_traced(target, point, args).await;
            *self.last_trace.lock().await = Some(trace);
            return result;
        }
        self.dispatch(target, point, args, None).await
    }

    /// Like [`run`](Self::run), also returning the execution trace.
    pub async fn run_traced(&self, target: &str, point: &str, args: &mut [Value]) -> TracedRun {
        let mut trace = ExecutionTrace::new(target, point);
        let result = self.dispatch(target, point, args, Some(&mut trace)).await;
        trace.finish(&result);
        TracedRun { result, trace }
    }

    /// Trace of the most recent dispatch when debug mode is on.
    pub async fn last_trace(&self) -> Option<ExecutionTrace> {
        self.last_trace.lock().await.clone()
    }

    /// Skips `hook_id` in future dispatches.
    pub async fn disable_hook(&self, hook_id: &str) {
        self.disabled.write().await.ids.insert(hook_id.to_string());
        debug!(hook = %hook_id, "Hook disabled");
    }

    /// Re-enables a hook disabled with [`disable_hook`](Self::disable_hook).
    pub async fn enable_hook(&self, hook_id: &str) {
        self.disabled.write().await.ids.remove(hook_id);
        debug!(hook = %hook_id, "Hook enabled");
    }

    /// Skips every hook; validation still runs.
    pub async fn disable_all_hooks(&self) {
        self.disabled.write().await.all = true;
        debug!("All hooks disabled");
    }

    /// Clears every disable switch. The severity filter is kept.
    pub async fn enable_all_hooks(&self) {
        let mut disabled = self.disabled.write().await;
        disabled.all = false;
        disabled.ids.clear();
        debug!("All hooks enabled");
    }

    /// Runs only hooks of `severity`; the others are skipped.
    pub async fn only_severity(&self, severity: Severity) {
        self.disabled.write().await.only_severity = Some(severity);
        debug!(severity = %severity, "Severity filter set");
    }

    pub async fn clear_severity_filter(&self) {
        self.disabled.write().await.only_severity = None;
        debug!("Severity filter cleared");
    }

    /// Runs `replacement` wherever a hook with id `hook_id` resolves,
    /// manual or discovered.
    ///
    /// The slot keeps its id and position; the failure policy follows the
    /// replacement's severity.
    pub async fn replace_hook(&self, hook_id: &str, replacement: Arc<dyn Hook>) {
        debug!(hook = %hook_id, replacement = %replacement.id(), "Hook replaced");
        let severity = replacement.severity();
        self.overrides
            .write()
            .await
            .insert(hook_id.to_string(), (replacement, severity));
    }

    /// Undoes [`replace_hook`](Self::replace_hook). Returns whether an
    /// override existed.
    pub async fn restore_hook(&self, hook_id: &str) -> bool {
        self.overrides.write().await.remove(hook_id).is_some()
    }

    pub async fn restore_all_hooks(&self) {
        self.overrides.write().await.clear();
    }

    /// Whether `hook_id` is currently skipped.
    pub async fn is_disabled(&self, hook_id: &str) -> bool {
        self.disabled.read().await.contains(hook_id)
    }

    async fn dispatch(
        &self,
        target: &str,
        point: &str,
        args: &mut [Value],
        mut trace: Option<&mut ExecutionTrace>,
    ) -> Result<(), LifecycleError> {
        let params = self.registry.contract(target, point).await?;
        if args.len() < params.len() {
            return Err(LifecycleError::MissingArguments {
                target: target.to_string(),
                point: point.to_string(),
                missing: params[args.len()..].to_vec(),
            });
        }

        let hooks = self.catalog.resolve(target, point).await;
        let disabled = self.disabled.read().await.clone();
        let overrides = self.overrides.read().await.clone();

        debug!(
            target_type = %target,
            point = %point,
            hooks = hooks.len(),
            "Dispatching lifecycle"
        );

        let mut bag = ArgumentBag::bind(&params, args);

        for resolved in hooks.iter() {
            let (hook, descriptor) = match overrides.get(&resolved.descriptor.id) {
                Some((replacement, severity)) => (
                    replacement,
                    HookDescriptor::new(
                        resolved.descriptor.id.clone(),
                        resolved.descriptor.lifecycle.clone(),
                        *severity,
                    ),
                ),
                None => (&resolved.hook, resolved.descriptor.clone()),
            };
            let descriptor = &descriptor;

            if disabled.skips(descriptor) {
                debug!(hook = %descriptor.id, point = %point, "Skipping disabled hook");
                if let Some(trace) = trace.as_deref_mut() {
                    let now = bag.snapshot();
                    trace.push(TraceEntry::new(
                        descriptor,
                        target,
                        Utc::now(),
                        now.clone(),
                        now,
                        HookOutcome::Skipped,
                    ));
                }
                continue;
            }

            let before = trace.is_some().then(|| bag.snapshot());
            let started_at = Utc::now();
            let clock = Instant::now();
            let result = hook.handle(&mut bag).await;
            let elapsed = clock.elapsed();

            let outcome = match &result {
                Ok(()) => HookOutcome::Succeeded,
                Err(e) if descriptor.severity.is_critical() => HookOutcome::Failed {
                    message: e.to_string(),
                },
                Err(e) => HookOutcome::Suppressed {
                    message: e.to_string(),
                },
            };

            if let Some(trace) = trace.as_deref_mut() {
                trace.push(
                    TraceEntry::new(
                        descriptor,
                        target,
                        started_at,
                        before.unwrap_or_default(),
                        bag.snapshot(),
                        outcome,
                    )
                    .with_elapsed(elapsed),
                );
            }

            let Err(source) = result else {
                continue;
            };

            if descriptor.severity.is_critical() {
                warn!(
                    hook = %descriptor.id,
                    point = %point,
                    target_type = %target,
                    error = %source,
                    "Critical hook failed, aborting dispatch"
                );
                return Err(LifecycleError::HookExecutionFailure {
                    hook: descriptor.id.clone(),
                    point: point.to_string(),
                    target: target.to_string(),
                    source,
                });
            }

            if self.options.log_failures {
                error!(
                    hook = %descriptor.id,
                    severity = %descriptor.severity,
                    point = %point,
                    target_type = %target,
                    error = %source,
                    "Optional hook failed, continuing"
                );
            }
        }

        Ok(())
    }
}
