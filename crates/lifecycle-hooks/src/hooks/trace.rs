//! Execution traces for instrumentation and tests.
//!
//! A trace never feeds back into dispatch decisions.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::LifecycleError;

use super::definitions::{HookDescriptor, Severity};

/// What happened to one hook during a dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HookOutcome {
    /// The handler returned `Ok`.
    Succeeded,
    /// A Critical handler failed and aborted the dispatch.
    Failed { message: String },
    /// An Optional handler failed and the dispatch continued.
    Suppressed { message: String },
    /// The hook is disabled and was not invoked.
    Skipped,
}

/// One hook invocation.
#[derive(Debug, Clone, Serialize)]
pub struct TraceEntry {
    pub hook: String,
    pub lifecycle: String,
    pub target: String,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
    /// Arguments as the hook received them.
    pub before: Map<String, Value>,
    /// Arguments as the hook left them.
    pub after: Map<String, Value>,
    pub outcome: HookOutcome,
    /// Wall time spent in the handler; zero for skipped hooks.
    pub elapsed_micros: u64,
}

/// Timing of one invoked hook.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HookMetric {
    pub hook: String,
    pub millis: f64,
    pub outcome: HookOutcome,
}

impl TraceEntry {
    pub(crate) fn new(
        descriptor: &HookDescriptor,
        target: &str,
        timestamp: DateTime<Utc>,
        before: Map<String, Value>,
        after: Map<String, Value>,
        outcome: HookOutcome,
    ) -> Self {
        Self {
            hook: descriptor.id.clone(),
            lifecycle: descriptor.lifecycle.clone(),
            target: target.to_string(),
            severity: descriptor.severity,
            timestamp,
            before,
            after,
            outcome,
            elapsed_micros: 0,
        }
    }

    pub(crate) fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed_micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_micros(self.elapsed_micros)
    }

    /// Whether the handler was actually invoked.
    pub fn was_invoked(&self) -> bool {
        !matches!(self.outcome, HookOutcome::Skipped)
    }
}

/// Terminal state of a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchState {
    /// Still running.
    Dispatching,
    /// Every hook was attempted.
    Completed,
    /// A Critical hook failed.
    Aborted,
    /// Validation failed before any hook ran.
    Rejected,
}

/// Ordered record of one dispatch.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionTrace {
    pub dispatch_id: Uuid,
    pub target: String,
    pub point: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub state: DispatchState,
    pub entries: Vec<TraceEntry>,
}

impl ExecutionTrace {
    pub(crate) fn new(target: &str, point: &str) -> Self {
        Self {
            dispatch_id: Uuid::now_v7(),
            target: target.to_string(),
            point: point.to_string(),
            started_at: Utc::now(),
            finished_at: None,
            state: DispatchState::Dispatching,
            entries: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, entry: TraceEntry) {
        self.entries.push(entry);
    }

    pub(crate) fn finish(&mut self, result: &Result<(), LifecycleError>) {
        self.state = match result {
            Ok(()) => DispatchState::Completed,
            Err(err) if err.is_rejection() => DispatchState::Rejected,
            Err(_) => DispatchState::Aborted,
        };
        self.finished_at = Some(Utc::now());
    }

    /// Ids of the hooks whose handler ran, in execution order.
    pub fn executed(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.was_invoked())
            .map(|e| e.hook.as_str())
            .collect()
    }

    /// Handler timings of the invoked hooks, in execution order.
    pub fn metrics(&self) -> Vec<HookMetric> {
        self.entries
            .iter()
            .filter(|e| e.was_invoked())
            .map(|e| HookMetric {
                hook: e.hook.clone(),
                millis: e.elapsed_micros as f64 / 1000.0,
                outcome: e.outcome.clone(),
            })
            .collect()
    }

    /// Total handler time of the dispatch.
    pub fn total_elapsed(&self) -> Duration {
        self.entries.iter().map(TraceEntry::elapsed).sum()
    }

    /// The entry of a given hook, if it appears in the trace.
    pub fn entry(&self, hook: &str) -> Option<&TraceEntry> {
        self.entries.iter().find(|e| e.hook == hook)
    }
}

/// Result of a traced dispatch together with its trace.
#[derive(Debug)]
pub struct TracedRun {
    pub result: Result<(), LifecycleError>,
    pub trace: ExecutionTrace,
}
