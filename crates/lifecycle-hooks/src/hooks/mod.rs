//! Hook system: definitions, catalog, resolution cache and execution engine.

pub mod cache;
pub mod catalog;
pub mod definitions;
pub mod engine;
pub mod hook;
pub mod ordering;
pub mod trace;

pub use cache::ResolutionCache;
pub use catalog::{HookCatalog, HookSource, ResolvedHook, ResolvedHookList};
pub use definitions::{ArgumentBag, HookDescriptor, HookError, Severity};
pub use engine::{EngineOptions, ExecutionEngine};
pub use hook::{FnHook, Hook};
pub use trace::{DispatchState, ExecutionTrace, HookMetric, HookOutcome, TraceEntry, TracedRun};
