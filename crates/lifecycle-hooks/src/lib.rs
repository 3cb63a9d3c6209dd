//! # lifecycle-hooks
//!
//! Hook resolution and execution engine. Provides:
//!
//! - Lifecycle point declarations with ordered parameter contracts
//! - A hook catalog merging manual registrations, discovered plugins and
//!   kernel-declared explicit order
//! - A two-layer resolution cache
//! - A sequential execution engine with Critical/Optional failure policy
//! - The [`LifecycleManager`] context object tying it all together

pub mod analysis;
pub mod api;
pub mod error;
pub mod hooks;
pub mod lifecycle;
pub mod manager;
pub mod naming;
pub mod prelude;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{InvalidPointReason, LifecycleError};
pub use hooks::definitions::{ArgumentBag, HookDescriptor, HookError, Severity};
pub use hooks::engine::ExecutionEngine;
pub use hooks::hook::{FnHook, Hook};
pub use hooks::trace::ExecutionTrace;
pub use lifecycle::{LifecyclePointDef, LifecycleRegistry};
pub use manager::LifecycleManager;
