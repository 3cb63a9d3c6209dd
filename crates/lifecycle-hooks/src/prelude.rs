//! Prelude for hook authors and host applications.

pub use async_trait::async_trait;
pub use serde_json::{Value, json};

pub use crate::api::{
    HookDiscovery, HookFactory, HookKernel, LifecycleDeclaration, PluginCatalog, StaticDeclarations,
    StaticKernel,
};
pub use crate::error::LifecycleError;
pub use crate::hooks::definitions::{ArgumentBag, HookDescriptor, HookError, Severity};
pub use crate::hooks::hook::{FnHook, Hook};
pub use crate::manager::LifecycleManager;
