//! Hook discovery and instantiation capabilities.

use std::fmt;
use std::sync::Arc;

use crate::hooks::definitions::HookError;
use crate::hooks::hook::Hook;

/// Finds hook ids for a target from naming-convention candidates.
pub trait HookDiscovery: Send + Sync + fmt::Debug {
    /// Hook ids found for `target` under any of `candidates`, in candidate
    /// probe order.
    fn discover(&self, target: &str, candidates: &[String]) -> Vec<String>;
}

/// Builds hook instances from the ids discovery returned.
///
/// Ids are only unique within a target: two targets may each file their own
/// `LogError`.
pub trait HookFactory: Send + Sync + fmt::Debug {
    /// Instantiates the hook `target` files as `id`.
    fn instantiate(&self, target: &str, id: &str) -> Result<Arc<dyn Hook>, HookError>;
}
