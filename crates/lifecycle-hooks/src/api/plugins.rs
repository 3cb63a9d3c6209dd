//! In-process plugin catalog.
//!
//! Hook constructors are filed under `(target, folder, id)`, where the
//! folder is one of the naming-convention candidates of the point the hook
//! handles (e.g. `PaymentFailed` for `payment.failed`). Discovery probes the
//! folders in candidate order; instantiation calls the stored constructor.

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::hooks::definitions::HookError;
use crate::hooks::hook::Hook;

use super::discovery::{HookDiscovery, HookFactory};

type Constructor = dyn Fn() -> Result<Arc<dyn Hook>, HookError> + Send + Sync;

struct PluginEntry {
    target: String,
    folder: String,
    id: String,
    constructor: Arc<Constructor>,
}

/// Discovery and factory over hooks compiled into the host binary.
#[derive(Default)]
pub struct PluginCatalog {
    entries: Vec<PluginEntry>,
}

impl PluginCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Files a hook constructor.
    ///
    /// Ids are scoped to their target. Within one target the first
    /// constructor filed under an id wins; later ones are ignored.
    pub fn with_hook<F>(mut self, target: &str, folder: &str, id: &str, constructor: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn Hook>, HookError> + Send + Sync + 'static,
    {
        self.add(target, folder, id, constructor);
        self
    }

    /// Files a hook constructor in place.
    pub fn add<F>(&mut self, target: &str, folder: &str, id: &str, constructor: F)
    where
        F: Fn() -> Result<Arc<dyn Hook>, HookError> + Send + Sync + 'static,
    {
        if self.entry(target, id).is_some() {
            warn!(
                target_type = %target,
                folder = %folder,
                hook = %id,
                "Hook id already filed for target, ignoring"
            );
            return;
        }
        self.entries.push(PluginEntry {
            target: target.to_string(),
            folder: folder.to_string(),
            id: id.to_string(),
            constructor: Arc::new(constructor),
        });
    }

    fn entry(&self, target: &str, id: &str) -> Option<&PluginEntry> {
        self.entries.iter().find(|e| e.target == target && e.id == id)
    }

    /// Number of filed hooks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is filed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for PluginCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.entries
                    .iter()
                    .map(|e| format!("{}/{}/{}", e.target, e.folder, e.id)),
            )
            .finish()
    }
}

impl HookDiscovery for PluginCatalog {
    fn discover(&self, target: &str, candidates: &[String]) -> Vec<String> {
        let mut found = Vec::new();
        for candidate in candidates {
            for entry in &self.entries {
                if entry.target == target && &entry.folder == candidate && !found.contains(&entry.id) {
                    found.push(entry.id.clone());
                }
            }
        }
        found
    }
}

impl HookFactory for PluginCatalog {
    fn instantiate(&self, target: &str, id: &str) -> Result<Arc<dyn Hook>, HookError> {
        let entry = self
            .entry(target, id)
            .ok_or_else(|| HookError::new(format!("No hook filed under '{target}/{id}'")))?;
        (entry.constructor)()
    }
}
