//! Hook catalog: manual registrations, discovered plugins and kernel order.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::api::discovery::{HookDiscovery, HookFactory};
use crate::api::kernel::HookKernel;
use crate::error::LifecycleError;
use crate::lifecycle::PointKey;
use crate::naming;

use super::cache::ResolutionCache;
use super::definitions::HookDescriptor;
use super::hook::Hook;
use super::ordering::apply_explicit_order;

/// Where a resolved hook came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HookSource {
    /// Registered through [`HookCatalog::register`].
    Manual,
    /// Found by the discovery collaborator.
    Discovered,
}

/// A hook ready to run, with its metadata captured at registration.
#[derive(Debug, Clone)]
pub struct ResolvedHook {
    pub hook: Arc<dyn Hook>,
    pub descriptor: HookDescriptor,
    pub source: HookSource,
}

impl ResolvedHook {
    fn new(hook: Arc<dyn Hook>, source: HookSource) -> Self {
        let descriptor = hook.descriptor();
        Self {
            hook,
            descriptor,
            source,
        }
    }
}

/// Ordered hooks of one `(target, point)` pair.
pub type ResolvedHookList = Arc<[ResolvedHook]>;

/// Registry of hooks per `(target, point)`, merged with discovered hooks
/// and ordered by the kernel.
///
/// Registration takes the write lock and resolution holds the read lock
/// for its whole duration, so a resolution never observes (or memoises) a
/// half-applied registration.
#[derive(Debug)]
pub struct HookCatalog {
    registrations: RwLock<HashMap<PointKey, Vec<ResolvedHook>>>,
    kernel: Option<Arc<dyn HookKernel>>,
    discovery: Option<(Arc<dyn HookDiscovery>, Arc<dyn HookFactory>)>,
    cache: Arc<ResolutionCache>,
}

impl HookCatalog {
    /// Creates a catalog without kernel or discovery.
    pub fn new(cache: Arc<ResolutionCache>) -> Self {
        Self {
            registrations: RwLock::new(HashMap::new()),
            kernel: None,
            discovery: None,
            cache,
        }
    }

    /// Orders resolutions with `kernel`.
    pub fn with_kernel(mut self, kernel: Arc<dyn HookKernel>) -> Self {
        self.kernel = Some(kernel);
        self
    }

    /// Merges hooks found by `discovery` and built by `factory`.
    pub fn with_discovery(mut self, discovery: Arc<dyn HookDiscovery>, factory: Arc<dyn HookFactory>) -> Self {
        self.discovery = Some((discovery, factory));
        self
    }

    /// The kernel consulted during resolution, if any.
    pub fn kernel(&self) -> Option<&Arc<dyn HookKernel>> {
        self.kernel.as_ref()
    }

    /// Whether discovered hooks are merged.
    pub fn has_discovery(&self) -> bool {
        self.discovery.is_some()
    }

    /// The resolution cache.
    pub fn cache(&self) -> &Arc<ResolutionCache> {
        &self.cache
    }

    /// Appends a hook to the registrations of `(target, point)`.
    ///
    /// The hook must declare `point` as its lifecycle.
    pub async fn register(&self, target: &str, point: &str, hook: Arc<dyn Hook>) -> Result<(), LifecycleError> {
        let resolved = ResolvedHook::new(hook, HookSource::Manual);
        if resolved.descriptor.lifecycle != point {
            return Err(LifecycleError::HookPointMismatch {
                hook: resolved.descriptor.id,
                declared: resolved.descriptor.lifecycle,
                requested: point.to_string(),
            });
        }

        let key = PointKey::new(target, point);
        let mut registrations = self.registrations.write().await;

        info!(
            target_type = %target,
            point = %point,
            hook = %resolved.descriptor.id,
            severity = %resolved.descriptor.severity,
            "Hook registered"
        );

        registrations.entry(key.clone()).or_default().push(resolved);
        self.cache.invalidate(&key);
        Ok(())
    }

    /// Removes every manual registration of `(target, point)`.
    ///
    /// Returns the number of hooks removed.
    pub async fn unregister_all(&self, target: &str, point: &str) -> usize {
        let key = PointKey::new(target, point);
        let mut registrations = self.registrations.write().await;
        let removed = registrations.remove(&key).map(|hooks| hooks.len()).unwrap_or(0);
        self.cache.invalidate(&key);

        info!(target_type = %target, point = %point, removed, "Hooks unregistered");
        removed
    }

    /// Descriptors of the manual registrations of `(target, point)`.
    pub async fn registered(&self, target: &str, point: &str) -> Vec<HookDescriptor> {
        let registrations = self.registrations.read().await;
        registrations
            .get(&PointKey::new(target, point))
            .map(|hooks| hooks.iter().map(|h| h.descriptor.clone()).collect())
            .unwrap_or_default()
    }

    /// Drops memoised and persisted resolutions.
    pub async fn clear_cache(&self) -> u64 {
        let _registrations = self.registrations.write().await;
        self.cache.clear().await
    }

    /// Ordered hooks to run for `(target, point)`.
    ///
    /// Manual registrations come first in insertion order, then discovered
    /// hooks in discovery order. When the kernel declares an order, the
    /// hooks it names move to the front in that order.
    pub async fn resolve(&self, target: &str, point: &str) -> ResolvedHookList {
        let key = PointKey::new(target, point);
        let registrations = self.registrations.read().await;

        if let Some(hit) = self.cache.get(&key) {
            debug!(target_type = %target, point = %point, hooks = hit.len(), "Resolution cache hit");
            return hit;
        }

        let mut union: Vec<ResolvedHook> = registrations.get(&key).cloned().unwrap_or_default();
        let manual = union.len();
        union.extend(self.discover(&key).await);
        let discovered = union.len() - manual;

        let ordered = match self.kernel.as_ref().and_then(|k| k.explicit_order(target, point)) {
            Some(order) => apply_explicit_order(&order, union, |h| h.descriptor.id.as_str()),
            None => union,
        };

        let hooks: ResolvedHookList = ordered.into();
        debug!(
            target_type = %target,
            point = %point,
            manual,
            discovered,
            "Resolved hooks"
        );

        self.cache.put(key, Arc::clone(&hooks));
        drop(registrations);
        hooks
    }

    async fn discover(&self, key: &PointKey) -> Vec<ResolvedHook> {
        let Some((discovery, factory)) = self.discovery.as_ref() else {
            return Vec::new();
        };

        let ids = match self.cache.discovered_ids(key).await {
            Some(ids) => ids,
            None => {
                let candidates = naming::candidates(&key.point);
                let ids = discovery.discover(&key.target, &candidates);
                self.cache.store_discovered_ids(key, &ids).await;
                ids
            }
        };

        let mut hooks = Vec::with_capacity(ids.len());
        for id in ids {
            match factory.instantiate(&key.target, &id) {
                Ok(hook) if hook.lifecycle() == key.point => {
                    hooks.push(ResolvedHook::new(hook, HookSource::Discovered));
                }
                Ok(hook) => {
                    debug!(
                        target_type = %key.target,
                        point = %key.point,
                        hook = %id,
                        declared = %hook.lifecycle(),
                        "Discovered hook handles another lifecycle, skipping"
                    );
                }
                Err(e) => {
                    warn!(
                        target_type = %key.target,
                        point = %key.point,
                        hook = %id,
                        error = %e,
                        "Failed to instantiate discovered hook"
                    );
                }
            }
        }
        hooks
    }
}
