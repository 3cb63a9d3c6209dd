//! Lifecycle manager: the context object owning the registry, catalog,
//! resolution cache and engine.
//!
//! Build one per process and hand clones to call sites.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use lifecycle_core::config::LifecycleConfig;
use lifecycle_core::config::cache::CacheConfig;
use lifecycle_core::traits::cache::CacheProvider;

use crate::analysis::{HookSummary, LifecycleSummary, PointSummary};
use crate::api::declaration::{LifecycleDeclaration, StaticDeclarations};
use crate::api::discovery::{HookDiscovery, HookFactory};
use crate::api::kernel::{HookKernel, StaticKernel};
use crate::api::plugins::PluginCatalog;
use crate::error::LifecycleError;
use crate::hooks::cache::ResolutionCache;
use crate::hooks::catalog::HookCatalog;
use crate::hooks::definitions::{HookDescriptor, Severity};
use crate::hooks::engine::{EngineOptions, ExecutionEngine};
use crate::hooks::hook::Hook;
use crate::hooks::trace::{ExecutionTrace, TracedRun};
use crate::lifecycle::{LifecyclePointDef, LifecycleRegistry};
use crate::naming;

/// Entry point for declaring lifecycles, registering hooks and running
/// lifecycle points.
#[derive(Debug, Clone)]
pub struct LifecycleManager {
    registry: Arc<LifecycleRegistry>,
    catalog: Arc<HookCatalog>,
    engine: Arc<ExecutionEngine>,
}

impl LifecycleManager {
    /// Starts building a manager.
    pub fn builder() -> LifecycleManagerBuilder {
        LifecycleManagerBuilder::default()
    }

    /// Builds a manager from configuration.
    ///
    /// `[[targets]]` are declared, `[[kernel]]` orders resolutions and
    /// `store` backs the persisted resolution layer when `cache.enabled`.
    pub async fn from_config(
        config: &LifecycleConfig,
        store: Option<Arc<dyn CacheProvider>>,
    ) -> Result<Self, LifecycleError> {
        let mut builder = Self::builder().config(config);
        if let Some(store) = store {
            builder = builder.cache_store(store);
        }
        builder.build().await
    }

    /// Declares one lifecycle point.
    pub async fn declare<I, S>(&self, target: &str, point: &str, parameters: I) -> Result<(), LifecycleError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registry
            .declare(LifecyclePointDef::new(target, point, parameters))
            .await
    }

    /// Declares every point `source` lists for `target`.
    ///
    /// Returns the number of points read from the source.
    pub async fn declare_from(
        &self,
        source: &dyn LifecycleDeclaration,
        target: &str,
    ) -> Result<usize, LifecycleError> {
        let points = source.declared_points(target);
        let count = points.len();
        for def in points {
            self.registry.declare(def).await?;
        }
        Ok(count)
    }

    /// Registers a hook for `(target, point)`.
    pub async fn register(&self, target: &str, point: &str, hook: Arc<dyn Hook>) -> Result<(), LifecycleError> {
        self.catalog.register(target, point, hook).await
    }

    /// Registers a hook under the point it declares.
    pub async fn register_hook(&self, target: &str, hook: Arc<dyn Hook>) -> Result<(), LifecycleError> {
        let point = hook.lifecycle().to_string();
        self.catalog.register(target, &point, hook).await
    }

    /// Removes every manual registration of `(target, point)`.
    pub async fn unregister_all(&self, target: &str, point: &str) -> usize {
        self.catalog.unregister_all(target, point).await
    }

    /// Runs a lifecycle point; see [`ExecutionEngine::run`].
    pub async fn run(&self, target: &str, point: &str, args: &mut [Value]) -> Result<(), LifecycleError> {
        self.engine.run(target, point, args).await
    }

    /// Runs a lifecycle point and returns its trace.
    pub async fn run_traced(&self, target: &str, point: &str, args: &mut [Value]) -> TracedRun {
        self.engine.run_traced(target, point, args).await
    }

    /// Trace of the most recent dispatch when debug mode is on.
    pub async fn last_trace(&self) -> Option<ExecutionTrace> {
        self.engine.last_trace().await
    }

    /// Hooks that would run for `(target, point)`, in order.
    pub async fn resolved_hooks(&self, target: &str, point: &str) -> Vec<HookDescriptor> {
        self.catalog
            .resolve(target, point)
            .await
            .iter()
            .map(|h| h.descriptor.clone())
            .collect()
    }

    /// Drops memoised and persisted resolutions.
    pub async fn clear_cache(&self) -> u64 {
        self.catalog.clear_cache().await
    }

    /// Summary of a target's declared points and resolved hooks.
    ///
    /// Returns `None` when the target declared no lifecycle point.
    pub async fn describe(&self, target: &str) -> Option<LifecycleSummary> {
        let defs = self.registry.points(target).await;
        if defs.is_empty() {
            return None;
        }

        let mut points = Vec::with_capacity(defs.len());
        for def in defs {
            let resolved = self.catalog.resolve(target, &def.name).await;
            let mut hooks = Vec::with_capacity(resolved.len());
            for h in resolved.iter() {
                hooks.push(HookSummary {
                    id: h.descriptor.id.clone(),
                    severity: h.descriptor.severity,
                    source: h.source,
                    disabled: self.engine.is_disabled(&h.descriptor.id).await,
                });
            }

            points.push(PointSummary {
                explicit_order: self
                    .catalog
                    .kernel()
                    .and_then(|k| k.explicit_order(target, &def.name)),
                candidates: naming::candidates(&def.name),
                parameters: def.parameters.to_vec(),
                name: def.name,
                hooks,
            });
        }

        Some(LifecycleSummary {
            target: target.to_string(),
            points,
        })
    }

    /// Skips `hook_id` in future dispatches.
    pub async fn disable_hook(&self, hook_id: &str) {
        self.engine.disable_hook(hook_id).await;
    }

    /// Re-enables a disabled hook.
    pub async fn enable_hook(&self, hook_id: &str) {
        self.engine.enable_hook(hook_id).await;
    }

    /// Skips every hook.
    pub async fn disable_all_hooks(&self) {
        self.engine.disable_all_hooks().await;
    }

    /// Clears every disable switch.
    pub async fn enable_all_hooks(&self) {
        self.engine.enable_all_hooks().await;
    }

    /// Runs only hooks of `severity` until the filter is cleared.
    pub async fn only_severity(&self, severity: Severity) {
        self.engine.only_severity(severity).await;
    }

    /// Lets hooks of every severity run again.
    pub async fn clear_severity_filter(&self) {
        self.engine.clear_severity_filter().await;
    }

    /// Runs `replacement` in place of every resolved hook with id
    /// `hook_id`; see [`ExecutionEngine::replace_hook`].
    pub async fn replace_hook(&self, hook_id: &str, replacement: Arc<dyn Hook>) {
        self.engine.replace_hook(hook_id, replacement).await;
    }

    /// Puts the resolved hook back. Returns whether it had been replaced.
    pub async fn restore_hook(&self, hook_id: &str) -> bool {
        self.engine.restore_hook(hook_id).await
    }

    /// Drops every replacement.
    pub async fn restore_all_hooks(&self) {
        self.engine.restore_all_hooks().await;
    }

    /// Declared lifecycle points and their parameter contracts.
    pub fn registry(&self) -> &Arc<LifecycleRegistry> {
        &self.registry
    }

    /// Manual registrations, discovery and the resolution cache.
    pub fn catalog(&self) -> &Arc<HookCatalog> {
        &self.catalog
    }

    /// Dispatch switches and the last debug trace.
    pub fn engine(&self) -> &Arc<ExecutionEngine> {
        &self.engine
    }
}

/// Builder for [`LifecycleManager`].
#[derive(Debug)]
pub struct LifecycleManagerBuilder {
    options: EngineOptions,
    discovery_enabled: bool,
    cache_config: CacheConfig,
    store: Option<Arc<dyn CacheProvider>>,
    declarations: Vec<Arc<dyn LifecycleDeclaration>>,
    kernel: Option<Arc<dyn HookKernel>>,
    discovery: Option<(Arc<dyn HookDiscovery>, Arc<dyn HookFactory>)>,
}

impl Default for LifecycleManagerBuilder {
    fn default() -> Self {
        Self {
            options: EngineOptions::default(),
            discovery_enabled: true,
            cache_config: CacheConfig::default(),
            store: None,
            declarations: Vec::new(),
            kernel: None,
            discovery: None,
        }
    }
}

impl LifecycleManagerBuilder {
    /// Applies every setting of `config`.
    pub fn config(mut self, config: &LifecycleConfig) -> Self {
        self.options = EngineOptions::from(config);
        self.discovery_enabled = config.discovery.enabled;
        self.cache_config = config.cache.clone();
        if !config.targets.is_empty() {
            self.declarations
                .push(Arc::new(StaticDeclarations::from_config(&config.targets)));
        }
        if !config.kernel.is_empty() {
            self.kernel = Some(Arc::new(StaticKernel::from_entries(&config.kernel)));
        }
        self
    }

    /// Engine switches.
    pub fn options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// Backend of the persisted resolution layer.
    pub fn cache_store(mut self, store: Arc<dyn CacheProvider>) -> Self {
        self.store = Some(store);
        self
    }

    /// Adds a declaration source; all its targets are declared on build.
    pub fn declarations(mut self, source: Arc<dyn LifecycleDeclaration>) -> Self {
        self.declarations.push(source);
        self
    }

    /// Explicit order source.
    pub fn kernel(mut self, kernel: Arc<dyn HookKernel>) -> Self {
        self.kernel = Some(kernel);
        self
    }

    /// Discovery and factory collaborators.
    pub fn discovery(mut self, discovery: Arc<dyn HookDiscovery>, factory: Arc<dyn HookFactory>) -> Self {
        self.discovery = Some((discovery, factory));
        self
    }

    /// Uses a plugin catalog as both discovery and factory.
    pub fn plugins(self, plugins: Arc<PluginCatalog>) -> Self {
        self.discovery(plugins.clone(), plugins)
    }

    /// Builds the manager and declares every target of the declaration
    /// sources.
    pub async fn build(self) -> Result<LifecycleManager, LifecycleError> {
        let cache = Arc::new(ResolutionCache::from_config(&self.cache_config, self.store));

        let mut catalog = HookCatalog::new(cache);
        if let Some(kernel) = self.kernel {
            catalog = catalog.with_kernel(kernel);
        }
        if self.discovery_enabled {
            if let Some((discovery, factory)) = self.discovery {
                catalog = catalog.with_discovery(discovery, factory);
            }
        }
        let catalog = Arc::new(catalog);

        let registry = Arc::new(LifecycleRegistry::new());
        for source in &self.declarations {
            for target in source.targets() {
                for def in source.declared_points(&target) {
                    registry.declare(def).await?;
                }
            }
        }

        let engine = Arc::new(ExecutionEngine::new(
            Arc::clone(&registry),
            Arc::clone(&catalog),
            self.options,
        ));

        info!(
            targets = registry.targets().await.len(),
            persistent_cache = catalog.cache().is_persistent(),
            discovery = catalog.has_discovery(),
            kernel = catalog.kernel().is_some(),
            debug = self.options.debug,
            "Lifecycle manager ready"
        );

        Ok(LifecycleManager {
            registry,
            catalog,
            engine,
        })
    }
}
