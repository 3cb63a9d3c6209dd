//! Integration tests for naming-convention discovery and the persisted
//! resolution cache.

mod helpers;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use lifecycle_cache::memory::MemoryCacheProvider;
use lifecycle_core::config::LifecycleConfig;
use lifecycle_core::config::cache::MemoryCacheConfig;
use lifecycle_core::error::AppError;
use lifecycle_core::result::AppResult;
use lifecycle_core::traits::cache::CacheProvider;
use lifecycle_hooks::api::{HookDiscovery, PluginCatalog};
use lifecycle_hooks::hooks::HookSource;
use lifecycle_hooks::naming;
use lifecycle_hooks::testing::{MockHook, SequenceRecorder, spy_on};
use lifecycle_hooks::{FnHook, HookError, LifecycleManager, Severity};

use helpers::SVC;

const FAILED_KEY: &str = "lifecycle.hooks:PaymentService:payment.failed";

/// Discovery that counts how often it is consulted.
#[derive(Debug)]
struct CountingDiscovery {
    inner: Arc<PluginCatalog>,
    calls: AtomicUsize,
}

impl CountingDiscovery {
    fn new(inner: Arc<PluginCatalog>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl HookDiscovery for CountingDiscovery {
    fn discover(&self, target: &str, candidates: &[String]) -> Vec<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.discover(target, candidates)
    }
}

/// Cache backend that is always unreachable.
#[derive(Debug)]
struct UnreachableCache;

#[async_trait]
impl CacheProvider for UnreachableCache {
    fn backend(&self) -> &'static str {
        "unreachable"
    }

    async fn get(&self, _key: &str) -> AppResult<Option<String>> {
        Err(AppError::cache("connection refused"))
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> AppResult<()> {
        Err(AppError::cache("connection refused"))
    }

    async fn delete(&self, _key: &str) -> AppResult<()> {
        Err(AppError::cache("connection refused"))
    }

    async fn exists(&self, _key: &str) -> AppResult<bool> {
        Err(AppError::cache("connection refused"))
    }

    async fn delete_pattern(&self, _pattern: &str) -> AppResult<u64> {
        Err(AppError::cache("connection refused"))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(false)
    }
}

fn plugins(recorder: &SequenceRecorder) -> Arc<PluginCatalog> {
    let refund = recorder.clone();
    let notify = recorder.clone();
    Arc::new(
        PluginCatalog::new()
            .with_hook(SVC, "PaymentFailed", "RefundLedger", move || {
                Ok(refund.hook("RefundLedger", "payment.failed", Severity::Optional))
            })
            .with_hook(SVC, "PaymentFailed", "Broken", || {
                Err(HookError::new("missing ledger credentials"))
            })
            .with_hook(SVC, "PaymentFailed", "Misfiled", || {
                Ok(FnHook::optional("Misfiled", "before_payment", |_| Ok(())).into_arc())
            })
            .with_hook(SVC, "payment_failed", "NotifyOps", move || {
                Ok(notify.hook("NotifyOps", "payment.failed", Severity::Optional))
            }),
    )
}

fn memory_store() -> Arc<dyn CacheProvider> {
    Arc::new(MemoryCacheProvider::new(&MemoryCacheConfig::default()))
}

async fn manager_with(
    discovery: Arc<CountingDiscovery>,
    plugins: Arc<PluginCatalog>,
    store: Option<Arc<dyn CacheProvider>>,
) -> LifecycleManager {
    let mut builder = LifecycleManager::builder()
        .declarations(Arc::new(helpers::declarations()))
        .discovery(discovery, plugins);
    if let Some(store) = store {
        builder = builder.cache_store(store);
    }
    builder.build().await.unwrap()
}

fn failed_args() -> Vec<serde_json::Value> {
    vec![json!(7), json!(25.0), json!("card declined")]
}

#[test]
fn test_candidates_never_contain_dots_or_duplicates() {
    for point in ["payment.failed", "before_payment", "paymentBegin", "order.line.item_added"] {
        let candidates = naming::candidates(point);
        assert!(!candidates.is_empty(), "{point}");
        assert!(candidates.iter().all(|c| !c.contains('.')), "{point}");

        let mut unique = candidates.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), candidates.len(), "{point}");
    }
}

#[tokio::test]
async fn test_discovered_hooks_run_after_manual_ones() {
    let recorder = SequenceRecorder::new();
    let catalog = plugins(&recorder);
    let manager = manager_with(CountingDiscovery::new(catalog.clone()), catalog, None).await;
    manager
        .register(SVC, "payment.failed", recorder.hook("Audit", "payment.failed", Severity::Optional))
        .await
        .unwrap();

    let mut args = failed_args();
    manager.run(SVC, "payment.failed", &mut args).await.unwrap();

    assert_eq!(recorder.sequence(), vec!["Audit", "RefundLedger", "NotifyOps"]);

    let resolved = manager.catalog().resolve(SVC, "payment.failed").await;
    let sources: Vec<HookSource> = resolved.iter().map(|h| h.source).collect();
    assert_eq!(
        sources,
        vec![HookSource::Manual, HookSource::Discovered, HookSource::Discovered]
    );
}

#[tokio::test]
async fn test_discovered_ids_are_persisted() {
    let recorder = SequenceRecorder::new();
    let catalog = plugins(&recorder);
    let store = memory_store();
    let manager = manager_with(CountingDiscovery::new(catalog.clone()), catalog, Some(store.clone())).await;

    let hooks = manager.resolved_hooks(SVC, "payment.failed").await;
    assert_eq!(hooks.len(), 2);

    let raw = store.get(FAILED_KEY).await.unwrap().unwrap();
    let ids: Vec<String> = serde_json::from_str(&raw).unwrap();
    assert_eq!(ids, vec!["RefundLedger", "Broken", "Misfiled", "NotifyOps"]);
}

#[tokio::test]
async fn test_shared_store_skips_discovery() {
    let recorder = SequenceRecorder::new();
    let catalog = plugins(&recorder);
    let store = memory_store();

    let first_discovery = CountingDiscovery::new(catalog.clone());
    let first = manager_with(first_discovery.clone(), catalog.clone(), Some(store.clone())).await;
    first.resolved_hooks(SVC, "payment.failed").await;
    assert_eq!(first_discovery.calls(), 1);

    let second_discovery = CountingDiscovery::new(catalog.clone());
    let second = manager_with(second_discovery.clone(), catalog, Some(store)).await;
    let mut args = failed_args();
    second.run(SVC, "payment.failed", &mut args).await.unwrap();

    assert_eq!(second_discovery.calls(), 0);
    assert_eq!(recorder.sequence(), vec!["RefundLedger", "NotifyOps"]);
}

#[tokio::test]
async fn test_resolution_is_memoised_per_manager() {
    let recorder = SequenceRecorder::new();
    let catalog = plugins(&recorder);
    let discovery = CountingDiscovery::new(catalog.clone());
    let manager = manager_with(discovery.clone(), catalog, None).await;

    for _ in 0..3 {
        let mut args = failed_args();
        manager.run(SVC, "payment.failed", &mut args).await.unwrap();
    }

    assert_eq!(discovery.calls(), 1);
    assert_eq!(recorder.sequence().len(), 6);
}

#[tokio::test]
async fn test_clear_cache_forces_rediscovery() {
    let recorder = SequenceRecorder::new();
    let catalog = plugins(&recorder);
    let store = memory_store();
    let discovery = CountingDiscovery::new(catalog.clone());
    let manager = manager_with(discovery.clone(), catalog, Some(store.clone())).await;

    manager.resolved_hooks(SVC, "payment.failed").await;
    assert!(store.exists(FAILED_KEY).await.unwrap());

    let removed = manager.clear_cache().await;
    assert_eq!(removed, 1);
    assert!(!store.exists(FAILED_KEY).await.unwrap());

    manager.resolved_hooks(SVC, "payment.failed").await;
    assert_eq!(discovery.calls(), 2);
}

#[tokio::test]
async fn test_unreachable_cache_still_resolves() {
    let recorder = SequenceRecorder::new();
    let catalog = plugins(&recorder);
    let discovery = CountingDiscovery::new(catalog.clone());
    let manager = manager_with(discovery.clone(), catalog, Some(Arc::new(UnreachableCache))).await;

    let mut args = failed_args();
    manager.run(SVC, "payment.failed", &mut args).await.unwrap();

    assert_eq!(recorder.sequence(), vec!["RefundLedger", "NotifyOps"]);
    assert_eq!(manager.clear_cache().await, 0);
}

#[tokio::test]
async fn test_registration_invalidates_memoised_resolution() {
    let recorder = SequenceRecorder::new();
    let catalog = plugins(&recorder);
    let manager = manager_with(CountingDiscovery::new(catalog.clone()), catalog, None).await;

    assert_eq!(manager.resolved_hooks(SVC, "payment.failed").await.len(), 2);

    manager
        .register(SVC, "payment.failed", recorder.hook("Late", "payment.failed", Severity::Optional))
        .await
        .unwrap();
    let ids: Vec<String> = manager
        .resolved_hooks(SVC, "payment.failed")
        .await
        .into_iter()
        .map(|d| d.id)
        .collect();
    assert_eq!(ids, vec!["Late", "RefundLedger", "NotifyOps"]);

    assert_eq!(manager.unregister_all(SVC, "payment.failed").await, 1);
    assert_eq!(manager.resolved_hooks(SVC, "payment.failed").await.len(), 2);
}

#[tokio::test]
async fn test_disabled_discovery_ignores_plugins() {
    let config = LifecycleConfig::from_toml("[discovery]\nenabled = false\n").unwrap();
    let recorder = SequenceRecorder::new();
    let manager = LifecycleManager::builder()
        .config(&config)
        .declarations(Arc::new(helpers::declarations()))
        .plugins(plugins(&recorder))
        .build()
        .await
        .unwrap();

    let mut args = failed_args();
    manager.run(SVC, "payment.failed", &mut args).await.unwrap();

    assert!(recorder.sequence().is_empty());
    assert!(!manager.catalog().has_discovery());
}

#[tokio::test]
async fn test_same_hook_id_resolves_per_target() {
    let recorder = SequenceRecorder::new();
    let payment = recorder.clone();
    let order = recorder.clone();
    let catalog = Arc::new(
        PluginCatalog::new()
            .with_hook(SVC, "PaymentFailed", "LogError", move || {
                Ok(payment.hook("LogError", "payment.failed", Severity::Optional))
            })
            .with_hook("OrderService", "OrderFailed", "LogError", move || {
                Ok(order.wrap("LogError", "order.failed", Severity::Optional, |args| {
                    args.set("reason", "logged")
                }))
            }),
    );
    let store = memory_store();
    let declarations =
        helpers::declarations().with_point("OrderService", "order.failed", ["order_id", "reason"]);
    let manager = LifecycleManager::builder()
        .declarations(Arc::new(declarations))
        .plugins(catalog)
        .cache_store(store.clone())
        .build()
        .await
        .unwrap();

    let mut args = vec![json!(11), json!("out of stock")];
    manager.run("OrderService", "order.failed", &mut args).await.unwrap();
    assert_eq!(args[1], json!("logged"));

    let mut args = failed_args();
    manager.run(SVC, "payment.failed", &mut args).await.unwrap();
    assert_eq!(args[2], json!("card declined"));
    assert_eq!(recorder.sequence(), vec!["LogError", "LogError"]);

    let raw = store
        .get("lifecycle.hooks:OrderService:order.failed")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(raw, r#"["LogError"]"#);
}

#[tokio::test]
async fn test_discovered_hooks_can_be_spied_and_replaced() {
    let recorder = SequenceRecorder::new();
    let catalog = plugins(&recorder);
    let manager = manager_with(CountingDiscovery::new(catalog.clone()), catalog, None).await;

    let spy = spy_on(&manager, SVC, "payment.failed", "RefundLedger").await.unwrap();
    let mock = MockHook::new("Quiet", "payment.failed").build();
    manager.replace_hook("NotifyOps", mock.clone()).await;

    let mut args = failed_args();
    manager.run(SVC, "payment.failed", &mut args).await.unwrap();

    assert_eq!(spy.times(), 1);
    assert_eq!(spy.last_args().unwrap().get("reason"), Some(&json!("card declined")));
    assert_eq!(mock.calls(), 1);
    assert_eq!(recorder.sequence(), vec!["RefundLedger"]);

    assert!(manager.restore_hook("NotifyOps").await);
    manager.restore_all_hooks().await;
    let mut args = failed_args();
    manager.run(SVC, "payment.failed", &mut args).await.unwrap();

    assert_eq!(spy.times(), 1);
    assert_eq!(mock.calls(), 1);
    assert_eq!(recorder.sequence(), vec!["RefundLedger", "RefundLedger", "NotifyOps"]);
    assert!(spy_on(&manager, SVC, "payment.failed", "Missing").await.is_none());
}

#[tokio::test]
async fn test_severity_filter_applies_to_discovered_hooks() {
    let recorder = SequenceRecorder::new();
    let catalog = plugins(&recorder);
    let manager = manager_with(CountingDiscovery::new(catalog.clone()), catalog, None).await;
    manager
        .register(SVC, "payment.failed", recorder.hook("Audit", "payment.failed", Severity::Critical))
        .await
        .unwrap();

    manager.only_severity(Severity::Critical).await;
    let mut args = failed_args();
    manager.run(SVC, "payment.failed", &mut args).await.unwrap();
    assert_eq!(recorder.sequence(), vec!["Audit"]);

    manager.clear_severity_filter().await;
    recorder.clear();
    let mut args = failed_args();
    manager.run(SVC, "payment.failed", &mut args).await.unwrap();
    assert_eq!(recorder.sequence(), vec!["Audit", "RefundLedger", "NotifyOps"]);
}
