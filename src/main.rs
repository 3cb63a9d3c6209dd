//! Lifecycle demo: a payment service whose operations run lifecycle hooks.
//!
//! Wires configuration, logging, the cache backend and the lifecycle
//! manager together, then processes a few payments.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use lifecycle_cache::CacheManager;
use lifecycle_core::config::LifecycleConfig;
use lifecycle_core::config::logging::LogFormat;
use lifecycle_core::error::AppError;
use lifecycle_core::traits::cache::CacheProvider;
use lifecycle_hooks::LifecycleManager;

use lifecycle_service::payment::{self, PaymentService, TARGET};

const FRAUD_LIMIT: f64 = 10_000.0;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(e.kind.exit_code());
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, kind = %e.kind, "Demo failed");
        std::process::exit(e.kind.exit_code());
    }
}

/// Load configuration from `LIFECYCLE_CONFIG` or the layered defaults.
fn load_configuration() -> Result<LifecycleConfig, AppError> {
    match std::env::var("LIFECYCLE_CONFIG") {
        Ok(path) => LifecycleConfig::load_from(&path),
        Err(_) => {
            let env = std::env::var("LIFECYCLE_ENV").unwrap_or_else(|_| "development".to_string());
            LifecycleConfig::load(&env)
        }
    }
}

fn init_logging(config: &LifecycleConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let subscriber = fmt().with_env_filter(filter).with_target(true);

    match config.logging.format {
        LogFormat::Json => subscriber.json().with_current_span(false).init(),
        LogFormat::Compact => subscriber.compact().init(),
        LogFormat::Pretty => subscriber.pretty().init(),
    }
}

async fn run(config: LifecycleConfig) -> Result<(), AppError> {
    tracing::info!("Starting lifecycle demo v{}", env!("CARGO_PKG_VERSION"));

    let mut builder = LifecycleManager::builder()
        .config(&config)
        .plugins(Arc::new(payment::plugins()));
    if config.cache.enabled {
        let store: Arc<dyn CacheProvider> = CacheManager::new(&config.cache).await?.shared();
        builder = builder.cache_store(store);
    }
    let lifecycle = builder.build().await?;

    if !lifecycle.registry().has_any(TARGET).await {
        lifecycle.declare(TARGET, "before_payment", ["user_id", "amount"]).await?;
        lifecycle
            .declare(TARGET, "after_payment", ["user_id", "amount", "transaction_id"])
            .await?;
        lifecycle
            .declare(TARGET, "payment.failed", ["user_id", "amount", "reason"])
            .await?;
    }

    let service = PaymentService::new(lifecycle.clone());
    service.install_hooks(FRAUD_LIMIT).await?;

    for (user_id, amount) in [(20_u64, 50.0), (21, 20_000.0), (7, 120.0)] {
        match service.pay(user_id, amount).await {
            Ok(charged) => tracing::info!(user_id, amount, charged, "Payment accepted"),
            Err(e) => tracing::warn!(user_id, amount, error = %e, "Payment rejected"),
        }
    }

    let mut args = vec![serde_json::json!(30), serde_json::json!(80.0)];
    let traced = lifecycle.run_traced(TARGET, "before_payment", &mut args).await;
    let trace = serde_json::to_string_pretty(&traced.trace)?;
    tracing::info!(state = ?traced.trace.state, "Execution trace:\n{trace}");
    traced.result?;

    let cleared = lifecycle.clear_cache().await;
    tracing::info!(cleared, "Demo finished");
    Ok(())
}
