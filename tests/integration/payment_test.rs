//! End-to-end tests of the payment service running on lifecycle hooks.

mod helpers;

use std::sync::Arc;

use serde_json::{Value, json};

use lifecycle_core::config::LifecycleConfig;
use lifecycle_core::error::ErrorKind;
use lifecycle_hooks::hooks::trace::{DispatchState, HookOutcome};
use lifecycle_hooks::testing::SequenceRecorder;
use lifecycle_hooks::{FnHook, Hook, HookError, LifecycleManager, Severity};
use lifecycle_service::payment::{self, Discount, FraudCheck, PaymentService, TARGET};

use helpers::{assert_close, number};

const CONFIG: &str = r#"
[[targets]]
name = "PaymentService"

[[targets.points]]
name = "before_payment"
parameters = ["user_id", "amount"]

[[targets.points]]
name = "after_payment"
parameters = ["user_id", "amount", "transaction_id"]

[[targets.points]]
name = "payment.failed"
parameters = ["user_id", "amount", "reason"]

[[kernel]]
target = "PaymentService"
point = "before_payment"
order = ["FraudCheck", "Discount"]
"#;

async fn configured(debug: bool) -> LifecycleManager {
    let mut config = LifecycleConfig::from_toml(CONFIG).unwrap();
    config.debug = debug;
    LifecycleManager::builder()
        .config(&config)
        .plugins(Arc::new(payment::plugins()))
        .build()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_hook_mutation_is_visible_to_caller() {
    let manager = configured(false).await;
    manager
        .register_hook(
            TARGET,
            FnHook::optional("HalfOff", "before_payment", |args| {
                let amount = args.require_f64("amount")?;
                args.set("amount", amount * 0.9)
            })
            .into_arc(),
        )
        .await
        .unwrap();

    let mut args = vec![json!(1), json!(100.0)];
    manager.run(TARGET, "before_payment", &mut args).await.unwrap();

    assert_close(number(&args[1]), 90.0);
    assert_eq!(args[0], json!(1));
}

#[tokio::test]
async fn test_discounted_payment_succeeds() {
    let service = PaymentService::new(configured(false).await);
    service.install_hooks(10_000.0).await.unwrap();

    let charged = service.pay(20, 50.0).await.unwrap();
    assert_close(charged, 45.0);

    let charged = service.pay(7, 50.0).await.unwrap();
    assert_close(charged, 50.0);
}

#[tokio::test]
async fn test_fraud_check_aborts_before_discount() {
    let manager = configured(false).await;
    let service = PaymentService::new(manager.clone());
    service.install_hooks(10_000.0).await.unwrap();

    let mut args = vec![json!(30), json!(20_000.0)];
    let err = manager
        .run(TARGET, "before_payment", &mut args)
        .await
        .unwrap_err();

    assert_eq!(err.failed_hook(), Some("FraudCheck"));
    assert_close(number(&args[1]), 20_000.0);
}

#[tokio::test]
async fn test_rejected_payment_runs_failure_lifecycle() {
    let manager = configured(false).await;
    let recorder = SequenceRecorder::new();
    manager
        .register(
            TARGET,
            "payment.failed",
            recorder.wrap("AuditFailure", "payment.failed", Severity::Optional, |args| {
                match args.get_str("reason") {
                    Some(reason) if reason.contains("fraud limit") => Ok(()),
                    other => Err(HookError::new(format!("unexpected reason: {other:?}"))),
                }
            }),
        )
        .await
        .unwrap();

    let service = PaymentService::new(manager.clone());
    service.install_hooks(10_000.0).await.unwrap();

    let err = service.pay(21, 20_000.0).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Hook);
    assert_eq!(recorder.sequence(), vec!["AuditFailure"]);

    let failed = manager.resolved_hooks(TARGET, "payment.failed").await;
    let ids: Vec<&str> = failed.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["AuditFailure", "NotifyOps"]);
}

#[tokio::test]
async fn test_configured_kernel_orders_hooks() {
    let manager = configured(false).await;
    let discount: Arc<dyn Hook> = Arc::new(Discount);
    let fraud: Arc<dyn Hook> = Arc::new(FraudCheck::new(500.0));
    manager.register_hook(TARGET, discount).await.unwrap();
    manager.register_hook(TARGET, fraud).await.unwrap();

    let resolved = manager.resolved_hooks(TARGET, "before_payment").await;
    let ids: Vec<&str> = resolved.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["FraudCheck", "Discount"]);
    assert_eq!(resolved[0].severity, Severity::Critical);
    assert_eq!(resolved[1].severity, Severity::Optional);
}

#[tokio::test]
async fn test_debug_mode_records_last_trace() {
    let manager = configured(true).await;
    PaymentService::new(manager.clone())
        .install_hooks(10_000.0)
        .await
        .unwrap();

    let mut args = vec![json!(40), json!(100.0)];
    manager.run(TARGET, "before_payment", &mut args).await.unwrap();

    let trace = manager.last_trace().await.unwrap();
    assert_eq!(trace.state, DispatchState::Completed);
    assert_eq!(trace.executed(), vec!["FraudCheck", "Discount"]);

    let discount = trace.entry("Discount").unwrap();
    assert_eq!(discount.outcome, HookOutcome::Succeeded);
    assert_eq!(discount.before.get("amount"), Some(&json!(100.0)));
    assert_close(
        discount.after.get("amount").and_then(Value::as_f64).unwrap(),
        90.0,
    );
}

#[tokio::test]
async fn test_traced_abort_without_debug_mode() {
    let manager = configured(false).await;
    PaymentService::new(manager.clone())
        .install_hooks(10.0)
        .await
        .unwrap();

    let mut args = vec![json!(3), json!(11.0)];
    let traced = manager.run_traced(TARGET, "before_payment", &mut args).await;

    assert!(traced.result.is_err());
    assert_eq!(traced.trace.state, DispatchState::Aborted);
    assert_eq!(traced.trace.executed(), vec!["FraudCheck"]);
    assert!(matches!(
        traced.trace.entry("FraudCheck").map(|e| &e.outcome),
        Some(HookOutcome::Failed { .. })
    ));
    assert!(manager.last_trace().await.is_none());
}
