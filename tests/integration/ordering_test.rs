//! Integration tests for kernel ordering and chained argument mutation.

mod helpers;

use serde_json::json;

use lifecycle_hooks::api::StaticKernel;
use lifecycle_hooks::testing::SequenceRecorder;
use lifecycle_hooks::{FnHook, LifecycleManager, Severity};

use helpers::{SVC, assert_close, number};

async fn register_value_hooks(manager: &LifecycleManager, recorder: &SequenceRecorder, ids: &[&str]) {
    for id in ids {
        let hook = match *id {
            "Hook1" => recorder.wrap("Hook1", "process", Severity::Optional, |args| {
                let v = args.require_f64("value")?;
                args.set("value", v * 2.0)
            }),
            "Hook2" => recorder.wrap("Hook2", "process", Severity::Optional, |args| {
                let v = args.require_f64("value")?;
                args.set("value", v + 50.0)
            }),
            "Hook3" => recorder.wrap("Hook3", "process", Severity::Optional, |args| {
                let v = args.require_f64("value")?;
                args.set("value", v - 25.0)
            }),
            _ => recorder.wrap(id, "process", Severity::Optional, |args| {
                let v = args.require_f64("value")?;
                args.set("value", v * 1.1)
            }),
        };
        manager.register(SVC, "process", hook).await.unwrap();
    }
}

#[tokio::test]
async fn test_explicit_order_overrides_registration_order() {
    let kernel = StaticKernel::new().with_order(SVC, "process", ["H2", "H1"]);
    let manager = helpers::manager_with_kernel(kernel).await;
    let recorder = SequenceRecorder::new();
    manager
        .register(SVC, "process", recorder.hook("H1", "process", Severity::Optional))
        .await
        .unwrap();
    manager
        .register(SVC, "process", recorder.hook("H2", "process", Severity::Optional))
        .await
        .unwrap();

    let mut args = vec![json!(0)];
    manager.run(SVC, "process", &mut args).await.unwrap();

    assert_eq!(recorder.sequence(), vec!["H2", "H1"]);
}

#[tokio::test]
async fn test_unordered_hooks_are_appended_in_registration_order() {
    let kernel = StaticKernel::new().with_order(SVC, "process", ["C", "A"]);
    let manager = helpers::manager_with_kernel(kernel).await;
    let recorder = SequenceRecorder::new();
    for id in ["A", "X", "C", "Y"] {
        manager
            .register(SVC, "process", recorder.hook(id, "process", Severity::Optional))
            .await
            .unwrap();
    }

    let mut args = vec![json!(0)];
    manager.run(SVC, "process", &mut args).await.unwrap();

    assert_eq!(recorder.sequence(), vec!["C", "A", "X", "Y"]);
}

#[tokio::test]
async fn test_kernel_order_is_per_point() {
    let kernel = StaticKernel::new().with_order(SVC, "charge", ["Second", "First"]);
    let manager = helpers::manager_with_kernel(kernel).await;
    let recorder = SequenceRecorder::new();
    for id in ["First", "Second"] {
        manager
            .register(SVC, "process", recorder.hook(id, "process", Severity::Optional))
            .await
            .unwrap();
    }

    let mut args = vec![json!(0)];
    manager.run(SVC, "process", &mut args).await.unwrap();

    assert_eq!(recorder.sequence(), vec!["First", "Second"]);
}

#[tokio::test]
async fn test_ordered_value_pipeline() {
    let kernel = StaticKernel::new().with_order(SVC, "process", ["Hook1", "Hook2", "Hook3"]);
    let manager = helpers::manager_with_kernel(kernel).await;
    let recorder = SequenceRecorder::new();
    register_value_hooks(&manager, &recorder, &["Hook3", "Hook1", "Hook2"]).await;

    let mut args = vec![json!(100)];
    manager.run(SVC, "process", &mut args).await.unwrap();

    assert_eq!(recorder.sequence(), vec!["Hook1", "Hook2", "Hook3"]);
    assert_close(number(&args[0]), 225.0);
}

#[tokio::test]
async fn test_mixed_ordered_and_unordered_pipeline() {
    let kernel = StaticKernel::new().with_order(SVC, "process", ["Hook1", "Hook2", "Hook3"]);
    let manager = helpers::manager_with_kernel(kernel).await;
    let recorder = SequenceRecorder::new();
    register_value_hooks(&manager, &recorder, &["Extra", "Hook3", "Hook1"]).await;

    let mut args = vec![json!(100)];
    manager.run(SVC, "process", &mut args).await.unwrap();

    assert_eq!(recorder.sequence(), vec!["Hook1", "Hook3", "Extra"]);
    assert_close(number(&args[0]), 192.5);
}

fn discount() -> FnHook {
    FnHook::optional("Discount", "charge", |args| {
        let amount = args.require_f64("amount")?;
        args.set("amount", amount * 0.9)
    })
}

/// 8% tax on the gross total (amount plus fees collected so far).
fn tax() -> FnHook {
    FnHook::optional("Tax", "charge", |args| {
        let amount = args.require_f64("amount")?;
        let fees = args.require_f64("fees")?;
        args.set("amount", amount + (amount + fees) * 0.08)
    })
}

fn processing_fee() -> FnHook {
    FnHook::optional("ProcessingFee", "charge", |args| {
        let fees = args.require_f64("fees")?;
        args.set("fees", fees + 2.50)
    })
}

async fn charge(hooks: Vec<FnHook>) -> (f64, f64) {
    let manager = helpers::manager().await;
    for hook in hooks {
        manager.register(SVC, "charge", hook.into_arc()).await.unwrap();
    }

    let mut args = vec![json!(100.00), json!(0.00)];
    manager.run(SVC, "charge", &mut args).await.unwrap();
    (number(&args[0]), number(&args[1]))
}

#[tokio::test]
async fn test_chained_mutation() {
    let (amount, fees) = charge(vec![discount(), tax(), processing_fee()]).await;
    assert_close(amount, 97.20);
    assert_close(fees, 2.50);
}

#[tokio::test]
async fn test_chained_mutation_is_order_sensitive() {
    let (forward, _) = charge(vec![discount(), tax(), processing_fee()]).await;
    let (reversed, fees) = charge(vec![processing_fee(), tax(), discount()]).await;

    assert_close(fees, 2.50);
    assert!((forward - reversed).abs() > 0.01, "{forward} vs {reversed}");
}
