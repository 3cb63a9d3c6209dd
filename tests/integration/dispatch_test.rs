//! Integration tests for call validation, argument binding and the
//! severity policy.

mod helpers;

use serde_json::{Value, json};

use lifecycle_core::error::{AppError, ErrorKind};
use lifecycle_hooks::testing::{HookSpy, MockHook, SequenceRecorder};
use lifecycle_hooks::{HookError, InvalidPointReason, LifecycleError, Severity};

use helpers::SVC;

#[tokio::test]
async fn test_binds_values_in_declared_order() {
    let manager = helpers::manager().await;
    let recorder = SequenceRecorder::new();
    let names = recorder.clone();
    let hook = MockHook::new("Inspect", "triple")
        .with_handler(move |args| {
            for name in args.names() {
                names.record(name);
            }
            Ok(())
        })
        .build();
    let spy = HookSpy::new(hook.clone());
    manager.register(SVC, "triple", spy.clone()).await.unwrap();

    let mut args = vec![json!(1), json!("two"), json!(3.5)];
    manager.run(SVC, "triple", &mut args).await.unwrap();

    assert_eq!(recorder.sequence(), vec!["a", "b", "c"]);
    let seen = spy.last_args().unwrap();
    assert_eq!(seen.get("a"), Some(&json!(1)));
    assert_eq!(seen.get("b"), Some(&json!("two")));
    assert_eq!(seen.get("c"), Some(&json!(3.5)));
    assert_eq!(hook.calls(), 1);
}

#[tokio::test]
async fn test_extra_values_are_ignored() {
    let manager = helpers::manager().await;
    let hook = MockHook::new("CountArgs", "process")
        .with_handler(|args| {
            if args.len() != 1 {
                return Err(HookError::new(format!("bound {} arguments", args.len())));
            }
            args.set("value", 1)
        })
        .critical()
        .build();
    manager.register(SVC, "process", hook.clone()).await.unwrap();

    let mut args = vec![json!(0), json!("extra"), json!(false)];
    manager.run(SVC, "process", &mut args).await.unwrap();

    assert_eq!(args, vec![json!(1), json!("extra"), json!(false)]);
}

#[tokio::test]
async fn test_missing_arguments_runs_no_hook() {
    let manager = helpers::manager().await;
    let hook = MockHook::new("Counter", "triple").build();
    manager.register(SVC, "triple", hook.clone()).await.unwrap();

    let mut args = vec![json!(1)];
    let err = manager.run(SVC, "triple", &mut args).await.unwrap_err();

    match &err {
        LifecycleError::MissingArguments { missing, point, .. } => {
            assert_eq!(missing, &vec!["b".to_string(), "c".to_string()]);
            assert_eq!(point, "triple");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().ends_with("expects arguments: b, c"));
    assert_eq!(hook.calls(), 0);
}

#[tokio::test]
async fn test_undeclared_point_runs_no_hook() {
    let manager = helpers::manager().await;
    let hook = MockHook::new("Counter", "refund").build();
    manager.register(SVC, "refund", hook.clone()).await.unwrap();

    let mut args = vec![json!(1)];
    let err = manager.run(SVC, "refund", &mut args).await.unwrap_err();
    assert!(matches!(
        err,
        LifecycleError::InvalidLifecyclePoint { reason: InvalidPointReason::PointNotDefined, .. }
    ));
    assert_eq!(hook.calls(), 0);
}

#[tokio::test]
async fn test_target_without_lifecycle_is_rejected() {
    let manager = helpers::manager().await;
    let mut args: Vec<Value> = Vec::new();
    let err = manager.run("Mailer", "send", &mut args).await.unwrap_err();
    assert!(matches!(
        err,
        LifecycleError::InvalidLifecyclePoint { reason: InvalidPointReason::NoLifecyclePoints, .. }
    ));
}

#[tokio::test]
async fn test_critical_failure_aborts_remaining_hooks() {
    let manager = helpers::manager().await;
    let recorder = SequenceRecorder::new();
    manager
        .register(SVC, "process", recorder.hook("H1", "process", Severity::Optional))
        .await
        .unwrap();
    manager
        .register(
            SVC,
            "process",
            recorder.failing_hook("H2", "process", Severity::Critical, "declined"),
        )
        .await
        .unwrap();
    manager
        .register(SVC, "process", recorder.hook("H3", "process", Severity::Optional))
        .await
        .unwrap();

    let mut args = vec![json!(1)];
    let result = manager.run(SVC, "process", &mut args).await;

    assert_eq!(helpers::failed_hook(result), "H2");
    assert_eq!(recorder.sequence(), vec!["H1", "H2"]);
}

#[tokio::test]
async fn test_optional_failure_is_swallowed() {
    let manager = helpers::manager().await;
    let recorder = SequenceRecorder::new();
    manager
        .register(SVC, "process", recorder.hook("H1", "process", Severity::Optional))
        .await
        .unwrap();
    manager
        .register(
            SVC,
            "process",
            recorder.failing_hook("H2", "process", Severity::Optional, "flaky"),
        )
        .await
        .unwrap();
    manager
        .register(SVC, "process", recorder.hook("H3", "process", Severity::Optional))
        .await
        .unwrap();

    let mut args = vec![json!(1)];
    manager.run(SVC, "process", &mut args).await.unwrap();

    assert_eq!(recorder.sequence(), vec!["H1", "H2", "H3"]);
}

#[tokio::test]
async fn test_hook_failure_keeps_cause_and_maps_to_app_error() {
    let manager = helpers::manager().await;
    let hook = MockHook::new("Guard", "process")
        .critical()
        .failing("limit exceeded")
        .build();
    manager.register(SVC, "process", hook).await.unwrap();

    let mut args = vec![json!(1)];
    let err = manager.run(SVC, "process", &mut args).await.unwrap_err();

    let LifecycleError::HookExecutionFailure { source, target, .. } = &err else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(source.message, "limit exceeded");
    assert_eq!(target, SVC);

    let app: AppError = err.into();
    assert_eq!(app.kind, ErrorKind::Hook);
}
