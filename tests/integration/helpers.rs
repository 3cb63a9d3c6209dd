//! Shared helpers for lifecycle integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::Value;

use lifecycle_hooks::api::{HookKernel, StaticDeclarations};
use lifecycle_hooks::{LifecycleError, LifecycleManager};

/// Target type used throughout the tests.
pub const SVC: &str = "PaymentService";

/// Declarations shared by every test manager.
pub fn declarations() -> StaticDeclarations {
    StaticDeclarations::new()
        .with_point(SVC, "before_payment", ["user_id", "amount"])
        .with_point(SVC, "charge", ["amount", "fees"])
        .with_point(SVC, "process", ["value"])
        .with_point(SVC, "triple", ["a", "b", "c"])
        .with_point(SVC, "payment.failed", ["user_id", "amount", "reason"])
}

/// A manager with the shared declarations and no kernel.
pub async fn manager() -> LifecycleManager {
    LifecycleManager::builder()
        .declarations(Arc::new(declarations()))
        .build()
        .await
        .expect("Failed to build lifecycle manager")
}

/// A manager with the shared declarations ordered by `kernel`.
pub async fn manager_with_kernel(kernel: impl HookKernel + 'static) -> LifecycleManager {
    LifecycleManager::builder()
        .declarations(Arc::new(declarations()))
        .kernel(Arc::new(kernel))
        .build()
        .await
        .expect("Failed to build lifecycle manager")
}

/// Numeric value of a JSON slot.
pub fn number(value: &Value) -> f64 {
    value.as_f64().expect("Expected a numeric argument")
}

/// Asserts `actual` is within 1e-9 of `expected`.
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

/// Id of the hook that aborted a dispatch.
pub fn failed_hook(result: Result<(), LifecycleError>) -> String {
    match result {
        Err(LifecycleError::HookExecutionFailure { hook, .. }) => hook,
        other => panic!("Expected HookExecutionFailure, got {other:?}"),
    }
}
