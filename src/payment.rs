//! Payment service walkthrough wired to the lifecycle engine.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::info;

use lifecycle_core::error::AppError;
use lifecycle_hooks::api::PluginCatalog;
use lifecycle_hooks::{ArgumentBag, FnHook, Hook, HookError, LifecycleManager, Severity};

pub const TARGET: &str = "PaymentService";

/// Rejects payments above the fraud threshold.
#[derive(Debug)]
pub struct FraudCheck {
    limit: f64,
}

impl FraudCheck {
    pub fn new(limit: f64) -> Self {
        Self { limit }
    }
}

#[async_trait]
impl Hook for FraudCheck {
    fn id(&self) -> &str {
        "FraudCheck"
    }

    fn lifecycle(&self) -> &str {
        "before_payment"
    }

    fn severity(&self) -> Severity {
        Severity::Critical
    }

    async fn handle(&self, args: &mut ArgumentBag<'_>) -> Result<(), HookError> {
        let amount = args.require_f64("amount")?;
        if amount > self.limit {
            return Err(HookError::new(format!(
                "Amount {amount:.2} exceeds the fraud limit of {:.2}",
                self.limit
            )));
        }
        Ok(())
    }
}

/// Ten percent off for every tenth customer.
#[derive(Debug)]
pub struct Discount;

#[async_trait]
impl Hook for Discount {
    fn id(&self) -> &str {
        "Discount"
    }

    fn lifecycle(&self) -> &str {
        "before_payment"
    }

    async fn handle(&self, args: &mut ArgumentBag<'_>) -> Result<(), HookError> {
        let user_id = args.require_i64("user_id")?;
        if user_id % 10 == 0 {
            let amount = args.require_f64("amount")?;
            args.set("amount", amount * 0.9)?;
        }
        Ok(())
    }
}

/// Hooks shipped as plugins, found through naming-convention discovery.
pub fn plugins() -> PluginCatalog {
    PluginCatalog::new()
        .with_hook(TARGET, "PaymentFailed", "NotifyOps", || {
            Ok(FnHook::optional("NotifyOps", "payment.failed", |args| {
                info!(
                    user_id = ?args.get("user_id"),
                    reason = ?args.get_str("reason"),
                    "Operations notified of failed payment"
                );
                Ok(())
            })
            .into_arc())
        })
        .with_hook(TARGET, "after_payment", "Receipt", || {
            Ok(FnHook::optional("Receipt", "after_payment", |args| {
                info!(transaction_id = ?args.get_str("transaction_id"), "Receipt issued");
                Ok(())
            })
            .into_arc())
        })
}

/// A payment service whose operations run lifecycle points.
#[derive(Debug, Clone)]
pub struct PaymentService {
    lifecycle: LifecycleManager,
}

impl PaymentService {
    pub fn new(lifecycle: LifecycleManager) -> Self {
        Self { lifecycle }
    }

    /// Registers the built-in hooks.
    pub async fn install_hooks(&self, fraud_limit: f64) -> Result<(), AppError> {
        let fraud: Arc<dyn Hook> = Arc::new(FraudCheck::new(fraud_limit));
        let discount: Arc<dyn Hook> = Arc::new(Discount);
        self.lifecycle.register_hook(TARGET, fraud).await?;
        self.lifecycle.register_hook(TARGET, discount).await?;
        Ok(())
    }

    /// Charges `amount` to `user_id`, returning the amount actually charged.
    pub async fn pay(&self, user_id: u64, amount: f64) -> Result<f64, AppError> {
        let mut args = vec![json!(user_id), json!(amount)];

        if let Err(e) = self.lifecycle.run(TARGET, "before_payment", &mut args).await {
            let reason = e.hook_error().map_or_else(|| e.to_string(), |cause| format!("{e}: {cause}"));
            let mut failed = vec![args[0].clone(), args[1].clone(), Value::from(reason)];
            self.lifecycle.run(TARGET, "payment.failed", &mut failed).await?;
            return Err(e.into());
        }

        let charged = args[1].as_f64().unwrap_or(amount);
        let transaction_id = format!("txn-{user_id}-{}", (charged * 100.0).round() as i64);

        let mut done = vec![json!(user_id), json!(charged), json!(transaction_id)];
        self.lifecycle.run(TARGET, "after_payment", &mut done).await?;

        info!(user_id, requested = amount, charged, "Payment processed");
        Ok(charged)
    }
}
