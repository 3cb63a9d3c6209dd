//! Explicit hook order source ("kernel").

use std::collections::HashMap;
use std::fmt;

use lifecycle_core::config::declarations::KernelEntry;

use crate::lifecycle::PointKey;

/// Supplies an explicit execution order for a `(target, point)` pair.
pub trait HookKernel: Send + Sync + fmt::Debug {
    /// Hook ids in the order they must run, or `None` when the pair has no
    /// explicit order.
    fn explicit_order(&self, target: &str, point: &str) -> Option<Vec<String>>;
}

/// Kernel backed by an in-memory table.
#[derive(Debug, Clone, Default)]
pub struct StaticKernel {
    orders: HashMap<PointKey, Vec<String>>,
}

impl StaticKernel {
    /// Creates an empty kernel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a kernel from the `[[kernel]]` configuration tables.
    ///
    /// A later entry for the same pair replaces an earlier one.
    pub fn from_entries(entries: &[KernelEntry]) -> Self {
        let orders = entries
            .iter()
            .map(|e| (PointKey::new(&e.target, &e.point), e.order.clone()))
            .collect();
        Self { orders }
    }

    /// Sets the order of one pair.
    pub fn with_order<I, S>(mut self, target: &str, point: &str, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.orders.insert(
            PointKey::new(target, point),
            order.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// Number of pairs with an explicit order.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Whether no pair has an explicit order.
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

impl HookKernel for StaticKernel {
    fn explicit_order(&self, target: &str, point: &str) -> Option<Vec<String>> {
        self.orders.get(&PointKey::new(target, point)).cloned()
    }
}
