//! Lifecycle declarations and explicit hook ordering.
//!
//! Names are carried in values rather than table keys so that target,
//! point, and hook identifiers keep their exact spelling.

use serde::{Deserialize, Serialize};

/// A target type and the lifecycle points it declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Target type identifier (e.g. `"PaymentService"`).
    pub name: String,
    /// Declared lifecycle points.
    #[serde(default)]
    pub points: Vec<PointConfig>,
}

/// One lifecycle point with its ordered parameter contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointConfig {
    /// Point name, unique within its target.
    pub name: String,
    /// Parameter names in positional order.
    #[serde(default)]
    pub parameters: Vec<String>,
}

/// Explicit execution order for one `(target, point)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelEntry {
    /// Target type identifier.
    pub target: String,
    /// Lifecycle point name.
    pub point: String,
    /// Hook ids in the order they must run.
    #[serde(default)]
    pub order: Vec<String>,
}
