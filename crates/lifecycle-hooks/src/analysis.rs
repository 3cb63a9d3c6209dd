//! Lifecycle analysis summaries.

use serde::Serialize;

use crate::hooks::catalog::HookSource;
use crate::hooks::definitions::Severity;

/// A hook as it would run for a point.
#[derive(Debug, Clone, Serialize)]
pub struct HookSummary {
    pub id: String,
    pub severity: Severity,
    pub source: HookSource,
    pub disabled: bool,
}

/// One declared point of a target.
#[derive(Debug, Clone, Serialize)]
pub struct PointSummary {
    pub name: String,
    pub parameters: Vec<String>,
    /// Kernel order, when one is declared.
    pub explicit_order: Option<Vec<String>>,
    /// Naming candidates probed by discovery.
    pub candidates: Vec<String>,
    /// Resolved hooks in execution order.
    pub hooks: Vec<HookSummary>,
}

/// Everything known about a target type's lifecycle.
#[derive(Debug, Clone, Serialize)]
pub struct LifecycleSummary {
    pub target: String,
    pub points: Vec<PointSummary>,
}

impl LifecycleSummary {
    /// Total hooks across all points.
    pub fn hook_count(&self) -> usize {
        self.points.iter().map(|p| p.hooks.len()).sum()
    }

    /// Hooks with the given severity across all points.
    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.points
            .iter()
            .flat_map(|p| &p.hooks)
            .filter(|h| h.severity == severity)
            .count()
    }

    /// Points with a kernel order.
    pub fn ordered_points(&self) -> usize {
        self.points
            .iter()
            .filter(|p| p.explicit_order.is_some())
            .count()
    }
}
