//! Lifecycle registry: per target type, the declared points and their
//! parameter contracts.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{InvalidPointReason, LifecycleError};

use super::definitions::LifecyclePointDef;

/// Registry of declared lifecycle points, grouped by target type.
///
/// Points keep their declaration order so that listings are stable.
#[derive(Debug, Default)]
pub struct LifecycleRegistry {
    targets: RwLock<HashMap<String, Vec<LifecyclePointDef>>>,
}

impl LifecycleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a lifecycle point.
    ///
    /// Re-declaring with the same parameters is a no-op. A point's contract
    /// never changes once declared, so a different parameter list is
    /// rejected.
    pub async fn declare(&self, def: LifecyclePointDef) -> Result<(), LifecycleError> {
        let mut targets = self.targets.write().await;
        let points = targets.entry(def.target.clone()).or_default();

        if let Some(existing) = points.iter().find(|p| p.name == def.name) {
            if existing.parameters == def.parameters {
                debug!(target_type = %def.target, point = %def.name, "Lifecycle point already declared");
                return Ok(());
            }
            return Err(LifecycleError::ConflictingDeclaration {
                target: def.target.clone(),
                point: def.name.clone(),
                existing: existing.parameters.to_vec(),
                requested: def.parameters.to_vec(),
            });
        }

        info!(
            target_type = %def.target,
            point = %def.name,
            parameters = def.parameters.len(),
            "Lifecycle point declared"
        );
        points.push(def);
        Ok(())
    }

    /// Parameter names of a declared point.
    pub async fn lookup(&self, target: &str, point: &str) -> Option<Arc<[String]>> {
        let targets = self.targets.read().await;
        targets
            .get(target)?
            .iter()
            .find(|p| p.name == point)
            .map(|p| Arc::clone(&p.parameters))
    }

    /// Whether `target` declared at least one lifecycle point.
    pub async fn has_any(&self, target: &str) -> bool {
        let targets = self.targets.read().await;
        targets.get(target).is_some_and(|points| !points.is_empty())
    }

    /// Validates `(target, point)` and returns its parameter contract.
    ///
    /// Distinguishes a target type without any lifecycle from a wrong point
    /// name.
    pub async fn contract(&self, target: &str, point: &str) -> Result<Arc<[String]>, LifecycleError> {
        let targets = self.targets.read().await;
        let points = match targets.get(target) {
            Some(points) if !points.is_empty() => points,
            _ => {
                return Err(LifecycleError::InvalidLifecyclePoint {
                    target: target.to_string(),
                    point: point.to_string(),
                    reason: InvalidPointReason::NoLifecyclePoints,
                });
            }
        };

        points
            .iter()
            .find(|p| p.name == point)
            .map(|p| Arc::clone(&p.parameters))
            .ok_or_else(|| LifecycleError::InvalidLifecyclePoint {
                target: target.to_string(),
                point: point.to_string(),
                reason: InvalidPointReason::PointNotDefined,
            })
    }

    /// Declared points of a target, in declaration order.
    pub async fn points(&self, target: &str) -> Vec<LifecyclePointDef> {
        let targets = self.targets.read().await;
        targets.get(target).cloned().unwrap_or_default()
    }

    /// All target types with at least one declared point, sorted.
    pub async fn targets(&self) -> Vec<String> {
        let targets = self.targets.read().await;
        let mut names: Vec<String> = targets
            .iter()
            .filter(|(_, points)| !points.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }
}
