//! Lifecycle declaration source.

use std::fmt;

use lifecycle_core::config::declarations::TargetConfig;

use crate::lifecycle::LifecyclePointDef;

/// Supplies the lifecycle points a target type declares.
pub trait LifecycleDeclaration: Send + Sync + fmt::Debug {
    /// Declared points of `target`, with their parameter contracts.
    fn declared_points(&self, target: &str) -> Vec<LifecyclePointDef>;

    /// Every target type this source knows about.
    fn targets(&self) -> Vec<String>;
}

/// Declarations held in memory, usually loaded from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticDeclarations {
    points: Vec<LifecyclePointDef>,
}

impl StaticDeclarations {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a source from the `[[targets]]` configuration tables.
    pub fn from_config(targets: &[TargetConfig]) -> Self {
        let points = targets
            .iter()
            .flat_map(|target| {
                target.points.iter().map(|point| {
                    LifecyclePointDef::new(&target.name, &point.name, point.parameters.iter().cloned())
                })
            })
            .collect();
        Self { points }
    }

    /// Adds one point.
    pub fn with_point<I, S>(mut self, target: &str, point: &str, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.points.push(LifecyclePointDef::new(target, point, parameters));
        self
    }
}

impl LifecycleDeclaration for StaticDeclarations {
    fn declared_points(&self, target: &str) -> Vec<LifecyclePointDef> {
        self.points
            .iter()
            .filter(|p| p.target == target)
            .cloned()
            .collect()
    }

    fn targets(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for point in &self.points {
            if !names.contains(&point.target) {
                names.push(point.target.clone());
            }
        }
        names
    }
}
