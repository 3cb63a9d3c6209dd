//! Lifecycle analysis commands.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use lifecycle_core::error::AppError;
use lifecycle_hooks::LifecycleManager;
use lifecycle_hooks::analysis::LifecycleSummary;
use lifecycle_hooks::lifecycle::PointKey;

use crate::output::{self, OutputFormat};

/// Arguments for `analyze`
#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Target type to analyze; all declared targets when omitted
    pub target: Option<String>,
}

/// One declared target
#[derive(Debug, Serialize, Tabled)]
struct TargetRow {
    target: String,
    points: usize,
    ordered: usize,
    hooks: usize,
}

/// One lifecycle point of a target
#[derive(Debug, Serialize, Tabled)]
struct PointRow {
    point: String,
    parameters: String,
    order: String,
    candidates: String,
    /// Hook ids persisted by a previous discovery.
    cached: String,
}

pub async fn execute(args: &AnalyzeArgs, config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let store = super::connect_cache(&config).await?;
    let manager = super::build_manager(&config, store).await?;

    match &args.target {
        None => {
            let mut rows = Vec::new();
            for target in manager.registry().targets().await {
                if let Some(summary) = manager.describe(&target).await {
                    rows.push(TargetRow {
                        points: summary.points.len(),
                        ordered: summary.ordered_points(),
                        hooks: summary.hook_count(),
                        target,
                    });
                }
            }
            output::print_rows(&rows, format)
        }
        Some(target) => {
            let summary = manager.describe(target).await.ok_or_else(|| {
                AppError::not_found(format!("Target '{target}' declares no lifecycle points"))
            })?;
            match format {
                OutputFormat::Json => output::print_json(&summary),
                OutputFormat::Table => {
                    let rows = point_rows(&manager, &summary).await;
                    output::print_rows(&rows, format)
                }
            }
        }
    }
}

async fn point_rows(manager: &LifecycleManager, summary: &LifecycleSummary) -> Vec<PointRow> {
    let cache = manager.catalog().cache();
    let mut rows = Vec::with_capacity(summary.points.len());
    for point in &summary.points {
        let key = PointKey::new(summary.target.as_str(), point.name.as_str());
        let cached = match cache.discovered_ids(&key).await {
            Some(ids) if ids.is_empty() => "(none found)".to_string(),
            Some(ids) => ids.join(", "),
            None => "-".to_string(),
        };
        rows.push(PointRow {
            point: point.name.clone(),
            parameters: point.parameters.join(", "),
            order: point
                .explicit_order
                .as_ref()
                .map(|o| o.join(" > "))
                .unwrap_or_else(|| "-".to_string()),
            candidates: point.candidates.join(", "),
            cached,
        });
    }
    rows
}
