//! Argument parsing and the wiring shared by every subcommand.

pub mod analyze;
pub mod cache;
pub mod candidates;
pub mod config;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::debug;

use lifecycle_cache::CacheManager;
use lifecycle_core::config::LifecycleConfig;
use lifecycle_core::error::AppError;
use lifecycle_core::traits::cache::CacheProvider;
use lifecycle_hooks::LifecycleManager;

use crate::output::OutputFormat;

/// Inspect lifecycle declarations, hook ordering and the resolution cache
#[derive(Debug, Parser)]
#[command(name = "lifecycle", version, about, long_about = None)]
pub struct Cli {
    /// TOML file holding `[cache]`, `[[targets]]` and `[[kernel]]`
    #[arg(short, long, env = "LIFECYCLE_CONFIG", default_value = "config/default.toml")]
    pub config: String,

    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show declared lifecycle points and how their hooks resolve
    Analyze(analyze::AnalyzeArgs),
    /// Show the discovery naming candidates of lifecycle points
    Candidates(candidates::CandidatesArgs),
    /// Resolution cache management
    Cache(cache::CacheArgs),
    /// Show, validate or generate configuration
    Config(config::ConfigArgs),
}

impl Cli {
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Analyze(args) => analyze::execute(args, &self.config, self.format).await,
            Commands::Candidates(args) => candidates::execute(args, self.format),
            Commands::Cache(args) => cache::execute(args, &self.config, self.format).await,
            Commands::Config(args) => config::execute(args, &self.config, self.format).await,
        }
    }
}

pub fn load_config(config_path: &str) -> Result<LifecycleConfig, AppError> {
    LifecycleConfig::load_from(config_path)
}

/// The configured backend, or `None` when only the in-process memo is used.
pub async fn connect_cache(config: &LifecycleConfig) -> Result<Option<Arc<dyn CacheProvider>>, AppError> {
    if config.cache.enabled {
        Ok(Some(CacheManager::new(&config.cache).await?.shared()))
    } else {
        debug!("Persisted resolution cache disabled");
        Ok(None)
    }
}

/// Declares every configured target and wires kernel, discovery and cache.
pub async fn build_manager(
    config: &LifecycleConfig,
    store: Option<Arc<dyn CacheProvider>>,
) -> Result<LifecycleManager, AppError> {
    Ok(LifecycleManager::from_config(config, store).await?)
}
