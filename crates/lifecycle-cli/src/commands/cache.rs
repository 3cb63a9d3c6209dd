//! Resolution cache management commands.

use clap::{Args, Subcommand};
use serde::Serialize;

use lifecycle_cache::keys;
use lifecycle_core::error::AppError;
use lifecycle_hooks::hooks::ResolutionCache;
use lifecycle_hooks::lifecycle::PointKey;

use crate::output::{self, OutputFormat};

/// Arguments for cache commands
#[derive(Debug, Args)]
pub struct CacheArgs {
    /// Cache subcommand
    #[command(subcommand)]
    pub command: CacheCommand,
}

/// Cache subcommands
#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Show the persisted discovered hook ids of a lifecycle point
    Show {
        /// Target type
        target: String,
        /// Lifecycle point
        point: String,
    },
    /// Delete persisted resolutions
    Clear {
        /// Only clear entries of this target type
        #[arg(short, long)]
        target: Option<String>,
        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Serialize)]
struct CachedEntry<'a> {
    key: String,
    hooks: Option<&'a [String]>,
}

pub async fn execute(args: &CacheArgs, config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let Some(store) = super::connect_cache(&config).await? else {
        output::print_warning("Persisted resolution cache is disabled ([cache] enabled = false)");
        return Ok(());
    };
    if config.cache.provider == "memory" {
        output::print_warning("The memory provider is local to each process; this run starts empty");
    }

    match &args.command {
        CacheCommand::Show { target, point } => {
            let cache = ResolutionCache::from_config(&config.cache, Some(store));
            let ids = cache.discovered_ids(&PointKey::new(target.as_str(), point.as_str())).await;
            let key = keys::resolution(cache.namespace(), target, point);

            match format {
                OutputFormat::Json => output::print_json(&CachedEntry {
                    key,
                    hooks: ids.as_deref(),
                })?,
                OutputFormat::Table => {
                    output::print_kv("Key", &key);
                    match ids {
                        Some(ids) if ids.is_empty() => output::print_kv("Hooks", "(discovery found none)"),
                        Some(ids) => output::print_kv("Hooks", ids.join(", ")),
                        None => output::print_kv("Hooks", "(not cached)"),
                    }
                }
            }
        }
        CacheCommand::Clear { target, force } => {
            let pattern = match target {
                Some(t) => keys::resolution_target_pattern(&config.cache.key, t),
                None => keys::resolution_pattern(&config.cache.key),
            };

            if !force {
                let confirmed = dialoguer::Confirm::new()
                    .with_prompt(format!("Delete every cache entry matching '{pattern}'?"))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;
                if !confirmed {
                    output::print_warning("Aborted");
                    return Ok(());
                }
            }

            let removed = store.delete_pattern(&pattern).await?;
            output::print_success(&format!("Removed {removed} cached resolution(s) matching '{pattern}'"));
        }
    }

    Ok(())
}
