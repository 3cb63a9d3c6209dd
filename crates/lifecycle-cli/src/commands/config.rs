//! `config show | validate | generate`.

use std::path::Path;

use clap::{Args, Subcommand};

use lifecycle_core::config::LifecycleConfig;
use lifecycle_core::error::AppError;

use crate::output::{self, OutputFormat};

const DEFAULT_CONFIG: &str = include_str!("../../../../config/default.toml");

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration after layering
    Show,
    /// Load the configuration and declare every target it lists
    Validate,
    /// Write the bundled default configuration
    Generate {
        /// Destination file
        #[arg(short, long, default_value = "config/generated.toml")]
        output: String,
        /// Replace the destination if it exists
        #[arg(long)]
        overwrite: bool,
    },
}

pub async fn execute(args: &ConfigArgs, config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => show(config_path, format),
        ConfigCommand::Validate => validate(config_path).await,
        ConfigCommand::Generate { output, overwrite } => generate(output, *overwrite).await,
    }
}

fn show(config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    match format {
        OutputFormat::Json => output::print_json(&config),
        OutputFormat::Table => {
            println!("{config:#?}");
            Ok(())
        }
    }
}

async fn validate(config_path: &str) -> Result<(), AppError> {
    let config = super::load_config(config_path).inspect_err(|e| {
        output::print_error(&format!("Cannot load '{config_path}': {e}"));
    })?;

    // Conflicting declarations only surface once the targets are declared.
    let manager = super::build_manager(&config, None).await?;
    let targets = manager.registry().targets().await;

    output::print_success(&format!("'{config_path}' is valid"));
    print_summary(&config, &targets);
    Ok(())
}

fn print_summary(config: &LifecycleConfig, targets: &[String]) {
    output::print_kv("Debug traces", config.debug);
    output::print_kv("Discovery", config.discovery.enabled);
    output::print_kv("Log failures", config.error_handling.log_failures);
    let persisted = if config.cache.enabled { "persisted" } else { "memo only" };
    output::print_kv("Cache", format!("{} ({persisted})", config.cache.provider));
    output::print_kv("Targets", targets.join(", "));
    output::print_kv("Kernel entries", config.kernel.len());
}

async fn generate(out_path: &str, overwrite: bool) -> Result<(), AppError> {
    let path = Path::new(out_path);
    if !overwrite && tokio::fs::try_exists(path).await? {
        return Err(AppError::validation(format!(
            "'{out_path}' already exists; pass --overwrite to replace it"
        )));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, DEFAULT_CONFIG).await?;

    output::print_success(&format!("Default configuration written to '{out_path}'"));
    Ok(())
}
