//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod cache;
pub mod declarations;
pub mod discovery;
pub mod logging;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use self::cache::CacheConfig;
use self::declarations::{KernelEntry, TargetConfig};
use self::discovery::{DiscoveryConfig, ErrorHandlingConfig};
use self::logging::LoggingConfig;

use crate::error::AppError;

/// Root configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Record an execution trace for every dispatch.
    #[serde(default)]
    pub debug: bool,
    /// Hook discovery settings.
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    /// Resolution cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Failure reporting settings.
    #[serde(default)]
    pub error_handling: ErrorHandlingConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Declared lifecycle contracts per target type.
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
    /// Explicit hook execution order.
    #[serde(default)]
    pub kernel: Vec<KernelEntry>,
}

impl LifecycleConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `LIFECYCLE_`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false));

        Self::build(builder)
    }

    /// Load configuration from a single TOML file plus the environment.
    pub fn load_from(path: &str) -> Result<Self, AppError> {
        let builder =
            config::Config::builder().add_source(config::File::with_name(path).required(true));

        Self::build(builder)
    }

    /// Parse configuration from an inline TOML document.
    pub fn from_toml(source: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let parsed: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        parsed.validate()?;
        Ok(parsed)
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, AppError> {
        let config = builder
            .add_source(
                config::Environment::with_prefix("LIFECYCLE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let parsed: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        parsed.validate()?;

        debug!(
            targets = parsed.targets.len(),
            kernel_entries = parsed.kernel.len(),
            cache_provider = %parsed.cache.provider,
            "Lifecycle configuration loaded"
        );
        Ok(parsed)
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), AppError> {
        match self.cache.provider.as_str() {
            "memory" | "redis" => {}
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown cache provider: '{other}'. Supported: memory, redis"
                )));
            }
        }

        let mut seen_targets = HashSet::new();
        for target in &self.targets {
            if !seen_targets.insert(target.name.as_str()) {
                return Err(AppError::configuration(format!(
                    "Target '{}' is declared more than once",
                    target.name
                )));
            }

            let mut seen_points = HashSet::new();
            for point in &target.points {
                if !seen_points.insert(point.name.as_str()) {
                    return Err(AppError::configuration(format!(
                        "Lifecycle point '{}' is declared more than once in '{}'",
                        point.name, target.name
                    )));
                }
            }
        }

        Ok(())
    }

    /// Returns the declaration for a target, if any.
    pub fn target(&self, name: &str) -> Option<&TargetConfig> {
        self.targets.iter().find(|t| t.name == name)
    }
}
