//! Hook discovery and failure-handling configuration.

use serde::{Deserialize, Serialize};

/// Hook discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Whether the discovery collaborator is consulted during resolution.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

/// How swallowed hook failures are reported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorHandlingConfig {
    /// Emit an error event for every optional hook failure.
    #[serde(default = "default_true")]
    pub log_failures: bool,
}

impl Default for ErrorHandlingConfig {
    fn default() -> Self {
        Self {
            log_failures: default_true(),
        }
    }
}

fn default_true() -> bool {
    true
}
