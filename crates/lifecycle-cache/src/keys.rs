//! Cache key builders for resolution cache entries.
//!
//! Centralising key construction keeps writers and invalidators in
//! agreement on the key layout.

/// Namespace used when configuration does not provide one.
pub const DEFAULT_NAMESPACE: &str = "lifecycle.hooks";

/// Cache key for the discovered hook ids of one `(target, point)` pair.
pub fn resolution(namespace: &str, target: &str, point: &str) -> String {
    format!("{namespace}:{target}:{point}")
}

/// Pattern matching every resolution entry of a target.
pub fn resolution_target_pattern(namespace: &str, target: &str) -> String {
    format!("{namespace}:{target}:*")
}

/// Pattern matching every resolution entry in a namespace.
pub fn resolution_pattern(namespace: &str) -> String {
    format!("{namespace}:*")
}
