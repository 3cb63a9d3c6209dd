//! Lifecycle point declarations.

pub mod definitions;
pub mod registry;

pub use definitions::{LifecyclePointDef, PointKey};
pub use registry::LifecycleRegistry;
