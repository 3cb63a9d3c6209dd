//! Collaborator capabilities consumed by the engine, with in-process
//! implementations.

pub mod declaration;
pub mod discovery;
pub mod kernel;
pub mod plugins;

pub use declaration::{LifecycleDeclaration, StaticDeclarations};
pub use discovery::{HookDiscovery, HookFactory};
pub use kernel::{HookKernel, StaticKernel};
pub use plugins::PluginCatalog;
