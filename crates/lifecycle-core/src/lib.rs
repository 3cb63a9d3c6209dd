//! # lifecycle-core
//!
//! What every other lifecycle crate links against: the layered
//! [`config::LifecycleConfig`], the [`traits::CacheProvider`] seam that
//! cache backends implement, and [`AppError`].
//!
//! Nothing here knows about hooks; that lives in `lifecycle-hooks`.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
