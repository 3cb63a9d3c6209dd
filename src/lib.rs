//! Payment service demo built on the lifecycle hook engine.

pub mod payment;
