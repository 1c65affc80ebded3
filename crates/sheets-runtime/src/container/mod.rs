//! # Node Container
//!
//! Configuration and the dependency container holding every coordination
//! subsystem of one sheets instance, wired to its adapters.

pub mod config;
pub mod subsystems;

pub use config::{ConfigError, NodeConfig};
pub use subsystems::{Coordinator, Discovery, Imports, NodeContainer, Replica};
