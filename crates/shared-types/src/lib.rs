//! # Shared Types Crate
//!
//! Value types, shared driven ports and wire constants used by every
//! subsystem of the sheets coordination core.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: all cross-subsystem types are defined here.
//! - **Newtypes over primitives**: versions, write-times and URIs are distinct
//!   types so they cannot be mixed up at call sites.

pub mod entities;
pub mod errors;
pub mod ports;
pub mod retry;
pub mod wire;

pub use entities::*;
pub use errors::*;
pub use ports::*;
pub use retry::RetryPolicy;
pub use wire::*;
