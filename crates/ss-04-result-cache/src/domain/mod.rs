//! Domain layer for the result cache.

mod cache;
mod config;
mod entry;
mod errors;

pub use cache::*;
pub use config::*;
pub use entry::*;
pub use errors::*;
