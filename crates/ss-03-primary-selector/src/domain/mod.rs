//! Domain layer for primary selection.

mod errors;
mod role;
mod write_gate;

pub use errors::*;
pub use role::*;
pub use write_gate::*;
