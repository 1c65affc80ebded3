//! Domain layer for replication.

mod errors;
mod operation;
mod reorder;
mod value_objects;
mod version;

pub use errors::*;
pub use operation::*;
pub use reorder::*;
pub use value_objects::*;
pub use version::*;
