//! # Ports Layer
//!
//! - **inbound**: `PrimarySelectorApi`, used by the write path
//! - **outbound**: `LeadershipOracle`, the external coordination service

pub mod inbound;
pub mod outbound;

pub use inbound::PrimarySelectorApi;
pub use outbound::{LeadershipOracle, PrimaryChangeCallback};
