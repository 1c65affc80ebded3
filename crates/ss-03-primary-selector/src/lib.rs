//! # Primary Selector Subsystem
//!
//! Decides whether this instance may execute a write. Exactly one instance per
//! domain is primary, as reported by an external leadership oracle; every
//! other instance answers writes with a redirect to it.
//!
//! ## Architecture
//!
//! - **Domain Layer:** `Role`, `WriteRequest`, `WriteDecision`, redirect construction
//! - **Ports Layer:** `PrimarySelectorApi` (inbound), `LeadershipOracle` (outbound)
//! - **Service Layer:** `PrimarySelector` (cached primary pointer + role watch channel)
//! - **Adapters Layer:** `StaticLeadershipOracle`
//!
//! ## Example
//!
//! ```rust
//! use ss_03_primary_selector::{
//!     PrimarySelector, ServiceUri, StaticLeadershipOracle, WriteDecision, WriteRequest,
//! };
//!
//! let oracle = StaticLeadershipOracle::new(Some(ServiceUri::new("http://h2/rest")));
//! let selector = PrimarySelector::new(ServiceUri::new("http://h1/rest"), &oracle);
//!
//! let request = WriteRequest::parse("/spreadsheets/S1").unwrap();
//! assert_eq!(
//!     selector.gate_write(&request),
//!     WriteDecision::Redirect { location: "http://h2/rest/spreadsheets/S1".into() }
//! );
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::StaticLeadershipOracle;
pub use domain::{redirect_location, Role, SelectorError, WriteDecision, WriteRequest};
pub use ports::{LeadershipOracle, PrimaryChangeCallback, PrimarySelectorApi};
pub use service::PrimarySelector;
pub use shared_types::ServiceUri;
