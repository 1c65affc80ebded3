//! # Sheets Coordination Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── cluster.rs        # In-process cluster + loopback peer transport
//! └── integration/      # Cross-subsystem flows
//!     ├── discovery_flows.rs
//!     ├── replication_flows.rs
//!     └── import_flows.rs
//!
//! tests/benches/
//! └── coordination_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ss-tests
//! cargo test -p ss-tests integration::replication_flows
//! cargo bench -p ss-tests
//! ```

pub mod cluster;
pub mod integration;
