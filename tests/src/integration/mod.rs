//! # Integration Test Flows
//!
//! Whole instances wired together through the in-process cluster.

pub mod discovery_flows;
pub mod import_flows;
pub mod replication_flows;
