//! # Adapters Layer

pub mod static_oracle;

pub use static_oracle::StaticLeadershipOracle;
