//! # Node Configuration
//!
//! Unified configuration for the coordination subsystems and the runtime.
//!
//! ## Sources (later wins)
//!
//! 1. Built-in defaults
//! 2. TOML file (`SS_CONFIG`), missing keys keep their defaults
//! 3. Environment: `SS_DOMAIN`, `SS_SERVICE_NAME`, `SS_LOCAL_URI`, `SS_SECRET`,
//!    `SS_PRIMARY_URI`
//!
//! ## Security Requirements
//!
//! - `node.secret` MUST NOT be empty in production; it authenticates
//!   replicated operations between instances.

use serde::{Deserialize, Serialize};
use std::net::SocketAddrV4;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use shared_types::{ServiceUri, SHEETS_SERVICE};
use ss_01_service_discovery::{DiscoveryConfig, DEFAULT_MULTICAST_GROUP, MIN_RECV_BUFFER};
use ss_02_replication::ReplicationConfig;
use ss_04_result_cache::CacheConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Failed to parse config file: {0}")]
    Parse(String),

    #[error(
        "SECURITY VIOLATION: inter-instance secret is empty. \
         Set SS_SECRET or node.secret in the config file."
    )]
    EmptySecret,

    #[error("Local URI must be an http(s) URL, got {0:?}")]
    InvalidLocalUri(String),

    #[error("Invalid multicast group {0:?}, expected ipv4:port")]
    InvalidMulticastGroup(String),
}

/// Complete node configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub node: NodeSection,
    pub discovery: DiscoverySection,
    pub replication: ReplicationConfig,
    pub cache: CacheConfig,
    pub http: HttpConfig,
    pub leadership: LeadershipConfig,
}

/// Identity of this instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSection {
    pub domain: String,
    pub service_name: String,
    /// URI under which peers reach this instance, e.g. `http://h1:8080/rest`.
    pub local_uri: String,
    /// Shared secret between instances of the system.
    pub secret: String,
}

impl Default for NodeSection {
    fn default() -> Self {
        Self {
            domain: "default".to_string(),
            service_name: SHEETS_SERVICE.to_string(),
            local_uri: "http://localhost:8080/rest".to_string(),
            secret: String::new(),
        }
    }
}

/// File form of [`DiscoveryConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoverySection {
    /// `ipv4:port`
    pub multicast_group: String,
    pub announce_period_ms: u64,
    /// `None` disables eviction.
    pub stale_after_ms: Option<u64>,
    pub eviction_interval_ms: u64,
    pub recv_buffer_size: usize,
}

impl Default for DiscoverySection {
    fn default() -> Self {
        let defaults = DiscoveryConfig::default();
        Self {
            multicast_group: DEFAULT_MULTICAST_GROUP.to_string(),
            announce_period_ms: defaults.announce_period_ms,
            stale_after_ms: defaults.stale_after_ms,
            eviction_interval_ms: defaults.eviction_interval_ms,
            recv_buffer_size: MIN_RECV_BUFFER,
        }
    }
}

impl DiscoverySection {
    pub fn to_discovery_config(&self) -> Result<DiscoveryConfig, ConfigError> {
        let group: SocketAddrV4 = self
            .multicast_group
            .parse()
            .map_err(|_| ConfigError::InvalidMulticastGroup(self.multicast_group.clone()))?;
        Ok(DiscoveryConfig {
            multicast_group: group,
            announce_period_ms: self.announce_period_ms,
            stale_after_ms: self.stale_after_ms,
            eviction_interval_ms: self.eviction_interval_ms,
            recv_buffer_size: self.recv_buffer_size,
            ..DiscoveryConfig::default()
        })
    }
}

/// Outbound peer HTTP client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 1_000,
            request_timeout_ms: 2_000,
        }
    }
}

impl HttpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Static leadership: the primary is named in configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadershipConfig {
    pub primary_uri: Option<String>,
}

impl NodeConfig {
    /// Defaults, then the TOML file at `path` (if any), then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply `SS_*` overrides. `lookup` is `std::env::var` in production.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(domain) = lookup("SS_DOMAIN") {
            self.node.domain = domain;
        }
        if let Some(service) = lookup("SS_SERVICE_NAME") {
            self.node.service_name = service;
        }
        if let Some(uri) = lookup("SS_LOCAL_URI") {
            self.node.local_uri = uri;
        }
        if let Some(secret) = lookup("SS_SECRET") {
            self.node.secret = secret;
        }
        if let Some(primary) = lookup("SS_PRIMARY_URI") {
            self.leadership.primary_uri = Some(primary).filter(|p| !p.is_empty());
        }
    }

    /// Validate configuration for production readiness.
    ///
    /// # Returns
    ///
    /// Returns `Err` if:
    /// - the shared secret is empty
    /// - the local URI is not an http(s) URL
    /// - the multicast group does not parse
    pub fn validate_for_production(&self) -> Result<(), ConfigError> {
        if self.node.secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        let uri = &self.node.local_uri;
        if !(uri.starts_with("http://") || uri.starts_with("https://")) {
            return Err(ConfigError::InvalidLocalUri(uri.clone()));
        }
        self.discovery.to_discovery_config()?;
        Ok(())
    }

    pub fn local_uri(&self) -> ServiceUri {
        ServiceUri::new(self.node.local_uri.clone())
    }

    pub fn primary_uri(&self) -> Option<ServiceUri> {
        self.leadership.primary_uri.clone().map(ServiceUri::from)
    }

    /// Configuration for in-process clusters and tests: fast timings.
    pub fn for_testing(domain: &str, local_uri: &str) -> Self {
        let discovery = DiscoveryConfig::for_testing();
        Self {
            node: NodeSection {
                domain: domain.to_string(),
                local_uri: local_uri.to_string(),
                secret: "test-secret".to_string(),
                ..NodeSection::default()
            },
            discovery: DiscoverySection {
                announce_period_ms: discovery.announce_period_ms,
                stale_after_ms: discovery.stale_after_ms,
                eviction_interval_ms: discovery.eviction_interval_ms,
                ..DiscoverySection::default()
            },
            replication: ReplicationConfig::for_testing(),
            cache: CacheConfig::for_testing(),
            http: HttpConfig::default(),
            leadership: LeadershipConfig::default(),
        }
    }
}
