//! Announcement wire codec.
//!
//! Wire format: UTF-8 text, `serviceName<TAB>serviceURI`. The service name is
//! domain-qualified by convention (`"<domain>:<service>"`).

use shared_types::{qualified_service_name, ServiceUri, FIELD_DELIMITER};

use super::DiscoveryError;

/// A single assertion that `uri` currently serves `service_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub service_name: String,
    pub uri: ServiceUri,
}

impl Announcement {
    pub fn new(service_name: impl Into<String>, uri: ServiceUri) -> Self {
        Self {
            service_name: service_name.into(),
            uri,
        }
    }

    /// Announcement for `service` in `domain`, qualified as `"<domain>:<service>"`.
    pub fn for_domain(domain: &str, service: &str, uri: ServiceUri) -> Self {
        Self::new(qualified_service_name(domain, service), uri)
    }

    pub fn encode(&self) -> String {
        format!("{}{}{}", self.service_name, FIELD_DELIMITER, self.uri)
    }

    pub fn parse(text: &str) -> Result<Self, DiscoveryError> {
        let fields: Vec<&str> = text.split(FIELD_DELIMITER).collect();
        if fields.len() != 2 {
            return Err(DiscoveryError::MalformedAnnouncement {
                fields: fields.len(),
            });
        }
        let (name, uri) = (fields[0].trim(), fields[1].trim());
        if name.is_empty() || uri.is_empty() {
            return Err(DiscoveryError::EmptyField);
        }
        Ok(Self::new(name, ServiceUri::new(uri)))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DiscoveryError> {
        let text = std::str::from_utf8(bytes).map_err(|_| DiscoveryError::InvalidEncoding)?;
        Self::parse(text)
    }
}
