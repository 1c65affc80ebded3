//! Write-gate decision and redirect construction.

use shared_types::ServiceUri;

use super::SelectorError;

/// Target of an incoming mutating request, relative to the service URI
/// (e.g. path `/spreadsheets/S1/A1`, query `userId=bob&password=x`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRequest {
    pub path: String,
    pub query: Option<String>,
}

impl WriteRequest {
    pub fn new(path: impl Into<String>, query: Option<String>) -> Self {
        Self {
            path: path.into(),
            query: query.filter(|q| !q.is_empty()),
        }
    }

    /// Parse a request target of the form `/path?query`.
    pub fn parse(target: &str) -> Result<Self, SelectorError> {
        if !target.starts_with('/') {
            return Err(SelectorError::InvalidRequestTarget(target.to_string()));
        }
        Ok(match target.split_once('?') {
            Some((path, query)) => Self::new(path, Some(query.to_string())),
            None => Self::new(target, None),
        })
    }

    pub fn path_and_query(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{}", self.path, query),
            None => self.path.clone(),
        }
    }
}

/// What the write path must do with a mutating request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteDecision {
    /// This instance is the primary: run the operation locally.
    Execute,
    /// Send the client to the primary, same path and query.
    Redirect { location: String },
    /// Nobody is primary yet; the request must be refused, not run locally.
    NoPrimary,
}

impl WriteDecision {
    pub fn is_execute(&self) -> bool {
        matches!(self, Self::Execute)
    }
}

/// `primary` + original path and query.
pub fn redirect_location(primary: &ServiceUri, request: &WriteRequest) -> String {
    format!("{}{}", primary.base(), request.path_and_query())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_preserves_path_and_query() {
        let primary = ServiceUri::new("http://h2:8080/rest/");
        let request = WriteRequest::parse("/spreadsheets/S1/A1?userId=bob&password=pw").unwrap();

        assert_eq!(
            redirect_location(&primary, &request),
            "http://h2:8080/rest/spreadsheets/S1/A1?userId=bob&password=pw"
        );
    }

    #[test]
    fn test_empty_query_is_dropped() {
        let request = WriteRequest::parse("/spreadsheets/S1?").unwrap();
        assert_eq!(request.query, None);
        assert_eq!(request.path_and_query(), "/spreadsheets/S1");
    }

    #[test]
    fn test_relative_target_is_rejected() {
        assert_eq!(
            WriteRequest::parse("spreadsheets/S1"),
            Err(SelectorError::InvalidRequestTarget("spreadsheets/S1".into()))
        );
    }
}
