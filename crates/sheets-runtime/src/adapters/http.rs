//! Peer HTTP client.
//!
//! - `POST {peer}/replication/ops?secret=...`, header `X-SHEETS-version`,
//!   body = encoded operation. Any 2xx is an ack.
//! - `GET {peer}/spreadsheets/{sheetId}/{range}?secret=...` returning
//!   `{"values": [[...]], "writeTime": n}`.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use shared_types::{ImportKey, ServiceUri, TransportError, Version, VERSION_HEADER};
use ss_02_replication::ReplicaTransport;
use ss_04_result_cache::{FetchedRange, RemoteRangeFetcher};

/// Everything an instance needs to talk to its peers.
pub trait PeerTransport: ReplicaTransport + RemoteRangeFetcher {}

impl<T: ReplicaTransport + RemoteRangeFetcher> PeerTransport for T {}

pub struct HttpPeerClient {
    client: Client,
}

impl HttpPeerClient {
    pub fn new(connect_timeout: Duration, request_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()?;
        Ok(Self { client })
    }

    pub fn replication_url(peer: &ServiceUri) -> String {
        format!("{}/replication/ops", peer.base())
    }

    pub fn range_url(peer: &ServiceUri, key: &ImportKey) -> String {
        format!("{}/spreadsheets/{}/{}", peer.base(), key.sheet_id, key.range)
    }
}

fn classify(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else if let Some(status) = error.status() {
        TransportError::Rejected {
            status: status.as_u16(),
        }
    } else if error.is_decode() {
        TransportError::Malformed(error.to_string())
    } else {
        TransportError::Unreachable(error.to_string())
    }
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(TransportError::Rejected {
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl ReplicaTransport for HttpPeerClient {
    async fn send_operation(
        &self,
        peer: &ServiceUri,
        encoded: &str,
        version: Version,
        secret: &str,
    ) -> Result<(), TransportError> {
        let response = self
            .client
            .post(Self::replication_url(peer))
            .query(&[("secret", secret)])
            .header(VERSION_HEADER, version.to_string())
            .header(reqwest::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(encoded.to_string())
            .send()
            .await
            .map_err(classify)?;
        check_status(response).map(|_| ())
    }
}

#[async_trait]
impl RemoteRangeFetcher for HttpPeerClient {
    async fn fetch_range(
        &self,
        peer: &ServiceUri,
        key: &ImportKey,
        secret: &str,
    ) -> Result<FetchedRange, TransportError> {
        let response = self
            .client
            .get(Self::range_url(peer, key))
            .query(&[("secret", secret)])
            .send()
            .await
            .map_err(classify)?;
        check_status(response)?
            .json::<FetchedRange>()
            .await
            .map_err(|e| TransportError::Malformed(e.to_string()))
    }
}
