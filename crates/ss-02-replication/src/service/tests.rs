use super::*;
use parking_lot::Mutex;
use shared_types::TransportError;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Duration;

use crate::domain::UpdateCellArgs;

// =============================================================================
// Mocks
// =============================================================================

#[derive(Clone)]
enum PeerBehaviour {
    Ack,
    AckAfter(Duration),
    Fail(TransportError),
    Hang,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SentOperation {
    peer: String,
    encoded: String,
    version: u64,
    secret: String,
}

#[derive(Default)]
struct MockTransport {
    behaviours: HashMap<String, PeerBehaviour>,
    sent: Mutex<Vec<SentOperation>>,
}

impl MockTransport {
    fn with(peers: &[(&str, PeerBehaviour)]) -> Arc<Self> {
        Arc::new(Self {
            behaviours: peers
                .iter()
                .map(|(uri, b)| (uri.to_string(), b.clone()))
                .collect(),
            sent: Mutex::new(Vec::new()),
        })
    }

    fn sent(&self) -> Vec<SentOperation> {
        self.sent.lock().clone()
    }

    fn attempts_to(&self, peer: &str) -> usize {
        self.sent.lock().iter().filter(|s| s.peer == peer).count()
    }
}

#[async_trait]
impl ReplicaTransport for MockTransport {
    async fn send_operation(
        &self,
        peer: &ServiceUri,
        encoded: &str,
        version: Version,
        secret: &str,
    ) -> Result<(), TransportError> {
        self.sent.lock().push(SentOperation {
            peer: peer.to_string(),
            encoded: encoded.to_string(),
            version: version.get(),
            secret: secret.to_string(),
        });

        let behaviour = self
            .behaviours
            .get(peer.as_str())
            .cloned()
            .unwrap_or(PeerBehaviour::Fail(TransportError::Unreachable(
                "unknown peer".into(),
            )));
        match behaviour {
            PeerBehaviour::Ack => Ok(()),
            PeerBehaviour::AckAfter(delay) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
            PeerBehaviour::Fail(e) => Err(e),
            PeerBehaviour::Hang => std::future::pending().await,
        }
    }
}

struct FixedPeers(HashMap<String, Vec<ServiceUri>>);

impl FixedPeers {
    fn sheets(uris: &[&str]) -> Self {
        let mut map = HashMap::new();
        map.insert(
            "fct:sheets".to_string(),
            uris.iter().map(|u| ServiceUri::new(*u)).collect(),
        );
        Self(map)
    }
}

impl PeerResolver for FixedPeers {
    fn resolve(&self, qualified_service_name: &str) -> Vec<ServiceUri> {
        self.0.get(qualified_service_name).cloned().unwrap_or_default()
    }
}

const LOCAL: &str = "http://h1:8080/rest";

fn local() -> ServiceUri {
    ServiceUri::new(LOCAL)
}

fn coordinator(
    peers: &[&str],
    transport: Arc<MockTransport>,
) -> ReplicationCoordinator<FixedPeers, MockTransport> {
    ReplicationCoordinator::new(
        ReplicationConfig::for_testing(),
        FixedPeers::sheets(peers),
        transport,
    )
}

fn update_cell() -> SheetOperation {
    SheetOperation::UpdateCell(UpdateCellArgs {
        sheet_id: "S1".into(),
        cell: "A1".into(),
        raw_value: "42".into(),
    })
}

// =============================================================================
// Versioning
// =============================================================================

#[test]
fn test_versions_start_after_seed() {
    let transport = MockTransport::with(&[]);
    let config = ReplicationConfig {
        initial_version: 9,
        ..ReplicationConfig::for_testing()
    };
    let coordinator = ReplicationCoordinator::new(config, FixedPeers::sheets(&[]), transport);

    assert_eq!(coordinator.current_version(), Version(9));
    assert_eq!(coordinator.next_version(), Version(10));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writers_get_unique_gap_free_versions() {
    let coordinator = Arc::new(coordinator(&[], MockTransport::with(&[])));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move {
                let mut issued = Vec::new();
                for _ in 0..100 {
                    issued.push(coordinator.next_version().get());
                    tokio::task::yield_now().await;
                }
                issued
            })
        })
        .collect();

    let mut all = Vec::new();
    for handle in handles {
        all.extend(handle.await.unwrap());
    }
    let unique: HashSet<u64> = all.iter().copied().collect();
    assert_eq!(unique.len(), 1_600);
    assert_eq!(*all.iter().max().unwrap(), 1_600);
    assert_eq!(coordinator.current_version(), Version(1_600));
}

// =============================================================================
// Propagation
// =============================================================================

#[tokio::test]
async fn test_propagate_without_peers_returns_immediately() {
    let transport = MockTransport::with(&[]);
    let coordinator = coordinator(&[], Arc::clone(&transport));

    let stats = coordinator
        .propagate("updateCell\t{}", Version(1), "fct", &local(), "s3cret")
        .await;

    assert_eq!(stats.peers_targeted, 0);
    assert_eq!(stats.first_ack, None);
    assert!(transport.sent().is_empty());
    assert_eq!(coordinator.metrics().propagations_without_ack, 1);
}

#[tokio::test]
async fn test_propagate_excludes_local_instance() {
    let transport = MockTransport::with(&[(LOCAL, PeerBehaviour::Ack)]);
    let coordinator = coordinator(&[LOCAL], Arc::clone(&transport));

    let stats = coordinator
        .propagate("updateCell\t{}", Version(1), "fct", &local(), "s3cret")
        .await;

    assert_eq!(stats.peers_targeted, 0);
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_propagate_sends_encoding_version_and_secret() {
    let peer = "http://h2:8080/rest";
    let transport = MockTransport::with(&[(peer, PeerBehaviour::Ack)]);
    let coordinator = coordinator(&[LOCAL, peer], Arc::clone(&transport));

    let stats = coordinator
        .propagate("updateCell\t{\"x\":1}", Version(7), "fct", &local(), "s3cret")
        .await;

    assert_eq!(stats.first_ack, Some(ServiceUri::new(peer)));
    assert_eq!(
        transport.sent(),
        vec![SentOperation {
            peer: peer.into(),
            encoded: "updateCell\t{\"x\":1}".into(),
            version: 7,
            secret: "s3cret".into(),
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn test_propagate_returns_on_first_ack_while_slow_peer_pending() {
    let fast = "http://h2:8080/rest";
    let slow = "http://h3:8080/rest";
    let transport = MockTransport::with(&[
        (fast, PeerBehaviour::AckAfter(Duration::from_millis(5))),
        (slow, PeerBehaviour::Hang),
    ]);
    let config = ReplicationConfig {
        request_timeout_ms: 10_000,
        ..ReplicationConfig::for_testing()
    };
    let coordinator =
        ReplicationCoordinator::new(config, FixedPeers::sheets(&[fast, slow]), Arc::clone(&transport));

    let started = tokio::time::Instant::now();
    let stats = coordinator
        .propagate("deleteSpreadsheet\t{}", Version(3), "fct", &local(), "s")
        .await;

    assert_eq!(stats.first_ack, Some(ServiceUri::new(fast)));
    assert_eq!(stats.peers_targeted, 2);
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(transport.attempts_to(slow), 1);
}

#[tokio::test(start_paused = true)]
async fn test_propagate_with_no_ack_still_returns() {
    let down = "http://h2:8080/rest";
    let refusing = "http://h3:8080/rest";
    let transport = MockTransport::with(&[
        (down, PeerBehaviour::Fail(TransportError::Unreachable("refused".into()))),
        (refusing, PeerBehaviour::Fail(TransportError::Rejected { status: 403 })),
    ]);
    let coordinator = coordinator(&[down, refusing], Arc::clone(&transport));

    let stats = coordinator
        .propagate("updateCell\t{}", Version(1), "fct", &local(), "wrong")
        .await;

    assert_eq!(stats.first_ack, None);
    assert_eq!(stats.failures, 2);
    assert!(!stats.acknowledged());
    // Transient failures are retried, rejections are not.
    assert_eq!(transport.attempts_to(down), 2);
    assert_eq!(transport.attempts_to(refusing), 1);

    let metrics = coordinator.metrics();
    assert_eq!(metrics.propagations_without_ack, 1);
    assert_eq!(metrics.send_failures, 2);
}

#[tokio::test(start_paused = true)]
async fn test_hanging_peer_times_out_per_attempt() {
    let peer = "http://h2:8080/rest";
    let transport = MockTransport::with(&[(peer, PeerBehaviour::Hang)]);
    let coordinator = coordinator(&[peer], Arc::clone(&transport));

    let stats = coordinator
        .propagate("updateCell\t{}", Version(1), "fct", &local(), "s")
        .await;

    assert_eq!(stats.first_ack, None);
    assert_eq!(transport.attempts_to(peer), 2);
}

#[tokio::test]
async fn test_replicate_consumes_version_and_encodes() {
    let peer = "http://h2:8080/rest";
    let transport = MockTransport::with(&[(peer, PeerBehaviour::Ack)]);
    let coordinator = coordinator(&[peer], Arc::clone(&transport));

    let stats = coordinator
        .replicate(&update_cell(), "fct", &local(), "s")
        .await
        .unwrap();

    assert_eq!(stats.version, Version(1));
    let sent = transport.sent();
    assert_eq!(sent[0].version, 1);
    assert_eq!(
        SheetOperation::decode(&sent[0].encoded).unwrap(),
        update_cell()
    );
}

// =============================================================================
// Response stamping
// =============================================================================

#[test]
fn test_stamp_response_sets_version_header() {
    let coordinator = coordinator(&[], MockTransport::with(&[]));
    coordinator.next_version();
    coordinator.next_version();

    let mut headers: BTreeMap<String, String> = BTreeMap::new();
    coordinator.stamp_response(&mut headers);

    assert_eq!(headers.get("X-SHEETS-version").map(String::as_str), Some("2"));
}
