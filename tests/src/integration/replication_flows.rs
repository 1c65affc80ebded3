//! # Replication Flows
//!
//! Writes land on the primary, are versioned and reach the replicas;
//! replicas redirect writes; a new primary takes over cleanly.
//!
//! ```text
//! client ──write──→ replica ──307──→ client ──write──→ primary
//!                                                        │ apply, version
//!                                   ┌────────────────────┼────────────────┐
//!                                   ↓                    ↓                ↓
//!                               replica A            replica B      (first ack
//!                                                                    returns)
//! ```

#[cfg(test)]
mod tests {
    use shared_types::{ServiceUri, Spreadsheet, VERSION_HEADER};
    use sheets_runtime::handlers::LOCATION_HEADER;
    use ss_02_replication::SheetOperation;
    use ss_03_primary_selector::{Role, WriteRequest};

    use crate::cluster::{eventually, Cluster, Fault};

    const PRIMARY: &str = "http://fct1:8080/rest";

    async fn domain_cluster() -> Cluster {
        let mut cluster = Cluster::new();
        for uri in [PRIMARY, "http://fct2:8080/rest", "http://fct3:8080/rest"] {
            cluster.spawn("fct", uri, Some(PRIMARY)).unwrap();
        }
        assert!(cluster.await_resolved(0, "fct:sheets", 3).await);
        cluster
    }

    fn create(id: &str) -> SheetOperation {
        SheetOperation::CreateSpreadsheet(Spreadsheet::blank(
            id,
            "alice",
            format!("{PRIMARY}/spreadsheets/{id}"),
            3,
            3,
        ))
    }

    fn create_request() -> WriteRequest {
        WriteRequest::new("/spreadsheets", Some("password=pw".into()))
    }

    #[tokio::test]
    async fn test_primary_write_reaches_every_replica() {
        let cluster = domain_cluster().await;
        let primary = cluster.node(0).write_handler();

        let created = primary.handle(&create_request(), create("S1")).await;
        assert_eq!(created.status, 204);
        assert_eq!(created.header(VERSION_HEADER), Some("1"));

        let updated = primary.update_cell("S1", "C3", "=A1+1", None).await;
        assert_eq!(updated.header(VERSION_HEADER), Some("2"));

        for node in &cluster.nodes()[1..] {
            let store = &node.container().store;
            assert!(
                eventually(|| store
                    .get("S1")
                    .is_some_and(|sheet| sheet.raw_values[2][2] == "=A1+1"))
                .await
            );
            assert_eq!(node.container().replica.metrics().last_applied, Some(2));
        }

        cluster.shutdown().await;
    }

    #[tokio::test]
    async fn test_replica_redirects_write_without_touching_state() {
        let cluster = domain_cluster().await;
        cluster
            .node(0)
            .container()
            .store
            .put(Spreadsheet::blank("S1", "alice", "", 2, 2));

        let response = cluster
            .node(1)
            .write_handler()
            .update_cell("S1", "A1", "7", Some("userId=alice&password=pw".into()))
            .await;

        assert_eq!(response.status, 307);
        assert_eq!(
            response.header(LOCATION_HEADER),
            Some("http://fct1:8080/rest/spreadsheets/S1/A1?userId=alice&password=pw")
        );
        assert_eq!(cluster.node(0).container().store.get("S1").unwrap().raw_values[0][0], "");
        assert!(cluster.node(1).container().store.is_empty());
        for node in cluster.nodes() {
            assert_eq!(node.container().coordinator.current_version().get(), 0);
        }

        cluster.shutdown().await;
    }

    #[tokio::test]
    async fn test_write_completes_when_no_replica_acknowledges() {
        let cluster = domain_cluster().await;
        cluster.transport().inject(&cluster.uri(1), Fault::Unreachable);
        cluster.transport().inject(&cluster.uri(2), Fault::Hang);

        let response = cluster
            .node(0)
            .write_handler()
            .handle(&create_request(), create("S1"))
            .await;

        assert_eq!(response.status, 204);
        assert_eq!(response.header(VERSION_HEADER), Some("1"));
        let metrics = cluster.node(0).container().coordinator.metrics();
        assert_eq!(metrics.propagations_without_ack, 1);
        assert!(cluster.node(1).container().store.is_empty());

        cluster.shutdown().await;
    }

    #[tokio::test]
    async fn test_first_ack_is_enough() {
        let cluster = domain_cluster().await;
        cluster.transport().inject(&cluster.uri(2), Fault::Hang);

        let response = cluster
            .node(0)
            .write_handler()
            .handle(&create_request(), create("S1"))
            .await;

        assert_eq!(response.status, 204);
        assert!(cluster.node(1).container().store.get("S1").is_some());
        assert_eq!(
            cluster.node(0).container().coordinator.metrics().propagations_without_ack,
            0
        );

        cluster.shutdown().await;
    }

    #[tokio::test]
    async fn test_new_primary_takes_over_versioning() {
        let cluster = domain_cluster().await;
        let old = cluster.node(0).write_handler();
        old.handle(&create_request(), create("S1")).await;
        old.handle(&create_request(), create("S2")).await;
        for node in &cluster.nodes()[1..] {
            let replica = &node.container().replica;
            assert!(eventually(|| replica.metrics().last_applied == Some(2)).await);
        }

        let successor = ServiceUri::new("http://fct2:8080/rest");
        cluster.elect(&successor);
        assert_eq!(cluster.node(1).container().selector.role(), Role::Primary);
        assert_eq!(cluster.node(0).container().selector.role(), Role::Replica);
        for index in [0, 2] {
            let replica = &cluster.node(index).container().replica;
            assert!(eventually(|| replica.metrics().last_applied.is_none()).await);
        }

        // The old primary now redirects to the new one.
        let redirected = old.handle(&create_request(), create("S3")).await;
        assert_eq!(redirected.status, 307);

        // The successor counts from its own baseline and replicas follow it.
        let response = cluster
            .node(1)
            .write_handler()
            .handle(&create_request(), create("S3"))
            .await;
        assert_eq!(response.header(VERSION_HEADER), Some("1"));
        for index in [0, 2] {
            let store = &cluster.node(index).container().store;
            assert!(eventually(|| store.get("S3").is_some()).await);
        }

        cluster.shutdown().await;
    }
}
