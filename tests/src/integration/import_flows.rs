//! # Cross-Domain Import Flows
//!
//! An instance of `fct` imports ranges served by `ua`. Partitions degrade to
//! the last values seen, or to "no data" when nothing was ever fetched.
//! Write-times are the serving domain's versions, so whichever instance
//! answers, newer content always wins.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use shared_types::{Spreadsheet, WriteTime};
    use sheets_runtime::handlers::{ImportResponse, ImportSource, Response};
    use ss_02_replication::{SheetOperation, UpdateCellArgs};

    use crate::cluster::{Cluster, Fault};

    const FCT: &str = "http://fct1:8080/rest";
    const UA: &str = "http://ua1:8080/rest";
    const UA2: &str = "http://ua2:8080/rest";

    async fn two_domains() -> Cluster {
        let mut cluster = Cluster::new();
        cluster.spawn("fct", FCT, Some(FCT)).unwrap();
        cluster.spawn("ua", UA, Some(UA)).unwrap();
        assert!(cluster.await_resolved(0, "ua:sheets", 1).await);
        cluster
    }

    fn decode(response: &Response) -> ImportResponse {
        assert_eq!(response.status, 200);
        serde_json::from_str(response.body.as_deref().unwrap()).unwrap()
    }

    fn row(values: &[&str]) -> Vec<Vec<String>> {
        vec![values.iter().map(|v| v.to_string()).collect()]
    }

    async fn publish(cluster: &Cluster, a1: &str) {
        let response = cluster.node(1).write_handler().update_cell("S1", "A1", a1, None).await;
        assert_eq!(response.status, 204);
    }

    async fn seeded() -> Cluster {
        let cluster = two_domains().await;
        cluster
            .node(1)
            .container()
            .store
            .put(Spreadsheet::blank("S1", "bob", format!("{UA}/spreadsheets/S1"), 2, 2));
        publish(&cluster, "1").await;
        cluster
    }

    #[tokio::test]
    async fn test_live_import_fills_cache() {
        let cluster = seeded().await;
        let importer = cluster.node(0).import_handler();

        let body = decode(&importer.import("ua", "S1:A1:B1").await);

        assert_eq!(body.source, ImportSource::Live);
        assert_eq!(body.values, Some(row(&["1", ""])));
        assert_eq!(cluster.node(0).container().imports.metrics().entries, 1);

        cluster.shutdown().await;
    }

    #[tokio::test]
    async fn test_partition_serves_last_known_values() {
        let cluster = seeded().await;
        let importer = cluster.node(0).import_handler();
        let live = decode(&importer.import("ua", "S1:A1:B1").await);

        cluster.transport().inject(&cluster.uri(1), Fault::Hang);
        let cached = decode(&importer.import("ua", "S1:A1:B1").await);

        assert_eq!(cached.source, ImportSource::Cached);
        assert_eq!(cached.values, live.values);
        assert_eq!(cached.write_time, live.write_time);

        cluster.shutdown().await;
    }

    #[tokio::test]
    async fn test_partition_without_cache_is_no_data() {
        let cluster = seeded().await;
        cluster.transport().inject(&cluster.uri(1), Fault::Hang);

        let body = decode(&cluster.node(0).import_handler().import("ua", "S1:A1:B1").await);

        assert_eq!(body.source, ImportSource::None);
        assert_eq!(body.values, None);

        cluster.shutdown().await;
    }

    #[tokio::test]
    async fn test_newer_values_replace_cached_after_heal() {
        let cluster = seeded().await;
        let importer = cluster.node(0).import_handler();
        let first = decode(&importer.import("ua", "S1:A1").await);

        cluster.transport().inject(&cluster.uri(1), Fault::Unreachable);
        tokio::time::sleep(Duration::from_millis(5)).await;
        publish(&cluster, "2").await;
        assert_eq!(
            decode(&importer.import("ua", "S1:A1").await).values,
            Some(row(&["1"]))
        );

        cluster.transport().heal(&cluster.uri(1));
        let healed = decode(&importer.import("ua", "S1:A1").await);

        assert_eq!(healed.source, ImportSource::Live);
        assert_eq!(healed.values, Some(row(&["2"])));
        assert!(healed.write_time > first.write_time);

        cluster.shutdown().await;
    }

    #[tokio::test]
    async fn test_unknown_domain_is_no_data() {
        let cluster = two_domains().await;
        let body = decode(&cluster.node(0).import_handler().import("nowhere", "S1:A1").await);
        assert_eq!(body.source, ImportSource::None);
        cluster.shutdown().await;
    }

    #[tokio::test]
    async fn test_lagging_replica_does_not_shadow_newer_primary_values() {
        let mut cluster = Cluster::new();
        cluster.spawn("fct", FCT, Some(FCT)).unwrap();
        cluster.spawn("ua", UA, Some(UA)).unwrap();
        cluster.spawn("ua", UA2, Some(UA)).unwrap();
        assert!(cluster.await_resolved(0, "ua:sheets", 2).await);
        for index in [1, 2] {
            cluster
                .node(index)
                .container()
                .store
                .put(Spreadsheet::blank("S1", "bob", "", 1, 1));
        }

        // The replica misses both writes while partitioned...
        cluster.transport().inject(&cluster.uri(2), Fault::Unreachable);
        publish(&cluster, "1").await;
        publish(&cluster, "2").await;

        // ...and only gets the first one afterwards, later in wall-clock time.
        tokio::time::sleep(Duration::from_millis(5)).await;
        let first = SheetOperation::UpdateCell(UpdateCellArgs {
            sheet_id: "S1".into(),
            cell: "A1".into(),
            raw_value: "1".into(),
        })
        .encode()
        .unwrap();
        let replica = cluster.node(2);
        let secret = replica.container().config.node.secret.clone();
        assert_eq!(replica.replica_handler().receive(&secret, Some("1"), &first).status, 204);
        cluster.transport().heal(&cluster.uri(2));

        let importer = cluster.node(0).import_handler();

        cluster.transport().inject(&cluster.uri(1), Fault::Unreachable);
        let lagging = decode(&importer.import("ua", "S1:A1").await);
        assert_eq!(lagging.source, ImportSource::Live);
        assert_eq!(lagging.values, Some(row(&["1"])));
        assert_eq!(lagging.write_time, Some(WriteTime(1)));

        cluster.transport().heal(&cluster.uri(1));
        cluster.transport().inject(&cluster.uri(2), Fault::Unreachable);
        let current = decode(&importer.import("ua", "S1:A1").await);
        assert_eq!(current.source, ImportSource::Live);
        assert_eq!(current.values, Some(row(&["2"])));
        assert_eq!(current.write_time, Some(WriteTime(2)));

        cluster.shutdown().await;
    }
}
