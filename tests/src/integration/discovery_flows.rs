//! # Discovery Flows
//!
//! Instances find each other through announcements alone, per domain, and
//! forget instances that stop announcing.

#[cfg(test)]
mod tests {
    use ss_01_service_discovery::{Announcement, DiscoveryApi};

    use crate::cluster::{eventually, Cluster};

    #[tokio::test]
    async fn test_instances_of_a_domain_discover_each_other() {
        let mut cluster = Cluster::new();
        for uri in ["http://fct1:8080/rest", "http://fct2:8080/rest", "http://fct3:8080/rest"] {
            cluster.spawn("fct", uri, None).unwrap();
        }

        assert!(cluster.await_resolved(0, "fct:sheets", 3).await);

        // Many re-announcements later still one entry per instance.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        let mut resolved = cluster.node(2).container().discovery.resolve("fct:sheets");
        resolved.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        resolved.dedup();
        assert_eq!(resolved.len(), 3);

        cluster.shutdown().await;
    }

    #[tokio::test]
    async fn test_domains_are_isolated() {
        let mut cluster = Cluster::new();
        cluster.spawn("fct", "http://fct1:8080/rest", None).unwrap();
        cluster.spawn("ua", "http://ua1:8080/rest", None).unwrap();

        assert!(cluster.await_resolved(0, "ua:sheets", 1).await);
        let fct = cluster.node(0).container().discovery.resolve("fct:sheets");
        assert_eq!(fct, vec![cluster.uri(0)]);

        cluster.shutdown().await;
    }

    #[tokio::test]
    async fn test_silent_instance_is_evicted() {
        let mut cluster = Cluster::new();
        cluster.spawn("fct", "http://fct1:8080/rest", None).unwrap();
        cluster.spawn("fct", "http://fct2:8080/rest", None).unwrap();
        assert!(cluster.await_resolved(0, "fct:sheets", 2).await);

        cluster.node(1).shutdown().await;

        let discovery = &cluster.node(0).container().discovery;
        assert!(eventually(|| discovery.resolve("fct:sheets") == vec![cluster.uri(0)]).await);

        cluster.shutdown().await;
    }

    #[tokio::test]
    async fn test_garbage_datagrams_do_not_stop_listeners() {
        let mut cluster = Cluster::new();
        cluster.spawn("fct", "http://fct1:8080/rest", None).unwrap();

        let discovery = &cluster.node(0).container().discovery;
        assert!(discovery.handle_datagram(b"no delimiter here").is_err());

        // A foreign instance announced by hand still shows up.
        let foreign = Announcement::for_domain("fct", "sheets", "http://fct9:8080/rest".into());
        discovery.announce_once(&foreign).await.unwrap();
        assert!(cluster.await_resolved(0, "fct:sheets", 2).await);

        cluster.shutdown().await;
    }
}
