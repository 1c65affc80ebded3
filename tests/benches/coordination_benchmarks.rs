//! # Coordination Core Benchmarks
//!
//! Hot paths of the coordination subsystems:
//!
//! | Subsystem | Operation |
//! |-----------|-----------|
//! | ss-01 Discovery | observe / resolve on a populated directory |
//! | ss-02 Replication | version issue, operation codec, reorder buffer |
//! | ss-04 Result Cache | reconcile under fresh and stale write-times |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use std::time::Duration;

use shared_types::{ImportKey, ServiceUri, Spreadsheet, SystemTimeSource, Timestamp, Version, WriteTime};
use ss_01_service_discovery::PeerDirectory;
use ss_02_replication::{
    ReorderBuffer, ReplicatedOperation, SheetOperation, UpdateCellArgs, VersionCounter,
};
use ss_04_result_cache::ResultCache;

// ============================================================================
// SS-01: Discovery
// ============================================================================

fn bench_peer_directory(c: &mut Criterion) {
    let mut group = c.benchmark_group("ss-01-discovery");
    group.measurement_time(Duration::from_secs(5));

    for peers in [10usize, 100, 1_000] {
        let directory = PeerDirectory::new(Some(5_000));
        let uris: Vec<ServiceUri> = (0..peers)
            .map(|i| ServiceUri::new(format!("http://h{i}:8080/rest")))
            .collect();
        for uri in &uris {
            directory.observe("fct:sheets", uri.clone(), Timestamp::from_millis(1_000));
        }

        group.throughput(Throughput::Elements(peers as u64));
        group.bench_with_input(BenchmarkId::new("reannounce", peers), &uris, |b, uris| {
            b.iter(|| {
                for uri in uris {
                    black_box(directory.observe(
                        "fct:sheets",
                        uri.clone(),
                        Timestamp::from_millis(2_000),
                    ));
                }
            })
        });
        group.bench_function(BenchmarkId::new("resolve", peers), |b| {
            b.iter(|| black_box(directory.resolve("fct:sheets", Timestamp::from_millis(2_500))))
        });
    }

    group.finish();
}

// ============================================================================
// SS-02: Replication
// ============================================================================

fn update(version: u64) -> ReplicatedOperation {
    ReplicatedOperation::new(
        SheetOperation::UpdateCell(UpdateCellArgs {
            sheet_id: "S1".into(),
            cell: "A1".into(),
            raw_value: version.to_string(),
        }),
        Version(version),
    )
}

fn bench_replication(c: &mut Criterion) {
    let mut group = c.benchmark_group("ss-02-replication");

    let counter = VersionCounter::new();
    group.bench_function("next_version", |b| b.iter(|| black_box(counter.next())));

    let create = SheetOperation::CreateSpreadsheet(Spreadsheet::blank("S1", "alice", "", 50, 26));
    let encoded = create.encode().unwrap_or_default();
    group.bench_function("encode_create_50x26", |b| {
        b.iter(|| black_box(create.encode()))
    });
    group.bench_function("decode_create_50x26", |b| {
        b.iter(|| black_box(SheetOperation::decode(&encoded)))
    });

    for window in [1u64, 8, 64] {
        group.throughput(Throughput::Elements(window));
        group.bench_with_input(BenchmarkId::new("reorder_reversed", window), &window, |b, &window| {
            b.iter(|| {
                let mut buffer = ReorderBuffer::new(window as usize + 1);
                buffer.admit(update(1));
                for version in (2..=window + 1).rev() {
                    black_box(buffer.admit(update(version)));
                }
            })
        });
    }

    group.finish();
}

// ============================================================================
// SS-04: Result Cache
// ============================================================================

fn bench_result_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("ss-04-result-cache");
    let cache = ResultCache::new(Arc::new(SystemTimeSource::new()));
    let key = ImportKey::new("S1", "A1:Z50");
    let values = vec![vec!["1".to_string(); 26]; 50];

    let mut write_time = 0u64;
    group.bench_function("reconcile_newer", |b| {
        b.iter(|| {
            write_time += 1;
            black_box(cache.reconcile(key.clone(), values.clone(), WriteTime(write_time)))
        })
    });
    group.bench_function("reconcile_stale", |b| {
        b.iter(|| black_box(cache.reconcile(key.clone(), values.clone(), WriteTime(0))))
    });
    group.bench_function("lookup", |b| b.iter(|| black_box(cache.lookup(&key))));

    group.finish();
}

criterion_group!(
    benches,
    bench_peer_directory,
    bench_replication,
    bench_result_cache,
);
criterion_main!(benches);
