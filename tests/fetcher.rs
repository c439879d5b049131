//! Integration tests for the cached fetcher
//!
//! Covers cache hits and misses, canonical keys, and snapshot reload across
//! fetcher instances.

mod common;

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use bugzilla_cache::cache::{CacheStore, read_snapshot, save_snapshot};
use bugzilla_cache::{CachedFetcher, CachedResponse, QueryParams};
use chrono::Utc;
use serde_json::json;
use tempfile::TempDir;

use common::{HOST, RecordingTransport, config};

#[tokio::test]
async fn test_second_identical_fetch_is_served_from_cache() {
    let dir = TempDir::new().unwrap();
    let url = format!("{HOST}/rest/product/Firefox");
    let transport = RecordingTransport::new().route(&url, json!({"products": []}));
    let fetcher = CachedFetcher::with_transport(&config(&dir), transport).unwrap();

    let first = fetcher
        .fetch("/rest/product/Firefox", &QueryParams::new())
        .await
        .unwrap();
    assert_eq!(first.resolved_url, url);
    assert_eq!(fetcher.transport().request_count(), 1);
    assert_eq!(fetcher.cache_len().await, 1);

    let on_disk = read_snapshot::<CachedResponse>(fetcher.cache_file())
        .unwrap()
        .expect("cache file should exist after a miss");
    assert_eq!(on_disk.len(), 1);
    assert_eq!(on_disk[0].key, url);

    let second = fetcher
        .fetch("/rest/product/Firefox", &QueryParams::new())
        .await
        .unwrap();
    assert_eq!(second, first);
    assert_eq!(fetcher.transport().request_count(), 1);
}

#[tokio::test]
async fn test_array_order_creates_distinct_entries() {
    let dir = TempDir::new().unwrap();
    let transport = RecordingTransport::new()
        .route(&format!("{HOST}/rest/bug?id=1&id=2"), json!({"bugs": [{"id": 1}]}))
        .route(&format!("{HOST}/rest/bug?id=2&id=1"), json!({"bugs": [{"id": 2}]}));
    let fetcher = CachedFetcher::with_transport(&config(&dir), transport).unwrap();

    fetcher
        .fetch("/rest/bug", &QueryParams::new().with("id", vec![1u64, 2]))
        .await
        .unwrap();
    fetcher
        .fetch("/rest/bug", &QueryParams::new().with("id", vec![2u64, 1]))
        .await
        .unwrap();

    assert_eq!(fetcher.cache_len().await, 2);
    assert_eq!(
        fetcher.transport().requests(),
        vec![
            format!("{HOST}/rest/bug?id=1&id=2"),
            format!("{HOST}/rest/bug?id=2&id=1"),
        ]
    );
}

#[tokio::test]
async fn test_param_insertion_order_shares_an_entry() {
    let dir = TempDir::new().unwrap();
    let transport = RecordingTransport::new().route(
        &format!("{HOST}/rest/bug?limit=15&product=Firefox"),
        json!({"bugs": []}),
    );
    let fetcher = CachedFetcher::with_transport(&config(&dir), transport).unwrap();

    let a = QueryParams::new().with("product", "Firefox").with("limit", 15u32);
    let b: QueryParams = [("limit", "15"), ("product", "Firefox")].into_iter().collect();

    fetcher.fetch("/rest/bug", &a).await.unwrap();
    fetcher.fetch("/rest/bug", &b).await.unwrap();

    assert_eq!(fetcher.transport().request_count(), 1);
}

#[tokio::test]
async fn test_network_failure_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let fetcher = CachedFetcher::with_transport(&config(&dir), RecordingTransport::new()).unwrap();

    let result = fetcher.fetch("/rest/bug/404", &QueryParams::new()).await;

    assert!(result.is_err());
    assert_eq!(fetcher.transport().request_count(), 1);
    assert_eq!(fetcher.cache_len().await, 0);
    assert!(!fetcher.cache_file().exists());
}

#[tokio::test]
async fn test_cache_survives_a_new_fetcher() {
    let dir = TempDir::new().unwrap();
    let url = format!("{HOST}/rest/bug?id=42");
    let config = config(&dir);

    let first = CachedFetcher::with_transport(
        &config,
        RecordingTransport::new().route(&url, json!({"bugs": [{"id": 42}]})),
    )
    .unwrap();
    let original = first
        .fetch("/rest/bug", &QueryParams::new().with("id", 42u64))
        .await
        .unwrap();

    // The second instance has no routes, so any network call would fail.
    let second = CachedFetcher::with_transport(&config, RecordingTransport::new()).unwrap();
    let reloaded = second
        .fetch("/rest/bug", &QueryParams::new().with("id", 42u64))
        .await
        .unwrap();

    assert_eq!(reloaded, original);
    assert_eq!(second.transport().request_count(), 0);
}

#[tokio::test]
async fn test_entries_expired_on_disk_are_refetched() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let url = format!("{HOST}/rest/bug?id=7");
    let fresh_url = format!("{HOST}/rest/bug?id=8");

    let mut store = CacheStore::new(config.capacity, config.ttl);
    let value = CachedResponse {
        resolved_url: url.clone(),
        data: json!({"bugs": [{"id": 7, "status": "OLD"}]}),
    };
    store.set_at(url.clone(), value.clone(), Utc::now() - chrono::Duration::minutes(10));
    store.set(fresh_url.clone(), value.clone());
    save_snapshot(&store, &config.cache_file).unwrap();

    let transport =
        RecordingTransport::new().route(&url, json!({"bugs": [{"id": 7, "status": "NEW"}]}));
    let fetcher = CachedFetcher::with_transport(&config, transport).unwrap();
    assert_eq!(fetcher.cache_len().await, 1);

    let response = fetcher
        .fetch("/rest/bug", &QueryParams::new().with("id", 7u64))
        .await
        .unwrap();
    assert_eq!(response.data["bugs"][0]["status"], "NEW");
    assert_eq!(fetcher.transport().request_count(), 1);

    let cached = fetcher
        .fetch("/rest/bug", &QueryParams::new().with("id", 8u64))
        .await
        .unwrap();
    assert_eq!(cached, value);
    assert_eq!(fetcher.transport().request_count(), 1);
}

#[tokio::test]
async fn test_corrupt_cache_file_starts_empty() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    fs::write(&config.cache_file, "[[[ definitely not a snapshot").unwrap();

    let url = format!("{HOST}/rest/bug");
    let transport = RecordingTransport::new().route(&url, json!({"bugs": []}));
    let fetcher = CachedFetcher::with_transport(&config, transport).unwrap();
    assert_eq!(fetcher.cache_len().await, 0);

    fetcher.fetch("/rest/bug", &QueryParams::new()).await.unwrap();
    assert!(read_snapshot::<CachedResponse>(&config.cache_file).is_ok());
}

#[tokio::test]
async fn test_capacity_bounds_the_persisted_cache() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir).with_capacity(2).with_ttl(Duration::from_secs(60));

    let mut transport = RecordingTransport::new();
    for id in 1..=3 {
        transport = transport.route(&format!("{HOST}/rest/bug?id={id}"), json!({"bugs": []}));
    }
    let fetcher = CachedFetcher::with_transport(&config, transport).unwrap();

    for id in 1..=3u64 {
        fetcher
            .fetch("/rest/bug", &QueryParams::new().with("id", id))
            .await
            .unwrap();
    }

    assert_eq!(fetcher.cache_len().await, 2);
    let keys: Vec<String> = read_snapshot::<CachedResponse>(&config.cache_file)
        .unwrap()
        .unwrap()
        .into_iter()
        .map(|entry| entry.key)
        .collect();
    assert_eq!(
        keys,
        vec![format!("{HOST}/rest/bug?id=2"), format!("{HOST}/rest/bug?id=3")]
    );
}

#[tokio::test]
async fn test_hits_never_write_the_cache_file() {
    let dir = TempDir::new().unwrap();
    let bug_1 = format!("{HOST}/rest/bug?id=1");
    let bug_2 = format!("{HOST}/rest/bug?id=2");
    let transport = RecordingTransport::new()
        .route(&bug_1, json!({"bugs": [{"id": 1}]}))
        .route(&bug_2, json!({"bugs": [{"id": 2}]}));
    let fetcher = CachedFetcher::with_transport(&config(&dir), transport).unwrap();

    fetcher
        .fetch("/rest/bug", &QueryParams::new().with("id", 1u64))
        .await
        .unwrap();
    fs::remove_file(fetcher.cache_file()).unwrap();

    fetcher
        .fetch("/rest/bug", &QueryParams::new().with("id", 1u64))
        .await
        .unwrap();
    assert!(!fetcher.cache_file().exists(), "a cache hit must not persist");

    fetcher
        .fetch("/rest/bug", &QueryParams::new().with("id", 2u64))
        .await
        .unwrap();
    let keys: Vec<String> = read_snapshot::<CachedResponse>(fetcher.cache_file())
        .unwrap()
        .expect("a miss should persist the cache")
        .into_iter()
        .map(|entry| entry.key)
        .collect();
    assert_eq!(keys, vec![bug_1, bug_2]);
    assert_eq!(fetcher.transport().request_count(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_misses_fetch_once() {
    let dir = TempDir::new().unwrap();
    let url = format!("{HOST}/rest/product/Firefox");
    let transport = RecordingTransport::new().route(&url, json!({"products": []}));
    let fetcher = Arc::new(CachedFetcher::with_transport(&config(&dir), transport).unwrap());

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let fetcher = Arc::clone(&fetcher);
            tokio::spawn(async move {
                fetcher
                    .fetch("/rest/product/Firefox", &QueryParams::new())
                    .await
            })
        })
        .collect();

    for handle in handles {
        let response = handle.await.unwrap().unwrap();
        assert_eq!(response.resolved_url, url);
    }

    assert_eq!(fetcher.transport().request_count(), 1);
    assert_eq!(fetcher.cache_len().await, 1);
}
