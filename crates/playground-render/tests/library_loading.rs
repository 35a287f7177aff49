//! Library registry concurrency tests
//!
//! Rendering engines are fetched on demand. Concurrent requests for the same
//! library must share one in-flight load, and a failed load must leave the
//! registry able to retry.

use futures::future::join_all;
use playground_render::{LibraryError, LibraryHandle, LibraryId, LibraryRegistry};
use playground_test_utils::{FakeChartEngine, FakeLoader};
use std::sync::Arc;
use tokio::sync::Notify;

#[tokio::test]
async fn concurrent_requests_share_one_load() {
    let gate = Arc::new(Notify::new());
    let loader = FakeLoader::gated(LibraryHandle::Chart(FakeChartEngine::new()), gate.clone());
    let registry = LibraryRegistry::new().with_loader(LibraryId::Chart, loader.clone());

    let requests = join_all((0..8).map(|_| registry.chart()));
    let release = async {
        tokio::task::yield_now().await;
        gate.notify_one();
    };
    let (results, ()) = tokio::join!(requests, release);

    assert!(results.iter().all(Result::is_ok));
    assert_eq!(loader.calls(), 1);
    assert_eq!(registry.load_count(), 1);
    assert!(registry.is_loaded(LibraryId::Chart));
}

#[tokio::test]
async fn failures_are_shared_then_retried() {
    let loader = FakeLoader::failing(LibraryHandle::Chart(FakeChartEngine::new()), 1);
    let registry = LibraryRegistry::new().with_loader(LibraryId::Chart, loader.clone());

    let err = registry.acquire(LibraryId::Chart).await.unwrap_err();
    assert!(matches!(err, LibraryError::LoadFailed { library: LibraryId::Chart, .. }));
    assert!(!registry.is_loaded(LibraryId::Chart));

    registry.acquire(LibraryId::Chart).await.unwrap();
    assert_eq!(loader.calls(), 2);
    assert_eq!(registry.load_count(), 2);
}

#[tokio::test]
async fn clones_share_the_cache() {
    let loader = FakeLoader::new(LibraryHandle::Chart(FakeChartEngine::new()));
    let registry = LibraryRegistry::new().with_loader(LibraryId::Chart, loader.clone());
    let other = registry.clone();

    registry.chart().await.unwrap();
    other.chart().await.unwrap();
    assert_eq!(loader.calls(), 1);
    assert!(other.is_loaded(LibraryId::Chart));
    assert!(!other.is_loaded(LibraryId::Diagram));
}
