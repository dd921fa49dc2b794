//! Action coordinator tests

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use shipkit::actions::coordinator::{ActionCoordinator, Options};
use shipkit::actions::fsm::ActionKind;
use shipkit::cache::status::StatusCache;
use shipkit::errors::ShipkitError;
use shipkit::notify::{Level, MemoryNotifier, Notification};
use shipkit::sync::fetcher::StatusFetcher;
use shipkit_api::DeploymentState;
use tokio::time::sleep;

use crate::mocks::{status, MockApi};

struct Harness {
    api: Arc<MockApi>,
    cache: Arc<StatusCache>,
    fetcher: Arc<StatusFetcher>,
    notifier: Arc<MemoryNotifier>,
    coordinator: Arc<ActionCoordinator>,
}

fn harness(api: MockApi) -> Harness {
    let api = Arc::new(api);
    let cache = Arc::new(StatusCache::new());
    let fetcher = Arc::new(StatusFetcher::new(api.clone(), cache.clone()));
    let notifier = Arc::new(MemoryNotifier::new());
    let coordinator = Arc::new(ActionCoordinator::new(
        Options::default(),
        api.clone(),
        fetcher.clone(),
        notifier.clone(),
    ));
    Harness {
        api,
        cache,
        fetcher,
        notifier,
        coordinator,
    }
}

#[tokio::test(start_paused = true)]
async fn test_stop_is_optimistic_then_refetched() {
    let h = harness(MockApi::new());
    h.cache.replace("d-1", status("d-1", DeploymentState::Running));
    h.api.set_state("d-1", DeploymentState::Stopped);

    h.coordinator.stop("d-1").await.unwrap();
    assert_eq!(h.cache.state("d-1"), DeploymentState::Stopping);
    assert!(!h.coordinator.is_loading(ActionKind::Stop, "d-1"));
    assert_eq!(
        h.notifier.latest(),
        Some(Notification {
            level: Level::Success,
            message: "Deployment stopped successfully!".to_string(),
        })
    );

    sleep(Duration::from_millis(1900)).await;
    assert_eq!(h.cache.state("d-1"), DeploymentState::Stopping);
    assert_eq!(h.api.status_calls("d-1"), 0);

    sleep(Duration::from_millis(200)).await;
    assert_eq!(h.cache.state("d-1"), DeploymentState::Stopped);
    assert_eq!(h.api.status_calls("d-1"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_start_sets_starting_and_settles() {
    let h = harness(MockApi::new());
    h.api.set_state("d-1", DeploymentState::Running);

    h.coordinator.start("d-1").await.unwrap();
    assert_eq!(h.cache.state("d-1"), DeploymentState::Starting);
    assert_eq!(h.cache.get("d-1").unwrap().uuid, "d-1");

    h.coordinator.settle().await;
    assert_eq!(h.cache.state("d-1"), DeploymentState::Running);
    assert_eq!(
        h.notifier.latest().unwrap().message,
        "Deployment restarted successfully!"
    );
}

#[tokio::test(start_paused = true)]
async fn test_failed_action_leaves_cache_untouched() {
    let h = harness(MockApi::new());
    h.cache.replace("d-1", status("d-1", DeploymentState::Running));
    h.api.fail_actions.store(true, Ordering::SeqCst);

    let err = h.coordinator.stop("d-1").await.unwrap_err();
    assert!(matches!(err, ShipkitError::ServerError(_)));
    assert_eq!(h.cache.state("d-1"), DeploymentState::Running);
    assert!(!h.coordinator.is_busy("d-1"));
    assert_eq!(
        h.notifier.latest(),
        Some(Notification {
            level: Level::Error,
            message: "Failed to stop deployment".to_string(),
        })
    );

    // no refetch is scheduled after a failure
    sleep(Duration::from_secs(5)).await;
    assert_eq!(h.api.status_calls("d-1"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_delete_drops_cache_entry() {
    let h = harness(MockApi::new());
    h.cache.replace("d-1", status("d-1", DeploymentState::Stopped));

    h.coordinator.delete("d-1").await.unwrap();
    assert!(h.cache.get("d-1").is_none());
    assert_eq!(
        h.notifier.latest().unwrap().message,
        "Deployment deleted successfully!"
    );

    sleep(Duration::from_secs(5)).await;
    assert_eq!(h.api.status_calls("d-1"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_loading_flags_are_per_kind_and_id() {
    let h = harness(MockApi::with_delays(Duration::ZERO, Duration::from_secs(1)));

    let coordinator = h.coordinator.clone();
    let stop = tokio::spawn(async move { coordinator.stop("d-1").await });
    sleep(Duration::from_millis(10)).await;

    assert!(h.coordinator.is_loading(ActionKind::Stop, "d-1"));
    assert!(!h.coordinator.is_loading(ActionKind::Start, "d-1"));
    assert!(!h.coordinator.is_loading(ActionKind::Stop, "d-2"));
    assert!(h.coordinator.is_busy("d-1"));

    // a second stop on the same deployment is rejected while the first runs
    let err = h.coordinator.stop("d-1").await.unwrap_err();
    assert!(matches!(err, ShipkitError::ValidationError(_)));

    // a start is not serialized against the running stop
    let coordinator = h.coordinator.clone();
    let start = tokio::spawn(async move { coordinator.start("d-1").await });
    sleep(Duration::from_millis(10)).await;
    assert!(h.coordinator.is_loading(ActionKind::Start, "d-1"));

    stop.await.unwrap().unwrap();
    start.await.unwrap().unwrap();
    assert!(!h.coordinator.is_busy("d-1"));
    assert_eq!(
        h.api.action_calls(),
        vec![("stop", "d-1".to_string()), ("start", "d-1".to_string())]
    );
}

#[tokio::test(start_paused = true)]
async fn test_confirming_fetch_outlives_slow_poll() {
    let h = harness(MockApi::with_delays(Duration::from_secs(3), Duration::ZERO));
    h.cache.replace("d-1", status("d-1", DeploymentState::Running));
    h.api.set_state("d-1", DeploymentState::Running);

    // a poll fetch sent before the stop, answered 3 s later with the old state
    let fetcher = h.fetcher.clone();
    let poll = tokio::spawn(async move { fetcher.fetch_status("d-1").await });
    sleep(Duration::from_millis(10)).await;

    h.api.set_state("d-1", DeploymentState::Stopped);
    h.coordinator.stop("d-1").await.unwrap();
    assert_eq!(h.cache.state("d-1"), DeploymentState::Stopping);

    // the stale poll answer lands first
    poll.await.unwrap();
    assert_eq!(h.cache.state("d-1"), DeploymentState::Running);

    // the confirming fetch was not dropped; it went out after the poll
    h.coordinator.settle().await;
    assert_eq!(h.cache.state("d-1"), DeploymentState::Stopped);
    assert_eq!(h.api.status_calls("d-1"), 2);
}
