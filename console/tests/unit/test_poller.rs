//! Poller tests

use std::sync::Arc;
use std::time::Duration;

use shipkit::cache::status::StatusCache;
use shipkit::sync::fetcher::StatusFetcher;
use shipkit::workers::poller::{Options, Poller};
use tokio::time::sleep;

use crate::mocks::MockApi;

fn poller(api: Arc<MockApi>) -> Poller {
    let fetcher = Arc::new(StatusFetcher::new(api, Arc::new(StatusCache::new())));
    Poller::new(Options::default(), fetcher)
}

fn ids(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

async fn settle() {
    sleep(Duration::from_millis(1)).await;
}

#[tokio::test(start_paused = true)]
async fn test_fetches_immediately_then_every_interval() {
    let api = Arc::new(MockApi::new());
    let poller = poller(api.clone());

    poller.set_deployments(ids(&["a", "b"]));
    settle().await;
    assert_eq!(api.status_calls("a"), 1);
    assert_eq!(api.status_calls("b"), 1);

    sleep(Duration::from_secs(14)).await;
    assert_eq!(api.status_calls("a"), 1);

    sleep(Duration::from_secs(1)).await;
    settle().await;
    assert_eq!(api.status_calls("a"), 2);
    assert_eq!(api.status_calls("b"), 2);

    sleep(Duration::from_secs(15)).await;
    assert_eq!(api.status_calls("a"), 3);
    assert_eq!(api.status_calls("b"), 3);
}

#[tokio::test(start_paused = true)]
async fn test_new_list_replaces_previous_timer() {
    let api = Arc::new(MockApi::new());
    let poller = poller(api.clone());

    let first = poller.set_deployments(ids(&["a", "b"]));
    settle().await;
    let second = poller.set_deployments(ids(&["c"]));
    assert!(second > first);
    settle().await;
    assert_eq!(api.status_calls("c"), 1);

    sleep(Duration::from_secs(30)).await;
    assert_eq!(api.status_calls("a"), 1);
    assert_eq!(api.status_calls("b"), 1);
    assert_eq!(api.status_calls("c"), 3);
}

#[tokio::test(start_paused = true)]
async fn test_repeated_setup_keeps_one_timer() {
    let api = Arc::new(MockApi::new());
    let poller = poller(api.clone());

    poller.set_deployments(ids(&["a"]));
    poller.set_deployments(ids(&["a"]));
    poller.set_deployments(ids(&["a"]));
    settle().await;
    assert_eq!(api.status_calls("a"), 1);

    sleep(Duration::from_secs(15)).await;
    assert_eq!(api.status_calls("a"), 2);
    assert!(poller.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_stop_cancels_polling() {
    let api = Arc::new(MockApi::new());
    let poller = poller(api.clone());

    poller.set_deployments(ids(&["a"]));
    settle().await;
    poller.stop();
    settle().await;
    assert!(!poller.is_running());

    sleep(Duration::from_secs(60)).await;
    assert_eq!(api.status_calls("a"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_empty_list_schedules_nothing() {
    let api = Arc::new(MockApi::new());
    let poller = poller(api.clone());

    poller.set_deployments(ids(&["a"]));
    settle().await;
    poller.set_deployments(Vec::new());
    assert!(!poller.is_running());

    sleep(Duration::from_secs(30)).await;
    assert_eq!(api.status_calls("a"), 1);
}
