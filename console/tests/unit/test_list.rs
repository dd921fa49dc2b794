//! List view projection tests

use std::sync::Arc;
use std::time::Duration;

use shipkit::actions::coordinator::{ActionCoordinator, Options};
use shipkit::actions::fsm::ActionKind;
use shipkit::cache::status::StatusCache;
use shipkit::notify::MemoryNotifier;
use shipkit::sync::fetcher::StatusFetcher;
use shipkit::view::list::{project, render, BadgeColor, ListView, EMPTY_MESSAGE};
use shipkit_api::DeploymentState;
use tokio::time::sleep;

use crate::mocks::{deployment, status, MockApi};

fn setup(api: MockApi) -> (Arc<StatusCache>, Arc<ActionCoordinator>) {
    let api = Arc::new(api);
    let cache = Arc::new(StatusCache::new());
    let fetcher = Arc::new(StatusFetcher::new(api.clone(), cache.clone()));
    let coordinator = Arc::new(ActionCoordinator::new(
        Options::default(),
        api,
        fetcher,
        Arc::new(MemoryNotifier::new()),
    ));
    (cache, coordinator)
}

fn cards(view: ListView) -> Vec<shipkit::view::list::DeploymentCard> {
    match view {
        ListView::Cards(cards) => cards,
        ListView::Empty => panic!("expected cards"),
    }
}

#[tokio::test]
async fn test_empty_list() {
    let (cache, coordinator) = setup(MockApi::new());
    let view = project(&[], &cache, &coordinator);
    assert_eq!(view, ListView::Empty);
    assert_eq!(render(&view), EMPTY_MESSAGE);
}

#[tokio::test]
async fn test_cards_follow_cached_state() {
    let (cache, coordinator) = setup(MockApi::new());
    cache.replace("d-1", status("d-1", DeploymentState::Running));
    cache.replace("d-2", status("d-2", DeploymentState::Stopped));
    cache.replace("d-3", status("d-3", DeploymentState::Stopping));

    let deployments = vec![
        deployment("d-1", "web"),
        deployment("d-2", "worker"),
        deployment("d-3", "cron"),
        deployment("d-4", "fresh"),
    ];
    let cards = cards(project(&deployments, &cache, &coordinator));
    assert_eq!(cards.len(), 4);

    assert_eq!(cards[0].name, "web");
    assert_eq!(cards[0].badge, BadgeColor::Green);
    assert_eq!(cards[0].toggle, ActionKind::Stop);

    assert_eq!(cards[1].badge, BadgeColor::Red);
    assert_eq!(cards[1].toggle, ActionKind::Start);

    assert_eq!(cards[2].badge, BadgeColor::Orange);
    assert_eq!(cards[2].toggle, ActionKind::Stop);

    // never fetched: unknown, offered as startable
    assert_eq!(cards[3].state, DeploymentState::Unknown);
    assert_eq!(cards[3].badge, BadgeColor::Gray);
    assert_eq!(cards[3].toggle, ActionKind::Start);

    assert!(cards.iter().all(|c| !c.toggle_disabled && !c.delete_disabled));
    assert_eq!(
        cards[0].created_at.as_deref(),
        Some("2025-01-01T00:00:00Z")
    );
}

#[tokio::test]
async fn test_error_state_badge() {
    assert_eq!(
        BadgeColor::for_state(DeploymentState::Error),
        BadgeColor::Gray
    );
    assert_eq!(
        BadgeColor::for_state(DeploymentState::Starting),
        BadgeColor::Yellow
    );
}

#[tokio::test(start_paused = true)]
async fn test_toggle_disabled_while_action_runs() {
    let (cache, coordinator) = setup(MockApi::with_delays(
        Duration::ZERO,
        Duration::from_secs(1),
    ));
    cache.replace("d-1", status("d-1", DeploymentState::Running));
    let deployments = vec![deployment("d-1", "web"), deployment("d-2", "worker")];

    let running = coordinator.clone();
    let stop = tokio::spawn(async move { running.stop("d-1").await });
    sleep(Duration::from_millis(10)).await;

    let view = project(&deployments, &cache, &coordinator);
    let rendered = render(&view);
    let during = cards(view);
    assert!(during[0].toggle_disabled);
    assert!(!during[0].delete_disabled);
    assert!(!during[1].toggle_disabled);
    assert!(rendered.contains("stopping…"));

    stop.await.unwrap().unwrap();
    let after = cards(project(&deployments, &cache, &coordinator));
    assert!(!after[0].toggle_disabled);
    assert_eq!(after[0].state, DeploymentState::Stopping);
}
