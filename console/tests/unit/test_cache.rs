//! Status cache tests

use shipkit::cache::status::{StatusCache, StatusOverride};
use shipkit_api::{ContainerStatus, DeploymentState};

use crate::mocks::status;

#[test]
fn test_unknown_until_fetched() {
    let cache = StatusCache::new();
    assert_eq!(cache.state("d-1"), DeploymentState::Unknown);
    assert!(cache.get("d-1").is_none());
    assert!(cache.is_empty());
}

#[test]
fn test_replace_is_wholesale() {
    let cache = StatusCache::new();
    let mut first = status("d-1", DeploymentState::Running);
    first.message = Some("healthy".to_string());
    first.containers = vec![ContainerStatus {
        name: "web".to_string(),
        state: "running".to_string(),
        health: Some("healthy".to_string()),
        ports: vec!["0.0.0.0:80->80/tcp".to_string()],
    }];
    cache.replace("d-1", first);

    cache.replace("d-1", status("d-1", DeploymentState::Stopped));
    let entry = cache.get("d-1").unwrap();
    assert_eq!(entry.state, DeploymentState::Stopped);
    assert!(entry.message.is_none());
    assert!(entry.containers.is_empty());
}

#[test]
fn test_override_then_remove() {
    let cache = StatusCache::new();
    cache.replace("d-1", status("d-1", DeploymentState::Stopped));
    assert!(cache.is_stopped("d-1"));

    cache.apply_override(
        "d-1",
        StatusOverride {
            state: Some(DeploymentState::Starting),
            message: Some("starting".to_string()),
            ..Default::default()
        },
    );
    let entry = cache.get("d-1").unwrap();
    assert_eq!(entry.state, DeploymentState::Starting);
    assert_eq!(entry.message.as_deref(), Some("starting"));
    assert_eq!(entry.status, 200);
    assert!(!cache.is_stopped("d-1"));

    assert!(cache.remove("d-1").is_some());
    assert_eq!(cache.state("d-1"), DeploymentState::Unknown);
}

#[test]
fn test_snapshot() {
    let cache = StatusCache::new();
    cache.replace("a", status("a", DeploymentState::Running));
    cache.replace("b", status("b", DeploymentState::Stopped));

    let snapshot = cache.snapshot();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot["a"].state, DeploymentState::Running);
}
