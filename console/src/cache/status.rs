//! Deployment status cache

use std::collections::HashMap;
use std::sync::RwLock;

use shipkit_api::{ContainerStatus, DeploymentState, DeploymentStatus};

/// Partial status used for optimistic updates. Absent fields keep the
/// previously cached value.
#[derive(Debug, Clone, Default)]
pub struct StatusOverride {
    pub state: Option<DeploymentState>,
    pub message: Option<String>,
    pub status: Option<i32>,
    pub containers: Option<Vec<ContainerStatus>>,
}

impl StatusOverride {
    /// Override only the state
    pub fn state(state: DeploymentState) -> Self {
        Self {
            state: Some(state),
            ..Default::default()
        }
    }
}

/// In-memory map of deployment id to last known status
#[derive(Default)]
pub struct StatusCache {
    entries: RwLock<HashMap<String, DeploymentStatus>>,
}

impl StatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cached status of a deployment
    pub fn get(&self, id: &str) -> Option<DeploymentStatus> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(id).cloned()
    }

    /// Last known state; `Unknown` for ids never fetched
    pub fn state(&self, id: &str) -> DeploymentState {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(id).map(|s| s.state).unwrap_or_default()
    }

    /// Replace the entry for `id` wholesale
    pub fn replace(&self, id: &str, status: DeploymentStatus) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(id.to_string(), status);
    }

    /// Merge a partial status over the cached one
    pub fn apply_override(&self, id: &str, patch: StatusOverride) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let previous = entries.remove(id);

        let (uuid, state, message, status, containers) = match previous {
            Some(prev) => (prev.uuid, prev.state, prev.message, prev.status, prev.containers),
            None => (id.to_string(), DeploymentState::Unknown, None, 0, Vec::new()),
        };

        let merged = DeploymentStatus {
            uuid,
            state: patch.state.unwrap_or(state),
            message: patch.message.or(message),
            status: patch.status.unwrap_or(status),
            containers: patch.containers.unwrap_or(containers),
        };
        entries.insert(id.to_string(), merged);
    }

    /// Remove a deployment from the cache
    pub fn remove(&self, id: &str) -> Option<DeploymentStatus> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(id)
    }

    /// Whether Start should be offered: stopped or never observed
    pub fn is_stopped(&self, id: &str) -> bool {
        matches!(
            self.state(id),
            DeploymentState::Stopped | DeploymentState::Unknown
        )
    }

    /// Copy of every cached entry
    pub fn snapshot(&self) -> HashMap<String, DeploymentStatus> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.clone()
    }

    /// Drop entries for ids not in `keep`
    pub fn retain_ids(&self, keep: &[String]) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.retain(|id, _| keep.contains(id));
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
