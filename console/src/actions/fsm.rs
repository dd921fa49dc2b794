//! Per-deployment action state machine

use shipkit_api::DeploymentState;

/// Remote action a user can trigger on a deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Start,
    Stop,
    Delete,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Start => "start",
            ActionKind::Stop => "stop",
            ActionKind::Delete => "delete",
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            ActionKind::Start => "Deployment restarted successfully!",
            ActionKind::Stop => "Deployment stopped successfully!",
            ActionKind::Delete => "Deployment deleted successfully!",
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self {
            ActionKind::Start => "Failed to restart deployment",
            ActionKind::Stop => "Failed to stop deployment",
            ActionKind::Delete => "Failed to delete deployment",
        }
    }

    /// Transitional state shown until the next real fetch. `None` for
    /// delete, whose cache entry is dropped instead.
    pub fn optimistic_state(&self) -> Option<DeploymentState> {
        match self {
            ActionKind::Start => Some(DeploymentState::Starting),
            ActionKind::Stop => Some(DeploymentState::Stopping),
            ActionKind::Delete => None,
        }
    }
}

/// Action phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionPhase {
    /// Nothing running
    Idle,

    /// Mutation sent, waiting for the gateway
    InFlight,
}

/// Action event
#[derive(Debug, Clone)]
pub enum ActionEvent {
    /// The mutation is about to be sent
    Invoke,

    /// The gateway accepted the mutation
    Succeeded,

    /// The mutation failed
    Failed(String),
}

/// Action FSM for one (kind, deployment) pair
#[derive(Debug, Clone)]
pub struct ActionFsm {
    phase: ActionPhase,
    last_error: Option<String>,
}

impl ActionFsm {
    pub fn new() -> Self {
        Self {
            phase: ActionPhase::Idle,
            last_error: None,
        }
    }

    pub fn phase(&self) -> ActionPhase {
        self.phase
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_in_flight(&self) -> bool {
        self.phase == ActionPhase::InFlight
    }

    /// Process an event and transition phase
    pub fn process(&mut self, event: ActionEvent) -> Result<(), String> {
        let next = match (self.phase, &event) {
            (ActionPhase::Idle, ActionEvent::Invoke) => {
                self.last_error = None;
                ActionPhase::InFlight
            }
            (ActionPhase::InFlight, ActionEvent::Succeeded) => ActionPhase::Idle,
            (ActionPhase::InFlight, ActionEvent::Failed(err)) => {
                self.last_error = Some(err.clone());
                ActionPhase::Idle
            }
            (phase, event) => {
                return Err(format!("Invalid transition: {:?} -> {:?}", phase, event));
            }
        };

        self.phase = next;
        Ok(())
    }
}

impl Default for ActionFsm {
    fn default() -> Self {
        Self::new()
    }
}
