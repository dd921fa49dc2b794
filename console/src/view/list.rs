//! Deployments list projection

use colored::{ColoredString, Colorize};
use shipkit_api::{Deployment, DeploymentState};

use crate::actions::coordinator::ActionCoordinator;
use crate::actions::fsm::ActionKind;
use crate::cache::status::StatusCache;

pub const EMPTY_MESSAGE: &str = "No deployments yet. Create one with `shipkit create`.";

/// Badge color for a state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeColor {
    Green,
    Red,
    Yellow,
    Orange,
    Gray,
}

impl BadgeColor {
    pub fn for_state(state: DeploymentState) -> Self {
        match state {
            DeploymentState::Running => BadgeColor::Green,
            DeploymentState::Stopped => BadgeColor::Red,
            DeploymentState::Starting => BadgeColor::Yellow,
            DeploymentState::Stopping => BadgeColor::Orange,
            DeploymentState::Error | DeploymentState::Unknown => BadgeColor::Gray,
        }
    }

    pub fn paint(&self, text: &str) -> ColoredString {
        match self {
            BadgeColor::Green => text.green(),
            BadgeColor::Red => text.red(),
            BadgeColor::Yellow => text.yellow(),
            BadgeColor::Orange => text.truecolor(255, 165, 0),
            BadgeColor::Gray => text.bright_black(),
        }
    }
}

/// One rendered deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentCard {
    pub id: String,
    pub name: String,
    pub state: DeploymentState,
    pub badge: BadgeColor,
    pub created_at: Option<String>,
    pub containers: usize,
    /// Start when stopped or unknown, Stop otherwise
    pub toggle: ActionKind,
    pub toggle_disabled: bool,
    pub delete_disabled: bool,
}

/// What the list screen shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListView {
    Empty,
    Cards(Vec<DeploymentCard>),
}

/// Project the deployments list and the status cache into cards
pub fn project(
    deployments: &[Deployment],
    cache: &StatusCache,
    actions: &ActionCoordinator,
) -> ListView {
    if deployments.is_empty() {
        return ListView::Empty;
    }

    let cards = deployments
        .iter()
        .map(|deployment| {
            let id = deployment.id.as_str();
            let status = cache.get(id);
            let state = status.as_ref().map(|s| s.state).unwrap_or_default();
            let toggle = if cache.is_stopped(id) {
                ActionKind::Start
            } else {
                ActionKind::Stop
            };
            DeploymentCard {
                id: deployment.id.clone(),
                name: deployment.name.clone(),
                state,
                badge: BadgeColor::for_state(state),
                created_at: deployment.created_at.clone(),
                containers: status.map(|s| s.containers.len()).unwrap_or(0),
                toggle,
                toggle_disabled: actions.is_loading(ActionKind::Start, id)
                    || actions.is_loading(ActionKind::Stop, id),
                delete_disabled: actions.is_loading(ActionKind::Delete, id),
            }
        })
        .collect();

    ListView::Cards(cards)
}

/// Render the view as terminal text
pub fn render(view: &ListView) -> String {
    let cards = match view {
        ListView::Empty => return EMPTY_MESSAGE.to_string(),
        ListView::Cards(cards) => cards,
    };

    let mut out = String::new();
    for card in cards {
        let badge = card.badge.paint(&format!("[{}]", card.state));
        let toggle = match (card.toggle, card.toggle_disabled) {
            (ActionKind::Start, false) => "start".to_string(),
            (ActionKind::Start, true) => "starting…".to_string(),
            (_, false) => "stop".to_string(),
            (_, true) => "stopping…".to_string(),
        };
        let delete = if card.delete_disabled { "deleting…" } else { "delete" };

        out.push_str(&format!(
            "{:<12} {} {}\n",
            badge,
            card.name.bold(),
            format!("({})", card.id).dimmed()
        ));
        out.push_str(&format!(
            "             containers: {}  created: {}  actions: {} | edit | {}\n",
            card.containers,
            card.created_at.as_deref().unwrap_or("-"),
            toggle,
            delete
        ));
    }
    out
}
