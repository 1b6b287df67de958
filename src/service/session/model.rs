use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::service::{Language, Task, VideoLink};

/// Actions offered in the menu shown after a link is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Summarize,
    Takeaways,
    Ask,
}

impl Action {
    /// `Ask` has no generation task yet.
    pub fn task(&self) -> Option<Task> {
        match self {
            Action::Summarize => Some(Task::Summary),
            Action::Takeaways => Some(Task::Takeaways),
            Action::Ask => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Action::Summarize => "summarize",
            Action::Takeaways => "takeaways",
            Action::Ask => "ask",
        }
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "summarize" => Ok(Action::Summarize),
            "takeaways" => Ok(Action::Takeaways),
            "ask" => Ok(Action::Ask),
            _ => Err(format!("Unknown action: {}", s)),
        }
    }
}

/// Per-user conversation state. Each variant carries only what is valid in it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum FlowState {
    #[default]
    Idle,
    LinkReceived {
        link: VideoLink,
    },
    ActionChosen {
        link: VideoLink,
        task: Task,
    },
    Generating {
        run_id: Uuid,
        link: VideoLink,
        task: Task,
        language: Language,
    },
}

impl FlowState {
    pub fn pending_link(&self) -> Option<&VideoLink> {
        match self {
            FlowState::LinkReceived { link } | FlowState::ActionChosen { link, .. } => Some(link),
            FlowState::Idle | FlowState::Generating { .. } => None,
        }
    }
}

/// Everything one pipeline run needs, taken out of the session in a single step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationJob {
    pub run_id: Uuid,
    pub link: VideoLink,
    pub task: Task,
    pub language: Language,
}
