mod error;
mod model;

pub use error::SessionError;
pub use model::*;

use std::{str::FromStr, sync::Arc};

use dashmap::DashMap;
use teloxide::types::UserId;
use uuid::Uuid;

use crate::service::{Language, Task, VideoLink};

/// In-memory flow state keyed by user. Every transition happens under the
/// user's map entry and never across an await point.
#[derive(Clone, Default)]
pub struct SessionService {
    sessions: Arc<DashMap<UserId, FlowState>>,
}

impl SessionService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, user_id: UserId) -> FlowState {
        self.sessions
            .get(&user_id)
            .map(|state| state.value().clone())
            .unwrap_or_default()
    }

    pub fn has_pending_link(&self, user_id: UserId) -> bool {
        self.sessions
            .get(&user_id)
            .is_some_and(|state| state.pending_link().is_some())
    }

    /// Replaces whatever the user had, including a run in progress.
    pub fn set_pending_link(&self, user_id: UserId, link: VideoLink) {
        debug!("User {} submitted video {}", user_id, link.video_id);
        self.sessions.insert(user_id, FlowState::LinkReceived { link });
    }

    pub fn set_pending_action(&self, user_id: UserId, task: Task) -> Result<(), SessionError> {
        let mut entry = self.sessions.get_mut(&user_id).ok_or(SessionError::NoPendingLink)?;
        let link = entry.pending_link().cloned().ok_or(SessionError::NoPendingLink)?;

        *entry = FlowState::ActionChosen { link, task };
        Ok(())
    }

    pub fn resolve_language_code(code: &str) -> Result<Language, SessionError> {
        Language::from_str(code).map_err(|_| SessionError::UnsupportedLanguage(code.to_string()))
    }

    /// Takes link and action out of the session and marks the run as started.
    /// An unsupported code leaves the session untouched.
    pub fn consume_for_generation(&self, user_id: UserId, language_code: &str) -> Result<GenerationJob, SessionError> {
        let language = Self::resolve_language_code(language_code)?;

        let mut entry = self
            .sessions
            .get_mut(&user_id)
            .ok_or(SessionError::MissingSessionData)?;

        let (link, task) = match &*entry {
            FlowState::ActionChosen { link, task } => (link.clone(), *task),
            _ => return Err(SessionError::MissingSessionData),
        };

        let job = GenerationJob {
            run_id: Uuid::new_v4(),
            link: link.clone(),
            task,
            language,
        };

        *entry = FlowState::Generating {
            run_id: job.run_id,
            link,
            task,
            language,
        };

        Ok(job)
    }

    /// Returns the user to `Idle` unless a newer link already replaced the run.
    pub fn finish_generation(&self, user_id: UserId, run_id: Uuid) {
        if let Some(mut entry) = self.sessions.get_mut(&user_id) {
            if matches!(&*entry, FlowState::Generating { run_id: current, .. } if *current == run_id) {
                *entry = FlowState::Idle;
            }
        }
    }
}
