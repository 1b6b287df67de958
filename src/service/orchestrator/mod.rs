mod error;
mod guard;
mod reply;

pub use error::FlowError;
pub use guard::{run_guards, ActionGuard, GuardContext, ACTION_GUARDS};
pub use reply::*;

use std::{future::Future, sync::Arc, time::Duration};

use teloxide::types::UserId;

use crate::service::{
    link, prompt, Action, FlowState, GenerationJob, Language, SessionService, Task, TextGenerator,
    TranscriptFetcher, UsageInfo, UsageLedger, UserProfile, UserTier,
};

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub model: String,
    pub max_transcript_chars: usize,
    pub min_content_chars: usize,
    pub transcript_timeout: Duration,
    pub generation_timeout: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            model: crate::service::generation::DEFAULT_MODEL.to_string(),
            max_transcript_chars: prompt::DEFAULT_MAX_TRANSCRIPT_CHARS,
            min_content_chars: prompt::DEFAULT_MIN_CONTENT_CHARS,
            transcript_timeout: Duration::from_secs(30),
            generation_timeout: Duration::from_secs(60),
        }
    }
}

/// Text produced for one completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub task: Task,
    pub language: Language,
    pub text: String,
}

/// Drives the per-user flow: link, action, language, result.
pub struct Orchestrator {
    ledger: UsageLedger,
    sessions: SessionService,
    transcripts: Arc<dyn TranscriptFetcher>,
    generator: Arc<dyn TextGenerator>,
    settings: PipelineSettings,
}

impl Orchestrator {
    pub fn new(
        ledger: UsageLedger,
        sessions: SessionService,
        transcripts: Arc<dyn TranscriptFetcher>,
        generator: Arc<dyn TextGenerator>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            ledger,
            sessions,
            transcripts,
            generator,
            settings,
        }
    }

    pub fn flow_state(&self, user_id: UserId) -> FlowState {
        self.sessions.state(user_id)
    }

    pub async fn register_user(&self, profile: &UserProfile) -> Result<(), FlowError> {
        self.ledger.register_user(profile).await?;
        Ok(())
    }

    /// A valid link always restarts the flow; invalid text leaves the session as it was.
    pub async fn submit_link(&self, user_id: UserId, text: &str) -> Result<Reply, FlowError> {
        let link = link::parse_link(text)?;
        self.sessions.set_pending_link(user_id, link);

        Ok(Reply::with_menu(t!("messages.link_accepted"), Menu::actions()))
    }

    pub async fn choose_action(&self, user_id: UserId, action: Action) -> Result<Reply, FlowError> {
        let check = self.ledger.check_and_describe_quota(user_id).await?;

        let ctx = GuardContext {
            tier: check.tier,
            quota: check.status,
            action,
            has_pending_link: self.sessions.has_pending_link(user_id),
        };
        run_guards(&ACTION_GUARDS, &ctx)?;

        match action.task() {
            Some(task) => {
                self.sessions.set_pending_action(user_id, task)?;
                let prompt_key = match task {
                    Task::Summary => "messages.choose_language_summary",
                    Task::Takeaways => "messages.choose_language_takeaways",
                };
                Ok(Reply::with_menu(t!(prompt_key), Menu::languages()))
            }
            None => Ok(Reply::text(t!("messages.ask_coming_soon"))),
        }
    }

    /// Validates the language and claims the pending action. Nothing external is called yet.
    pub fn prepare_generation(&self, user_id: UserId, language_code: &str) -> Result<GenerationJob, FlowError> {
        Ok(self.sessions.consume_for_generation(user_id, language_code)?)
    }

    /// Runs the pipeline for a claimed job and always releases the session afterwards.
    pub async fn run_generation(&self, user_id: UserId, job: GenerationJob) -> Result<Generated, FlowError> {
        let result = self.run_pipeline(user_id, &job).await;
        self.sessions.finish_generation(user_id, job.run_id);
        result
    }

    pub async fn choose_language(&self, user_id: UserId, language_code: &str) -> Result<Generated, FlowError> {
        let job = self.prepare_generation(user_id, language_code)?;
        self.run_generation(user_id, job).await
    }

    pub async fn change_tier(&self, user_id: UserId, tier: &str) -> Result<UserTier, FlowError> {
        Ok(self.ledger.set_tier(user_id, tier).await?)
    }

    pub async fn usage(&self, user_id: UserId) -> Result<UsageInfo, FlowError> {
        Ok(self.ledger.describe_usage(user_id).await?)
    }

    async fn run_pipeline(&self, user_id: UserId, job: &GenerationJob) -> Result<Generated, FlowError> {
        let video_id = job.link.video_id.as_str();
        info!("Fetching transcript for {} ({:?}, user {})", video_id, job.task, user_id);

        let segments = match with_timeout(self.settings.transcript_timeout, self.transcripts.fetch(video_id)).await {
            Some(Ok(segments)) if !segments.is_empty() => segments,
            Some(Ok(_)) => {
                warn!("Empty transcript for {}", video_id);
                return Err(FlowError::TranscriptUnavailable);
            }
            Some(Err(e)) => {
                warn!("Transcript not available for {}: {}", video_id, e);
                return Err(FlowError::TranscriptUnavailable);
            }
            None => {
                warn!("Transcript fetch for {} timed out", video_id);
                return Err(FlowError::TranscriptUnavailable);
            }
        };

        let transcript_text = prompt::format_transcript(&segments, self.settings.max_transcript_chars);
        if transcript_text.chars().count() < self.settings.min_content_chars {
            info!("Transcript for {} is too short to process", video_id);
            return Err(FlowError::ContentTooShort);
        }

        let prompt = prompt::build_prompt(&transcript_text, job.language, job.task);
        debug!("Prompt for {} is {} characters", video_id, prompt.len());

        let text = match with_timeout(
            self.settings.generation_timeout,
            self.generator.complete(&prompt, &self.settings.model),
        )
        .await
        {
            Some(Ok(text)) => text,
            Some(Err(e)) => {
                error!("Generation failed for {}: {}", video_id, e);
                return Err(FlowError::GenerationFailed(e.to_string()));
            }
            None => {
                error!("Generation for {} timed out", video_id);
                return Err(FlowError::GenerationFailed("timed out".to_string()));
            }
        };

        self.ledger.record_usage(user_id, job.task.request_kind()).await?;

        Ok(Generated {
            task: job.task,
            language: job.language,
            text,
        })
    }
}

async fn with_timeout<F: Future>(duration: Duration, future: F) -> Option<F::Output> {
    tokio::time::timeout(duration, future).await.ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::RequestKind;
    use crate::storage::{MemoryStore, UserStore};
    use crate::utils::test::{transcript_of_len, FakeGenerator, FakeTranscripts};

    const LINK: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
    const OTHER_LINK: &str = "https://youtu.be/aaaaaaaaaaa";

    struct Harness {
        orchestrator: Orchestrator,
        store: MemoryStore,
        transcripts: Arc<FakeTranscripts>,
        generator: Arc<FakeGenerator>,
    }

    fn harness(transcripts: FakeTranscripts, generator: FakeGenerator) -> Harness {
        let store = MemoryStore::new();
        let transcripts = Arc::new(transcripts);
        let generator = Arc::new(generator);

        let orchestrator = Orchestrator::new(
            UsageLedger::new(Arc::new(store.clone())),
            SessionService::new(),
            transcripts.clone(),
            generator.clone(),
            PipelineSettings::default(),
        );

        Harness {
            orchestrator,
            store,
            transcripts,
            generator,
        }
    }

    fn default_harness() -> Harness {
        harness(
            FakeTranscripts::returning(transcript_of_len(500)),
            FakeGenerator::returning("Generated summary."),
        )
    }

    async fn seed_requests(store: &MemoryStore, user: UserId, count: usize) {
        for _ in 0..count {
            store.append_request(user, RequestKind::Summarize).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_invalid_link_stays_idle() {
        let h = default_harness();
        let user = UserId(1);

        let err = h.orchestrator.submit_link(user, "not a link").await.unwrap_err();
        assert!(matches!(err, FlowError::InvalidLinkFormat));
        assert_eq!(h.orchestrator.flow_state(user), FlowState::Idle);
    }

    #[tokio::test]
    async fn test_valid_link_offers_actions() {
        let h = default_harness();
        let user = UserId(1);

        let reply = h.orchestrator.submit_link(user, LINK).await.unwrap();
        assert_eq!(reply.menu, Some(Menu::actions()));
        assert!(matches!(h.orchestrator.flow_state(user), FlowState::LinkReceived { .. }));
    }

    #[tokio::test]
    async fn test_end_to_end_summary() {
        let h = default_harness();
        let user = UserId(1);
        h.store.set_tier(user, UserTier::Pro).await.unwrap();

        h.orchestrator.submit_link(user, LINK).await.unwrap();
        let reply = h.orchestrator.choose_action(user, Action::Summarize).await.unwrap();
        assert_eq!(reply.menu, Some(Menu::languages()));

        let generated = h.orchestrator.choose_language(user, "en").await.unwrap();
        assert_eq!(generated.text, "Generated summary.");
        assert_eq!(generated.task, Task::Summary);

        assert_eq!(h.transcripts.calls(), vec!["dQw4w9WgXcQ".to_string()]);
        let prompts = h.generator.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("english"));
        assert!(prompts[0].contains(&transcript_of_len(500)[0].text));

        let records = h.store.records(user);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, RequestKind::Summarize);
        assert_eq!(h.orchestrator.flow_state(user), FlowState::Idle);
    }

    #[tokio::test]
    async fn test_free_user_at_quota_is_denied() {
        let h = default_harness();
        let user = UserId(1);
        seed_requests(&h.store, user, 3).await;

        h.orchestrator.submit_link(user, LINK).await.unwrap();
        for action in [Action::Summarize, Action::Takeaways, Action::Ask] {
            let err = h.orchestrator.choose_action(user, action).await.unwrap_err();
            assert!(matches!(err, FlowError::QuotaExceeded { limit: 3 }));
        }

        assert_eq!(h.store.records(user).len(), 3);
        assert!(matches!(h.orchestrator.flow_state(user), FlowState::LinkReceived { .. }));
    }

    #[tokio::test]
    async fn test_plus_user_at_quota_is_denied() {
        let h = default_harness();
        let user = UserId(1);
        h.store.set_tier(user, UserTier::Plus).await.unwrap();
        seed_requests(&h.store, user, 100).await;

        h.orchestrator.submit_link(user, LINK).await.unwrap();
        let err = h.orchestrator.choose_action(user, Action::Summarize).await.unwrap_err();
        assert!(matches!(err, FlowError::QuotaExceeded { limit: 100 }));
        assert!(matches!(h.orchestrator.flow_state(user), FlowState::LinkReceived { .. }));
    }

    #[tokio::test]
    async fn test_free_user_cannot_pick_takeaways() {
        let h = default_harness();
        let user = UserId(1);

        h.orchestrator.submit_link(user, LINK).await.unwrap();
        let err = h.orchestrator.choose_action(user, Action::Takeaways).await.unwrap_err();
        assert!(matches!(err, FlowError::TierRestricted));
        assert!(h.store.records(user).is_empty());
        assert!(matches!(h.orchestrator.flow_state(user), FlowState::LinkReceived { .. }));
    }

    #[tokio::test]
    async fn test_action_without_link() {
        let h = default_harness();
        let err = h
            .orchestrator
            .choose_action(UserId(1), Action::Summarize)
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::NoPendingLink));
    }

    #[tokio::test]
    async fn test_ask_is_not_available_yet() {
        let h = default_harness();
        let user = UserId(1);

        h.orchestrator.submit_link(user, LINK).await.unwrap();
        let reply = h.orchestrator.choose_action(user, Action::Ask).await.unwrap();
        assert!(reply.menu.is_none());
        assert!(matches!(h.orchestrator.flow_state(user), FlowState::LinkReceived { .. }));
    }

    #[tokio::test]
    async fn test_second_link_discards_stale_action() {
        let h = default_harness();
        let user = UserId(1);

        h.orchestrator.submit_link(user, LINK).await.unwrap();
        h.orchestrator.choose_action(user, Action::Summarize).await.unwrap();
        h.orchestrator.submit_link(user, OTHER_LINK).await.unwrap();

        let err = h.orchestrator.choose_language(user, "en").await.unwrap_err();
        assert!(matches!(err, FlowError::MissingSessionData));
        assert!(h.transcripts.calls().is_empty());
        assert!(h.store.records(user).is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_language() {
        let h = default_harness();
        let user = UserId(1);

        h.orchestrator.submit_link(user, LINK).await.unwrap();
        h.orchestrator.choose_action(user, Action::Summarize).await.unwrap();

        let err = h.orchestrator.choose_language(user, "de").await.unwrap_err();
        assert!(matches!(err, FlowError::UnsupportedLanguage(ref code) if code == "de"));
        assert!(matches!(h.orchestrator.flow_state(user), FlowState::ActionChosen { .. }));

        // The pending action is still there for a valid choice.
        assert!(h.orchestrator.choose_language(user, "es").await.is_ok());
    }

    #[tokio::test]
    async fn test_short_transcript_is_rejected() {
        let h = harness(
            FakeTranscripts::returning(transcript_of_len(40)),
            FakeGenerator::returning("unused"),
        );
        let user = UserId(1);
        h.store.set_tier(user, UserTier::Plus).await.unwrap();

        h.orchestrator.submit_link(user, LINK).await.unwrap();
        h.orchestrator.choose_action(user, Action::Takeaways).await.unwrap();

        let err = h.orchestrator.choose_language(user, "en").await.unwrap_err();
        assert!(matches!(err, FlowError::ContentTooShort));
        assert!(h.generator.prompts().is_empty());
        assert!(h.store.records(user).is_empty());
        assert_eq!(h.orchestrator.flow_state(user), FlowState::Idle);
    }

    #[tokio::test]
    async fn test_missing_transcript_skips_generation() {
        let h = harness(FakeTranscripts::unavailable(), FakeGenerator::returning("unused"));
        let user = UserId(1);

        h.orchestrator.submit_link(user, LINK).await.unwrap();
        h.orchestrator.choose_action(user, Action::Summarize).await.unwrap();

        let err = h.orchestrator.choose_language(user, "ar").await.unwrap_err();
        assert!(matches!(err, FlowError::TranscriptUnavailable));
        assert!(h.generator.prompts().is_empty());
        assert!(h.store.records(user).is_empty());
        assert_eq!(h.orchestrator.flow_state(user), FlowState::Idle);
    }

    #[tokio::test]
    async fn test_generation_failure_records_nothing() {
        let h = harness(FakeTranscripts::returning(transcript_of_len(500)), FakeGenerator::failing());
        let user = UserId(1);

        h.orchestrator.submit_link(user, LINK).await.unwrap();
        h.orchestrator.choose_action(user, Action::Summarize).await.unwrap();

        let err = h.orchestrator.choose_language(user, "en").await.unwrap_err();
        assert!(matches!(err, FlowError::GenerationFailed(_)));
        assert_eq!(h.generator.prompts().len(), 1);
        assert!(h.store.records(user).is_empty());
        assert_eq!(h.orchestrator.flow_state(user), FlowState::Idle);
    }

    #[tokio::test]
    async fn test_tier_change_is_not_retroactive() {
        let h = default_harness();
        let user = UserId(1);
        seed_requests(&h.store, user, 3).await;

        h.orchestrator.submit_link(user, LINK).await.unwrap();
        let denied = h.orchestrator.choose_action(user, Action::Summarize).await;
        assert!(matches!(denied, Err(FlowError::QuotaExceeded { limit: 3 })));
        assert!(matches!(h.orchestrator.flow_state(user), FlowState::LinkReceived { .. }));

        assert_eq!(h.orchestrator.change_tier(user, "plus").await.unwrap(), UserTier::Plus);
        assert!(h.orchestrator.choose_action(user, Action::Summarize).await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_tier() {
        let h = default_harness();
        let err = h.orchestrator.change_tier(UserId(1), "enterprise").await.unwrap_err();
        assert!(matches!(err, FlowError::InvalidTier(_)));
    }

    #[tokio::test]
    async fn test_pipeline_timeout_is_reported() {
        let store = MemoryStore::new();
        let orchestrator = Orchestrator::new(
            UsageLedger::new(Arc::new(store.clone())),
            SessionService::new(),
            Arc::new(FakeTranscripts::returning(transcript_of_len(500))),
            Arc::new(FakeGenerator::returning("late").with_delay(Duration::from_millis(200))),
            PipelineSettings {
                generation_timeout: Duration::from_millis(20),
                ..PipelineSettings::default()
            },
        );
        let user = UserId(1);

        orchestrator.submit_link(user, LINK).await.unwrap();
        orchestrator.choose_action(user, Action::Summarize).await.unwrap();

        let err = orchestrator.choose_language(user, "en").await.unwrap_err();
        assert!(matches!(err, FlowError::GenerationFailed(_)));
        assert!(store.records(user).is_empty());
    }

    #[tokio::test]
    async fn test_usage_summary_counts_completed_requests() {
        let h = default_harness();
        let user = UserId(1);

        h.orchestrator.submit_link(user, LINK).await.unwrap();
        h.orchestrator.choose_action(user, Action::Summarize).await.unwrap();
        h.orchestrator.choose_language(user, "en").await.unwrap();

        let usage = h.orchestrator.usage(user).await.unwrap();
        assert_eq!(usage.used_today, 1);
        assert_eq!(usage.remaining, 2);
    }

    /// Counts tier reads so a click can be checked against a single snapshot.
    struct TierReadCounter {
        inner: MemoryStore,
        tier_reads: std::sync::atomic::AtomicUsize,
    }

    #[async_trait::async_trait]
    impl UserStore for TierReadCounter {
        async fn upsert_user(&self, profile: &UserProfile) -> Result<(), crate::storage::StorageError> {
            self.inner.upsert_user(profile).await
        }

        async fn get_tier(&self, user_id: UserId) -> Result<UserTier, crate::storage::StorageError> {
            self.tier_reads.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.inner.get_tier(user_id).await
        }

        async fn set_tier(&self, user_id: UserId, tier: UserTier) -> Result<(), crate::storage::StorageError> {
            self.inner.set_tier(user_id, tier).await
        }

        async fn count_requests_today(&self, user_id: UserId) -> Result<u32, crate::storage::StorageError> {
            self.inner.count_requests_today(user_id).await
        }

        async fn append_request(&self, user_id: UserId, kind: RequestKind) -> Result<(), crate::storage::StorageError> {
            self.inner.append_request(user_id, kind).await
        }
    }

    #[tokio::test]
    async fn test_action_reads_tier_once() {
        let store = Arc::new(TierReadCounter {
            inner: MemoryStore::new(),
            tier_reads: Default::default(),
        });
        let orchestrator = Orchestrator::new(
            UsageLedger::new(store.clone()),
            SessionService::new(),
            Arc::new(FakeTranscripts::returning(transcript_of_len(500))),
            Arc::new(FakeGenerator::returning("unused")),
            PipelineSettings::default(),
        );
        let user = UserId(1);
        store.inner.set_tier(user, UserTier::Pro).await.unwrap();

        orchestrator.submit_link(user, LINK).await.unwrap();
        orchestrator.choose_action(user, Action::Takeaways).await.unwrap();

        assert_eq!(store.tier_reads.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
