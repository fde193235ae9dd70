//! ConversationService: platform events in, replies and notices out.
//!
//! Wires the registry, moderation, the run orchestrator, staleness checks and
//! segmentation into the two entry points a platform adapter calls: starting
//! a conversation and handling a message posted into one.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use threadbot_types::completion::{CompletionOutcome, CompletionStatus};
use threadbot_types::config::BotConfig;
use threadbot_types::error::{OrchestratorError, PlatformError, StartError};
use threadbot_types::moderation::ModerationVerdict;
use threadbot_types::platform::{InboundMessage, OutboundMessage};
use threadbot_types::session::ConversationId;

use crate::moderation::{check_fail_open, ModerationGate};
use crate::platform::ChatPlatform;
use crate::remote::RemoteRunClient;
use crate::run::RunOrchestrator;
use crate::segment::ResponseSegmenter;
use crate::session::{SessionHandle, SessionRegistry};
use crate::staleness::StalenessGuard;

use super::render;

/// A request to open a new conversation.
#[derive(Debug, Clone, Default)]
pub struct StartConversation {
    pub author_name: String,
    pub first_message: String,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

/// Why an inbound message was not processed at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    ServerNotAllowed,
    FromBot,
    /// No session is bound to the conversation.
    UnknownConversation,
    SessionClosed,
    /// Archived or locked on the platform side.
    ConversationInactive,
}

/// What became of one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDisposition {
    Ignored(IgnoreReason),
    /// The conversation hit the message cap and was closed.
    LimitReached,
    /// A newer message arrived during the debounce delay.
    Superseded,
    /// Inbound moderation blocked the message; nothing was submitted.
    Blocked,
    /// A newer message arrived while the run was in flight; nothing was sent.
    Stale,
    /// The outcome was sent to the conversation.
    Dispatched(CompletionStatus),
}

/// A newly opened conversation and what happened to its first message.
#[derive(Debug, Clone)]
pub struct StartedConversation {
    pub conversation_id: ConversationId,
    pub disposition: TurnDisposition,
}

pub struct ConversationService<C, M, P>
where
    C: RemoteRunClient,
    M: ModerationGate,
    P: ChatPlatform,
{
    config: BotConfig,
    registry: SessionRegistry<C>,
    orchestrator: RunOrchestrator<C>,
    moderation: M,
    platform: Arc<P>,
    guard: StalenessGuard,
    segmenter: ResponseSegmenter,
}

impl<C, M, P> ConversationService<C, M, P>
where
    C: RemoteRunClient,
    M: ModerationGate,
    P: ChatPlatform,
{
    pub fn new(config: BotConfig, client: Arc<C>, moderation: M, platform: Arc<P>) -> Self {
        let registry = SessionRegistry::new(client.clone(), config.allowed_models.clone());
        let orchestrator = RunOrchestrator::from_config(client, &config);
        let guard = StalenessGuard::new(Duration::from_secs(config.debounce_secs));
        let segmenter = ResponseSegmenter::new(config.max_segment_chars);
        Self {
            config,
            registry,
            orchestrator,
            moderation,
            platform,
            guard,
            segmenter,
        }
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn registry(&self) -> &SessionRegistry<C> {
        &self.registry
    }

    /// Open a conversation, bind a remote session to it, and answer the
    /// first message.
    ///
    /// Settings are validated before anything is created. If the remote
    /// session cannot be created the platform conversation is closed again.
    pub async fn start_conversation(
        &self,
        request: StartConversation,
    ) -> Result<StartedConversation, StartError> {
        let desired = self.config.session_config(
            request.model.clone(),
            request.temperature,
            request.max_tokens,
        );
        desired.validate(&self.config.allowed_models)?;

        let title = render::conversation_title(
            &self.config.title_prefix,
            &request.author_name,
            &request.first_message,
        );
        let conversation_id = self.platform.open_conversation(&title).await?;
        info!(
            conversation_id = %conversation_id,
            author = %request.author_name,
            model = %desired.model,
            "Conversation started"
        );

        let session = match self.registry.get_or_create(&conversation_id, &desired).await {
            Ok(session) => session,
            Err(e) => {
                if let Err(close_err) = self.platform.close_conversation(&conversation_id).await {
                    warn!(
                        conversation_id = %conversation_id,
                        error = %close_err,
                        "Failed to close conversation after session error"
                    );
                }
                return Err(e.into());
            }
        };

        self.platform
            .send(
                &conversation_id,
                render::start_notice(&request.author_name, &request.first_message, &desired),
            )
            .await?;

        let disposition = self
            .process_turn(&session, &request.author_name, &request.first_message, None)
            .await?;

        Ok(StartedConversation {
            conversation_id,
            disposition,
        })
    }

    /// Handle a message posted into a conversation.
    ///
    /// Platform failures are returned; everything the remote side does is
    /// turned into a disposition.
    pub async fn handle_message(
        &self,
        message: &InboundMessage,
    ) -> Result<TurnDisposition, PlatformError> {
        if !self.config.is_server_allowed(message.server_id.as_deref()) {
            return Ok(TurnDisposition::Ignored(IgnoreReason::ServerNotAllowed));
        }
        if message.is_from_bot {
            return Ok(TurnDisposition::Ignored(IgnoreReason::FromBot));
        }
        let Some(session) = self.registry.get(&message.conversation_id) else {
            return Ok(TurnDisposition::Ignored(IgnoreReason::UnknownConversation));
        };
        if session.is_closed() {
            return Ok(TurnDisposition::Ignored(IgnoreReason::SessionClosed));
        }

        let state = self
            .platform
            .conversation_state(&message.conversation_id)
            .await?;
        if !state.is_open() {
            return Ok(TurnDisposition::Ignored(IgnoreReason::ConversationInactive));
        }

        if state.message_count > self.config.max_conversation_messages {
            info!(
                conversation_id = %message.conversation_id,
                message_count = state.message_count,
                "Message limit reached"
            );
            self.close(&session, "message limit reached").await?;
            return Ok(TurnDisposition::LimitReached);
        }

        if !self.guard.debounce(self.platform.as_ref(), message).await {
            return Ok(TurnDisposition::Superseded);
        }

        info!(
            conversation_id = %message.conversation_id,
            author = %message.author_name,
            chars = message.text.chars().count(),
            "Processing message"
        );

        self.process_turn(&session, &message.author_name, &message.text, Some(message))
            .await
    }

    /// Moderate, run and dispatch one turn. `trigger` enables the post-run
    /// staleness check.
    async fn process_turn(
        &self,
        session: &SessionHandle,
        author: &str,
        text: &str,
        trigger: Option<&InboundMessage>,
    ) -> Result<TurnDisposition, PlatformError> {
        let conversation = session.local_id();

        let inbound = check_fail_open(&self.moderation, text).await;
        if inbound == ModerationVerdict::Blocked {
            info!(conversation_id = %conversation, author = %author, "Inbound message blocked");
            self.platform
                .send(conversation, render::blocked_notice(author))
                .await?;
            return Ok(TurnDisposition::Blocked);
        }

        let outcome = match self.orchestrator.submit_and_wait(session, text).await {
            Ok(outcome) => outcome,
            Err(OrchestratorError::ConversationClosed(_)) => {
                return Ok(TurnDisposition::Ignored(IgnoreReason::SessionClosed));
            }
        };

        if let Some(trigger) = trigger {
            if !self.guard.is_current(self.platform.as_ref(), trigger).await {
                debug!(
                    conversation_id = %conversation,
                    status = %outcome.status(),
                    "Discarding outcome of a superseded message"
                );
                return Ok(TurnDisposition::Stale);
            }
        }

        // Inbound is Allowed or Flagged here. Flagging only matters once there
        // is a reply to send alongside the warning.
        let verdict = match outcome.reply_text() {
            Some(reply) => inbound.most_severe(check_fail_open(&self.moderation, reply).await),
            None => ModerationVerdict::Allowed,
        };
        let outcome = match verdict {
            ModerationVerdict::Blocked => {
                info!(conversation_id = %conversation, "Reply blocked by moderation");
                CompletionOutcome::moderation_blocked("reply blocked by moderation")
            }
            ModerationVerdict::Flagged => outcome.into_flagged(),
            ModerationVerdict::Allowed => outcome,
        };

        self.dispatch(session, author, outcome).await
    }

    /// Send one outcome: at most one notice, then the reply segments if any.
    async fn dispatch(
        &self,
        session: &SessionHandle,
        author: &str,
        outcome: CompletionOutcome,
    ) -> Result<TurnDisposition, PlatformError> {
        let conversation = session.local_id();
        let status = outcome.status();

        if let Some(notice) = render::outcome_notice(&outcome, author) {
            self.platform.send(conversation, notice).await?;
            if outcome.closes_conversation() {
                info!(conversation_id = %conversation, "Context limit reached, closing");
                self.close_silently(session).await?;
                return Ok(TurnDisposition::Dispatched(status));
            }
        }

        if let Some(reply) = outcome.into_reply_text() {
            let mut sent = 0usize;
            for segment in self.segmenter.split(&reply) {
                self.platform
                    .send(conversation, OutboundMessage::Segment(segment))
                    .await?;
                sent += 1;
            }
            debug!(conversation_id = %conversation, segments = sent, "Reply sent");
        }
        Ok(TurnDisposition::Dispatched(status))
    }

    /// Post a closing notice, then close the session and the conversation.
    async fn close(&self, session: &SessionHandle, reason: &str) -> Result<(), PlatformError> {
        self.platform
            .send(session.local_id(), render::closed_notice(reason))
            .await?;
        self.close_silently(session).await
    }

    async fn close_silently(&self, session: &SessionHandle) -> Result<(), PlatformError> {
        self.registry.close(session.local_id());
        self.platform.close_conversation(session.local_id()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use threadbot_types::error::{RemoteError, SessionConfigError, SessionError};
    use threadbot_types::platform::NoticeLevel;

    use crate::moderation::AllowAllModeration;
    use crate::testing::{message_ref, KeywordModeration, MockPlatform, MockRemote};

    type Service<M> = ConversationService<MockRemote, M, MockPlatform>;

    fn config() -> BotConfig {
        BotConfig {
            allowed_models: vec!["gpt-4o".to_string(), "gpt-4o-mini".to_string()],
            default_model: "gpt-4o-mini".to_string(),
            debounce_secs: 0,
            poll_interval_ms: 10,
            max_conversation_messages: 5,
            max_segment_chars: 20,
            ..BotConfig::default()
        }
    }

    fn service<M: ModerationGate>(
        remote: MockRemote,
        moderation: M,
        config: BotConfig,
    ) -> (Arc<MockRemote>, Arc<MockPlatform>, Service<M>) {
        let remote = Arc::new(remote);
        let platform = Arc::new(MockPlatform::default());
        let service = ConversationService::new(config, remote.clone(), moderation, platform.clone());
        (remote, platform, service)
    }

    fn start(message: &str) -> StartConversation {
        StartConversation {
            author_name: "alice".to_string(),
            first_message: message.to_string(),
            ..Default::default()
        }
    }

    fn inbound(conversation: &ConversationId, id: &str, text: &str) -> InboundMessage {
        InboundMessage {
            id: id.to_string(),
            conversation_id: conversation.clone(),
            server_id: None,
            author_id: "user-1".to_string(),
            author_name: "alice".to_string(),
            text: text.to_string(),
            timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            is_from_bot: false,
        }
    }

    fn segments(sent: &[OutboundMessage]) -> Vec<String> {
        sent.iter()
            .filter_map(|m| match m {
                OutboundMessage::Segment(s) => Some(s.text.clone()),
                _ => None,
            })
            .collect()
    }

    fn notices(sent: &[OutboundMessage]) -> Vec<(NoticeLevel, String)> {
        sent.iter()
            .filter_map(|m| match m {
                OutboundMessage::Notice { level, text } => Some((*level, text.clone())),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_start_conversation_answers_first_message() {
        let (remote, platform, service) =
            service(MockRemote::replying("Hi!"), AllowAllModeration, config());

        let started = service.start_conversation(start("hello bot")).await.unwrap();

        assert_eq!(started.disposition, TurnDisposition::Dispatched(CompletionStatus::Ok));
        assert_eq!(platform.opened(), vec!["💬✅ alice - hello bot".to_string()]);
        assert_eq!(segments(&platform.sent()), vec!["Hi!"]);
        assert_eq!(remote.create_calls(), 1);

        let session = service.registry().get(&started.conversation_id).unwrap();
        assert_eq!(session.config().model, "gpt-4o-mini");
        assert_eq!(session.turns_processed(), 1);
        assert!(!session.is_closed());
    }

    #[tokio::test]
    async fn test_start_with_invalid_temperature_makes_no_calls() {
        let (remote, platform, service) =
            service(MockRemote::replying("Hi!"), AllowAllModeration, config());
        let request = StartConversation {
            temperature: Some(1.3),
            ..start("hello")
        };

        let err = service.start_conversation(request).await.unwrap_err();
        assert!(matches!(
            err,
            StartError::InvalidConfig(SessionConfigError::TemperatureOutOfRange(_))
        ));
        assert!(platform.opened().is_empty());
        assert_eq!(remote.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_start_with_unknown_model_is_refused() {
        let (_remote, platform, service) =
            service(MockRemote::replying("Hi!"), AllowAllModeration, config());
        let request = StartConversation {
            model: Some("gpt-2".to_string()),
            ..start("hello")
        };
        let err = service.start_conversation(request).await.unwrap_err();
        assert!(matches!(
            err,
            StartError::InvalidConfig(SessionConfigError::UnknownModel(_))
        ));
        assert!(platform.opened().is_empty());
    }

    #[tokio::test]
    async fn test_start_session_failure_closes_conversation() {
        let remote = MockRemote::default().with(|s| {
            s.fail_create = Some(RemoteError::AuthenticationFailed);
        });
        let (_remote, platform, service) = service(remote, AllowAllModeration, config());

        let err = service.start_conversation(start("hello")).await.unwrap_err();
        assert!(matches!(err, StartError::Session(SessionError::Creation(_))));
        assert_eq!(platform.closed(), vec![ConversationId::new("conv-1")]);
        assert!(service.registry().is_empty());
    }

    #[tokio::test]
    async fn test_completed_reply_dispatched_once_and_conversation_stays_open() {
        let (remote, platform, service) =
            service(MockRemote::replying("Sure thing."), AllowAllModeration, config());
        let id = service.start_conversation(start("hi")).await.unwrap().conversation_id;

        let disposition = service
            .handle_message(&inbound(&id, "m2", "tell me more"))
            .await
            .unwrap();

        assert_eq!(disposition, TurnDisposition::Dispatched(CompletionStatus::Ok));
        assert_eq!(segments(&platform.sent()), vec!["Sure thing.", "Sure thing."]);
        assert_eq!(remote.appended().len(), 2);
        assert!(!service.registry().is_closed(&id));
        assert!(platform.closed().is_empty());
    }

    #[tokio::test]
    async fn test_long_reply_is_segmented() {
        let reply = "First paragraph here.\n\nSecond paragraph here.";
        let (_remote, platform, service) =
            service(MockRemote::replying(reply), AllowAllModeration, config());
        service.start_conversation(start("hi")).await.unwrap();

        let sent = segments(&platform.sent());
        assert!(sent.len() > 1);
        assert!(sent.iter().all(|s| s.chars().count() <= 20));
        assert_eq!(sent.concat(), reply);
    }

    #[tokio::test]
    async fn test_message_over_limit_closes_without_run() {
        let (remote, platform, service) =
            service(MockRemote::replying("ok"), AllowAllModeration, config());
        let id = service.start_conversation(start("hi")).await.unwrap().conversation_id;
        platform.state.lock().unwrap().conversation.message_count = 6;

        let disposition = service
            .handle_message(&inbound(&id, "m2", "one more"))
            .await
            .unwrap();

        assert_eq!(disposition, TurnDisposition::LimitReached);
        assert_eq!(remote.appended().len(), 1);
        assert!(service.registry().is_closed(&id));
        assert_eq!(platform.closed(), vec![id.clone()]);

        // Later messages are ignored.
        let again = service.handle_message(&inbound(&id, "m3", "hello?")).await.unwrap();
        assert_eq!(again, TurnDisposition::Ignored(IgnoreReason::SessionClosed));
    }

    #[tokio::test]
    async fn test_message_at_limit_is_processed() {
        let (_remote, platform, service) =
            service(MockRemote::replying("ok"), AllowAllModeration, config());
        let id = service.start_conversation(start("hi")).await.unwrap().conversation_id;
        platform.state.lock().unwrap().conversation.message_count = 5;

        let disposition = service.handle_message(&inbound(&id, "m2", "still ok")).await.unwrap();
        assert_eq!(disposition, TurnDisposition::Dispatched(CompletionStatus::Ok));
    }

    #[tokio::test]
    async fn test_blocked_inbound_is_not_submitted() {
        let (remote, platform, service) = service(
            MockRemote::replying("ok"),
            KeywordModeration::blocking("forbidden"),
            config(),
        );
        let id = service.start_conversation(start("hi")).await.unwrap().conversation_id;

        let disposition = service
            .handle_message(&inbound(&id, "m2", "something forbidden"))
            .await
            .unwrap();

        assert_eq!(disposition, TurnDisposition::Blocked);
        assert_eq!(remote.appended().len(), 1);
        let notices = notices(&platform.sent());
        let (level, text) = notices.last().unwrap();
        assert_eq!(*level, NoticeLevel::Error);
        assert!(text.contains("alice's message has been blocked"));
    }

    #[tokio::test]
    async fn test_flagged_inbound_warns_and_replies() {
        let (remote, platform, service) = service(
            MockRemote::replying("careful answer"),
            KeywordModeration::flagging("edgy"),
            config(),
        );

        let started = service.start_conversation(start("an edgy question")).await.unwrap();

        assert_eq!(
            started.disposition,
            TurnDisposition::Dispatched(CompletionStatus::ModerationFlagged)
        );
        assert_eq!(remote.appended().len(), 1);
        let sent = platform.sent();
        assert!(notices(&sent).iter().any(|(_, t)| t.contains("flagged")));
        assert_eq!(segments(&sent), vec!["careful answer"]);
    }

    #[tokio::test]
    async fn test_flagged_inbound_with_failed_run_sends_only_the_error() {
        let (remote, platform, service) = service(
            MockRemote::replying("ok"),
            KeywordModeration::flagging("edgy"),
            config(),
        );
        let id = service.start_conversation(start("hi")).await.unwrap().conversation_id;
        let before = platform.sent().len();
        remote.state.lock().unwrap().fail_start =
            Some(RemoteError::Transport("connection reset".to_string()));

        let disposition = service
            .handle_message(&inbound(&id, "m2", "an edgy question"))
            .await
            .unwrap();

        assert_eq!(disposition, TurnDisposition::Dispatched(CompletionStatus::OtherError));
        let sent = platform.sent();
        let turn_notices = notices(&sent[before..]);
        assert_eq!(turn_notices.len(), 1);
        assert_eq!(turn_notices[0].0, NoticeLevel::Error);
        assert!(turn_notices[0].1.starts_with("**Error**"));
        assert!(segments(&sent[before..]).is_empty());
    }

    #[tokio::test]
    async fn test_flagged_reply_warns_and_is_still_sent() {
        let (_remote, platform, service) = service(
            MockRemote::replying("a spicy take"),
            KeywordModeration::flagging("spicy"),
            config(),
        );

        let started = service.start_conversation(start("innocent")).await.unwrap();

        assert_eq!(
            started.disposition,
            TurnDisposition::Dispatched(CompletionStatus::ModerationFlagged)
        );
        let sent = platform.sent();
        let flagged: Vec<_> = notices(&sent)
            .into_iter()
            .filter(|(_, t)| t.contains("flagged"))
            .collect();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].0, NoticeLevel::Warning);
        assert_eq!(segments(&sent), vec!["a spicy take"]);
    }

    #[tokio::test]
    async fn test_blocked_reply_is_suppressed() {
        let (_remote, platform, service) = service(
            MockRemote::replying("a forbidden reply"),
            KeywordModeration::blocking("forbidden"),
            config(),
        );

        let started = service.start_conversation(start("innocent")).await.unwrap();

        assert_eq!(
            started.disposition,
            TurnDisposition::Dispatched(CompletionStatus::ModerationBlocked)
        );
        assert!(segments(&platform.sent()).is_empty());
    }

    #[tokio::test]
    async fn test_newer_message_during_run_discards_outcome() {
        let (remote, platform, service) =
            service(MockRemote::replying("late answer"), AllowAllModeration, config());
        let id = service.start_conversation(start("hi")).await.unwrap().conversation_id;
        let sent_before = platform.sent().len();

        let trigger = inbound(&id, "m2", "first");
        platform.set_latest(Some(message_ref(
            "m3",
            "user-1",
            trigger.timestamp + chrono::Duration::seconds(1),
            false,
        )));

        let disposition = service.handle_message(&trigger).await.unwrap();

        assert_eq!(disposition, TurnDisposition::Stale);
        assert_eq!(remote.appended().len(), 2);
        assert_eq!(platform.sent().len(), sent_before);
    }

    #[tokio::test]
    async fn test_bot_message_after_trigger_keeps_outcome() {
        let (remote, platform, service) =
            service(MockRemote::replying("answer"), AllowAllModeration, config());
        let id = service.start_conversation(start("hi")).await.unwrap().conversation_id;
        let sent_before = platform.sent().len();

        let trigger = inbound(&id, "m2", "question");
        platform.set_latest(Some(message_ref(
            "m3",
            "bot",
            trigger.timestamp + chrono::Duration::seconds(1),
            true,
        )));

        let disposition = service.handle_message(&trigger).await.unwrap();

        assert_eq!(disposition, TurnDisposition::Dispatched(CompletionStatus::Ok));
        assert_eq!(remote.appended().len(), 2);
        assert_eq!(segments(&platform.sent()[sent_before..]), vec!["answer"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_during_debounce_is_not_submitted() {
        let config = BotConfig {
            debounce_secs: 3,
            ..config()
        };
        let (remote, platform, service) =
            service(MockRemote::replying("ok"), AllowAllModeration, config);
        let id = service.start_conversation(start("hi")).await.unwrap().conversation_id;

        let trigger = inbound(&id, "m2", "first");
        platform.set_latest(Some(message_ref(
            "m3",
            "user-1",
            trigger.timestamp + chrono::Duration::seconds(1),
            false,
        )));

        let disposition = service.handle_message(&trigger).await.unwrap();
        assert_eq!(disposition, TurnDisposition::Superseded);
        assert_eq!(remote.appended().len(), 1);
    }

    #[tokio::test]
    async fn test_context_length_error_closes_conversation() {
        let (remote, platform, service) =
            service(MockRemote::replying("ok"), AllowAllModeration, config());
        let id = service.start_conversation(start("hi")).await.unwrap().conversation_id;
        remote.state.lock().unwrap().fail_append = Some(RemoteError::InvalidRequest {
            message: "This model's maximum context length is 8192 tokens".to_string(),
            code: None,
        });

        let disposition = service
            .handle_message(&inbound(&id, "m2", "a very long message"))
            .await
            .unwrap();

        assert_eq!(disposition, TurnDisposition::Dispatched(CompletionStatus::TooLong));
        assert!(service.registry().is_closed(&id));
        assert_eq!(platform.closed(), vec![id.clone()]);
        let notices = notices(&platform.sent());
        assert!(notices.last().unwrap().1.contains("context limit reached"));
    }

    #[tokio::test]
    async fn test_error_outcome_sends_one_notice() {
        let (remote, platform, service) =
            service(MockRemote::replying("ok"), AllowAllModeration, config());
        let id = service.start_conversation(start("hi")).await.unwrap().conversation_id;
        let before = platform.sent().len();
        remote.state.lock().unwrap().fail_start =
            Some(RemoteError::Transport("connection reset".to_string()));

        let disposition = service.handle_message(&inbound(&id, "m2", "again")).await.unwrap();

        assert_eq!(disposition, TurnDisposition::Dispatched(CompletionStatus::OtherError));
        let sent = platform.sent();
        assert_eq!(sent.len(), before + 1);
        assert!(notices(&sent[before..]).iter().all(|(_, t)| t.starts_with("**Error**")));
        assert!(!service.registry().is_closed(&id));
    }

    #[tokio::test]
    async fn test_ignored_messages() {
        let (remote, platform, service) =
            service(MockRemote::replying("ok"), AllowAllModeration, config());
        let id = service.start_conversation(start("hi")).await.unwrap().conversation_id;

        let mut from_bot = inbound(&id, "m2", "bot talk");
        from_bot.is_from_bot = true;
        assert_eq!(
            service.handle_message(&from_bot).await.unwrap(),
            TurnDisposition::Ignored(IgnoreReason::FromBot)
        );

        let unknown = inbound(&ConversationId::new("elsewhere"), "m3", "hello");
        assert_eq!(
            service.handle_message(&unknown).await.unwrap(),
            TurnDisposition::Ignored(IgnoreReason::UnknownConversation)
        );

        platform.state.lock().unwrap().conversation.archived = true;
        assert_eq!(
            service.handle_message(&inbound(&id, "m4", "hello")).await.unwrap(),
            TurnDisposition::Ignored(IgnoreReason::ConversationInactive)
        );

        assert_eq!(remote.appended().len(), 1);
    }

    #[tokio::test]
    async fn test_server_allow_list() {
        let config = BotConfig {
            allowed_server_ids: vec!["guild-1".to_string()],
            ..config()
        };
        let (_remote, _platform, service) =
            service(MockRemote::replying("ok"), AllowAllModeration, config);
        let id = service.start_conversation(start("hi")).await.unwrap().conversation_id;

        let mut message = inbound(&id, "m2", "hello");
        message.server_id = Some("guild-2".to_string());
        assert_eq!(
            service.handle_message(&message).await.unwrap(),
            TurnDisposition::Ignored(IgnoreReason::ServerNotAllowed)
        );
    }
}
