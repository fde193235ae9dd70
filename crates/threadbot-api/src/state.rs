//! Application state wiring the collaborators together.
//!
//! AppState holds the loaded configuration and the concrete OpenAI clients.
//! The conversation service is generic over its collaborators; the type
//! alias below pins it to the infra implementations and the console.

use std::path::PathBuf;
use std::sync::Arc;

use threadbot_core::conversation::ConversationService;
use threadbot_core::moderation::BoxModerationGate;
use threadbot_infra::config::{load_bot_config, resolve_credentials, resolve_data_dir, validate};
use threadbot_infra::openai::{AssistantsClient, OpenAiHttp, OpenAiModeration};
use threadbot_types::config::BotConfig;

use crate::cli::chat::platform::ConsolePlatform;

pub type ConsoleConversationService =
    ConversationService<AssistantsClient, BoxModerationGate, ConsolePlatform>;

/// Everything a conversation needs, resolved once at startup.
pub struct AppState {
    pub config: BotConfig,
    pub data_dir: PathBuf,
    pub http: Arc<OpenAiHttp>,
    pub client: Arc<AssistantsClient>,
}

impl AppState {
    /// Load configuration and credentials and build the HTTP clients.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        let config = load_bot_config(&data_dir).await;
        validate(&config)?;
        let credentials = resolve_credentials(&config, |key| std::env::var(key).ok())?;

        let http = Arc::new(OpenAiHttp::new(credentials.api_key, config.api_base.clone())?);
        let client = Arc::new(AssistantsClient::new(http.clone(), credentials.assistant_id));

        tracing::debug!(
            data_dir = %data_dir.display(),
            api_base = %http.base_url(),
            assistant_id = %client.assistant_id(),
            "Application state initialized"
        );

        Ok(Self {
            config,
            data_dir,
            http,
            client,
        })
    }

    /// The moderation gate selected by configuration.
    pub fn moderation_gate(&self) -> BoxModerationGate {
        if self.config.moderation.enabled {
            BoxModerationGate::new(OpenAiModeration::new(self.http.clone(), &self.config.moderation))
        } else {
            BoxModerationGate::allow_all()
        }
    }

    pub fn conversation_service(
        &self,
        config: BotConfig,
        platform: Arc<ConsolePlatform>,
    ) -> ConsoleConversationService {
        ConversationService::new(config, self.client.clone(), self.moderation_gate(), platform)
    }
}
