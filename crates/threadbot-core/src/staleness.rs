//! Debounce and post-run staleness checks.
//!
//! Users often send several messages in a row. Only the most recent one that
//! is still current when its turn starts (and when its run finishes) gets a
//! reply; the others are dropped silently.

use std::time::Duration;

use tracing::{debug, warn};

use threadbot_types::platform::{InboundMessage, MessageRef};

use crate::platform::ChatPlatform;

/// Whether `latest` makes `trigger` stale.
///
/// A newer message supersedes the trigger unless the bot wrote it. A message
/// with an earlier timestamp than the trigger never supersedes it.
pub fn is_superseded(trigger: &MessageRef, latest: Option<&MessageRef>) -> bool {
    match latest {
        None => false,
        Some(latest) => {
            latest.id != trigger.id && !latest.is_from_bot && latest.timestamp >= trigger.timestamp
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StalenessGuard {
    debounce: Duration,
}

impl StalenessGuard {
    /// `debounce` of zero skips the pre-dispatch wait and check.
    pub fn new(debounce: Duration) -> Self {
        Self { debounce }
    }

    pub fn debounce_delay(&self) -> Duration {
        self.debounce
    }

    /// Wait out the debounce delay, then report whether `trigger` is still
    /// the message to answer.
    pub async fn debounce<P: ChatPlatform>(&self, platform: &P, trigger: &InboundMessage) -> bool {
        if self.debounce.is_zero() {
            return true;
        }
        tokio::time::sleep(self.debounce).await;
        let current = self.is_current(platform, trigger).await;
        if !current {
            debug!(
                conversation_id = %trigger.conversation_id,
                message_id = %trigger.id,
                "Message superseded during debounce"
            );
        }
        current
    }

    /// Whether `trigger` is still the latest relevant message.
    ///
    /// When the platform cannot answer, the message is treated as current.
    pub async fn is_current<P: ChatPlatform>(&self, platform: &P, trigger: &InboundMessage) -> bool {
        match platform.latest_message(&trigger.conversation_id).await {
            Ok(latest) => !is_superseded(&trigger.message_ref(), latest.as_ref()),
            Err(e) => {
                warn!(
                    conversation_id = %trigger.conversation_id,
                    error = %e,
                    "Could not fetch latest message, assuming current"
                );
                true
            }
        }
    }
}
