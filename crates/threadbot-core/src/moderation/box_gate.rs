//! BoxModerationGate -- object-safe dynamic dispatch wrapper for ModerationGate.
//!
//! Same blanket-impl pattern as the other boxed ports:
//! 1. Define an object-safe `ModerationGateDyn` trait with boxed futures
//! 2. Blanket-impl `ModerationGateDyn` for all `T: ModerationGate`
//! 3. `BoxModerationGate` wraps `Box<dyn ModerationGateDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use threadbot_types::error::RemoteError;
use threadbot_types::moderation::ModerationVerdict;

use super::gate::{AllowAllModeration, ModerationGate};

/// Object-safe version of [`ModerationGate`] with boxed futures.
pub trait ModerationGateDyn: Send + Sync {
    fn check_boxed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ModerationVerdict, RemoteError>> + Send + 'a>>;
}

impl<T: ModerationGate> ModerationGateDyn for T {
    fn check_boxed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ModerationVerdict, RemoteError>> + Send + 'a>> {
        Box::pin(self.check(text))
    }
}

/// Type-erased moderation gate, chosen at startup (remote endpoint or allow-all).
pub struct BoxModerationGate {
    inner: Box<dyn ModerationGateDyn + Send + Sync>,
}

impl BoxModerationGate {
    pub fn new<T: ModerationGate + 'static>(gate: T) -> Self {
        Self {
            inner: Box::new(gate),
        }
    }

    pub fn allow_all() -> Self {
        Self::new(AllowAllModeration)
    }
}

impl ModerationGate for BoxModerationGate {
    async fn check(&self, text: &str) -> Result<ModerationVerdict, RemoteError> {
        self.inner.check_boxed(text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::KeywordModeration;

    #[tokio::test]
    async fn test_box_delegates() {
        let gate = BoxModerationGate::new(KeywordModeration::flagging("sketchy"));
        assert_eq!(
            gate.check("slightly sketchy").await.unwrap(),
            ModerationVerdict::Flagged
        );
        assert_eq!(gate.check("fine").await.unwrap(), ModerationVerdict::Allowed);
    }

    #[tokio::test]
    async fn test_allow_all_box() {
        let gate = BoxModerationGate::allow_all();
        assert_eq!(gate.check("x").await.unwrap(), ModerationVerdict::Allowed);
    }
}
