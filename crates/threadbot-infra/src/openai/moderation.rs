//! OpenAiModeration -- [`ModerationGate`] backed by the `/moderations` endpoint.
//!
//! Category scores are compared against two threshold tables. A score
//! strictly above a category's blocked threshold blocks the text; otherwise
//! a score above its flagged threshold flags it. Categories missing from a
//! table use a threshold of 1.0, which no score exceeds.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::info;

use threadbot_core::moderation::ModerationGate;
use threadbot_types::config::ModerationConfig;
use threadbot_types::error::RemoteError;
use threadbot_types::moderation::ModerationVerdict;

use super::http::OpenAiHttp;
use super::types::{ModerationRequest, ModerationResponse};

const UNLISTED_THRESHOLD: f64 = 1.0;

pub struct OpenAiModeration {
    http: Arc<OpenAiHttp>,
    blocked: BTreeMap<String, f64>,
    flagged: BTreeMap<String, f64>,
}

impl OpenAiModeration {
    pub fn new(http: Arc<OpenAiHttp>, config: &ModerationConfig) -> Self {
        Self {
            http,
            blocked: config.blocked_thresholds.clone(),
            flagged: config.flagged_thresholds.clone(),
        }
    }
}

/// Classify category scores against the threshold tables.
pub fn classify_scores(
    scores: &HashMap<String, f64>,
    blocked: &BTreeMap<String, f64>,
    flagged: &BTreeMap<String, f64>,
) -> ModerationVerdict {
    let mut verdict = ModerationVerdict::Allowed;
    for (category, score) in scores {
        let limit = |table: &BTreeMap<String, f64>| {
            table.get(category).copied().unwrap_or(UNLISTED_THRESHOLD)
        };
        if *score > limit(blocked) {
            info!(category = %category, score, "Moderation blocked");
            return ModerationVerdict::Blocked;
        }
        if *score > limit(flagged) {
            info!(category = %category, score, "Moderation flagged");
            verdict = ModerationVerdict::Flagged;
        }
    }
    verdict
}

impl ModerationGate for OpenAiModeration {
    async fn check(&self, text: &str) -> Result<ModerationVerdict, RemoteError> {
        let request = self
            .http
            .post("/moderations")
            .json(&ModerationRequest { input: text });
        let response: ModerationResponse = self.http.send_json(request).await?;

        Ok(response
            .results
            .iter()
            .map(|r| classify_scores(&r.category_scores, &self.blocked, &self.flagged))
            .fold(ModerationVerdict::Allowed, ModerationVerdict::most_severe))
    }
}
