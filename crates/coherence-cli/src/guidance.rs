//! Guidance generators backing the CLI session.

use std::sync::Arc;
use std::time::Duration;

use coherence_core::TriggerKind;
use coherence_session::{GenerateError, GuidanceFuture, GuidanceGenerator, GuidanceSources};
use rand::seq::IndexedRandom;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{GuidanceConfig, GuidanceSource, HttpGuidanceConfig};

/// Build one generator per trigger kind from the config.
pub fn sources(config: &GuidanceConfig) -> anyhow::Result<GuidanceSources> {
    Ok(match config.source {
        GuidanceSource::Canned => GuidanceSources::new(
            Arc::new(CannedGuidance::new(config.suggestions.clone())),
            Arc::new(CannedGuidance::new(config.practices.clone())),
        ),
        GuidanceSource::Http => {
            let client = Client::builder()
                .timeout(Duration::from_millis(config.fetch_timeout_ms))
                .build()?;
            GuidanceSources::new(
                Arc::new(HttpGuidance::new(
                    client.clone(),
                    &config.http,
                    TriggerKind::Suggestion,
                )),
                Arc::new(HttpGuidance::new(client, &config.http, TriggerKind::Dissonance)),
            )
        }
    })
}

/// Picks a random phrase from a fixed list.
#[derive(Debug, Clone)]
pub struct CannedGuidance {
    phrases: Vec<String>,
}

impl CannedGuidance {
    pub fn new(phrases: Vec<String>) -> Self {
        Self { phrases }
    }
}

impl GuidanceGenerator for CannedGuidance {
    fn generate(&self) -> GuidanceFuture {
        let picked = self
            .phrases
            .choose(&mut rand::rng())
            .cloned()
            .ok_or(GenerateError::Empty);
        Box::pin(async move { picked })
    }
}

#[derive(Serialize)]
struct GuidanceRequest<'a> {
    kind: TriggerKind,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct GuidanceResponse {
    text: String,
}

/// POSTs `{ "kind", "prompt" }` and expects `{ "text" }` back.
#[derive(Debug, Clone)]
pub struct HttpGuidance {
    client: Client,
    url: String,
    api_key: Option<String>,
    kind: TriggerKind,
    prompt: String,
}

impl HttpGuidance {
    pub fn new(client: Client, config: &HttpGuidanceConfig, kind: TriggerKind) -> Self {
        let prompt = match kind {
            TriggerKind::Suggestion => config.suggestion_prompt.clone(),
            TriggerKind::Dissonance => config.practice_prompt.clone(),
        };
        Self {
            client,
            url: config.url.clone(),
            api_key: config.api_key.clone(),
            kind,
            prompt,
        }
    }

    async fn fetch(self) -> Result<String, GenerateError> {
        debug!(kind = %self.kind, url = %self.url, "requesting guidance");
        let mut request = self.client.post(&self.url).json(&GuidanceRequest {
            kind: self.kind,
            prompt: &self.prompt,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| GenerateError::Failed(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerateError::Failed(format!("{status}: {body}")));
        }

        let body: GuidanceResponse = response
            .json()
            .await
            .map_err(|e| GenerateError::Failed(format!("bad guidance response: {e}")))?;
        let text = body.text.trim();
        if text.is_empty() {
            return Err(GenerateError::Empty);
        }
        Ok(text.to_string())
    }
}

impl GuidanceGenerator for HttpGuidance {
    fn generate(&self) -> GuidanceFuture {
        Box::pin(self.clone().fetch())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_canned_picks_from_list() {
        let phrases = vec!["a".to_string(), "b".to_string()];
        let canned = CannedGuidance::new(phrases.clone());
        for _ in 0..10 {
            let text = canned.generate().await.unwrap();
            assert!(phrases.contains(&text));
        }
    }

    #[tokio::test]
    async fn test_canned_empty_list_fails() {
        let canned = CannedGuidance::new(Vec::new());
        assert_eq!(canned.generate().await, Err(GenerateError::Empty));
    }

    #[tokio::test]
    async fn test_http_unreachable_fails() {
        let config = HttpGuidanceConfig {
            url: "http://127.0.0.1:9/guidance".into(),
            ..HttpGuidanceConfig::default()
        };
        let client = Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();
        let http = HttpGuidance::new(client, &config, TriggerKind::Dissonance);
        assert!(matches!(
            http.generate().await,
            Err(GenerateError::Failed(_))
        ));
    }

    #[test]
    fn test_request_shape() {
        let body = serde_json::to_value(GuidanceRequest {
            kind: TriggerKind::Dissonance,
            prompt: "p",
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "kind": "dissonance", "prompt": "p" })
        );
    }
}
