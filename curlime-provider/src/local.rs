//! Local inference provider (Ollama-style daemon).
//!
//! No credential required. Sends one concatenated prompt with role markers
//! and stop sequences to `/api/generate`; health and model discovery use
//! `/api/tags`. Connection failures are remapped to guidance for starting
//! the daemon.

use crate::prompt;
use async_trait::async_trait;
use curlime_core::config::LocalSettings;
use curlime_core::error::CurlimeError;
use curlime_core::provider::Provider;
use curlime_core::types::{GeneratedCode, GenerationRequest, HealthReport, ProviderInfo};
use curlime_core::Result;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

const PROVIDER_ID: &str = "local-inference";
const UNREACHABLE_GUIDANCE: &str = "Ollama is not reachable. Ensure `ollama serve` is running.";

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TaggedModel>,
}

#[derive(Debug, Deserialize)]
struct TaggedModel {
    name: String,
}

/// Provider backed by a locally reachable inference daemon.
#[derive(Debug, Clone)]
pub struct LocalInferenceProvider {
    client: reqwest::Client,
    settings: LocalSettings,
    info: Arc<ProviderInfo>,
}

impl LocalInferenceProvider {
    pub fn new(settings: LocalSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            settings,
            info: Arc::new(ProviderInfo {
                id: PROVIDER_ID.to_string(),
                name: "Local Inference".to_string(),
            }),
        }
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.settings.endpoint.trim_end_matches('/'))
    }

    fn tags_url(&self) -> String {
        format!("{}/api/tags", self.settings.endpoint.trim_end_matches('/'))
    }

    fn remap_transport(err: reqwest::Error) -> CurlimeError {
        if err.is_connect() || err.is_timeout() {
            CurlimeError::unreachable(UNREACHABLE_GUIDANCE)
        } else {
            CurlimeError::Network(err)
        }
    }

    async fn fetch_tags(&self) -> std::result::Result<Vec<String>, String> {
        let response = self
            .client
            .get(self.tags_url())
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status().as_u16()));
        }
        let tags: TagsResponse = response.json().await.map_err(|e| e.to_string())?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

#[async_trait]
impl Provider for LocalInferenceProvider {
    fn info(&self) -> Arc<ProviderInfo> {
        self.info.clone()
    }

    async fn generate(&self, req: &GenerationRequest) -> Result<GeneratedCode> {
        req.validate()?;

        let payload = json!({
            "model": self.settings.model,
            "prompt": prompt::combined_prompt(&req.input, &req.instruction, &req.language),
            "stream": false,
            "options": {
                "temperature": prompt::TEMPERATURE,
                "top_p": prompt::TOP_P,
                "num_predict": prompt::MAX_OUTPUT_TOKENS,
                "stop": prompt::STOP_SEQUENCES,
            },
        });

        tracing::debug!(
            "calling local daemon: {} model={}",
            self.generate_url(),
            self.settings.model
        );

        let response = self
            .client
            .post(self.generate_url())
            .json(&payload)
            .send()
            .await
            .map_err(Self::remap_transport)?;

        let status = response.status();
        let body: Value = serde_json::from_str(&response.text().await.map_err(Self::remap_transport)?)
            .unwrap_or(Value::Null);

        if !status.is_success() {
            let message = body
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(CurlimeError::provider_http(status.as_u16(), message));
        }

        // Local models do not reliably fence their output; a fenceless
        // response is used verbatim.
        let raw = body.get("response").and_then(Value::as_str).unwrap_or("");
        Ok(GeneratedCode::from_raw(raw))
    }

    async fn check_health(&self) -> HealthReport {
        let model = Some(self.settings.model.clone());
        match self.fetch_tags().await {
            Ok(models) => {
                let report = HealthReport::healthy(PROVIDER_ID, model, models);
                tracing::debug!("local daemon health check: {:?}", report.status);
                report
            }
            Err(e) => {
                tracing::warn!("local daemon health check failed: {e}");
                HealthReport::unhealthy(PROVIDER_ID, model, e)
            }
        }
    }

    async fn list_models(&self) -> Vec<String> {
        match self.fetch_tags().await {
            Ok(models) => models,
            Err(e) => {
                tracing::warn!("failed to fetch models from local daemon: {e}");
                Vec::new()
            }
        }
    }
}
