//! Remote LLM provider (Anthropic-style messages API).
//!
//! Requires a credential. Builds a structured system + user message request
//! and extracts the generated text from `content[0].text`.

use crate::prompt;
use async_trait::async_trait;
use curlime_core::config::RemoteSettings;
use curlime_core::error::CurlimeError;
use curlime_core::provider::Provider;
use curlime_core::types::{GeneratedCode, GenerationRequest, HealthReport, ProviderInfo};
use curlime_core::Result;
use serde_json::{json, Value};
use std::sync::Arc;

const PROVIDER_ID: &str = "remote-llm";

/// Provider backed by a hosted messages API.
#[derive(Clone)]
pub struct RemoteLlmProvider {
    client: reqwest::Client,
    settings: RemoteSettings,
    info: Arc<ProviderInfo>,
}

impl std::fmt::Debug for RemoteLlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // api_key intentionally omitted
        f.debug_struct("RemoteLlmProvider")
            .field("endpoint", &self.settings.endpoint)
            .field("model", &self.settings.model)
            .finish()
    }
}

impl RemoteLlmProvider {
    pub fn new(settings: RemoteSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            settings,
            info: Arc::new(ProviderInfo {
                id: PROVIDER_ID.to_string(),
                name: "Remote LLM".to_string(),
            }),
        }
    }

    fn api_key(&self) -> Result<&str> {
        match self.settings.api_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(CurlimeError::missing_credential(
                "Anthropic API key is required",
            )),
        }
    }

    async fn post_messages(&self, api_key: &str, body: &Value) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(&self.settings.endpoint)
            .header("x-api-key", api_key)
            .header("anthropic-version", &self.settings.version)
            .json(body)
            .send()
            .await?;
        Ok(response)
    }

    /// One-token request used by the connection test and the health check.
    pub(crate) async fn probe(&self) -> bool {
        let api_key = match self.api_key() {
            Ok(key) => key.to_string(),
            Err(_) => return false,
        };
        let body = json!({
            "model": self.settings.model,
            "max_tokens": 1,
            "messages": [{ "role": "user", "content": "test" }],
        });
        match self.post_messages(&api_key, &body).await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("remote connection probe failed: {e}");
                false
            }
        }
    }
}

#[async_trait]
impl Provider for RemoteLlmProvider {
    fn info(&self) -> Arc<ProviderInfo> {
        self.info.clone()
    }

    async fn generate(&self, req: &GenerationRequest) -> Result<GeneratedCode> {
        req.validate()?;
        let api_key = self.api_key()?.to_string();

        let body = json!({
            "model": self.settings.model,
            "max_tokens": prompt::MAX_OUTPUT_TOKENS,
            "system": prompt::system_prompt(&req.language),
            "messages": [{
                "role": "user",
                "content": prompt::user_prompt(&req.input, &req.instruction),
            }],
        });

        tracing::debug!("calling remote LLM API: model={}", self.settings.model);
        let response = self.post_messages(&api_key, &body).await?;
        let status = response.status();
        // Error bodies are not guaranteed to be JSON; parse leniently.
        let payload: Value =
            serde_json::from_str(&response.text().await?).unwrap_or(Value::Null);

        if !status.is_success() {
            // Prefer the provider's own error message over a status line.
            let message = payload
                .pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("remote API error: {}", status.as_u16()));
            return Err(CurlimeError::provider_http(status.as_u16(), message));
        }

        let text = payload
            .pointer("/content/0/text")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                tracing::error!("remote API unexpected response: {payload}");
                CurlimeError::malformed_response("remote API returned no generated text")
            })?;

        Ok(GeneratedCode::from_raw(text))
    }

    async fn check_health(&self) -> HealthReport {
        let model = Some(self.settings.model.clone());
        if self.probe().await {
            HealthReport::healthy(PROVIDER_ID, model.clone(), vec![self.settings.model.clone()])
        } else {
            HealthReport::unhealthy(PROVIDER_ID, model, "remote backend rejected the probe request")
        }
    }

    async fn list_models(&self) -> Vec<String> {
        // The messages API has no discovery endpoint; the configured model
        // is the only one on offer.
        vec![self.settings.model.clone()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(endpoint: String, api_key: Option<&str>) -> RemoteSettings {
        RemoteSettings {
            endpoint,
            model: "test-model".to_string(),
            api_key: api_key.map(str::to_string),
            version: "2023-06-01".to_string(),
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new("hello world", "uppercase it", "js")
    }

    #[tokio::test]
    async fn missing_credential_fails_before_any_request() {
        let provider = RemoteLlmProvider::new(settings("http://127.0.0.1:1".into(), None));
        let err = provider.generate(&request()).await.unwrap_err();
        assert!(matches!(err, CurlimeError::MissingCredential(_)));
    }

    #[tokio::test]
    async fn empty_request_fields_are_rejected() {
        let provider =
            RemoteLlmProvider::new(settings("http://127.0.0.1:1".into(), Some("sk-test")));
        let err = provider
            .generate(&GenerationRequest::new("", "x", "js"))
            .await
            .unwrap_err();
        assert!(matches!(err, CurlimeError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn success_extracts_fenced_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "sk-test"))
            .and(header("anthropic-version", "2023-06-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{ "type": "text",
                              "text": "```js\nfunction transform(text) { return text.toUpperCase(); }\n```" }],
            })))
            .mount(&server)
            .await;

        let provider = RemoteLlmProvider::new(settings(
            format!("{}/v1/messages", server.uri()),
            Some("sk-test"),
        ));
        let code = provider.generate(&request()).await.unwrap();
        assert_eq!(
            code.extracted,
            "function transform(text) { return text.toUpperCase(); }"
        );
    }

    #[tokio::test]
    async fn error_status_prefers_provider_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": { "type": "rate_limit_error", "message": "slow down" },
            })))
            .mount(&server)
            .await;

        let provider =
            RemoteLlmProvider::new(settings(format!("{}/v1/messages", server.uri()), Some("k")));
        let err = provider.generate(&request()).await.unwrap_err();
        match err {
            CurlimeError::ProviderHttp { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "slow down");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_generated_text_is_malformed_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "content": [] })),
            )
            .mount(&server)
            .await;

        let provider =
            RemoteLlmProvider::new(settings(format!("{}/v1/messages", server.uri()), Some("k")));
        let err = provider.generate(&request()).await.unwrap_err();
        assert!(matches!(err, CurlimeError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn health_degrades_instead_of_erroring() {
        let provider = RemoteLlmProvider::new(settings("http://127.0.0.1:1".into(), Some("k")));
        let report = provider.check_health().await;
        assert_eq!(report.status, curlime_core::types::HealthStatus::Unhealthy);
    }
}
