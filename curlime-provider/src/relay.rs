//! Relay provider: delegates generation to an intermediary HTTP service.
//!
//! The relay picks its own backend and answers with a structured
//! success/failure envelope which is trusted as-is.

use async_trait::async_trait;
use curlime_core::error::CurlimeError;
use curlime_core::provider::Provider;
use curlime_core::types::{GeneratedCode, GenerationRequest, HealthReport, ProviderInfo};
use curlime_core::Result;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

const PROVIDER_ID: &str = "relay";
const UNREACHABLE_GUIDANCE: &str =
    "Relay service is not reachable. Start the relay service and retry.";

#[derive(Debug, Deserialize)]
struct RelayEnvelope {
    success: bool,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RelayModels {
    #[serde(default)]
    models: Vec<String>,
}

/// Provider that forwards requests to a relay endpoint.
#[derive(Debug, Clone)]
pub struct RelayProvider {
    client: reqwest::Client,
    endpoint: String,
    info: Arc<ProviderInfo>,
}

impl RelayProvider {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            endpoint,
            info: Arc::new(ProviderInfo {
                id: PROVIDER_ID.to_string(),
                name: "Relay".to_string(),
            }),
        }
    }

    fn url(&self, suffix: &str) -> String {
        format!("{}/{suffix}", self.endpoint)
    }

    fn remap_transport(err: reqwest::Error) -> CurlimeError {
        if err.is_connect() || err.is_timeout() {
            CurlimeError::unreachable(UNREACHABLE_GUIDANCE)
        } else {
            CurlimeError::Network(err)
        }
    }
}

#[async_trait]
impl Provider for RelayProvider {
    fn info(&self) -> Arc<ProviderInfo> {
        self.info.clone()
    }

    async fn generate(&self, req: &GenerationRequest) -> Result<GeneratedCode> {
        req.validate()?;

        let payload = json!({
            "input": req.input,
            "instruction": req.instruction,
            "language": req.language,
        });

        tracing::debug!("delegating generation to relay: {}", self.endpoint);
        let response = self
            .client
            .post(self.url("generate"))
            .json(&payload)
            .send()
            .await
            .map_err(Self::remap_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CurlimeError::provider_http(
                status.as_u16(),
                format!("relay returned HTTP {status}"),
            ));
        }

        let envelope: RelayEnvelope = response
            .json()
            .await
            .map_err(|e| CurlimeError::malformed_response(format!("invalid relay envelope: {e}")))?;

        if !envelope.success {
            return Err(CurlimeError::delegated(
                envelope.error.unwrap_or_else(|| "relay reported failure".to_string()),
            ));
        }

        let raw = envelope
            .code
            .filter(|c| !c.is_empty())
            .ok_or_else(|| CurlimeError::malformed_response("relay envelope carried no code"))?;

        Ok(GeneratedCode::from_raw(raw))
    }

    async fn check_health(&self) -> HealthReport {
        match self.client.get(self.url("health")).send().await {
            Ok(response) if response.status().is_success() => {
                HealthReport::healthy(PROVIDER_ID, None, self.list_models().await)
            }
            Ok(response) => HealthReport::unhealthy(
                PROVIDER_ID,
                None,
                format!("relay health returned HTTP {}", response.status().as_u16()),
            ),
            Err(e) => {
                tracing::warn!("relay health check failed: {e}");
                HealthReport::unhealthy(PROVIDER_ID, None, UNREACHABLE_GUIDANCE)
            }
        }
    }

    async fn list_models(&self) -> Vec<String> {
        let response = match self.client.get(self.url("models")).send().await {
            Ok(response) if response.status().is_success() => response,
            _ => return Vec::new(),
        };
        response
            .json::<RelayModels>()
            .await
            .map(|m| m.models)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> GenerationRequest {
        GenerationRequest::new("hello", "reverse it", "js")
    }

    #[tokio::test]
    async fn success_envelope_yields_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .and(body_partial_json(serde_json::json!({ "input": "hello" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "code": "```js\nconst transform = (t) => t.split('').reverse().join('');\n```",
            })))
            .mount(&server)
            .await;

        let provider = RelayProvider::new(server.uri());
        let code = provider.generate(&request()).await.unwrap();
        assert_eq!(
            code.extracted,
            "const transform = (t) => t.split('').reverse().join('');"
        );
    }

    #[tokio::test]
    async fn failure_envelope_is_delegated_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": false,
                "error": "backend quota exhausted",
            })))
            .mount(&server)
            .await;

        let provider = RelayProvider::new(server.uri());
        let err = provider.generate(&request()).await.unwrap_err();
        match err {
            CurlimeError::ProviderDelegated(msg) => assert_eq!(msg, "backend quota exhausted"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn unreachable_relay_maps_to_guidance() {
        let provider = RelayProvider::new("http://127.0.0.1:1");
        let err = provider.generate(&request()).await.unwrap_err();
        match err {
            CurlimeError::BackendUnreachable(msg) => assert!(msg.contains("relay service")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn health_and_models_degrade() {
        let provider = RelayProvider::new("http://127.0.0.1:1");
        let report = provider.check_health().await;
        assert_eq!(report.status, curlime_core::types::HealthStatus::Unhealthy);
        assert!(provider.list_models().await.is_empty());
    }
}
