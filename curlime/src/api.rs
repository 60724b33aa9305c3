//! The asynchronous operation surface consumed by an embedding UI or
//! bridge layer.
//!
//! `CurlimeApi` wires the configured provider (wrapped in a logging
//! layer), the execution sandbox and the version store, and exposes the
//! generate → execute → persist pipeline as individual operations.
//!
//! Error contracts differ by family: generation and execution return typed
//! errors; persistence writes return non-throwing `{ok, error}` envelopes
//! and persistence reads degrade to empty results, since the embedding
//! layer needs a call that cannot raise.

use curlime_core::config::{ProviderSettings, StoragePaths};
use curlime_core::provider::Provider;
use curlime_core::types::{
    Ack, CreateOutcome, GenerationRequest, HealthReport, HealthStatus, SaveOutcome, SavePayload,
    Transform, TransformDraft, TransformPatch, VersionRecord,
};
use curlime_core::Result;
use curlime_layer::{LoggingLayer, LoggingProvider};
use curlime_provider::{build_provider, test_connection};
use curlime_sandbox::Sandbox;
use curlime_store::VersionStore;

/// Facade over the generation-and-execution pipeline.
#[derive(Debug)]
pub struct CurlimeApi {
    settings: ProviderSettings,
    provider: LoggingProvider<Box<dyn Provider>>,
    sandbox: Sandbox,
    store: VersionStore,
}

impl CurlimeApi {
    /// Build the pipeline from explicit configuration.
    pub fn new(settings: ProviderSettings, paths: StoragePaths) -> Result<Self> {
        use curlime_core::layer::Layer;
        let provider = LoggingLayer::new().layer(build_provider(&settings)?);
        Ok(Self {
            settings,
            provider,
            sandbox: Sandbox::new(),
            store: VersionStore::new(paths),
        })
    }

    /// Build from the process environment and the per-user storage
    /// directory. Call once at startup.
    pub fn from_env() -> Result<Self> {
        Self::new(ProviderSettings::from_env(), StoragePaths::in_home())
    }

    /// Swap the sandbox (used by tests to shorten the time cap).
    pub fn with_sandbox(mut self, sandbox: Sandbox) -> Self {
        self.sandbox = sandbox;
        self
    }

    /// Generate transform code for `input` according to `instruction`.
    pub async fn generate_code(
        &self,
        input: &str,
        instruction: &str,
        language: &str,
    ) -> Result<String> {
        let req = GenerationRequest::new(input, instruction, language);
        let code = self.provider.generate(&req).await?;
        Ok(code.extracted)
    }

    /// Execute generated code against `input` inside the sandbox.
    pub async fn run_code(&self, code: &str, input: &str) -> Result<String> {
        self.sandbox.execute(code, input).await
    }

    /// Advisory backend health report; never errors.
    pub async fn check_backend_health(&self) -> HealthReport {
        self.provider.check_health().await
    }

    /// Advisory model listing; never errors.
    pub async fn get_available_models(&self) -> Vec<String> {
        self.provider.list_models().await
    }

    /// Probe whether the remote backend accepts `api_key`; never errors.
    pub async fn test_provider_connection(&self, api_key: &str) -> bool {
        test_connection(&self.settings.remote, api_key).await
    }

    /// Append an execution record to the history log.
    pub async fn save_executed_version(&self, payload: &SavePayload) -> SaveOutcome {
        match self.store.append_version(payload).await {
            Ok(record) => SaveOutcome::saved(record.id),
            Err(e) => {
                tracing::error!("failed to save executed version: {e}");
                SaveOutcome::failed(e.to_string())
            }
        }
    }

    /// Most recent execution records, newest-first; empty on unreadable
    /// storage.
    pub async fn list_executed_versions(&self, limit: usize) -> Vec<VersionRecord> {
        match self.store.list_versions(limit).await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!("failed to list executed versions: {e}");
                Vec::new()
            }
        }
    }

    /// All named transforms; empty on unreadable storage.
    pub async fn list_transforms(&self) -> Vec<Transform> {
        match self.store.list_transforms().await {
            Ok(transforms) => transforms,
            Err(e) => {
                tracing::error!("failed to list transforms: {e}");
                Vec::new()
            }
        }
    }

    pub async fn create_transform(&self, draft: &TransformDraft) -> CreateOutcome {
        match self.store.create_transform(draft).await {
            Ok(transform) => CreateOutcome::created(transform),
            Err(e) => {
                tracing::error!("create transform failed: {e}");
                CreateOutcome::failed(e.to_string())
            }
        }
    }

    pub async fn get_transform(&self, id: &str) -> Option<Transform> {
        match self.store.get_transform(id).await {
            Ok(transform) => transform,
            Err(e) => {
                tracing::error!("get transform failed: {e}");
                None
            }
        }
    }

    pub async fn update_transform(&self, id: &str, patch: &TransformPatch) -> Ack {
        match self.store.update_transform(id, patch).await {
            Ok(()) => Ack::ok(),
            Err(e) => {
                tracing::error!("update transform failed: {e}");
                Ack::failed(e.to_string())
            }
        }
    }

    pub async fn delete_transform(&self, id: &str) -> Ack {
        match self.store.delete_transform(id).await {
            Ok(()) => Ack::ok(),
            Err(e) => {
                tracing::error!("delete transform failed: {e}");
                Ack::failed(e.to_string())
            }
        }
    }

    /// Run the advisory health check once at startup and log actionable
    /// guidance when the backend is down.
    pub async fn log_startup_health(&self) -> HealthReport {
        let health = self.check_backend_health().await;
        if health.status == HealthStatus::Healthy {
            tracing::info!("backend is healthy and ready");
        } else {
            tracing::warn!(
                "backend is not healthy or not reachable: {}",
                health.error.as_deref().unwrap_or("unknown")
            );
            if let Some(model) = self.settings.active_model() {
                tracing::info!(
                    "ensure the service is running (`ollama serve`) and the model is pulled (`ollama pull {model}`)"
                );
            }
        }
        health
    }
}
