//! Logging layer for provider operations.
//!
//! Emits a diagnostic event when a generation attempt starts, succeeds or
//! fails, with elapsed time. Health and model-discovery calls are logged at
//! debug level only.

use async_trait::async_trait;
use curlime_core::layer::{Layer, LayeredProvider};
use curlime_core::provider::Provider;
use curlime_core::types::{GeneratedCode, GenerationRequest, HealthReport, ProviderInfo};
use curlime_core::Result;
use std::sync::Arc;

/// Logging layer that logs provider operations.
#[derive(Debug, Clone)]
pub struct LoggingLayer {
    prefix: String,
}

impl LoggingLayer {
    /// Create a new logging layer
    pub fn new() -> Self {
        Self {
            prefix: "[Curlime]".to_string(),
        }
    }

    /// Create a logging layer with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for LoggingLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Provider> Layer<P> for LoggingLayer {
    type LayeredProvider = LoggingProvider<P>;

    fn layer(&self, inner: P) -> Self::LayeredProvider {
        LoggingProvider {
            inner,
            prefix: self.prefix.clone(),
        }
    }
}

/// Provider wrapped with logging
#[derive(Debug)]
pub struct LoggingProvider<P> {
    inner: P,
    prefix: String,
}

#[async_trait]
impl<P: Provider> LayeredProvider for LoggingProvider<P> {
    type Inner = P;

    fn inner(&self) -> &Self::Inner {
        &self.inner
    }

    async fn layered_generate(&self, req: &GenerationRequest) -> Result<GeneratedCode> {
        tracing::debug!(
            "{} generate request: provider={}, language={}, input_len={}",
            self.prefix,
            self.inner.info().id,
            req.language,
            req.input.len()
        );

        let start = std::time::Instant::now();
        let result = self.inner.generate(req).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(code) => {
                tracing::debug!(
                    "{} generate success: code_len={}, elapsed={:?}",
                    self.prefix,
                    code.extracted.len(),
                    elapsed
                );
            }
            Err(e) => {
                tracing::error!("{} generate error: {e}, elapsed={:?}", self.prefix, elapsed);
            }
        }

        result
    }

    async fn layered_check_health(&self) -> HealthReport {
        let report = self.inner.check_health().await;
        tracing::debug!(
            "{} health check: provider={}, status={:?}",
            self.prefix,
            report.provider,
            report.status
        );
        report
    }

    async fn layered_list_models(&self) -> Vec<String> {
        let models = self.inner.list_models().await;
        tracing::debug!("{} list models: count={}", self.prefix, models.len());
        models
    }
}

#[async_trait]
impl<P: Provider> Provider for LoggingProvider<P> {
    fn info(&self) -> Arc<ProviderInfo> {
        LayeredProvider::layered_info(self)
    }

    async fn generate(&self, req: &GenerationRequest) -> Result<GeneratedCode> {
        LayeredProvider::layered_generate(self, req).await
    }

    async fn check_health(&self) -> HealthReport {
        LayeredProvider::layered_check_health(self).await
    }

    async fn list_models(&self) -> Vec<String> {
        LayeredProvider::layered_list_models(self).await
    }
}
