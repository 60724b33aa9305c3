//! Provider trait and core abstractions.

use crate::types::{GeneratedCode, GenerationRequest, HealthReport, ProviderInfo};
use crate::Result;
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

/// Core trait for code-generation backends.
///
/// Implementations turn a [`GenerationRequest`] into source code. The
/// health and model-discovery methods are advisory and must never error:
/// on any transport failure they degrade to an unhealthy/empty result.
#[async_trait]
pub trait Provider: Send + Sync + Debug + 'static {
    /// Get provider information
    fn info(&self) -> Arc<ProviderInfo>;

    /// Generate code for the given request.
    ///
    /// Providers validate the request before any I/O and never retry on
    /// their own; retry policy, if any, belongs to the caller.
    async fn generate(&self, req: &GenerationRequest) -> Result<GeneratedCode>;

    /// Advisory backend health probe.
    async fn check_health(&self) -> HealthReport;

    /// Advisory list of model identifiers the backend offers.
    async fn list_models(&self) -> Vec<String>;
}

// Layers wrap the provider picked by dispatch, which is type-erased.
#[async_trait]
impl Provider for Box<dyn Provider> {
    fn info(&self) -> Arc<ProviderInfo> {
        (**self).info()
    }

    async fn generate(&self, req: &GenerationRequest) -> Result<GeneratedCode> {
        (**self).generate(req).await
    }

    async fn check_health(&self) -> HealthReport {
        (**self).check_health().await
    }

    async fn list_models(&self) -> Vec<String> {
        (**self).list_models().await
    }
}
