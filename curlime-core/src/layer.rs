//! Layer trait and abstractions.
//!
//! Layers provide a composable way to wrap providers with cross-cutting
//! concerns such as logging. Each layer wraps an inner provider and returns
//! a new provider with enhanced behavior.

use crate::provider::Provider;
use crate::types::{GeneratedCode, GenerationRequest, HealthReport, ProviderInfo};
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Layer trait for wrapping providers.
pub trait Layer<P: Provider> {
    /// The type of the layered provider
    type LayeredProvider: Provider;

    /// Wrap the inner provider with this layer
    fn layer(&self, inner: P) -> Self::LayeredProvider;
}

/// Helper trait for layered providers.
///
/// Provides default forwarding implementations; implementers only override
/// the methods they want to intercept.
#[async_trait]
pub trait LayeredProvider: Sized + Provider {
    /// The inner provider type
    type Inner: Provider;

    /// Get a reference to the inner provider
    fn inner(&self) -> &Self::Inner;

    fn layered_info(&self) -> Arc<ProviderInfo> {
        self.inner().info()
    }

    async fn layered_generate(&self, req: &GenerationRequest) -> Result<GeneratedCode> {
        self.inner().generate(req).await
    }

    async fn layered_check_health(&self) -> HealthReport {
        self.inner().check_health().await
    }

    async fn layered_list_models(&self) -> Vec<String> {
        self.inner().list_models().await
    }
}

/// Macro to implement `Provider` by forwarding to `LayeredProvider` methods.
///
/// Reduces boilerplate for non-generic layered providers.
#[macro_export]
macro_rules! impl_layered_provider {
    ($type:ty) => {
        #[async_trait::async_trait]
        impl $crate::provider::Provider for $type {
            fn info(&self) -> std::sync::Arc<$crate::types::ProviderInfo> {
                $crate::layer::LayeredProvider::layered_info(self)
            }

            async fn generate(
                &self,
                req: &$crate::types::GenerationRequest,
            ) -> $crate::Result<$crate::types::GeneratedCode> {
                $crate::layer::LayeredProvider::layered_generate(self, req).await
            }

            async fn check_health(&self) -> $crate::types::HealthReport {
                $crate::layer::LayeredProvider::layered_check_health(self).await
            }

            async fn list_models(&self) -> Vec<String> {
                $crate::layer::LayeredProvider::layered_list_models(self).await
            }
        }
    };
}
