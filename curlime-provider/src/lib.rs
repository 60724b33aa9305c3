//! # Curlime Providers
//!
//! Provider strategy implementations for Curlime code generation.
//!
//! Three interchangeable strategies implement the core `Provider` trait:
//! a remote LLM backend (Anthropic-style messages API), a locally running
//! inference daemon (Ollama-style), and a relay that delegates generation
//! to an intermediary HTTP service. Which one is built is a pure function
//! of the configuration's provider tag.

pub mod local;
pub mod prompt;
pub mod relay;
pub mod remote;

// Re-exports
pub use local::LocalInferenceProvider;
pub use relay::RelayProvider;
pub use remote::RemoteLlmProvider;

use curlime_core::config::{ProviderKind, ProviderSettings, RemoteSettings};
use curlime_core::error::CurlimeError;
use curlime_core::provider::Provider;
use curlime_core::Result;

/// Build the provider selected by the configuration.
///
/// Dispatch is driven solely by the closed `ProviderKind` tag; no runtime
/// type inspection is involved.
pub fn build_provider(settings: &ProviderSettings) -> Result<Box<dyn Provider>> {
    match settings.kind {
        ProviderKind::RemoteLlm => Ok(Box::new(RemoteLlmProvider::new(settings.remote.clone()))),
        ProviderKind::LocalInference => {
            Ok(Box::new(LocalInferenceProvider::new(settings.local.clone())))
        }
        ProviderKind::Relay => {
            let endpoint = settings.relay.endpoint.clone().ok_or_else(|| {
                CurlimeError::invalid_request("relay provider selected but no relay endpoint configured")
            })?;
            Ok(Box::new(RelayProvider::new(endpoint)))
        }
    }
}

/// Probe whether the remote backend accepts the given credential.
///
/// Sends a minimal one-token request; returns `true` iff the endpoint
/// answers with a success status. Never errors.
pub async fn test_connection(settings: &RemoteSettings, api_key: &str) -> bool {
    let mut settings = settings.clone();
    settings.api_key = Some(api_key.to_string());
    RemoteLlmProvider::new(settings).probe().await
}
