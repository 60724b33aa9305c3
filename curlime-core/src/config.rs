//! Configuration for providers and storage.
//!
//! Configuration is constructed once at process start (usually via
//! [`ProviderSettings::from_env`]) and threaded into the components; no
//! other module reads ambient environment state.

use crate::error::CurlimeError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Closed set of provider strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    RemoteLlm,
    LocalInference,
    Relay,
}

impl ProviderKind {
    /// Stable identifier used in configuration and persisted records
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::RemoteLlm => "remote-llm",
            ProviderKind::LocalInference => "local-inference",
            ProviderKind::Relay => "relay",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = CurlimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "claude" and "ollama" are accepted for compatibility with older
        // configuration files.
        match s.trim().to_ascii_lowercase().as_str() {
            "remote-llm" | "claude" => Ok(ProviderKind::RemoteLlm),
            "local-inference" | "ollama" => Ok(ProviderKind::LocalInference),
            "relay" => Ok(ProviderKind::Relay),
            other => Err(CurlimeError::invalid_request(format!(
                "unknown provider '{other}' (expected remote-llm, local-inference or relay)"
            ))),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings for the remote LLM provider (Anthropic-style messages API).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSettings {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    /// Value of the `anthropic-version` header
    pub version: String,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.anthropic.com/v1/messages".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            api_key: None,
            version: "2023-06-01".to_string(),
        }
    }
}

/// Settings for the local inference provider (Ollama-style daemon).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalSettings {
    pub endpoint: String,
    pub model: String,
}

impl Default for LocalSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "deepseek-coder:6.7b".to_string(),
        }
    }
}

/// Settings for the relay provider (intermediary generation service).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelaySettings {
    /// Base URL of the relay service; required when the relay provider is
    /// selected.
    pub endpoint: Option<String>,
}

/// Full provider configuration, covering all three strategies so the
/// selected one can be switched without rebuilding the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub remote: RemoteSettings,
    pub local: LocalSettings,
    pub relay: RelaySettings,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: ProviderKind::LocalInference,
            remote: RemoteSettings::default(),
            local: LocalSettings::default(),
            relay: RelaySettings::default(),
        }
    }
}

impl ProviderSettings {
    /// Read settings from the process environment.
    ///
    /// This is the single place ambient environment state is consulted;
    /// call it once at startup and pass the value down.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Ok(kind) = std::env::var("CURLIME_PROVIDER") {
            if let Ok(kind) = kind.parse() {
                settings.kind = kind;
            }
        }
        if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            if !key.is_empty() {
                settings.remote.api_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var("CURLIME_REMOTE_URL") {
            settings.remote.endpoint = url;
        }
        if let Ok(model) = std::env::var("CURLIME_REMOTE_MODEL") {
            settings.remote.model = model;
        }
        if let Ok(url) = std::env::var("OLLAMA_URL") {
            settings.local.endpoint = url;
        }
        if let Ok(model) = std::env::var("OLLAMA_MODEL") {
            settings.local.model = model;
        }
        if let Ok(url) = std::env::var("CURLIME_RELAY_URL") {
            settings.relay.endpoint = Some(url);
        }
        settings
    }

    /// Model identifier of the currently selected strategy, if it has one
    pub fn active_model(&self) -> Option<&str> {
        match self.kind {
            ProviderKind::RemoteLlm => Some(&self.remote.model),
            ProviderKind::LocalInference => Some(&self.local.model),
            ProviderKind::Relay => None,
        }
    }
}

/// File locations owned by the version store.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    pub base_dir: PathBuf,
    pub versions_file: PathBuf,
    pub transforms_index: PathBuf,
}

impl StoragePaths {
    /// Storage rooted at an explicit directory (used by tests)
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Self {
            versions_file: base_dir.join("versions.jsonl"),
            transforms_index: base_dir.join("transforms.json"),
            base_dir,
        }
    }

    /// The per-user default: `<home>/.curlime/`
    pub fn in_home() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(home.join(".curlime"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_kind_parses_aliases() {
        assert_eq!(
            "claude".parse::<ProviderKind>().unwrap(),
            ProviderKind::RemoteLlm
        );
        assert_eq!(
            "ollama".parse::<ProviderKind>().unwrap(),
            ProviderKind::LocalInference
        );
        assert_eq!(
            "Remote-LLM".parse::<ProviderKind>().unwrap(),
            ProviderKind::RemoteLlm
        );
        assert!("magic".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn storage_paths_derive_file_names() {
        let paths = StoragePaths::new("/tmp/curlime-test");
        assert!(paths.versions_file.ends_with("versions.jsonl"));
        assert!(paths.transforms_index.ends_with("transforms.json"));
    }
}
