//! Core types for generation, execution and persistence.
//!
//! Durable types serialize with the camelCase field names of the on-disk
//! format (`versions.jsonl` / `transforms.json`), so existing stores remain
//! readable.

use crate::error::CurlimeError;
use crate::extract::extract_code;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One generation request: what to transform, how, and in which language.
///
/// Immutable; constructed per call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub input: String,
    pub instruction: String,
    pub language: String,
}

impl GenerationRequest {
    pub fn new(
        input: impl Into<String>,
        instruction: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            input: input.into(),
            instruction: instruction.into(),
            language: language.into(),
        }
    }

    /// Common precondition for every provider: all three fields non-empty.
    pub fn validate(&self) -> Result<()> {
        if self.input.is_empty() || self.instruction.is_empty() || self.language.is_empty() {
            return Err(CurlimeError::invalid_request(
                "Missing input, prompt, or language",
            ));
        }
        Ok(())
    }
}

/// Model output before and after fence extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCode {
    /// The verbatim generated text
    pub raw: String,
    /// `raw` with a single fenced block unwrapped, or `raw` trimmed when no
    /// fence is present; never contains the fence markers themselves
    pub extracted: String,
}

impl GeneratedCode {
    /// Run raw model output through the code extractor.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let extracted = extract_code(&raw);
        Self { raw, extracted }
    }
}

/// Identity of a provider implementation, for logging and health reports.
#[derive(Debug, Clone)]
pub struct ProviderInfo {
    pub id: String,
    pub name: String,
}

/// Advisory health status of the configured backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Result of an advisory backend health check. Never raised as an error;
/// an unreachable backend produces an `Unhealthy` report instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: HealthStatus,
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub models: Vec<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthReport {
    pub fn healthy(provider: impl Into<String>, model: Option<String>, models: Vec<String>) -> Self {
        Self {
            status: HealthStatus::Healthy,
            provider: provider.into(),
            model,
            models,
            timestamp: Utc::now(),
            error: None,
        }
    }

    pub fn unhealthy(
        provider: impl Into<String>,
        model: Option<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            provider: provider.into(),
            model,
            models: Vec::new(),
            timestamp: Utc::now(),
            error: Some(error.into()),
        }
    }
}

/// Usage counters carried by a transform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformStats {
    #[serde(default)]
    pub uses: u64,
    #[serde(default)]
    pub executes: u64,
}

/// A named, durable transform: a validated code snippet plus metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub sample_prompt: String,
    #[serde(default)]
    pub code: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_version_id: Option<String>,
    #[serde(default)]
    pub stats: TransformStats,
}

/// Caller-supplied fields for creating a transform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformDraft {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub sample_prompt: Option<String>,
    pub code: String,
}

/// Partial update of a transform; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub sample_prompt: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

/// The generation-side fields of a version record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionFields {
    pub code: String,
    pub language: String,
    pub provider: String,
    pub model: Option<String>,
}

/// What one execution looked like: input, prompt, output and timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecSnapshot {
    pub input: String,
    pub prompt: String,
    pub result: String,
    pub duration_ms: Option<u64>,
    pub success: bool,
}

/// One immutable entry in the append-only version log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    pub id: String,
    pub ts: DateTime<Utc>,
    pub label: String,
    pub fields: VersionFields,
    pub exec_snapshot: ExecSnapshot,
}

/// Caller payload for `save_executed_version`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePayload {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub duration_ms: Option<u64>,
}

/// Non-throwing envelope for `save_executed_version`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveOutcome {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SaveOutcome {
    pub fn saved(version_id: impl Into<String>) -> Self {
        Self {
            ok: true,
            version_id: Some(version_id.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            version_id: None,
            error: Some(error.into()),
        }
    }
}

/// Non-throwing envelope for `create_transform`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOutcome {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CreateOutcome {
    pub fn created(transform: Transform) -> Self {
        Self {
            ok: true,
            id: Some(transform.id.clone()),
            transform: Some(transform),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            transform: None,
            error: Some(error.into()),
        }
    }
}

/// Non-throwing acknowledgement for update/delete operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Ack {
    pub fn ok() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_request_requires_all_fields() {
        assert!(GenerationRequest::new("hi", "upper", "js").validate().is_ok());
        assert!(GenerationRequest::new("", "upper", "js").validate().is_err());
        assert!(GenerationRequest::new("hi", "", "js").validate().is_err());
        assert!(GenerationRequest::new("hi", "upper", "").validate().is_err());
    }

    #[test]
    fn generated_code_unwraps_fence() {
        let gen = GeneratedCode::from_raw("```js\nlet transform = t => t;\n```");
        assert_eq!(gen.extracted, "let transform = t => t;");
        assert!(gen.raw.contains("```"));
    }

    #[test]
    fn version_record_uses_wire_field_names() {
        let record = VersionRecord {
            id: "abc".into(),
            ts: Utc::now(),
            label: "Execute".into(),
            fields: VersionFields {
                code: "c".into(),
                language: "js".into(),
                provider: "local-inference".into(),
                model: None,
            },
            exec_snapshot: ExecSnapshot {
                input: "i".into(),
                prompt: "p".into(),
                result: "r".into(),
                duration_ms: Some(12),
                success: true,
            },
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("execSnapshot").is_some());
        assert_eq!(json["execSnapshot"]["durationMs"], 12);
        assert!(json.get("ts").is_some());
    }
}
