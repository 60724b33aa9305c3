//! The version store: append-only history and the transform index.
//!
//! The store exclusively owns two files under its base directory:
//! `versions.jsonl` (one record per line, append-only, never rewritten) and
//! `transforms.json` (one serialized index document, replaced wholesale via
//! write-temp-then-rename so a crash mid-write leaves either the old or the
//! new index, never a torn one).
//!
//! The index read-modify-write cycle is not protected by a cross-process
//! lock; concurrent mutations are last-writer-wins. Accepted for a
//! single-operator tool.

use crate::id::new_record_id;
use chrono::Utc;
use curlime_core::config::StoragePaths;
use curlime_core::error::CurlimeError;
use curlime_core::types::{
    ExecSnapshot, SavePayload, Transform, TransformDraft, TransformPatch, TransformStats,
    VersionFields, VersionRecord,
};
use curlime_core::validate::ensure_valid_transform_code;
use curlime_core::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Id of the implicit transform summary maintained by `append_version`.
pub const DEFAULT_TRANSFORM_ID: &str = "default";

/// Upper bound on how many history records one listing may return.
pub const MAX_LIST_LIMIT: usize = 500;

const INDEX_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct TransformIndex {
    version: u32,
    transforms: BTreeMap<String, Transform>,
}

impl Default for TransformIndex {
    fn default() -> Self {
        Self {
            version: INDEX_VERSION,
            transforms: BTreeMap::new(),
        }
    }
}

fn io_err(context: &str, err: impl std::fmt::Display) -> CurlimeError {
    CurlimeError::persistence(format!("{context}: {err}"))
}

/// Durable store for execution history and named transforms.
#[derive(Debug, Clone)]
pub struct VersionStore {
    paths: StoragePaths,
}

impl VersionStore {
    pub fn new(paths: StoragePaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    /// Create the storage directory and both files if absent. Idempotent;
    /// safe to call before every operation.
    pub async fn ensure_storage(&self) -> Result<()> {
        fs::create_dir_all(&self.paths.base_dir)
            .await
            .map_err(|e| io_err("failed to create storage directory", e))?;
        if fs::metadata(&self.paths.versions_file).await.is_err() {
            fs::write(&self.paths.versions_file, "")
                .await
                .map_err(|e| io_err("failed to create versions log", e))?;
        }
        if fs::metadata(&self.paths.transforms_index).await.is_err() {
            self.write_index(&TransformIndex::default()).await?;
        }
        Ok(())
    }

    /// Append one execution record to the log and bump the implicit
    /// transform summary in the index.
    pub async fn append_version(&self, payload: &SavePayload) -> Result<VersionRecord> {
        self.ensure_storage().await?;

        let now = Utc::now();
        let record = VersionRecord {
            id: new_record_id(),
            ts: now,
            label: "Execute".to_string(),
            fields: VersionFields {
                code: payload.code.clone(),
                language: payload.language.clone().unwrap_or_else(|| "js".to_string()),
                provider: payload
                    .provider
                    .clone()
                    .unwrap_or_else(|| "local-inference".to_string()),
                model: payload.model.clone(),
            },
            exec_snapshot: ExecSnapshot {
                input: payload.input.clone(),
                prompt: payload.prompt.clone(),
                result: payload.result.clone(),
                duration_ms: payload.duration_ms,
                success: true,
            },
        };

        let line = serde_json::to_string(&record)?;
        let mut file = fs::OpenOptions::new()
            .append(true)
            .open(&self.paths.versions_file)
            .await
            .map_err(|e| io_err("failed to open versions log", e))?;
        file.write_all(format!("{line}\n").as_bytes())
            .await
            .map_err(|e| io_err("failed to append version record", e))?;

        let mut index = self.read_index().await;
        let summary = index
            .transforms
            .entry(DEFAULT_TRANSFORM_ID.to_string())
            .or_insert_with(|| Transform {
                id: DEFAULT_TRANSFORM_ID.to_string(),
                name: "Default Transform".to_string(),
                language: String::new(),
                provider: String::new(),
                model: None,
                sample_prompt: String::new(),
                code: String::new(),
                created_at: now,
                updated_at: None,
                current_version_id: None,
                stats: TransformStats::default(),
            });
        summary.updated_at = Some(record.ts);
        summary.current_version_id = Some(record.id.clone());
        summary.stats.executes += 1;
        self.write_index(&index).await?;

        Ok(record)
    }

    /// Most recent records, newest-first. `limit` is clamped to
    /// `[1, MAX_LIST_LIMIT]`; lines that fail to parse (torn trailing
    /// writes) are silently skipped.
    pub async fn list_versions(&self, limit: usize) -> Result<Vec<VersionRecord>> {
        self.ensure_storage().await?;
        let limit = limit.clamp(1, MAX_LIST_LIMIT);

        let raw = fs::read_to_string(&self.paths.versions_file)
            .await
            .map_err(|e| io_err("failed to read versions log", e))?;

        let mut records: Vec<VersionRecord> = raw
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect();

        if records.len() > limit {
            records.drain(..records.len() - limit);
        }
        records.reverse();
        Ok(records)
    }

    pub async fn list_transforms(&self) -> Result<Vec<Transform>> {
        self.ensure_storage().await?;
        let index = self.read_index().await;
        Ok(index.transforms.into_values().collect())
    }

    pub async fn get_transform(&self, id: &str) -> Result<Option<Transform>> {
        self.ensure_storage().await?;
        let index = self.read_index().await;
        Ok(index.transforms.get(id).cloned())
    }

    /// Create a transform from caller-supplied fields. The code must pass
    /// the transform-shape check; on violation the index stays untouched.
    pub async fn create_transform(&self, draft: &TransformDraft) -> Result<Transform> {
        self.ensure_storage().await?;
        ensure_valid_transform_code(&draft.code)?;

        let now = Utc::now();
        let transform = Transform {
            id: new_record_id(),
            name: draft
                .name
                .clone()
                .unwrap_or_else(|| "Untitled Transform".to_string()),
            language: draft.language.clone().unwrap_or_else(|| "js".to_string()),
            provider: draft
                .provider
                .clone()
                .unwrap_or_else(|| "local-inference".to_string()),
            model: draft.model.clone(),
            sample_prompt: draft.sample_prompt.clone().unwrap_or_default(),
            code: draft.code.clone(),
            created_at: now,
            updated_at: Some(now),
            current_version_id: None,
            stats: TransformStats::default(),
        };

        let mut index = self.read_index().await;
        index
            .transforms
            .insert(transform.id.clone(), transform.clone());
        self.write_index(&index).await?;
        Ok(transform)
    }

    /// Apply a partial update. A patch that touches `code` is re-validated
    /// first and rejected without mutating the index if it fails.
    pub async fn update_transform(&self, id: &str, patch: &TransformPatch) -> Result<()> {
        self.ensure_storage().await?;

        if let Some(code) = &patch.code {
            ensure_valid_transform_code(code)?;
        }

        let mut index = self.read_index().await;
        let existing = index
            .transforms
            .get_mut(id)
            .ok_or_else(|| CurlimeError::persistence(format!("transform not found: {id}")))?;

        if let Some(name) = &patch.name {
            existing.name = name.clone();
        }
        if let Some(language) = &patch.language {
            existing.language = language.clone();
        }
        if let Some(provider) = &patch.provider {
            existing.provider = provider.clone();
        }
        if let Some(model) = &patch.model {
            existing.model = Some(model.clone());
        }
        if let Some(sample_prompt) = &patch.sample_prompt {
            existing.sample_prompt = sample_prompt.clone();
        }
        if let Some(code) = &patch.code {
            existing.code = code.clone();
        }
        existing.updated_at = Some(Utc::now());

        self.write_index(&index).await
    }

    /// Remove a transform from the index. History already in the append
    /// log is untouched; deletion is not retroactive.
    pub async fn delete_transform(&self, id: &str) -> Result<()> {
        self.ensure_storage().await?;
        let mut index = self.read_index().await;
        if index.transforms.remove(id).is_none() {
            return Err(CurlimeError::persistence(format!(
                "transform not found: {id}"
            )));
        }
        self.write_index(&index).await
    }

    // A missing or corrupt index degrades to the empty one rather than
    // failing reads.
    async fn read_index(&self) -> TransformIndex {
        match fs::read_to_string(&self.paths.transforms_index).await {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("transform index unreadable, treating as empty: {e}");
                TransformIndex::default()
            }),
            Err(_) => TransformIndex::default(),
        }
    }

    async fn write_index(&self, index: &TransformIndex) -> Result<()> {
        let tmp = self.paths.transforms_index.with_extension("json.tmp");
        let body = serde_json::to_string_pretty(index)?;
        fs::write(&tmp, body)
            .await
            .map_err(|e| io_err("failed to write transform index", e))?;
        fs::rename(&tmp, &self.paths.transforms_index)
            .await
            .map_err(|e| io_err("failed to commit transform index", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, VersionStore) {
        let dir = TempDir::new().expect("temp dir");
        let store = VersionStore::new(StoragePaths::new(dir.path()));
        (dir, store)
    }

    fn payload(result: &str) -> SavePayload {
        SavePayload {
            code: "function transform(text) { return text.toUpperCase(); }".to_string(),
            language: None,
            provider: None,
            model: Some("deepseek-coder:6.7b".to_string()),
            input: "hello world".to_string(),
            prompt: "uppercase it".to_string(),
            result: result.to_string(),
            duration_ms: Some(42),
        }
    }

    fn draft(code: &str) -> TransformDraft {
        TransformDraft {
            name: Some("Shout".to_string()),
            code: code.to_string(),
            ..TransformDraft::default()
        }
    }

    #[tokio::test]
    async fn ensure_storage_is_idempotent() {
        let (_dir, store) = store();
        store.ensure_storage().await.unwrap();
        store.ensure_storage().await.unwrap();
        assert!(store.paths().versions_file.exists());
        let raw = std::fs::read_to_string(&store.paths().transforms_index).unwrap();
        let index: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(index["version"], 1);
    }

    #[tokio::test]
    async fn save_then_list_round_trips() {
        let (_dir, store) = store();
        let record = store.append_version(&payload("HELLO WORLD")).await.unwrap();

        let listed = store.list_versions(1).await.unwrap();
        assert_eq!(listed.len(), 1);
        let got = &listed[0];
        assert_eq!(got.id, record.id);
        assert_eq!(got.exec_snapshot.input, "hello world");
        assert_eq!(got.exec_snapshot.prompt, "uppercase it");
        assert_eq!(got.exec_snapshot.result, "HELLO WORLD");
        assert_eq!(got.fields.code, record.fields.code);
        // defaults applied for absent payload fields
        assert_eq!(got.fields.language, "js");
        assert_eq!(got.fields.provider, "local-inference");
    }

    #[tokio::test]
    async fn listing_is_newest_first_and_clamped() {
        let (_dir, store) = store();
        for i in 0..5 {
            store.append_version(&payload(&format!("r{i}"))).await.unwrap();
        }

        let listed = store.list_versions(3).await.unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].exec_snapshot.result, "r4");
        assert_eq!(listed[2].exec_snapshot.result, "r2");

        // limit 0 clamps up to 1
        assert_eq!(store.list_versions(0).await.unwrap().len(), 1);
        // absurd limits clamp down to the cap
        assert!(store.list_versions(10_000).await.unwrap().len() <= MAX_LIST_LIMIT);
    }

    #[tokio::test]
    async fn torn_trailing_line_is_skipped() {
        let (_dir, store) = store();
        store.append_version(&payload("good")).await.unwrap();

        // Simulate a crash mid-append.
        use std::io::Write;
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(&store.paths().versions_file)
            .unwrap();
        write!(file, "{{\"id\":\"truncat").unwrap();
        drop(file);

        let listed = store.list_versions(50).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].exec_snapshot.result, "good");
    }

    #[tokio::test]
    async fn executes_counter_is_monotonic() {
        let (_dir, store) = store();
        for expected in 1..=3u64 {
            store.append_version(&payload("x")).await.unwrap();
            let transforms = store.list_transforms().await.unwrap();
            let summary = transforms
                .iter()
                .find(|t| t.id == DEFAULT_TRANSFORM_ID)
                .expect("implicit summary");
            assert_eq!(summary.stats.executes, expected);
            assert!(summary.current_version_id.is_some());
        }
    }

    #[tokio::test]
    async fn transform_crud_cycle() {
        let (_dir, store) = store();

        let created = store
            .create_transform(&draft("function transform(text) { return text.trim(); }"))
            .await
            .unwrap();
        assert_eq!(created.name, "Shout");
        assert_eq!(created.language, "js");

        let fetched = store.get_transform(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.code, created.code);

        store
            .update_transform(
                &created.id,
                &TransformPatch {
                    name: Some("Trim".to_string()),
                    ..TransformPatch::default()
                },
            )
            .await
            .unwrap();
        let updated = store.get_transform(&created.id).await.unwrap().unwrap();
        assert_eq!(updated.name, "Trim");
        assert_eq!(updated.code, created.code);

        store.delete_transform(&created.id).await.unwrap();
        assert!(store.get_transform(&created.id).await.unwrap().is_none());
        assert!(store.delete_transform(&created.id).await.is_err());
    }

    #[tokio::test]
    async fn invalid_code_is_rejected_without_mutation() {
        let (_dir, store) = store();

        let err = store.create_transform(&draft("not a function")).await.unwrap_err();
        assert!(matches!(err, CurlimeError::Validation(_)));
        assert!(store.list_transforms().await.unwrap().is_empty());

        let created = store
            .create_transform(&draft("const transform = (t) => t;"))
            .await
            .unwrap();
        let err = store
            .update_transform(
                &created.id,
                &TransformPatch {
                    code: Some("function broken()".to_string()),
                    ..TransformPatch::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CurlimeError::Validation(_)));
        let unchanged = store.get_transform(&created.id).await.unwrap().unwrap();
        assert_eq!(unchanged.code, "const transform = (t) => t;");
    }

    #[tokio::test]
    async fn deleting_a_transform_keeps_history() {
        let (_dir, store) = store();
        store.append_version(&payload("kept")).await.unwrap();
        store.delete_transform(DEFAULT_TRANSFORM_ID).await.unwrap();

        assert!(store.list_transforms().await.unwrap().is_empty());
        assert_eq!(store.list_versions(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn corrupt_index_degrades_to_empty() {
        let (_dir, store) = store();
        store.ensure_storage().await.unwrap();
        std::fs::write(&store.paths().transforms_index, "{ not json").unwrap();

        assert!(store.list_transforms().await.unwrap().is_empty());
        // Writes rebuild a valid index.
        store
            .create_transform(&draft("let transform = t => t;"))
            .await
            .unwrap();
        assert_eq!(store.list_transforms().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn index_writes_leave_no_temp_file() {
        let (_dir, store) = store();
        store.append_version(&payload("x")).await.unwrap();
        let tmp = store.paths().transforms_index.with_extension("json.tmp");
        assert!(!tmp.exists());
        // And the committed index is parseable.
        let raw = std::fs::read_to_string(&store.paths().transforms_index).unwrap();
        serde_json::from_str::<serde_json::Value>(&raw).unwrap();
    }
}
