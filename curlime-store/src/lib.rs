//! # Curlime Store
//!
//! Versioned persistence for executed transforms: an append-only JSONL
//! history plus a crash-safe mutable index of named transforms.

pub mod id;
pub mod store;

// Re-exports
pub use id::new_record_id;
pub use store::{VersionStore, DEFAULT_TRANSFORM_ID, MAX_LIST_LIMIT};
