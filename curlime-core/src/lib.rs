//! # Curlime Core
//!
//! Core abstractions for the Curlime code-transformation engine.
//!
//! This crate provides the shared vocabulary of the workspace: the error
//! taxonomy, the durable record types, the provider trait and its layer
//! (decorator) machinery, the fenced-code extractor and the transform-shape
//! validator. Provider implementations, the execution sandbox and the
//! version store live in their own crates and all speak these types.

pub mod config;
pub mod error;
pub mod extract;
pub mod layer;
pub mod provider;
pub mod types;
pub mod validate;

// Re-exports
pub use config::{
    LocalSettings, ProviderKind, ProviderSettings, RelaySettings, RemoteSettings, StoragePaths,
};
pub use error::{CurlimeError, ExecutionPhase};
pub use extract::extract_code;
pub use layer::{Layer, LayeredProvider};
pub use provider::Provider;
pub use types::*;
pub use validate::{ensure_valid_transform_code, validate_transform_code};

/// Result type alias for Curlime operations
pub type Result<T> = std::result::Result<T, CurlimeError>;
