//! # Curlime
//!
//! Generate, sandbox-execute and version small text transforms.
//!
//! Curlime turns a natural-language instruction into a `transform(text)`
//! function via one of several language-model backends, runs it against
//! sample input inside an isolated, time-capped runtime, and durably
//! records what was generated, run and produced.
//!
//! ## Quick start
//!
//! ```ignore
//! use curlime::CurlimeApi;
//!
//! # async fn example() -> curlime::Result<()> {
//! let api = CurlimeApi::from_env()?;
//!
//! let code = api
//!     .generate_code("hello world", "uppercase it", "js")
//!     .await?;
//! let output = api.run_code(&code, "hello world").await?;
//! assert_eq!(output, "HELLO WORLD");
//! # Ok(())
//! # }
//! ```
//!
//! The crates underneath can also be used on their own:
//! `curlime-provider` for the generation strategies, `curlime-sandbox` for
//! isolated execution, `curlime-store` for persistence.

pub mod api;

// Re-export core types and traits
pub use curlime_core::*;

// Re-export the component crates under short module names
pub mod provider {
    //! Code-generation provider strategies.
    pub use curlime_provider::*;
}

pub mod sandbox {
    //! Capability-scoped execution of generated code.
    pub use curlime_sandbox::*;
}

pub mod store {
    //! Versioned persistence for executed transforms.
    pub use curlime_store::*;
}

pub mod layer {
    //! Built-in provider layers.
    pub use curlime_layer::*;
}

pub use api::CurlimeApi;

/// Prelude module for convenient imports
pub mod prelude {
    //! The most commonly used types and traits.
    //!
    //! ```
    //! use curlime::prelude::*;
    //! ```

    pub use crate::api::CurlimeApi;
    pub use crate::layer::LoggingLayer;
    pub use crate::provider::build_provider;
    pub use crate::sandbox::Sandbox;
    pub use crate::store::VersionStore;
    pub use crate::{
        CurlimeError, GeneratedCode, GenerationRequest, HealthReport, Provider, ProviderKind,
        ProviderSettings, Result, SavePayload, StoragePaths, Transform, VersionRecord,
    };
}
