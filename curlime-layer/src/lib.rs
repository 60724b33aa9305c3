//! # Curlime Layers
//!
//! Built-in layers for wrapping Curlime providers.

pub mod logging;

// Re-exports
pub use logging::{LoggingLayer, LoggingProvider};
