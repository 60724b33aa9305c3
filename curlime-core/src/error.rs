//! Error types for Curlime operations.

/// Phase of a sandboxed execution at which the generated code failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionPhase {
    /// The code failed to parse, threw while being loaded, or did not
    /// leave a callable `transform` binding behind.
    Load,
    /// The `transform` call itself threw.
    Call,
    /// The call returned, but with a non-string value.
    Result,
}

impl std::fmt::Display for ExecutionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionPhase::Load => write!(f, "load"),
            ExecutionPhase::Call => write!(f, "call"),
            ExecutionPhase::Result => write!(f, "result"),
        }
    }
}

/// The main error type for Curlime operations.
#[derive(Debug, thiserror::Error)]
pub enum CurlimeError {
    /// Caller supplied an incomplete or malformed request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A credential was required but not supplied
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    /// Transport-level failure reaching a backend service; the message
    /// carries operator guidance for bringing the service up
    #[error("Backend unreachable: {0}")]
    BackendUnreachable(String),

    /// Backend reachable but returned a failure status
    #[error("Provider HTTP error ({status}): {message}")]
    ProviderHttp { status: u16, message: String },

    /// Backend responded successfully but without the expected payload
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    /// An intermediary service accepted the request but reported failure
    #[error("Relay error: {0}")]
    ProviderDelegated(String),

    /// Sandboxed execution exceeded the wall-clock cap
    #[error("Execution timed out after {limit_ms} ms")]
    ExecutionTimeout { limit_ms: u64 },

    /// Generated code failed inside the sandbox
    #[error("Execution failed ({phase}): {message}")]
    ExecutionRuntime {
        phase: ExecutionPhase,
        message: String,
    },

    /// Code does not satisfy the transform-shape contract
    #[error("Validation error: {0}")]
    Validation(String),

    /// Disk read/write/parse failure in the persistence store
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Network-level errors that have not been remapped yet
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CurlimeError {
    /// Create an invalid request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Create a missing credential error
    pub fn missing_credential(msg: impl Into<String>) -> Self {
        Self::MissingCredential(msg.into())
    }

    /// Create a backend unreachable error
    pub fn unreachable(msg: impl Into<String>) -> Self {
        Self::BackendUnreachable(msg.into())
    }

    /// Create a provider HTTP error
    pub fn provider_http(status: u16, message: impl Into<String>) -> Self {
        Self::ProviderHttp {
            status,
            message: message.into(),
        }
    }

    /// Create a malformed response error
    pub fn malformed_response(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Create a delegated provider error
    pub fn delegated(msg: impl Into<String>) -> Self {
        Self::ProviderDelegated(msg.into())
    }

    /// Create an execution runtime error
    pub fn execution(phase: ExecutionPhase, message: impl Into<String>) -> Self {
        Self::ExecutionRuntime {
            phase,
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a persistence error
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Whether this failure originated inside the execution sandbox
    pub fn is_execution_failure(&self) -> bool {
        matches!(
            self,
            CurlimeError::ExecutionTimeout { .. } | CurlimeError::ExecutionRuntime { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_human_readable() {
        let err = CurlimeError::provider_http(529, "overloaded");
        assert_eq!(err.to_string(), "Provider HTTP error (529): overloaded");

        let err = CurlimeError::ExecutionTimeout { limit_ms: 2000 };
        assert_eq!(err.to_string(), "Execution timed out after 2000 ms");

        let err = CurlimeError::execution(ExecutionPhase::Result, "returned number");
        assert_eq!(err.to_string(), "Execution failed (result): returned number");
    }
}
