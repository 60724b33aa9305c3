//! # Curlime Sandbox
//!
//! Capability-scoped execution of model-generated transform code.
//!
//! Each call spawns a fresh Node.js child process running a fixed harness.
//! Inside the harness the generated code is evaluated in a bare `vm`
//! context whose only binding is a console shim; there is no `require`, no
//! `process`, no filesystem, network or environment access, and string /
//! wasm code generation is disabled. The host enforces the wall-clock cap
//! preemptively: when it expires the child is killed, so a non-yielding
//! loop in the generated code cannot hang the caller.
//!
//! Contexts are one-shot. Nothing survives from one execution to the next.

use curlime_core::error::{CurlimeError, ExecutionPhase};
use curlime_core::Result;
use serde::Deserialize;
use serde_json::json;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Hard wall-clock cap for one execution.
pub const DEFAULT_TIMEOUT_MS: u64 = 2000;

// Allowance for interpreter startup and verdict plumbing, on top of the
// in-sandbox cap. The guest never gets this time.
const STARTUP_SLACK_MS: u64 = 1500;

const HARNESS: &str = include_str!("harness.js");

#[derive(Debug, Deserialize)]
struct Verdict {
    ok: bool,
    #[serde(default)]
    output: Option<String>,
    #[serde(default)]
    phase: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Isolated, time-capped execution engine for generated transforms.
#[derive(Debug, Clone)]
pub struct Sandbox {
    node_binary: String,
    timeout: Duration,
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            node_binary: "node".to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Override the wall-clock cap (used by tests).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a specific interpreter binary instead of `node` from PATH.
    pub fn with_node_binary(mut self, binary: impl Into<String>) -> Self {
        self.node_binary = binary.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `code` against `input` and return the transformed string.
    ///
    /// The code must define a callable named `transform` taking the input
    /// string and returning a string; any other shape fails with a typed
    /// execution error rather than crashing the caller.
    pub async fn execute(&self, code: &str, input: &str) -> Result<String> {
        let limit_ms = self.timeout.as_millis() as u64;
        let job = json!({
            "code": code,
            "input": input,
            "timeoutMs": limit_ms,
        });

        let mut child = Command::new(&self.node_binary)
            .arg("--no-warnings")
            .arg("-e")
            .arg(HARNESS)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| match err.kind() {
                std::io::ErrorKind::NotFound => CurlimeError::unreachable(
                    "Node.js runtime not found. Install Node.js to execute generated code.",
                ),
                _ => CurlimeError::execution(
                    ExecutionPhase::Load,
                    format!("failed to start sandbox process: {err}"),
                ),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            let payload = job.to_string();
            stdin.write_all(payload.as_bytes()).await.map_err(|err| {
                CurlimeError::execution(
                    ExecutionPhase::Load,
                    format!("failed to hand job to sandbox: {err}"),
                )
            })?;
            // Closing stdin signals the harness to run.
            drop(stdin);
        }

        let budget = self.timeout + Duration::from_millis(STARTUP_SLACK_MS);
        let output = match tokio::time::timeout(budget, child.wait_with_output()).await {
            // Dropping the wait future kills the child (kill_on_drop), so
            // runaway guest code is preempted at the cap boundary.
            Err(_) => return Err(CurlimeError::ExecutionTimeout { limit_ms }),
            Ok(Err(err)) => {
                return Err(CurlimeError::execution(
                    ExecutionPhase::Load,
                    format!("sandbox process failed: {err}"),
                ))
            }
            Ok(Ok(output)) => output,
        };

        // Guest console output arrives on stderr; forward it for diagnostics.
        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stderr.lines().filter(|l| !l.is_empty()) {
            tracing::debug!(target: "curlime::sandbox", "guest: {line}");
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let verdict: Verdict = serde_json::from_str(stdout.trim()).map_err(|_| {
            CurlimeError::execution(
                ExecutionPhase::Load,
                format!(
                    "sandbox produced no verdict (exit: {:?}): {}",
                    output.status.code(),
                    stderr.trim()
                ),
            )
        })?;

        self.interpret(verdict, limit_ms)
    }

    fn interpret(&self, verdict: Verdict, limit_ms: u64) -> Result<String> {
        if verdict.ok {
            return verdict.output.ok_or_else(|| {
                CurlimeError::execution(ExecutionPhase::Result, "verdict carried no output")
            });
        }

        let message = verdict
            .message
            .unwrap_or_else(|| "unknown sandbox failure".to_string());
        match verdict.phase.as_deref() {
            Some("timeout") => Err(CurlimeError::ExecutionTimeout { limit_ms }),
            Some("call") => Err(CurlimeError::execution(ExecutionPhase::Call, message)),
            Some("result") => Err(CurlimeError::execution(ExecutionPhase::Result, message)),
            _ => Err(CurlimeError::execution(ExecutionPhase::Load, message)),
        }
    }
}
