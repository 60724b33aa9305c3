//! Basic usage example for the curlime meta crate.
//!
//! This demonstrates the full pipeline:
//! 1. Check backend health (advisory, never fails)
//! 2. Generate transform code from a natural-language instruction
//! 3. Execute the generated code inside the sandbox
//! 4. Persist the executed version and read the history back
//!
//! Run with a local Ollama daemon (`ollama serve`) or set
//! `CURLIME_PROVIDER=remote-llm` and `ANTHROPIC_API_KEY` for the remote
//! backend.

use curlime::prelude::*;
use std::time::Instant;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let api = CurlimeApi::from_env()?;

    let health = api.log_startup_health().await;
    println!("backend: {:?} ({})", health.status, health.provider);

    let input = "hello world";
    let instruction = "uppercase the text";

    let code = api.generate_code(input, instruction, "js").await?;
    println!("generated:\n{code}\n");

    let started = Instant::now();
    let output = api.run_code(&code, input).await?;
    let duration_ms = started.elapsed().as_millis() as u64;
    println!("output: {output}");

    let saved = api
        .save_executed_version(&SavePayload {
            code,
            input: input.to_string(),
            prompt: instruction.to_string(),
            result: output,
            duration_ms: Some(duration_ms),
            ..SavePayload::default()
        })
        .await;
    println!("saved: ok={} id={:?}", saved.ok, saved.version_id);

    for record in api.list_executed_versions(5).await {
        println!("{} {} -> {}", record.ts, record.id, record.exec_snapshot.result);
    }

    Ok(())
}
