//! Prompt construction shared by the provider strategies.
//!
//! The system instruction pins the output contract: the model must define
//! `transform(text)` returning a string, wrapped in a single fenced code
//! block. The user message embeds the sample input and the instruction
//! verbatim.

/// Stop sequences that keep a local model from continuing past its answer.
pub const STOP_SEQUENCES: [&str; 4] = ["User:", "Human:", "\n\nUser:", "\n\nHuman:"];

/// Bounded output length for one generation.
pub const MAX_OUTPUT_TOKENS: u32 = 1024;

/// Deterministic-leaning sampling for code generation.
pub const TEMPERATURE: f32 = 0.1;
pub const TOP_P: f32 = 0.9;

/// System instruction pinning the transform-shape output contract.
pub fn system_prompt(language: &str) -> String {
    format!(
        "You are a code generator. \
         Output ONLY valid, executable {} code wrapped in triple backticks. \
         The code must define a function transform(text) that returns a string. \
         Do not include any explanations or comments outside the code block. \
         Ensure the function is complete and ready to execute.",
        language.to_uppercase()
    )
}

/// User message embedding the input and instruction verbatim.
pub fn user_prompt(input: &str, instruction: &str) -> String {
    format!("Input text:\n<<<\n{input}\n>>>\n\nUser prompt: {instruction}")
}

/// Single concatenated prompt with role markers, for backends that take
/// one string instead of structured messages.
pub fn combined_prompt(input: &str, instruction: &str, language: &str) -> String {
    format!(
        "{}\n\nUser: {}\n\nAssistant:",
        system_prompt(language),
        user_prompt(input, instruction)
    )
}
