//! Fenced code block extraction from raw model output.

use once_cell::sync::Lazy;
use regex::Regex;

// First fenced block wins; the optional tag is a lowercase language
// identifier. Everything between the fences is the payload.
static FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```[a-z]*\s*([\s\S]*?)```").expect("valid fence regex"));

/// Extract the code payload from raw model output.
///
/// If the text contains a fenced code block, the contents of the first one
/// are returned (trimmed). Otherwise the whole text is returned trimmed —
/// local models are not guaranteed to fence their output.
pub fn extract_code(raw: &str) -> String {
    match FENCE.captures(raw) {
        Some(caps) => caps
            .get(1)
            .map(|m| m.as_str())
            .unwrap_or(raw)
            .trim()
            .to_string(),
        None => raw.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_fenced_block() {
        let raw = "Here you go:\n```javascript\nfunction transform(text) { return text; }\n```\nEnjoy!";
        assert_eq!(
            extract_code(raw),
            "function transform(text) { return text; }"
        );
    }

    #[test]
    fn extracts_untagged_fence() {
        let raw = "```\nconst transform = (t) => t;\n```";
        assert_eq!(extract_code(raw), "const transform = (t) => t;");
    }

    #[test]
    fn first_fence_wins() {
        let raw = "```js\nfirst();\n```\ntext\n```js\nsecond();\n```";
        assert_eq!(extract_code(raw), "first();");
    }

    #[test]
    fn no_fence_returns_trimmed_raw() {
        let raw = "  function transform(text) { return text; }\n";
        assert_eq!(
            extract_code(raw),
            "function transform(text) { return text; }"
        );
    }

    #[test]
    fn never_returns_fence_markers() {
        assert_eq!(extract_code("```js\n```"), "");
        assert!(!extract_code("```js\ncode\n```").contains("```"));
    }
}
