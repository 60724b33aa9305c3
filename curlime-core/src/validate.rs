//! Transform-shape contract validation.
//!
//! A code snippet is only allowed into the transform index if it defines a
//! single-parameter callable named `transform`. The check is structural
//! (the code is never executed here); the sandbox enforces the
//! returns-a-string half of the contract at run time.

use crate::error::CurlimeError;
use crate::Result;
use once_cell::sync::Lazy;
use regex::Regex;

static FUNCTION_FORM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"function\s+transform\s*\(\s*[A-Za-z_$][\w$]*\s*\)").expect("valid function regex")
});

static ARROW_FORM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:const|let|var)\s+transform\s*=\s*(?:\(\s*[A-Za-z_$][\w$]*\s*\)|[A-Za-z_$][\w$]*)\s*=>",
    )
    .expect("valid arrow regex")
});

/// True iff `code` satisfies the transform-shape contract: a callable named
/// `transform` taking exactly one parameter, in function-declaration or
/// arrow form.
pub fn validate_transform_code(code: &str) -> bool {
    if code.trim().is_empty() {
        return false;
    }
    FUNCTION_FORM.is_match(code) || ARROW_FORM.is_match(code)
}

/// Validate `code`, mapping a contract violation to [`CurlimeError::Validation`].
pub fn ensure_valid_transform_code(code: &str) -> Result<()> {
    if validate_transform_code(code) {
        Ok(())
    } else {
        Err(CurlimeError::validation(
            "Invalid code: must define function transform(text)",
        ))
    }
}
