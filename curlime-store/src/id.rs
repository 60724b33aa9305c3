//! Record identifier generation.
//!
//! Identifiers are a base-36 millisecond timestamp followed by a random
//! suffix: sortable by creation time and collision-resistant without a
//! central counter.

use chrono::Utc;
use uuid::Uuid;

const SUFFIX_LEN: usize = 8;

/// Generate a fresh time-ordered record id, e.g. `mf0q3z1c-4fa21b9d`.
pub fn new_record_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u128;
    format!("{}-{}", to_base36(millis), random_suffix())
}

fn to_base36(mut n: u128) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(DIGITS[(n % 36) as usize] as char);
        n /= 36;
    }
    digits.iter().rev().collect()
}

fn random_suffix() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    hex[..SUFFIX_LEN].to_string()
}
