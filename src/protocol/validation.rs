//! Participant-name and join-code format validation (§3, §4.6).

use crate::error::ErrorCode;
use regex::Regex;
use std::sync::LazyLock;

/// `^[\p{L}\p{N}\s._-]{2,16}$` (§4.6): unicode letters, digits, space, and
/// `_-.`, 2-16 characters after trimming.
static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}\p{N}\s._-]{2,16}$").expect("valid name regex"));

/// Validate and trim a participant name. Trimming happens before both the
/// pattern check and the length check so leading/trailing whitespace never
/// counts toward the 2-16 character bound (§3 invariant 2).
pub fn validate_name(raw: &str) -> Result<String, ErrorCode> {
    let trimmed = raw.trim();
    if NAME_PATTERN.is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(ErrorCode::InvalidName)
    }
}

/// A join code is a 6-16 digit numeric string (§3).
pub fn validate_join_code(raw: &str) -> Result<(), ErrorCode> {
    let len = raw.chars().count();
    if (6..=16).contains(&len) && raw.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ErrorCode::InvalidJoinCode)
    }
}
