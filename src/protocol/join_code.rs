//! Numeric join-code generation (§3, §4.4): a 6-16 digit public identifier
//! for a live lobby, independent of its opaque `lobby_id`.

use rand::RngExt;

/// Generate a random numeric join code of exactly `length` digits.
/// The leading digit may be zero: join codes are opaque numeric strings, not
/// parsed as integers, so leading zeros are preserved and valid.
pub fn generate_join_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let digit = rng.random_range(0..10u8);
            (b'0' + digit) as char
        })
        .collect()
}
