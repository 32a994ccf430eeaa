//! Stable categorical encoding for free-text payload fields.
//!
//! Codes must be identical for the same input string across process runs,
//! so a fixed, seedless hash (CRC32) is used rather than the standard
//! library's randomized hasher.

/// Modulus for codes derived from `category` / `merchant` text.
pub const MERCHANT_CATEGORY_MODULUS: u32 = 10;

/// Modulus for codes derived from `type` text.
pub const TRANSACTION_TYPE_MODULUS: u32 = 3;

/// Deterministic non-negative code in `[0, modulus)` for a source string.
pub fn category_code(text: &str, modulus: u32) -> i64 {
    i64::from(crc32fast::hash(text.as_bytes()) % modulus)
}
