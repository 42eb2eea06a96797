//! Sender address normalization.
//!
//! Numeric addresses arrive with inconsistent formatting (`+1 (555) 010-2030`
//! vs `15550102030`). Lookups against the block list and the per-address
//! conversation threads use the normalized form so the same sender always
//! resolves to the same thread.

/// Normalize a sender address for storage and lookups.
///
/// Numeric addresses keep their digits and a leading `+`; every other
/// formatting character (spaces, dashes, dots, parentheses) is dropped.
/// Alphanumeric sender ids (e.g. carrier shortcodes like `GOOGLE`) are
/// lowercased instead, since they carry no digits to key on.
#[must_use]
pub fn normalize_address(address: &str) -> String {
    let trimmed = address.trim();

    let mut normalized = String::with_capacity(trimmed.len());
    for (i, c) in trimmed.chars().enumerate() {
        if c.is_ascii_digit() || (i == 0 && c == '+') {
            normalized.push(c);
        }
    }

    if normalized.chars().any(|c| c.is_ascii_digit()) {
        normalized
    } else {
        trimmed.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_formatting_characters() {
        assert_eq!(normalize_address("+1 (555) 010-2030"), "+15550102030");
        assert_eq!(normalize_address("555.010.2030"), "5550102030");
        assert_eq!(normalize_address("  5550102030  "), "5550102030");
    }

    #[test]
    fn test_plus_only_kept_in_leading_position() {
        assert_eq!(normalize_address("555+010"), "555010");
    }

    #[test]
    fn test_alphanumeric_sender_ids_lowercase() {
        assert_eq!(normalize_address("GOOGLE"), "google");
        assert_eq!(normalize_address(" My-Bank "), "my-bank");
    }

    #[test]
    fn test_same_number_different_formatting_collapses() {
        assert_eq!(
            normalize_address("+1 555 010 2030"),
            normalize_address("+1-555-010-2030")
        );
    }
}
