//! Contact-field validators. Pure predicates; no deliverability checks.

use regex::Regex;
use std::sync::LazyLock;

// Compiled once, reused across calls.
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.%+-]+@[\w.-]+\.[a-zA-Z]{2,}$").unwrap());

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\+?\d{10,15}$").unwrap());

/// `local@domain.tld` with a 2+ letter top-level segment.
pub fn valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Optional leading `+`, then 10-15 digits. Spaces, dashes and
/// parentheses are rejected.
pub fn valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_accepts_plus_and_subdomains() {
        assert!(valid_email("a.b+c@sub.domain.co"));
        assert!(valid_email("user%tag@example.com"));
    }

    #[test]
    fn test_email_rejects_malformed() {
        for bad in ["a@b", "@domain.com", "a b@domain.com", "nodomain", ""] {
            assert!(!valid_email(bad), "accepted: {}", bad);
        }
    }

    #[test]
    fn test_phone_accepts_bare_and_plus_prefixed() {
        assert!(valid_phone("+12345678901")); // 11 digits
        assert!(valid_phone("1234567890")); // 10 digits
        assert!(valid_phone("123456789012345")); // 15 digits
    }

    #[test]
    fn test_phone_rejects_formatting_and_short_numbers() {
        for bad in ["123-456-7890", "123456789", "+1 234 567 8901", "(123)4567890"] {
            assert!(!valid_phone(bad), "accepted: {}", bad);
        }
    }
}
