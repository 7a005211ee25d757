//! Credential Value Object
//!
//! An opaque bearer token. The client never interprets its contents; it
//! only rejects values that cannot possibly be a token.

use std::fmt;

/// Strings that end up in storage when a script persists a missing value
const CORRUPT_LITERALS: [&str; 2] = ["null", "undefined"];

/// Whether a persisted string is one of the placeholder literals
pub fn is_corrupt_literal(raw: &str) -> bool {
    CORRUPT_LITERALS.contains(&raw.trim())
}

/// Bearer credential value object
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Parse a raw stored value
    ///
    /// Returns `None` for empty, whitespace-only, `"null"` and `"undefined"`.
    pub fn parse(raw: impl AsRef<str>) -> Option<Self> {
        let raw = raw.as_ref().trim();
        if raw.is_empty() || is_corrupt_literal(raw) {
            return None;
        }
        Some(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let credential = Credential::parse("eyJhbGciOi.abc.def").unwrap();
        assert_eq!(credential.as_str(), "eyJhbGciOi.abc.def");
    }

    #[test]
    fn test_parse_trims() {
        assert_eq!(Credential::parse("  tok  ").unwrap().as_str(), "tok");
    }

    #[test]
    fn test_parse_rejects_placeholders() {
        assert!(Credential::parse("").is_none());
        assert!(Credential::parse("   ").is_none());
        assert!(Credential::parse("null").is_none());
        assert!(Credential::parse("undefined").is_none());
        assert!(Credential::parse(" undefined ").is_none());
    }

    #[test]
    fn test_debug_is_redacted() {
        let credential = Credential::parse("secret-token").unwrap();
        assert!(!format!("{:?}", credential).contains("secret-token"));
    }
}
