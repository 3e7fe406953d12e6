//! Username validation.
//!
//! Identities are embedded verbatim in REST paths (`/login/{identity}`) and
//! WebSocket paths (`/chat/{local}/{partner}`).  Only characters a URL path
//! segment carries without escaping are accepted: RFC 3986 `pchar` minus
//! `%`, and no dot segments.

use crate::error::{Error, Result};

/// Maximum identity length in characters.
pub const MAX_IDENTITY_CHARS: usize = 64;

/// Validate a user-supplied identity and return it trimmed.
pub fn validate_identity(raw: &str) -> Result<&str> {
    let identity = raw.trim();

    if identity.is_empty() {
        return Err(Error::Validation("username must not be empty".into()));
    }
    if identity.chars().count() > MAX_IDENTITY_CHARS {
        return Err(Error::Validation(format!(
            "username must be at most {MAX_IDENTITY_CHARS} characters"
        )));
    }
    if let Some(c) = identity.chars().find(|&c| !is_path_char(c)) {
        return Err(Error::Validation(format!(
            "username must not contain {c:?}"
        )));
    }
    if identity == "." || identity == ".." {
        return Err(Error::Validation(format!(
            "username {identity:?} is reserved"
        )));
    }

    Ok(identity)
}

/// `unreserved / sub-delims / ":" / "@"`.
fn is_path_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '-' | '.' | '_' | '~' | '!' | '$' | '&' | '\'' | '(' | ')' | '*' | '+' | ',' | ';' | '='
                | ':' | '@'
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(validate_identity("  alice ").unwrap(), "alice");
    }

    #[test]
    fn rejects_empty_and_blank() {
        assert!(validate_identity("").is_err());
        assert!(validate_identity("   ").is_err());
    }

    #[test]
    fn rejects_path_breaking_characters() {
        for bad in ["a/b", "a?b", "a#b", "a%2F", "a b"] {
            assert!(validate_identity(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn rejects_characters_a_websocket_uri_cannot_carry() {
        for bad in ["a<b", "a>b", "a\\b", "a^b", "a`b", "a\"b", "a{b}", "a|b", "zoë", "..", "."] {
            let err = validate_identity(bad).unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "{bad}: {err}");
        }
    }

    #[test]
    fn accepts_unreserved_and_sub_delims() {
        for ok in ["alice", "bob_2", "c.d", "e-f~g", "h@i", "j+k", "l'm", "n:o", "..."] {
            assert_eq!(validate_identity(ok).unwrap(), ok);
        }
    }

    #[test]
    fn rejects_overlong() {
        let long = "x".repeat(MAX_IDENTITY_CHARS + 1);
        assert!(validate_identity(&long).is_err());
        let ok = "x".repeat(MAX_IDENTITY_CHARS);
        assert!(validate_identity(&ok).is_ok());
    }
}
