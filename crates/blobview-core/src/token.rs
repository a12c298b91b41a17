//! Opaque continuation tokens.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque cursor issued by a paged listing API.
///
/// A token marks the position to resume listing from. It can only be used to
/// fetch the page that follows it; nothing about the previous page can be
/// derived from it. The value is never parsed, ordered or synthesized
/// locally, so the type deliberately implements neither `Ord` nor
/// `Display`. The absence of a token (`Option::None`) means "start of
/// sequence" when requesting and "no further pages" when returned.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    /// Wraps a token value received from the storage service.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Wraps a token value, treating an empty string as "no token".
    pub fn from_wire(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        (!value.is_empty()).then_some(Self(value))
    }

    /// Returns the raw value to send back to the storage service.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContinuationToken")
            .field(&format_args!("<{} bytes>", self.0.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_wire_value_is_no_token() {
        assert_eq!(ContinuationToken::from_wire(""), None);
        assert_eq!(
            ContinuationToken::from_wire("2!88!MDAw"),
            Some(ContinuationToken::new("2!88!MDAw"))
        );
    }

    #[test]
    fn debug_does_not_leak_value() {
        let token = ContinuationToken::new("secret-marker");
        let debug = format!("{token:?}");
        assert!(!debug.contains("secret-marker"));
        assert!(debug.contains("13 bytes"));
    }

    #[test]
    fn serializes_as_plain_string() {
        let token = ContinuationToken::new("abc");
        assert_eq!(serde_json::to_string(&token).unwrap(), "\"abc\"");
    }
}
