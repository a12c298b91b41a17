//! Query signatures for stale-paging detection.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::page::PageSize;

/// Every input that affects which blobs a listing returns.
///
/// Tokens issued under one set of inputs are not valid under another, so a
/// change in any of these fields must reset paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryInputs<'a> {
    /// Container name.
    pub container: &'a str,
    /// Storage account URL, empty when not configured.
    pub account_url: &'a str,
    /// Whether a SAS token is configured.
    pub has_sas_token: bool,
    /// Whether a connection string is configured.
    pub has_connection_string: bool,
    /// Blob name prefix filter, empty for none.
    pub prefix: &'a str,
    /// Requested page size.
    pub page_size: PageSize,
}

/// Fingerprint of [`QueryInputs`].
///
/// Fields are hashed with length prefixes, so inputs such as `("ab", "c")`
/// and `("a", "bc")` never produce the same signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuerySignature([u8; 32]);

impl QuerySignature {
    /// Computes the signature of the given inputs.
    pub fn new(inputs: &QueryInputs<'_>) -> Self {
        let mut hasher = Sha256::new();

        for field in [inputs.container, inputs.account_url, inputs.prefix] {
            hasher.update((field.len() as u64).to_be_bytes());
            hasher.update(field.as_bytes());
        }

        hasher.update([
            u8::from(inputs.has_sas_token),
            u8::from(inputs.has_connection_string),
        ]);
        hasher.update(inputs.page_size.get().to_be_bytes());

        Self(hasher.finalize().into())
    }

    /// Returns the signature as a lower-case hex string.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<&QueryInputs<'_>> for QuerySignature {
    fn from(inputs: &QueryInputs<'_>) -> Self {
        Self::new(inputs)
    }
}

impl fmt::Debug for QuerySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuerySignature({})", &self.to_hex()[..12])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> QueryInputs<'static> {
        QueryInputs {
            container: "photos",
            account_url: "https://acct.blob.core.windows.net",
            has_sas_token: true,
            has_connection_string: false,
            prefix: "",
            page_size: PageSize::DEFAULT,
        }
    }

    #[test]
    fn equal_inputs_equal_signatures() {
        assert_eq!(QuerySignature::new(&inputs()), QuerySignature::new(&inputs()));
    }

    #[test]
    fn any_field_change_changes_signature() {
        let base = QuerySignature::new(&inputs());
        let variants = [
            QueryInputs {
                container: "other",
                ..inputs()
            },
            QueryInputs {
                account_url: "https://other.blob.core.windows.net",
                ..inputs()
            },
            QueryInputs {
                has_sas_token: false,
                ..inputs()
            },
            QueryInputs {
                has_connection_string: true,
                ..inputs()
            },
            QueryInputs {
                prefix: "2024/",
                ..inputs()
            },
            QueryInputs {
                page_size: PageSize::saturating(24),
                ..inputs()
            },
        ];

        for variant in variants {
            assert_ne!(base, QuerySignature::new(&variant), "{variant:?}");
        }
    }

    #[test]
    fn field_boundaries_are_unambiguous() {
        let left = QueryInputs {
            container: "ab",
            account_url: "c",
            ..inputs()
        };
        let right = QueryInputs {
            container: "a",
            account_url: "bc",
            ..inputs()
        };
        assert_ne!(QuerySignature::new(&left), QuerySignature::new(&right));
    }
}
