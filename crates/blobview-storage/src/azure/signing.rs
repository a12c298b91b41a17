//! Shared Key request signing.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::Url;

use crate::error::{StorageError, StorageResult};

type HmacSha256 = Hmac<Sha256>;

/// Builds the Shared Key string-to-sign for a bodiless request.
///
/// Standard headers are all empty for `GET`, so the twelve slots after the
/// verb are blank. `ms_headers` must contain every `x-ms-*` header sent.
pub(crate) fn string_to_sign(
    method: &str,
    ms_headers: &[(&str, &str)],
    account: &str,
    url: &Url,
) -> String {
    let mut headers: Vec<(String, &str)> = ms_headers
        .iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value.trim()))
        .collect();
    headers.sort_by(|a, b| a.0.cmp(&b.0));

    let mut out = String::from(method);
    out.push_str(&"\n".repeat(12));
    for (name, value) in &headers {
        out.push_str(name);
        out.push(':');
        out.push_str(value);
        out.push('\n');
    }
    out.push_str(&canonicalized_resource(account, url));
    out
}

/// `/{account}{path}` followed by one `\nkey:value` line per query
/// parameter, keys lower-cased and sorted, values decoded.
fn canonicalized_resource(account: &str, url: &Url) -> String {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.to_lowercase(), v.into_owned()))
        .collect();
    params.sort();

    let mut out = format!("/{account}{}", url.path());
    for (key, value) in params {
        out.push('\n');
        out.push_str(&key);
        out.push(':');
        out.push_str(&value);
    }
    out
}

/// Returns the `Authorization` header value for a string-to-sign.
pub(crate) fn authorization(account: &str, key: &[u8], string_to_sign: &str) -> StorageResult<String> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| StorageError::connection(format!("invalid account key: {e}")))?;
    mac.update(string_to_sign.as_bytes());
    let signature = BASE64_STANDARD.encode(mac.finalize().into_bytes());

    Ok(format!("SharedKey {account}:{signature}"))
}
