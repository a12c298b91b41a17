//! Authentication mode resolution.
//!
//! A [`ContainerConfig`] may carry several credentials at once. Exactly one
//! of them is used, in this order:
//!
//! 1. the connection string,
//! 2. the account URL together with a SAS token,
//! 3. the account URL alone, for containers with public read access.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use sha2::{Digest, Sha256};
use url::Url;

use crate::config::ContainerConfig;
use crate::error::{StorageError, StorageResult};

/// Account name used by the local storage emulator.
const DEV_ACCOUNT_NAME: &str = "devstoreaccount1";
/// Well-known account key of the local storage emulator.
const DEV_ACCOUNT_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";
/// Blob endpoint of the local storage emulator.
const DEV_BLOB_ENDPOINT: &str = "http://127.0.0.1:10000/devstoreaccount1";

const DEFAULT_PROTOCOL: &str = "https";
const DEFAULT_ENDPOINT_SUFFIX: &str = "core.windows.net";

/// Parsed `Key=Value;` storage connection string.
///
/// Keys are matched case-insensitively and unknown keys are ignored.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConnectionString {
    /// `AccountName`.
    pub account_name: Option<String>,
    /// `AccountKey`, still base64 encoded.
    pub account_key: Option<String>,
    /// `BlobEndpoint`.
    pub blob_endpoint: Option<String>,
    /// `DefaultEndpointsProtocol`.
    pub protocol: Option<String>,
    /// `EndpointSuffix`.
    pub endpoint_suffix: Option<String>,
    /// `SharedAccessSignature`.
    pub shared_access_signature: Option<String>,
    /// `UseDevelopmentStorage=true`.
    pub use_development_storage: bool,
}

impl ConnectionString {
    /// Parses a connection string.
    pub fn parse(input: &str) -> StorageResult<Self> {
        let mut parsed = Self::default();

        for segment in input.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            let Some((key, value)) = segment.split_once('=') else {
                return Err(StorageError::connection(format!(
                    "connection string segment '{}' must have the form Key=Value",
                    redact_segment(segment)
                )));
            };

            let value = value.trim();
            let slot = match key.trim().to_ascii_lowercase().as_str() {
                "accountname" => &mut parsed.account_name,
                "accountkey" => &mut parsed.account_key,
                "blobendpoint" => &mut parsed.blob_endpoint,
                "defaultendpointsprotocol" => &mut parsed.protocol,
                "endpointsuffix" => &mut parsed.endpoint_suffix,
                "sharedaccesssignature" => &mut parsed.shared_access_signature,
                "usedevelopmentstorage" => {
                    parsed.use_development_storage = value.eq_ignore_ascii_case("true");
                    continue;
                }
                _ => continue,
            };

            if !value.is_empty() {
                *slot = Some(value.to_owned());
            }
        }

        Ok(parsed)
    }

    /// Returns the blob service endpoint described by this connection string.
    fn blob_endpoint(&self) -> StorageResult<String> {
        if let Some(endpoint) = &self.blob_endpoint {
            return Ok(endpoint.clone());
        }

        if self.use_development_storage {
            return Ok(DEV_BLOB_ENDPOINT.to_owned());
        }

        let account = self.account_name.as_deref().ok_or_else(|| {
            StorageError::connection("connection string needs AccountName or BlobEndpoint")
        })?;
        let protocol = self.protocol.as_deref().unwrap_or(DEFAULT_PROTOCOL);
        let suffix = self
            .endpoint_suffix
            .as_deref()
            .unwrap_or(DEFAULT_ENDPOINT_SUFFIX);

        Ok(format!("{protocol}://{account}.blob.{suffix}"))
    }

    fn auth_mode(&self) -> StorageResult<AuthMode> {
        let (account, key) = match (&self.account_name, &self.account_key) {
            (Some(account), Some(key)) => (account.as_str(), key.as_str()),
            _ if self.use_development_storage => (DEV_ACCOUNT_NAME, DEV_ACCOUNT_KEY),
            _ => {
                return Ok(match &self.shared_access_signature {
                    Some(token) => AuthMode::sas(token),
                    None => AuthMode::Anonymous,
                });
            }
        };

        let key = BASE64_STANDARD
            .decode(key)
            .map_err(|e| StorageError::connection(format!("account key is not valid base64: {e}")))?;

        Ok(AuthMode::SharedKey {
            account: account.to_owned(),
            key,
        })
    }
}

impl fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionString")
            .field("account_name", &self.account_name)
            .field("has_account_key", &self.account_key.is_some())
            .field("blob_endpoint", &self.blob_endpoint)
            .field("protocol", &self.protocol)
            .field("endpoint_suffix", &self.endpoint_suffix)
            .field("has_sas", &self.shared_access_signature.is_some())
            .field("use_development_storage", &self.use_development_storage)
            .finish()
    }
}

/// How requests to the storage service are authorized.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// Requests are signed with the decoded account key.
    SharedKey {
        /// Storage account name.
        account: String,
        /// Decoded account key.
        key: Vec<u8>,
    },
    /// A SAS query string is appended to every request.
    Sas {
        /// SAS query string without the leading `?`.
        token: String,
    },
    /// No authorization, for containers with public read access.
    Anonymous,
}

impl AuthMode {
    fn sas(token: &str) -> Self {
        Self::Sas {
            token: token.trim().trim_start_matches('?').to_owned(),
        }
    }

    /// Returns a short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SharedKey { .. } => "shared_key",
            Self::Sas { .. } => "sas",
            Self::Anonymous => "anonymous",
        }
    }

    /// Returns a hex SHA-256 digest identifying these credentials.
    ///
    /// Two modes share a fingerprint only when they authorize requests the
    /// same way. The secret itself cannot be recovered from it.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.name().as_bytes());

        let mut field = |bytes: &[u8]| {
            hasher.update((bytes.len() as u64).to_be_bytes());
            hasher.update(bytes);
        };
        match self {
            Self::SharedKey { account, key } => {
                field(account.as_bytes());
                field(key.as_slice());
            }
            Self::Sas { token } => field(token.as_bytes()),
            Self::Anonymous => {}
        }

        hex::encode(hasher.finalize())
    }
}

impl fmt::Debug for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SharedKey { account, .. } => f
                .debug_struct("SharedKey")
                .field("account", account)
                .finish_non_exhaustive(),
            Self::Sas { .. } => f.debug_struct("Sas").finish_non_exhaustive(),
            Self::Anonymous => f.write_str("Anonymous"),
        }
    }
}

/// Endpoint, container and credentials resolved from a [`ContainerConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAccess {
    /// Blob service endpoint without query or trailing slash.
    pub endpoint: Url,
    /// Container name.
    pub container: String,
    /// Selected authentication mode.
    pub auth: AuthMode,
}

impl ResolvedAccess {
    /// Picks the authentication mode for `config`.
    ///
    /// Returns a configuration error when the container name is empty or no
    /// usable credential is present, and a connection error when any part
    /// of the connection settings is malformed.
    pub fn resolve(config: &ContainerConfig) -> StorageResult<Self> {
        let container = config.container.trim();
        if container.is_empty() {
            return Err(StorageError::config("container name is required"));
        }

        let (endpoint, auth) = if let Some(conn) = config.connection_string() {
            let conn = ConnectionString::parse(conn)?;
            (conn.blob_endpoint()?, conn.auth_mode()?)
        } else if let Some(account_url) = config.account_url() {
            let auth = match config.sas_token() {
                Some(token) => AuthMode::sas(token),
                None => AuthMode::Anonymous,
            };
            (account_url.to_owned(), auth)
        } else {
            return Err(StorageError::config("no valid authentication method provided"));
        };

        Ok(Self {
            endpoint: parse_endpoint(&endpoint)?,
            container: container.to_owned(),
            auth,
        })
    }

    /// Returns the container identity: endpoint and container name.
    pub fn identity(&self) -> String {
        format!(
            "{}/{}",
            self.endpoint.as_str().trim_end_matches('/'),
            self.container
        )
    }
}

/// Keeps at most the first few characters of a malformed segment so a
/// pasted secret does not end up in logs.
fn redact_segment(segment: &str) -> String {
    let shown: String = segment.chars().take(12).collect();
    if shown.len() < segment.len() {
        format!("{shown}...")
    } else {
        shown
    }
}

fn parse_endpoint(raw: &str) -> StorageResult<Url> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| StorageError::connection(format!("invalid account URL '{raw}': {e}")))?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(StorageError::connection(format!(
            "account URL '{raw}' must be an http(s) URL"
        )));
    }

    url.set_query(None);
    url.set_fragment(None);
    let path = url.path().trim_end_matches('/').to_owned();
    url.set_path(&path);

    Ok(url)
}
