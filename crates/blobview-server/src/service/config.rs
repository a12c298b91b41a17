use std::fmt;
use std::time::Duration;

use blobview_core::PageSize;
use blobview_storage::StorageClientConfig;
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::service::{Error, Result, ViewerSettings};

/// Default values for configuration options.
mod defaults {
    /// Default page size.
    pub const PAGE_SIZE: u32 = 12;

    /// Default storage request timeout in seconds.
    pub const STORAGE_TIMEOUT_SECS: u64 = 15;

    /// Default time budget in seconds for loading the images of one page.
    pub const IMAGE_LOAD_TIMEOUT_SECS: u64 = 20;

    /// Default idle session lifetime in seconds.
    pub const SESSION_TTL_SECS: u64 = 3600;

    /// Default content cache capacity in bytes.
    pub const CONTENT_CACHE_BYTES: usize = 64 * 1024 * 1024;
}

/// App [`state`] configuration.
///
/// The `AZURE_*` values seed the settings form of every new session. Users
/// may override them per session; the server never writes them back.
///
/// [`state`]: crate::service::ServiceState
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ServiceConfig {
    /// Default container name.
    #[cfg_attr(feature = "config", arg(long, env = "AZURE_CONTAINER"))]
    pub azure_container: Option<String>,

    /// Default storage account URL, e.g. `https://<account>.blob.core.windows.net`.
    #[cfg_attr(feature = "config", arg(long, env = "AZURE_ACCOUNT_URL"))]
    pub azure_account_url: Option<String>,

    /// Default SAS token used together with the account URL.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "AZURE_SAS_TOKEN", hide_env_values = true)
    )]
    #[serde(skip_serializing)]
    pub azure_sas_token: Option<String>,

    /// Default storage connection string. Takes precedence over the account URL.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "AZURE_CONNECTION_STRING", hide_env_values = true)
    )]
    #[serde(skip_serializing)]
    pub azure_connection_string: Option<String>,

    /// Default number of blobs listed per page (3 to 60).
    #[cfg_attr(
        feature = "config",
        arg(long, env = "DEFAULT_PAGE_SIZE", default_value_t = defaults::PAGE_SIZE)
    )]
    pub default_page_size: u32,

    /// Timeout in seconds for a single storage request.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "STORAGE_TIMEOUT", default_value_t = defaults::STORAGE_TIMEOUT_SECS)
    )]
    pub storage_timeout: u64,

    /// Seconds a render pass may spend downloading the images of one page.
    ///
    /// Images not loaded in time are shown as failed items.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "IMAGE_LOAD_TIMEOUT", default_value_t = defaults::IMAGE_LOAD_TIMEOUT_SECS)
    )]
    pub image_load_timeout: u64,

    /// Seconds of inactivity after which a viewer session is discarded.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "SESSION_TTL", default_value_t = defaults::SESSION_TTL_SECS)
    )]
    pub session_ttl: u64,

    /// Upper bound in bytes for cached image content shared by all sessions.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CONTENT_CACHE_BYTES", default_value_t = defaults::CONTENT_CACHE_BYTES)
    )]
    pub content_cache_bytes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            azure_container: None,
            azure_account_url: None,
            azure_sas_token: None,
            azure_connection_string: None,
            default_page_size: defaults::PAGE_SIZE,
            storage_timeout: defaults::STORAGE_TIMEOUT_SECS,
            image_load_timeout: defaults::IMAGE_LOAD_TIMEOUT_SECS,
            session_ttl: defaults::SESSION_TTL_SECS,
            content_cache_bytes: defaults::CONTENT_CACHE_BYTES,
        }
    }
}

impl ServiceConfig {
    /// Validates all configuration values and returns errors for invalid settings.
    ///
    /// # Errors
    ///
    /// - the default page size must be within the allowed range
    /// - timeouts and the session lifetime must be positive
    /// - the account URL, when given, must be an http(s) URL
    pub fn validate(&self) -> Result<()> {
        PageSize::new(self.default_page_size).map_err(|e| {
            Error::config(format!("Invalid default page size: {e}")).with_source(e)
        })?;

        if self.storage_timeout == 0 {
            return Err(Error::config("Storage timeout must be greater than 0"));
        }

        if self.image_load_timeout == 0 {
            return Err(Error::config("Image load timeout must be greater than 0"));
        }

        if self.session_ttl == 0 {
            return Err(Error::config("Session lifetime must be greater than 0"));
        }

        if let Some(account_url) = self.azure_account_url.as_deref().filter(|u| !u.is_empty()) {
            let parsed = url::Url::parse(account_url).map_err(|e| {
                Error::config(format!("Invalid Azure account URL '{account_url}'")).with_source(e)
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(Error::config(
                    "Azure account URL must start with 'http://' or 'https://'",
                ));
            }
        }

        Ok(())
    }

    /// Returns the settings every new session starts from.
    pub fn default_settings(&self) -> ViewerSettings {
        ViewerSettings {
            container: self.azure_container.clone().unwrap_or_default(),
            account_url: self.azure_account_url.clone().unwrap_or_default(),
            sas_token: self.azure_sas_token.clone().unwrap_or_default(),
            connection_string: self.azure_connection_string.clone().unwrap_or_default(),
            prefix: String::new(),
            page_size: PageSize::saturating(self.default_page_size),
        }
    }

    /// Returns the storage HTTP client configuration.
    pub fn storage_client_config(&self) -> StorageClientConfig {
        StorageClientConfig::default()
            .with_request_timeout(Duration::from_secs(self.storage_timeout))
    }

    /// Returns the time budget for loading the images of one page.
    pub fn image_load_budget(&self) -> Duration {
        Duration::from_secs(self.image_load_timeout)
    }

    /// Returns the longest a render pass can take: one listing request
    /// followed by the image load budget.
    pub fn render_pass_limit(&self) -> Duration {
        Duration::from_secs(self.storage_timeout.saturating_add(self.image_load_timeout))
    }

    /// Returns the idle session lifetime.
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl)
    }

    /// Returns whether a default container and credentials are configured.
    pub fn has_default_container(&self) -> bool {
        self.azure_container.as_deref().is_some_and(|c| !c.is_empty())
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("azure_container", &self.azure_container)
            .field("azure_account_url", &self.azure_account_url)
            .field("has_sas_token", &self.azure_sas_token.is_some())
            .field("has_connection_string", &self.azure_connection_string.is_some())
            .field("default_page_size", &self.default_page_size)
            .field("storage_timeout", &self.storage_timeout)
            .field("image_load_timeout", &self.image_load_timeout)
            .field("session_ttl", &self.session_ttl)
            .field("content_cache_bytes", &self.content_cache_bytes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn default_config_is_valid() {
        assert!(ServiceConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_page_size() {
        let config = ServiceConfig {
            default_page_size: 100,
            ..ServiceConfig::default()
        };

        let err = config.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn rejects_zero_timeouts() {
        let config = ServiceConfig {
            storage_timeout: 0,
            ..ServiceConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ServiceConfig {
            session_ttl: 0,
            ..ServiceConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ServiceConfig {
            image_load_timeout: 0,
            ..ServiceConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn render_pass_limit_adds_listing_and_image_budget() {
        let config = ServiceConfig {
            storage_timeout: 10,
            image_load_timeout: 25,
            ..ServiceConfig::default()
        };
        assert_eq!(config.render_pass_limit(), Duration::from_secs(35));
        assert_eq!(config.image_load_budget(), Duration::from_secs(25));
    }

    #[test]
    fn rejects_non_http_account_url() {
        let config = ServiceConfig {
            azure_account_url: Some("ftp://acct.example.com".to_owned()),
            ..ServiceConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn default_settings_follow_environment() {
        let config = ServiceConfig {
            azure_container: Some("photos".to_owned()),
            azure_sas_token: Some("sv=1&sig=abc".to_owned()),
            default_page_size: 24,
            ..ServiceConfig::default()
        };
        let settings = config.default_settings();

        assert_eq!(settings.container, "photos");
        assert_eq!(settings.sas_token, "sv=1&sig=abc");
        assert_eq!(settings.page_size.get(), 24);
        assert!(settings.prefix.is_empty());
        assert!(config.has_default_container());
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = ServiceConfig {
            azure_connection_string: Some("AccountKey=c2VjcmV0".to_owned()),
            ..ServiceConfig::default()
        };
        assert!(!format!("{config:?}").contains("c2VjcmV0"));
    }
}
