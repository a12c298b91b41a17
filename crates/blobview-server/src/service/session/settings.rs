//! Per-session viewer settings.

use std::fmt;

use blobview_core::{PageSize, QueryInputs, QuerySignature};
use blobview_storage::ContainerConfig;

/// Everything the settings form edits.
///
/// Empty strings mean "not set". Secrets are kept here only; they are never
/// rendered back into a page or written to logs.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ViewerSettings {
    /// Container name.
    pub container: String,
    /// Storage account URL.
    pub account_url: String,
    /// SAS token.
    pub sas_token: String,
    /// Storage connection string.
    pub connection_string: String,
    /// Blob name prefix filter.
    pub prefix: String,
    /// Blobs listed per page.
    pub page_size: PageSize,
}

impl ViewerSettings {
    /// Returns the storage configuration for these settings.
    pub fn container_config(&self) -> ContainerConfig {
        ContainerConfig {
            container: self.container.clone(),
            account_url: non_empty(&self.account_url),
            sas_token: non_empty(&self.sas_token),
            connection_string: non_empty(&self.connection_string),
        }
    }

    /// Returns the query-affecting fields.
    pub fn query_inputs(&self) -> QueryInputs<'_> {
        QueryInputs {
            container: &self.container,
            account_url: &self.account_url,
            has_sas_token: self.has_sas_token(),
            has_connection_string: self.has_connection_string(),
            prefix: &self.prefix,
            page_size: self.page_size,
        }
    }

    /// Returns the fingerprint of the query-affecting fields.
    pub fn signature(&self) -> QuerySignature {
        QuerySignature::new(&self.query_inputs())
    }

    /// Returns whether a SAS token is stored.
    pub fn has_sas_token(&self) -> bool {
        !self.sas_token.is_empty()
    }

    /// Returns whether a connection string is stored.
    pub fn has_connection_string(&self) -> bool {
        !self.connection_string.is_empty()
    }

    /// Applies a submitted form.
    ///
    /// Plain fields are replaced when present. A secret field is replaced
    /// only when a non-empty value is submitted, since the form never shows
    /// the stored one; `forget_credentials` clears both secrets.
    pub fn apply(&mut self, update: SettingsUpdate) {
        if let Some(container) = update.container {
            self.container = container.trim().to_owned();
        }
        if let Some(account_url) = update.account_url {
            self.account_url = account_url.trim().to_owned();
        }
        if let Some(prefix) = update.prefix {
            self.prefix = prefix;
        }
        if let Some(page_size) = update.page_size {
            self.page_size = page_size;
        }

        if let Some(sas_token) = update.sas_token.filter(|s| !s.trim().is_empty()) {
            self.sas_token = sas_token.trim().to_owned();
        }
        if let Some(conn) = update.connection_string.filter(|s| !s.trim().is_empty()) {
            self.connection_string = conn.trim().to_owned();
        }

        if update.forget_credentials {
            self.sas_token.clear();
            self.connection_string.clear();
        }
    }
}

impl fmt::Debug for ViewerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewerSettings")
            .field("container", &self.container)
            .field("account_url", &self.account_url)
            .field("has_sas_token", &self.has_sas_token())
            .field("has_connection_string", &self.has_connection_string())
            .field("prefix", &self.prefix)
            .field("page_size", &self.page_size)
            .finish()
    }
}

/// Changes submitted through the settings form. `None` leaves a field as is.
#[derive(Default, Clone, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub container: Option<String>,
    pub account_url: Option<String>,
    pub sas_token: Option<String>,
    pub connection_string: Option<String>,
    pub prefix: Option<String>,
    pub page_size: Option<PageSize>,
    pub forget_credentials: bool,
}

impl fmt::Debug for SettingsUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsUpdate")
            .field("container", &self.container)
            .field("account_url", &self.account_url)
            .field("prefix", &self.prefix)
            .field("page_size", &self.page_size)
            .field("forget_credentials", &self.forget_credentials)
            .finish_non_exhaustive()
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ViewerSettings {
        ViewerSettings {
            container: "photos".to_owned(),
            account_url: "https://acct.blob.core.windows.net".to_owned(),
            sas_token: "sv=1&sig=abc".to_owned(),
            ..ViewerSettings::default()
        }
    }

    #[test]
    fn blank_secret_keeps_stored_value() {
        let mut settings = settings();
        settings.apply(SettingsUpdate {
            container: Some(" photos ".to_owned()),
            sas_token: Some(String::new()),
            ..SettingsUpdate::default()
        });

        assert_eq!(settings.container, "photos");
        assert_eq!(settings.sas_token, "sv=1&sig=abc");
    }

    #[test]
    fn forget_credentials_clears_secrets() {
        let mut settings = settings();
        settings.apply(SettingsUpdate {
            connection_string: Some("UseDevelopmentStorage=true".to_owned()),
            forget_credentials: true,
            ..SettingsUpdate::default()
        });

        assert!(!settings.has_sas_token());
        assert!(!settings.has_connection_string());
        assert_eq!(settings.account_url, "https://acct.blob.core.windows.net");
    }

    #[test]
    fn signature_tracks_query_fields() {
        let base = settings();

        let mut prefixed = base.clone();
        prefixed.apply(SettingsUpdate {
            prefix: Some("cats/".to_owned()),
            ..SettingsUpdate::default()
        });
        assert_ne!(base.signature(), prefixed.signature());

        let mut resized = base.clone();
        resized.apply(SettingsUpdate {
            page_size: Some(PageSize::saturating(30)),
            ..SettingsUpdate::default()
        });
        assert_ne!(base.signature(), resized.signature());

        let mut same = base.clone();
        same.apply(SettingsUpdate::default());
        assert_eq!(base.signature(), same.signature());
    }

    #[test]
    fn container_config_drops_empty_fields() {
        let config = ViewerSettings {
            container: "photos".to_owned(),
            ..ViewerSettings::default()
        }
        .container_config();

        assert_eq!(config.account_url, None);
        assert_eq!(config.sas_token, None);
    }

    #[test]
    fn debug_hides_secrets() {
        assert!(!format!("{:?}", settings()).contains("sig=abc"));
    }
}
