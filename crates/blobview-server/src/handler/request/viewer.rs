//! Viewer form request types.

use blobview_core::PageSize;
use serde::Deserialize;

use crate::service::{Navigation, SettingsUpdate};

/// Fields posted by the viewer form.
///
/// Every field is optional so a bare `action=next` works as well as a full
/// form submission. An unparsable page size leaves the stored one in place,
/// an out-of-range one is clamped.
#[must_use]
#[derive(Default, Deserialize)]
pub struct ViewerForm {
    pub container: Option<String>,
    pub account_url: Option<String>,
    pub sas_token: Option<String>,
    pub connection_string: Option<String>,
    pub prefix: Option<String>,
    pub page_size: Option<String>,
    /// Present when the checkbox is ticked.
    pub forget_credentials: Option<String>,
    #[serde(default)]
    pub action: Navigation,
}

impl ViewerForm {
    /// Splits the form into the settings change and the paging action.
    pub fn into_parts(self) -> (SettingsUpdate, Navigation) {
        let page_size = self
            .page_size
            .as_deref()
            .and_then(|value| value.trim().parse::<u32>().ok())
            .map(PageSize::saturating);

        let update = SettingsUpdate {
            container: self.container,
            account_url: self.account_url,
            sas_token: self.sas_token,
            connection_string: self.connection_string,
            prefix: self.prefix,
            page_size,
            forget_credentials: self.forget_credentials.is_some(),
        };

        (update, self.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_is_clamped_or_ignored() {
        let form = ViewerForm {
            page_size: Some("500".to_owned()),
            ..ViewerForm::default()
        };
        let (update, _) = form.into_parts();
        assert_eq!(update.page_size, Some(PageSize::saturating(PageSize::MAX)));

        let form = ViewerForm {
            page_size: Some("twelve".to_owned()),
            ..ViewerForm::default()
        };
        let (update, _) = form.into_parts();
        assert_eq!(update.page_size, None);
    }

    #[test]
    fn checkbox_presence_forgets_credentials() {
        let form = ViewerForm {
            forget_credentials: Some("true".to_owned()),
            action: Navigation::Next,
            ..ViewerForm::default()
        };
        let (update, action) = form.into_parts();

        assert!(update.forget_credentials);
        assert_eq!(action, Navigation::Next);
    }
}
