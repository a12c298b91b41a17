//! One render pass: settings and an action in, a page view out.

use std::sync::Arc;
use std::time::Duration;

use blobview_core::content_type_for;
use blobview_storage::{BlobStore, StorageError, StoreConnector};
use serde::Deserialize;

use crate::service::ContentCache;
use crate::service::session::ViewerSession;

/// Tracing target for render passes.
const TRACING_TARGET: &str = "blobview_server::service::render";

/// Paging action requested by the user.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Navigation {
    /// Re-render the current page, applying any settings change.
    #[default]
    #[serde(alias = "apply")]
    Stay,
    /// Go to the page after the current one.
    Next,
    /// Go back one page.
    Prev,
    /// Go back to the first page.
    Reset,
}

impl Navigation {
    /// Returns the action name as used in forms and logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stay => "stay",
            Self::Next => "next",
            Self::Prev => "prev",
            Self::Reset => "reset",
        }
    }
}

/// Message shown above the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Nothing to show yet, e.g. no container entered.
    Info(String),
    /// The settings do not describe a usable container.
    Config(String),
    /// The store could not be set up for the settings.
    Connection(String),
    /// The listing call failed; paging is unchanged.
    Listing(String),
}

impl Notice {
    /// Returns the notice text.
    pub fn message(&self) -> &str {
        match self {
            Self::Info(msg) | Self::Config(msg) | Self::Connection(msg) | Self::Listing(msg) => msg,
        }
    }

    /// Returns whether the notice reports a failure.
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::Info(_))
    }
}

/// One image on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    /// Blob name.
    pub name: String,
    /// MIME type derived from the extension.
    pub content_type: &'static str,
    /// Content size, when the download succeeded.
    pub size: Option<usize>,
    /// Download failure, shown next to this item only.
    pub error: Option<String>,
}

/// Result of a render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    /// 1-based page number after the action.
    pub page_number: usize,
    /// Whether Prev is enabled.
    pub can_prev: bool,
    /// Whether Next is enabled.
    pub can_next: bool,
    /// Notice shown above the grid.
    pub notice: Option<Notice>,
    /// Whether a listing succeeded in this pass.
    pub listed: bool,
    /// Images on the page, in listing order.
    pub items: Vec<ItemView>,
}

impl PageView {
    fn with_notice(session: &ViewerSession, notice: Notice) -> Self {
        Self {
            page_number: session.cursor.page_number(),
            can_prev: session.cursor.can_retreat(),
            can_next: session.cursor.can_advance(),
            notice: Some(notice),
            listed: false,
            items: Vec::new(),
        }
    }
}

/// Time a render pass may spend downloading the images of one page.
pub const DEFAULT_IMAGE_LOAD_BUDGET: Duration = Duration::from_secs(20);

/// Runs render passes against a store connector.
#[derive(Clone)]
pub struct Viewer {
    connector: Arc<dyn StoreConnector>,
    content_cache: ContentCache,
    image_load_budget: Duration,
}

impl Viewer {
    /// Creates a viewer.
    pub fn new(connector: Arc<dyn StoreConnector>, content_cache: ContentCache) -> Self {
        Self {
            connector,
            content_cache,
            image_load_budget: DEFAULT_IMAGE_LOAD_BUDGET,
        }
    }

    /// Bounds the time spent downloading the images of one page.
    ///
    /// Images still loading when the budget runs out are reported as failed
    /// items, so a pass never outlives listing time plus this budget.
    pub fn with_image_load_budget(mut self, budget: Duration) -> Self {
        self.image_load_budget = budget;
        self
    }

    /// Connects to the container described by the session settings.
    pub fn connect(&self, session: &ViewerSession) -> Result<Arc<dyn BlobStore>, StorageError> {
        self.connector.connect(&session.settings.container_config())
    }

    /// Returns the shared content cache.
    pub fn content_cache(&self) -> &ContentCache {
        &self.content_cache
    }

    /// Applies `action` to the session and renders the resulting page.
    ///
    /// The cursor only moves when the listing for the new position succeeds,
    /// except for [`Navigation::Reset`], which always takes effect. Changing
    /// any query-affecting setting restarts paging at page 1.
    pub async fn render(&self, session: &mut ViewerSession, action: Navigation) -> PageView {
        let signature = session.settings.signature();
        if session.signature != Some(signature) {
            if session.signature.is_some() {
                tracing::debug!(
                    target: TRACING_TARGET,
                    signature = ?signature,
                    "Query changed, paging reset"
                );
            }
            session.cursor.reset();
            session.signature = Some(signature);
        }

        if session.settings.container.trim().is_empty() {
            return PageView::with_notice(
                session,
                Notice::Info("Enter a container name to browse images.".to_owned()),
            );
        }

        let store = match self.connect(session) {
            Ok(store) => store,
            Err(err) if err.is_config() => {
                return PageView::with_notice(
                    session,
                    Notice::Config(format!("Configuration error: {err}")),
                );
            }
            Err(err) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %err,
                    "Failed to connect to container"
                );
                return PageView::with_notice(
                    session,
                    Notice::Connection(format!("Failed to connect to storage: {err}")),
                );
            }
        };

        let mut cursor = session.cursor.clone();
        match action {
            Navigation::Stay => {}
            Navigation::Next if cursor.can_advance() => {
                cursor.advance_fetched();
            }
            Navigation::Next => {}
            Navigation::Prev => cursor.retreat(),
            Navigation::Reset => {
                cursor.reset();
                session.cursor.reset();
            }
        }

        let settings = &session.settings;
        let prefix = (!settings.prefix.is_empty()).then_some(settings.prefix.as_str());
        let page = match store
            .list_page(prefix, cursor.current_token(), settings.page_size)
            .await
        {
            Ok(page) => page,
            Err(err) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    container = %store.identity(),
                    action = action.as_str(),
                    error = %err,
                    "Listing failed, paging unchanged"
                );
                return PageView::with_notice(
                    session,
                    Notice::Listing(format!("Failed to list blobs: {err}")),
                );
            }
        };

        cursor.on_page_fetched(page.next.clone());
        session.cursor = cursor;

        let deadline = tokio::time::Instant::now() + self.image_load_budget;
        let mut items = Vec::with_capacity(page.items.len());
        for name in page.items {
            let fetch = self.content_cache.get_or_fetch(store.as_ref(), &name);
            let loaded = match tokio::time::timeout_at(deadline, fetch).await {
                Ok(result) => result.map_err(|err| err.to_string()),
                Err(_) => Err(format!(
                    "not loaded within the {}s page budget",
                    self.image_load_budget.as_secs_f32()
                )),
            };

            let item = match loaded {
                Ok(content) => ItemView {
                    content_type: content_type_for(&name),
                    size: Some(content.len()),
                    error: None,
                    name,
                },
                Err(error) => {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        container = %store.identity(),
                        blob = %name,
                        error = %error,
                        "Failed to load image"
                    );
                    ItemView {
                        content_type: content_type_for(&name),
                        size: None,
                        error: Some(error),
                        name,
                    }
                }
            };
            items.push(item);
        }

        tracing::debug!(
            target: TRACING_TARGET,
            container = %store.identity(),
            action = action.as_str(),
            page = session.cursor.page_number(),
            items = items.len(),
            has_next = session.cursor.can_advance(),
            "Rendered page"
        );

        PageView {
            page_number: session.cursor.page_number(),
            can_prev: session.cursor.can_retreat(),
            can_next: session.cursor.can_advance(),
            notice: None,
            listed: true,
            items,
        }
    }
}
