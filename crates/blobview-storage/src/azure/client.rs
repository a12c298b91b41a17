//! Azure container handle.

use async_trait::async_trait;
use blobview_core::{ContinuationToken, ListPage, PageSize, is_image_name};
use bytes::Bytes;
use jiff::Timestamp;
use jiff::fmt::rfc2822::DateTimePrinter;
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use url::Url;

use super::AZURE_API_VERSION;
use super::listing::{error_code, parse_list_blobs};
use super::signing::{authorization, string_to_sign};
use crate::TRACING_TARGET;
use crate::auth::{AuthMode, ResolvedAccess};
use crate::error::{StorageError, StorageResult};
use crate::store::BlobStore;

/// Longest response body excerpt kept in an error message.
const MAX_ERROR_EXCERPT: usize = 200;

/// One Azure Blob Storage container.
///
/// Cloning is cheap; the HTTP client is reference counted.
#[derive(Debug, Clone)]
pub struct AzureContainer {
    client: reqwest::Client,
    access: ResolvedAccess,
    identity: String,
    credential: String,
}

impl AzureContainer {
    /// Creates a handle for the resolved container. No request is sent.
    pub fn new(client: reqwest::Client, access: ResolvedAccess) -> Self {
        let identity = access.identity();
        let credential = access.auth.fingerprint();
        Self {
            client,
            access,
            identity,
            credential,
        }
    }

    /// Returns the URL of the container, or of one blob in it.
    fn resource_url(&self, blob: Option<&str>) -> StorageResult<Url> {
        let mut url = self.access.endpoint.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                StorageError::connection(format!(
                    "account URL '{}' cannot hold a path",
                    self.access.endpoint
                ))
            })?;
            segments.pop_if_empty().push(&self.access.container);
            if let Some(blob) = blob {
                segments.extend(blob.split('/'));
            }
        }
        Ok(url)
    }

    /// Sends an authorized `GET` and maps non-success statuses to errors.
    async fn get(&self, mut url: Url, resource: &str) -> StorageResult<reqwest::Response> {
        let date = DateTimePrinter::new()
            .timestamp_to_rfc9110_string(&Timestamp::now())
            .map_err(|e| StorageError::connection(format!("failed to format request date: {e}")))?;

        let mut authorization_header = None;
        match &self.access.auth {
            AuthMode::SharedKey { account, key } => {
                let sts = string_to_sign(
                    "GET",
                    &[("x-ms-date", date.as_str()), ("x-ms-version", AZURE_API_VERSION)],
                    account,
                    &url,
                );
                authorization_header = Some(authorization(account, key, &sts)?);
            }
            AuthMode::Sas { token } => {
                let query = match url.query() {
                    Some(query) if !query.is_empty() => format!("{query}&{token}"),
                    _ => token.clone(),
                };
                url.set_query(Some(&query));
            }
            AuthMode::Anonymous => {}
        }

        let mut request = self
            .client
            .get(url)
            .header("x-ms-date", &date)
            .header("x-ms-version", AZURE_API_VERSION);
        if let Some(value) = authorization_header {
            request = request.header(AUTHORIZATION, value);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let header_code = response
            .headers()
            .get("x-ms-error-code")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response.text().await.unwrap_or_default();
        let code = header_code.or_else(|| error_code(&body));

        tracing::warn!(
            target: TRACING_TARGET,
            container = %self.identity,
            resource = %resource,
            status = status.as_u16(),
            code = code.as_deref().unwrap_or(""),
            "Storage request failed"
        );

        Err(status_error(status, code, &body, resource))
    }
}

fn status_error(status: StatusCode, code: Option<String>, body: &str, resource: &str) -> StorageError {
    let detail = code.clone().unwrap_or_else(|| status.to_string());
    match status {
        StatusCode::NOT_FOUND => StorageError::not_found(format!("{resource} ({detail})")),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            StorageError::permission_denied(format!("{resource} ({detail})"))
        }
        _ => StorageError::Http {
            status: status.as_u16(),
            message: code.unwrap_or_else(|| excerpt(body)),
        },
    }
}

fn excerpt(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_EXCERPT) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_owned(),
    }
}

#[async_trait]
impl BlobStore for AzureContainer {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn credential(&self) -> &str {
        &self.credential
    }

    async fn list_page(
        &self,
        prefix: Option<&str>,
        token: Option<&ContinuationToken>,
        page_size: PageSize,
    ) -> StorageResult<ListPage> {
        let mut url = self.resource_url(None)?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("restype", "container")
                .append_pair("comp", "list")
                .append_pair("maxresults", &page_size.get().to_string());
            if let Some(prefix) = prefix.filter(|p| !p.is_empty()) {
                query.append_pair("prefix", prefix);
            }
            if let Some(token) = token {
                query.append_pair("marker", token.as_str());
            }
        }

        tracing::debug!(
            target: TRACING_TARGET,
            container = %self.identity,
            prefix = prefix.unwrap_or(""),
            has_marker = token.is_some(),
            page_size = page_size.get(),
            "Listing blobs"
        );

        let body = self.get(url, &self.access.container).await?.text().await?;
        let listing = parse_list_blobs(&body)?;
        let scanned = listing.names.len();
        let items: Vec<String> = listing
            .names
            .into_iter()
            .filter(|name| is_image_name(name))
            .collect();
        let next = listing.next_marker.and_then(ContinuationToken::from_wire);

        tracing::debug!(
            target: TRACING_TARGET,
            container = %self.identity,
            scanned,
            images = items.len(),
            has_next = next.is_some(),
            "Listed blobs"
        );

        Ok(ListPage::new(items, next))
    }

    async fn read(&self, name: &str) -> StorageResult<Bytes> {
        let url = self.resource_url(Some(name))?;
        let bytes = self.get(url, name).await?.bytes().await?;

        tracing::debug!(
            target: TRACING_TARGET,
            container = %self.identity,
            blob = %name,
            size = bytes.len(),
            "Read blob"
        );

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use wiremock::matchers::{header_exists, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::ContainerConfig;

    const LISTING: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<EnumerationResults ContainerName="photos">
  <Blobs>
    <Blob><Name>a.png</Name></Blob>
    <Blob><Name>notes.txt</Name></Blob>
    <Blob><Name>b.JPG</Name></Blob>
  </Blobs>
  <NextMarker>marker-2</NextMarker>
</EnumerationResults>"#;

    fn container(config: ContainerConfig) -> AzureContainer {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        AzureContainer::new(client, ResolvedAccess::resolve(&config).unwrap())
    }

    #[tokio::test]
    async fn anonymous_listing_filters_images() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/photos"))
            .and(query_param("restype", "container"))
            .and(query_param("comp", "list"))
            .and(query_param("maxresults", "3"))
            .and(query_param("prefix", "cats/"))
            .and(query_param_is_missing("marker"))
            .and(header_exists("x-ms-version"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LISTING))
            .expect(1)
            .mount(&server)
            .await;

        let store = container(ContainerConfig::new("photos").with_account_url(server.uri()));
        let page = store
            .list_page(Some("cats/"), None, PageSize::new(3).unwrap())
            .await
            .unwrap();

        assert_eq!(page.items, vec!["a.png", "b.JPG"]);
        assert_eq!(page.next, Some(ContinuationToken::new("marker-2")));
    }

    #[tokio::test]
    async fn marker_and_sas_are_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/photos"))
            .and(query_param("marker", "marker-2"))
            .and(query_param("sig", "abc"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<EnumerationResults><Blobs></Blobs><NextMarker/></EnumerationResults>",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let store = container(
            ContainerConfig::new("photos")
                .with_account_url(server.uri())
                .with_sas_token("?sv=2024&sig=abc"),
        );
        let token = ContinuationToken::new("marker-2");
        let page = store
            .list_page(None, Some(&token), PageSize::DEFAULT)
            .await
            .unwrap();

        assert!(page.is_empty());
        assert_eq!(page.next, None);
    }

    #[tokio::test]
    async fn shared_key_requests_are_signed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/photos/cats/a.png"))
            .and(header_exists("authorization"))
            .and(header_exists("x-ms-date"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\x89PNG".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let store = container(ContainerConfig::new("photos").with_connection_string(format!(
            "AccountName=acct;AccountKey=c2VjcmV0LWtleQ==;BlobEndpoint={}",
            server.uri()
        )));
        let bytes = store.read("cats/a.png").await.unwrap();

        assert_eq!(bytes.as_ref(), b"\x89PNG");
    }

    #[tokio::test]
    async fn statuses_map_to_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/photos/missing.png"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/photos/secret.png"))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_string("<Error><Code>AuthorizationFailure</Code></Error>"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/photos"))
            .respond_with(
                ResponseTemplate::new(503).insert_header("x-ms-error-code", "ServerBusy"),
            )
            .mount(&server)
            .await;

        let store = container(ContainerConfig::new("photos").with_account_url(server.uri()));

        assert!(store.read("missing.png").await.unwrap_err().is_not_found());
        assert!(matches!(
            store.read("secret.png").await,
            Err(StorageError::PermissionDenied(msg)) if msg.contains("AuthorizationFailure")
        ));
        assert!(matches!(
            store.list_page(None, None, PageSize::DEFAULT).await,
            Err(StorageError::Http { status: 503, ref message }) if message == "ServerBusy"
        ));
    }

    #[test]
    fn same_container_differs_by_credential() {
        let url = "https://acct.blob.core.windows.net";
        let anonymous = container(ContainerConfig::new("photos").with_account_url(url));
        let signed = container(
            ContainerConfig::new("photos")
                .with_account_url(url)
                .with_sas_token("sv=2024&sig=good"),
        );

        assert_eq!(anonymous.identity(), signed.identity());
        assert_ne!(anonymous.credential(), signed.credential());
        let expected = AuthMode::Sas {
            token: "sv=2024&sig=good".to_owned(),
        };
        assert_eq!(signed.credential(), expected.fingerprint());
    }

    #[test]
    fn blob_urls_are_percent_encoded() {
        let store = container(
            ContainerConfig::new("photos").with_account_url("https://acct.blob.core.windows.net"),
        );
        let url = store.resource_url(Some("holiday 2024/beach #1.png")).unwrap();

        assert_eq!(
            url.as_str(),
            "https://acct.blob.core.windows.net/photos/holiday%202024/beach%20%231.png"
        );
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(MAX_ERROR_EXCERPT + 50);
        assert_eq!(excerpt(&body).len(), MAX_ERROR_EXCERPT + 3);
    }
}
