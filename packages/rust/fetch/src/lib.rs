//! Page fetching for soft navigations and full loads.
//!
//! This crate provides:
//! - [`PageFetcher`], the seam the navigation controller fetches through
//! - [`HttpFetcher`], the `reqwest` implementation used against live sites
//!
//! A fetcher only transports bytes. Deciding what a non-success status means
//! (fall back to a hard navigation, fail a full load) is the caller's job, so
//! every HTTP response, whatever its status, comes back as `Ok`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use docnav_shared::{DocNavError, NavigationConfig, Result};

/// User-Agent string for page requests.
const USER_AGENT: &str = concat!("docnav/", env!("CARGO_PKG_VERSION"));

/// Maximum number of redirects followed per request.
const MAX_REDIRECTS: usize = 5;

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

/// How a page is being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// In-page navigation; carries the soft-navigation marker header.
    Soft,
    /// Full document load, as the browser would issue it.
    Full,
}

/// A GET for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: Url,
    pub mode: FetchMode,
}

impl FetchRequest {
    pub fn soft(url: Url) -> Self {
        Self {
            url,
            mode: FetchMode::Soft,
        }
    }

    pub fn full(url: Url) -> Self {
        Self {
            url,
            mode: FetchMode::Full,
        }
    }
}

/// Status and body of a fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// Final URL after redirects.
    pub url: Url,
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl FetchResponse {
    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Issues page GETs.
///
/// Dropping the returned future aborts the request; the navigation controller
/// relies on that to cancel superseded fetches.
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, request: &FetchRequest) -> impl Future<Output = Result<FetchResponse>> + Send;
}

impl<T: PageFetcher> PageFetcher for Arc<T> {
    fn fetch(&self, request: &FetchRequest) -> impl Future<Output = Result<FetchResponse>> + Send {
        (**self).fetch(request)
    }
}

// ---------------------------------------------------------------------------
// HttpFetcher
// ---------------------------------------------------------------------------

/// `reqwest`-backed fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    marker_header: String,
    marker_value: String,
}

impl HttpFetcher {
    /// Build a fetcher from the navigation settings.
    pub fn new(config: &NavigationConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| DocNavError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            marker_header: config.marker_header.clone(),
            marker_value: config.marker_value.clone(),
        })
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(skip_all, fields(url = %request.url, mode = ?request.mode))]
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse> {
        let mut builder = self.client.get(request.url.as_str());
        if request.mode == FetchMode::Soft {
            builder = builder.header(self.marker_header.as_str(), self.marker_value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| DocNavError::Network(format!("{}: {e}", request.url)))?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let body = response.text().await.map_err(|e| {
            DocNavError::Network(format!("{}: body read failed: {e}", request.url))
        })?;

        debug!(status, bytes = body.len(), "page fetched");

        Ok(FetchResponse {
            url: final_url,
            status,
            body,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(&NavigationConfig::default()).expect("client")
    }

    #[tokio::test]
    async fn soft_fetch_sends_marker_header() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/guide/setup"))
            .and(wiremock::matchers::header("X-Docnav-Navigation", "1"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_string("<main class=\"main\"></main>"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/guide/setup", server.uri())).unwrap();
        let response = fetcher().fetch(&FetchRequest::soft(url)).await.unwrap();

        assert!(response.is_success());
        assert!(response.body.contains("main"));
    }

    #[tokio::test]
    async fn full_fetch_omits_marker_header() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/guide"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/guide", server.uri())).unwrap();
        fetcher().fetch(&FetchRequest::full(url)).await.unwrap();

        let requests = server.received_requests().await.expect("recording enabled");
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("x-docnav-navigation").is_none());
    }

    #[tokio::test]
    async fn error_status_is_returned_not_raised() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(404).set_body_string("missing"))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/nope", server.uri())).unwrap();
        let response = fetcher().fetch(&FetchRequest::soft(url)).await.unwrap();

        assert_eq!(response.status, 404);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn connection_failure_is_network_error() {
        let server = wiremock::MockServer::start().await;
        let url = Url::parse(&format!("{}/gone", server.uri())).unwrap();
        drop(server);

        let err = fetcher().fetch(&FetchRequest::soft(url)).await.unwrap_err();
        assert!(matches!(err, DocNavError::Network(_)));
    }
}
