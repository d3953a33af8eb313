//! Asynchronous image loading with a deadline.
//!
//! A load fetches the source bytes and decodes them as one future run under
//! [`tokio::time::timeout`], so finishing and timing out are the only two
//! outcomes. Nothing is retried; the caller decides whether to carry on
//! without the image.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use card_core::{Bitmap, EditorConfig};
use url::Url;

use crate::error::{LoadResult, ResourceLoadError};
use crate::image::{decode_bitmap, is_data_uri, parse_data_uri, to_data_uri};

/// Default time allowed for a single load.
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Where an image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceSource {
    /// Encoded image bytes already in memory, such as an uploaded file.
    Bytes(Vec<u8>),
    /// An HTTP(S) URL.
    Url(String),
    /// A stored locator: a data URI, an HTTP(S) URL, a `file:` URL or a
    /// filesystem path.
    Locator(String),
}

/// Fetches raw bytes for the loader.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Fetch a remote resource.
    async fn fetch_url(&self, url: &Url) -> LoadResult<Vec<u8>>;

    /// Read a local file.
    async fn read_path(&self, path: &Path) -> LoadResult<Vec<u8>>;
}

/// Fetches over HTTP(S) with reqwest and reads files with tokio.
///
/// Requests carry no cookies or credentials.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    /// Create a fetcher with a fresh HTTP client.
    #[must_use]
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("cardsmith/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client: {e}. Using default client.");
                reqwest::Client::new()
            });
        Self { client }
    }

    /// Create a fetcher around an existing client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch_url(&self, url: &Url) -> LoadResult<Vec<u8>> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ResourceLoadError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResourceLoadError::Network(format!("{url} returned {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ResourceLoadError::Network(e.to_string()))?;
        Ok(body.to_vec())
    }

    async fn read_path(&self, path: &Path) -> LoadResult<Vec<u8>> {
        Ok(tokio::fs::read(path).await?)
    }
}

/// Loads images from any [`ResourceSource`] within a deadline.
#[derive(Clone)]
pub struct ResourceLoader {
    fetcher: Arc<dyn ResourceFetcher>,
    timeout: Duration,
}

impl std::fmt::Debug for ResourceLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceLoader")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Default for ResourceLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceLoader {
    /// Create a loader using [`HttpFetcher`] and the default timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_fetcher(Arc::new(HttpFetcher::new()))
    }

    /// Create a loader using a custom fetcher and the default timeout.
    #[must_use]
    pub fn with_fetcher(fetcher: Arc<dyn ResourceFetcher>) -> Self {
        Self {
            fetcher,
            timeout: DEFAULT_LOAD_TIMEOUT,
        }
    }

    /// Create a loader with the configured timeout.
    #[must_use]
    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new().with_timeout(config.load_timeout())
    }

    /// Replace the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Time allowed for a single load.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Load and decode an image.
    ///
    /// Byte sources are remembered under a base64 data URI so the bitmap
    /// can be dehydrated and loaded again later.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceLoadError::Timeout`] if fetching and decoding take
    /// longer than the timeout, or the fetch/decode error otherwise.
    pub async fn load(&self, source: ResourceSource) -> LoadResult<Bitmap> {
        match tokio::time::timeout(self.timeout, self.fetch_and_decode(source)).await {
            Ok(result) => result,
            Err(_) => Err(ResourceLoadError::Timeout(self.timeout)),
        }
    }

    /// Load an image from a stored locator.
    ///
    /// # Errors
    ///
    /// See [`ResourceLoader::load`].
    pub async fn load_locator(&self, locator: &str) -> LoadResult<Bitmap> {
        self.load(ResourceSource::Locator(locator.to_string())).await
    }

    async fn fetch_and_decode(&self, source: ResourceSource) -> LoadResult<Bitmap> {
        let (locator, bytes) = match source {
            ResourceSource::Bytes(bytes) => (to_data_uri(&bytes), bytes),
            ResourceSource::Url(url) => {
                let parsed = parse_remote_url(&url)?;
                let bytes = self.fetcher.fetch_url(&parsed).await?;
                (url, bytes)
            }
            ResourceSource::Locator(locator) => {
                let bytes = self.read_locator(&locator).await?;
                (locator, bytes)
            }
        };

        tokio::task::spawn_blocking(move || decode_bitmap(locator, &bytes))
            .await
            .map_err(|e| ResourceLoadError::Decode(format!("Decode task failed: {e}")))?
    }

    async fn read_locator(&self, locator: &str) -> LoadResult<Vec<u8>> {
        if locator.trim().is_empty() {
            return Err(ResourceLoadError::InvalidLocator("empty locator".to_string()));
        }

        if is_data_uri(locator) {
            return parse_data_uri(locator);
        }

        if has_scheme(locator, "http:") || has_scheme(locator, "https:") {
            let url = parse_remote_url(locator)?;
            return self.fetcher.fetch_url(&url).await;
        }

        if has_scheme(locator, "file:") {
            let url = Url::parse(locator)
                .map_err(|e| ResourceLoadError::InvalidLocator(format!("{locator}: {e}")))?;
            let path = url.to_file_path().map_err(|()| {
                ResourceLoadError::InvalidLocator(format!("{locator}: not a local path"))
            })?;
            return self.fetcher.read_path(&path).await;
        }

        self.fetcher.read_path(Path::new(locator)).await
    }
}

fn has_scheme(locator: &str, scheme: &str) -> bool {
    locator
        .get(..scheme.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
}

fn parse_remote_url(raw: &str) -> LoadResult<Url> {
    let url =
        Url::parse(raw).map_err(|e| ResourceLoadError::InvalidLocator(format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ResourceLoadError::InvalidLocator(format!(
            "unsupported scheme {other}"
        ))),
    }
}
