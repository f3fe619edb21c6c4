use crate::config::Config;
use crate::feed::fetcher::{fetch_feed, FetchError};
use crate::feed::item::{FallbackTime, RssItem};
use crate::feed::normalizer::normalize;
use crate::feed::parser::{parse_feed, DecodeError};
use futures::stream::{self, StreamExt};
use thiserror::Error;

/// Why a location contributed no items.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Outcome of fetching one location.
///
/// `Ok` may still hold zero items when the feed was empty or every item
/// was dropped during normalization.
#[derive(Debug)]
pub struct SourceReport {
    /// The location as passed by the caller
    pub url: String,
    /// Normalized items, or the stage that failed
    pub result: Result<Vec<RssItem>, SourceError>,
}

/// Fetches feeds concurrently and merges their items.
///
/// Holds only configuration; every call to [`parse`](Self::parse) is
/// independent.
///
/// ```no_run
/// use feedgather::{Config, FallbackTime, FeedReader};
///
/// # async fn run() {
/// let reader = FeedReader::new(Config::default()).with_fallback_time(FallbackTime::now());
/// let items = reader
///     .parse(&["https://www.w3schools.com/xml/rss.xml", "https://example.com/feed"])
///     .await;
/// for item in &items {
///     println!("{} ({})", item.title(), item.source());
/// }
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FeedReader {
    client: reqwest::Client,
    config: Config,
    fallback_time: Option<FallbackTime>,
}

impl Default for FeedReader {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl FeedReader {
    /// Creates a reader with a default HTTP client.
    pub fn new(config: Config) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Creates a reader around a caller-configured HTTP client.
    pub fn with_client(client: reqwest::Client, config: Config) -> Self {
        Self {
            client,
            config,
            fallback_time: None,
        }
    }

    /// Sets the provider used for items without a publish date.
    ///
    /// Without one, such items are dropped.
    pub fn with_fallback_time(mut self, fallback: FallbackTime) -> Self {
        self.fallback_time = Some(fallback);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetches every location and returns all valid items.
    ///
    /// Never fails: an unreachable location, a malformed feed or an
    /// incomplete item only means fewer items. Returns after every location
    /// has finished. Items from one feed keep their document order; nothing
    /// is guaranteed across feeds.
    pub async fn parse<S: AsRef<str>>(&self, urls: &[S]) -> Vec<RssItem> {
        self.parse_detailed(urls)
            .await
            .into_iter()
            .flat_map(|report| match report.result {
                Ok(items) => items,
                Err(e) => {
                    tracing::debug!(url = %report.url, error = %e, "Feed contributed no items");
                    Vec::new()
                }
            })
            .collect()
    }

    /// Like [`parse`](Self::parse), but reports the outcome per location.
    ///
    /// Reports are returned in completion order, not input order.
    pub async fn parse_detailed<S: AsRef<str>>(&self, urls: &[S]) -> Vec<SourceReport> {
        if urls.is_empty() {
            return Vec::new();
        }

        stream::iter(urls.iter().map(|u| u.as_ref().to_owned()))
            .map(|url| async move {
                let result = self.process(&url).await;
                SourceReport { url, result }
            })
            .buffer_unordered(self.config.concurrency())
            .collect()
            .await
    }

    /// fetch → decode → normalize for one location.
    async fn process(&self, url: &str) -> Result<Vec<RssItem>, SourceError> {
        let bytes = fetch_feed(&self.client, url, &self.config).await?;
        let channel = parse_feed(&bytes, self.config.date_policy)?;
        let decoded = channel.items.len();

        let items = normalize(channel, url, self.fallback_time.as_ref());
        tracing::trace!(url = %url, decoded, kept = items.len(), "Feed processed");
        Ok(items)
    }
}

/// Fetches `urls` with default settings and the given date fallback.
///
/// Shorthand for [`FeedReader::parse`] on a default reader.
pub async fn parse<S: AsRef<str>>(urls: &[S], fallback: Option<FallbackTime>) -> Vec<RssItem> {
    let mut reader = FeedReader::default();
    reader.fallback_time = fallback;
    reader.parse(urls).await
}
